use crate::domain::utils;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Structural bucket a card line is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionHint {
    PrimaryUnit,
    SupportUnit,
    Resource,
    Leader,
    Site,
}

/// How a parsed line refers to its card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CardRef {
    Resolved {
        id: String,
        set_code: String,
        set_number: String,
    },
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCardLine {
    pub reference: CardRef,
    pub name: String,
    pub quantity: u32,
    pub section: Option<SectionHint>,
    pub line_number: usize,
    pub original_text: String,
}

impl RawCardLine {
    #[must_use]
    pub fn card_id(&self) -> Option<&str> {
        match &self.reference {
            CardRef::Resolved { id, .. } => Some(id),
            CardRef::Unresolved => None,
        }
    }

    #[must_use]
    pub fn needs_resolution(&self) -> bool {
        matches!(self.reference, CardRef::Unresolved)
    }

    /// Key used to merge repeated references inside one list.
    #[must_use]
    pub fn merge_key(&self) -> String {
        match &self.reference {
            CardRef::Resolved { id, .. } => format!("id:{id}"),
            CardRef::Unresolved => format!("name:{}", utils::canonical_name(&self.name)),
        }
    }
}

/// Card record returned by the card store.
#[cfg_attr(test, derive(PartialEq))]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CardMetadata {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub subtypes: Vec<String>,
    pub types: Vec<String>,
    pub stage: Option<String>,
    pub legality_marker: Option<String>,
    pub rarity: Option<String>,
    pub small_image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedVia {
    ById,
    ByName,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedCardLine {
    #[serde(flatten)]
    pub raw: RawCardLine,
    pub display_name: Option<String>,
    pub category: Option<String>,
    pub subtypes: Vec<String>,
    pub types: BTreeSet<String>,
    pub stage: Option<String>,
    pub legality_marker: Option<String>,
    pub rarity: Option<String>,
    pub small_image: Option<String>,
    pub resolved_via: ResolvedVia,
}

impl EnrichedCardLine {
    #[must_use]
    pub fn unresolved(raw: RawCardLine) -> Self {
        Self {
            raw,
            display_name: None,
            category: None,
            subtypes: Vec::new(),
            types: BTreeSet::new(),
            stage: None,
            legality_marker: None,
            rarity: None,
            small_image: None,
            resolved_via: ResolvedVia::None,
        }
    }

    #[must_use]
    pub fn with_metadata(raw: RawCardLine, metadata: CardMetadata, via: ResolvedVia) -> Self {
        Self {
            raw,
            display_name: Some(metadata.name),
            category: metadata.category,
            subtypes: metadata.subtypes,
            types: metadata.types.into_iter().collect(),
            stage: metadata.stage,
            legality_marker: metadata.legality_marker,
            rarity: metadata.rarity,
            small_image: metadata.small_image,
            resolved_via: via,
        }
    }

    #[must_use]
    pub fn resolved(&self) -> bool {
        self.resolved_via != ResolvedVia::None
    }

    /// Store name when known, otherwise the name as typed.
    #[must_use]
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.raw.name)
    }

    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.raw.quantity
    }

    #[must_use]
    pub fn has_subtype(&self, marker: &str) -> bool {
        self.subtypes
            .iter()
            .any(|subtype| subtype.eq_ignore_ascii_case(marker))
    }
}
