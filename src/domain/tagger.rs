use crate::domain::card::{EnrichedCardLine, SectionHint};
use crate::domain::format::FormatRuleSet;
use crate::domain::utils::canonical_name;
use std::collections::{BTreeMap, BTreeSet};

const TYPE_SHARE: f64 = 0.5;
const MECHANIC_SHARE: f64 = 0.25;

/// Descriptive tags for a list: dominant types, common rule-box mechanics,
/// archetypes recognised from key cards, and the format. Best effort; never
/// fails.
#[must_use]
pub fn auto_tags(lines: &[EnrichedCardLine], format: &FormatRuleSet) -> Vec<String> {
    if lines.is_empty() {
        return Vec::new();
    }

    let rules = format.game_rules();
    let mut tags = BTreeSet::new();
    tags.insert(format!("format:{}", format.id));

    let units: Vec<&EnrichedCardLine> = lines
        .iter()
        .filter(|line| rules.section_of(line) == SectionHint::PrimaryUnit)
        .collect();
    let unit_copies: u32 = units.iter().map(|line| line.quantity()).sum();

    if unit_copies > 0 {
        let mut types: BTreeMap<&str, u32> = BTreeMap::new();
        let mut mechanics: BTreeMap<&str, u32> = BTreeMap::new();
        for line in &units {
            for t in &line.types {
                *types.entry(t.as_str()).or_default() += line.quantity();
            }
            if let Some(marker) = rules.rule_box_of(line) {
                *mechanics.entry(marker).or_default() += line.quantity();
            }
        }

        let share = |copies: u32| f64::from(copies) / f64::from(unit_copies);
        for (t, copies) in types {
            if share(copies) >= TYPE_SHARE {
                tags.insert(format!("type:{}", t.to_lowercase()));
            }
        }
        for (marker, copies) in mechanics {
            if share(copies) >= MECHANIC_SHARE {
                tags.insert(format!("mechanic:{}", marker.to_lowercase()));
            }
        }
    }

    let names: BTreeSet<String> = lines
        .iter()
        .map(|line| canonical_name(line.name()))
        .collect();
    for (archetype, keywords) in rules.archetypes {
        if names
            .iter()
            .any(|name| keywords.iter().any(|keyword| name.contains(keyword)))
        {
            tags.insert(format!("archetype:{archetype}"));
        }
    }

    tags.into_iter().collect()
}
