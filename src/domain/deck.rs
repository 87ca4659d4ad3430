use crate::domain::app::App;
use crate::domain::card::EnrichedCardLine;
use crate::domain::classifier::{self, ClassificationResult};
use crate::domain::enricher::EnrichmentStats;
use crate::domain::format::detect::detect_format;
use crate::domain::format::{self, FormatId};
use crate::domain::game::Game;
use crate::domain::grouping::{group_reprints, ReprintGroup};
use crate::domain::parser::{self, Dialect, ParseIssue};
use crate::domain::tagger::auto_tags;
use crate::domain::validator::{self, ValidationResult};
use crate::ports::outbound::card_store::CardStore;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::time::Instant;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeckError {
    #[error("Unknown format '{0}'")]
    UnknownFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatSelection {
    /// Format the deck was validated against.
    pub format: FormatId,
    /// Format auto-detection picked, whether or not it was used.
    pub detected: FormatId,
    pub confidence: u8,
    pub is_override: bool,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeckSummary {
    pub total_cards: u32,
    pub unique_cards: usize,
    pub needs_resolution: usize,
    pub groups_exceeding_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckReport {
    pub game: ClassificationResult,
    /// Game the text was parsed and validated as; differs from the
    /// classification when a format of another game was requested.
    pub parsed_as: Game,
    pub format: FormatSelection,
    pub dialect: Dialect,
    pub cards: Vec<EnrichedCardLine>,
    pub groups: Vec<ReprintGroup>,
    pub breakdown: BTreeMap<String, u32>,
    pub validation: ValidationResult,
    pub parse_issues: Vec<ParseIssue>,
    pub parse_warnings: Vec<String>,
    pub tags: Vec<String>,
    pub enrichment: EnrichmentStats,
    pub summary: DeckSummary,
}

impl<CS> App<CS>
where
    CS: CardStore + Send + Sync,
{
    /// Runs a pasted deck list through classification, parsing, enrichment,
    /// grouping, validation and tagging.
    ///
    /// `format_override` forces the format to validate against; the detected
    /// format is still reported. Only an unknown override is an error.
    pub async fn analyse_deck(
        &self,
        text: &str,
        format_override: Option<&str>,
    ) -> Result<DeckReport, DeckError> {
        let start = Instant::now();

        let requested = format_override
            .map(|id| format::find(id).ok_or_else(|| DeckError::UnknownFormat(id.to_string())))
            .transpose()?;

        let classification = classifier::classify(text);
        let game = requested.map_or(classification.game, |format| format.game);
        if game != classification.game {
            log::debug!(
                "Classified as {} but parsing as {game} for the requested format",
                classification.game
            );
        }

        let parsed = parser::parse(text, game);
        let enrichment = self.enrich(game, parsed.lines).await;
        let cards = enrichment.lines;

        // Detection answers for the classified game even when another game's
        // format was requested. The store is not asked twice, so that
        // detection only sees the text.
        let detection = if game == classification.game {
            detect_format(game, &cards)
        } else {
            let unenriched: Vec<EnrichedCardLine> = parser::parse(text, classification.game)
                .lines
                .into_iter()
                .map(EnrichedCardLine::unresolved)
                .collect();
            detect_format(classification.game, &unenriched)
        };
        let format = requested.unwrap_or(detection.format);
        let selection = FormatSelection {
            format: FormatId::from(format),
            detected: FormatId::from(detection.format),
            confidence: detection.confidence,
            is_override: requested.is_some_and(|requested| requested != detection.format),
            reason: match requested {
                Some(requested) => format!("{} was requested", requested.name),
                None => detection.reason,
            },
        };

        let groups = group_reprints(&cards, format);
        let validation = validator::validate(&cards, &groups, format);
        let tags = auto_tags(&cards, format);
        let breakdown = validator::breakdown(&cards, format)
            .into_iter()
            .map(|(label, copies)| (label.to_string(), copies))
            .collect();

        let summary = DeckSummary {
            total_cards: cards.iter().map(EnrichedCardLine::quantity).sum(),
            unique_cards: groups.len(),
            needs_resolution: cards.iter().filter(|card| !card.resolved()).count(),
            groups_exceeding_limit: groups.iter().filter(|g| g.exceeds_limit()).count(),
        };

        log::info!(
            "Analysed {game} deck of {} cards as {} ({} errors) in {} ms",
            summary.total_cards,
            format.id,
            validation.errors.len(),
            start.elapsed().as_millis()
        );

        Ok(DeckReport {
            game: classification,
            parsed_as: game,
            format: selection,
            dialect: parsed.dialect,
            cards,
            groups,
            breakdown,
            validation,
            parse_issues: parsed.issues,
            parse_warnings: parsed.warnings,
            tags,
            enrichment: enrichment.stats,
            summary,
        })
    }
}
