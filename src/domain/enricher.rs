use crate::domain::app::App;
use crate::domain::card::{CardMetadata, CardRef, EnrichedCardLine, RawCardLine, ResolvedVia};
use crate::domain::game::Game;
use crate::domain::set_codes::SET_CODES;
use crate::domain::utils::{canonical_name, normalise};
use crate::ports::outbound::card_store::CardStore;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tokio::time::Instant;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentStats {
    pub total: usize,
    pub enriched: usize,
    pub not_found: usize,
    /// Lines resolved through the name lookup rather than by identifier.
    pub by_name: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enrichment {
    pub lines: Vec<EnrichedCardLine>,
    pub stats: EnrichmentStats,
}

fn candidate_ids(game: Game, line: &RawCardLine) -> Vec<String> {
    match &line.reference {
        CardRef::Resolved {
            id,
            set_code,
            set_number,
        } => {
            if !SET_CODES.is_known(game, set_code) {
                log::debug!("Unknown {game} set code '{set_code}' on line {}", line.line_number);
            }
            let mut candidates = vec![id.clone()];
            for candidate in SET_CODES.candidate_identifiers(game, set_code, set_number) {
                if !candidates.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
            candidates
        }
        CardRef::Unresolved => Vec::new(),
    }
}

fn name_keys(name: &str) -> [String; 2] {
    [normalise(name), normalise(&canonical_name(name))]
}

fn match_by_name<'a>(
    name: &str,
    found: &'a HashMap<String, CardMetadata>,
) -> Option<&'a CardMetadata> {
    let [exact, stripped] = name_keys(name);
    found.get(&exact).or_else(|| found.get(&stripped))
}

impl<CS> App<CS>
where
    CS: CardStore + Send + Sync,
{
    /// Attaches store metadata to every parsed line using at most one
    /// identifier lookup and one name lookup. Lines the store does not know
    /// come back unresolved; a failing store leaves everything unresolved.
    pub async fn enrich(&self, game: Game, lines: Vec<RawCardLine>) -> Enrichment {
        let start = Instant::now();

        let candidates: Vec<Vec<String>> =
            lines.iter().map(|line| candidate_ids(game, line)).collect();
        let ids: Vec<String> = candidates
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let by_id = if ids.is_empty() {
            HashMap::new()
        } else {
            match self.card_store.lookup_by_identifiers(game, &ids).await {
                Ok(found) => found,
                Err(why) => {
                    log::warn!("Failed to look up {} card identifiers - {why}", ids.len());
                    HashMap::new()
                }
            }
        };

        let id_matches: Vec<Option<&CardMetadata>> = candidates
            .iter()
            .map(|ids| ids.iter().find_map(|id| by_id.get(id)))
            .collect();

        let names: Vec<String> = lines
            .iter()
            .zip(&id_matches)
            .filter(|(_, found)| found.is_none())
            .flat_map(|(line, _)| name_keys(&line.name))
            .filter(|key| !key.trim().is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let by_name = if names.is_empty() {
            HashMap::new()
        } else {
            match self.card_store.lookup_by_names(game, &names).await {
                Ok(found) => found,
                Err(why) => {
                    log::warn!("Failed to look up {} card names - {why}", names.len());
                    HashMap::new()
                }
            }
        };

        let mut stats = EnrichmentStats {
            total: lines.len(),
            ..EnrichmentStats::default()
        };

        let enriched: Vec<EnrichedCardLine> = lines
            .into_iter()
            .zip(id_matches)
            .map(|(line, by_id)| {
                if let Some(metadata) = by_id {
                    stats.enriched += 1;
                    return EnrichedCardLine::with_metadata(line, metadata.clone(), ResolvedVia::ById);
                }
                match match_by_name(&line.name, &by_name) {
                    Some(metadata) => {
                        stats.enriched += 1;
                        stats.by_name += 1;
                        EnrichedCardLine::with_metadata(line, metadata.clone(), ResolvedVia::ByName)
                    }
                    None => {
                        stats.not_found += 1;
                        EnrichedCardLine::unresolved(line)
                    }
                }
            })
            .collect();

        stats.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        log::info!(
            "Enriched {}/{} {game} card lines ({} by name) in {} ms",
            stats.enriched,
            stats.total,
            stats.by_name,
            stats.duration_ms
        );

        Enrichment {
            lines: enriched,
            stats,
        }
    }
}
