use crate::domain::card::EnrichedCardLine;
use crate::domain::format::{self, DetectionSignal, FormatRuleSet};
use crate::domain::game::Game;
use crate::domain::grouping::{self, ReprintGroup};
use serde::Serialize;

const FALLBACK_CONFIDENCE: u8 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatDetection {
    #[serde(serialize_with = "serialize_format_id")]
    pub format: &'static FormatRuleSet,
    pub confidence: u8,
    pub reason: String,
}

fn serialize_format_id<S>(format: &&'static FormatRuleSet, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(format.id)
}

fn signal_fires(
    signal: DetectionSignal,
    lines: &[EnrichedCardLine],
    groups: &[ReprintGroup],
    game: Game,
) -> Option<String> {
    match signal {
        DetectionSignal::Singleton { min_groups } => {
            let rules = game.rules();
            let playables: Vec<&ReprintGroup> =
                groups.iter().filter(|g| !g.is_unlimited_resource).collect();
            let singleton = playables.len() >= min_groups
                && playables.iter().all(|g| g.total_quantity == 1);
            let rule_box = lines.iter().find_map(|line| rules.rule_box_of(line));

            (singleton && rule_box.is_none())
                .then(|| format!("{} single-copy cards and no rule-box cards", playables.len()))
        }
        DetectionSignal::MarksOutside { allowed } => groups
            .iter()
            .filter(|group| !group.is_unlimited_resource)
            .find(|group| {
                let marks: Vec<Option<&str>> = group
                    .members(lines)
                    .filter(|line| line.resolved())
                    .map(|line| line.legality_marker.as_deref())
                    .collect();
                !marks.is_empty()
                    && marks
                        .into_iter()
                        .all(|mark| {
                            mark.is_some_and(|mark| {
                                !allowed.iter().any(|a| a.eq_ignore_ascii_case(mark))
                            })
                        })
            })
            .map(|group| {
                format!(
                    "{} is only printed outside regulation marks {}",
                    group.display_name,
                    allowed.join("/")
                )
            }),
    }
}

/// Picks the format a list was most likely built for. Formats are tried in
/// table order; the game's primary format is the fallback.
#[must_use]
pub fn detect_format(game: Game, lines: &[EnrichedCardLine]) -> FormatDetection {
    let primary = format::primary_for(game);
    let groups = grouping::group_reprints(lines, primary);

    for candidate in format::for_game(game) {
        let Some(detection) = &candidate.detection else {
            continue;
        };
        if let Some(reason) = signal_fires(detection.signal, lines, &groups, game) {
            log::debug!("Detected {} format: {reason}", candidate.id);
            return FormatDetection {
                format: candidate,
                confidence: detection.confidence,
                reason,
            };
        }
    }

    let only_format = format::for_game(game).count() == 1;
    FormatDetection {
        format: primary,
        confidence: if only_format { 100 } else { FALLBACK_CONFIDENCE },
        reason: if only_format {
            format!("{} is the only {game} format", primary.name)
        } else {
            format!("no other format matched; defaulting to {}", primary.name)
        },
    }
}
