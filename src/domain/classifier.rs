use crate::domain::game::Game;
use crate::domain::parser;
use serde::Serialize;
use std::collections::BTreeMap;

/// Confidence at or above which a classification is considered reliable.
pub const HIGH_CONFIDENCE: u8 = 60;

const KEYWORD_WEIGHT: f64 = 6.0;
const KEYWORD_CAP: usize = 5;
const HEADER_WEIGHT: f64 = 30.0;
const LINE_WEIGHT: f64 = 40.0;
const MAX_SCORE: f64 = KEYWORD_WEIGHT * KEYWORD_CAP as f64 + HEADER_WEIGHT + LINE_WEIGHT;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub game: Game,
    pub confidence: u8,
    pub reasons: Vec<String>,
    pub raw_scores: BTreeMap<Game, f64>,
}

impl ClassificationResult {
    #[must_use]
    pub fn is_confident(&self) -> bool {
        self.confidence >= HIGH_CONFIDENCE
    }
}

struct GameScore {
    game: Game,
    score: f64,
    reasons: Vec<String>,
}

fn score_game(game: Game, text: &str, lines: &[&str]) -> GameScore {
    let rules = game.rules();
    let mut reasons = Vec::new();

    let keywords = rules.vocabulary_hits(text);
    let keyword_score = KEYWORD_WEIGHT * keywords.len().min(KEYWORD_CAP) as f64;
    if !keywords.is_empty() {
        let sample: Vec<&str> = keywords.iter().take(KEYWORD_CAP).map(String::as_str).collect();
        reasons.push(format!(
            "{} {game} keyword(s) found ({})",
            keywords.len(),
            sample.join(", ")
        ));
    }

    let headers = lines
        .iter()
        .filter(|line| parser::header(line, rules).is_some())
        .count();
    let header_score = if headers > 0 {
        reasons.push(format!("{headers} {game} section header(s) found"));
        HEADER_WEIGHT
    } else {
        0.0
    };

    let card_lines = lines
        .iter()
        .filter(|line| rules.card_line.is_match(line))
        .count();
    let line_score = if lines.is_empty() {
        0.0
    } else {
        let fraction = card_lines as f64 / lines.len() as f64;
        if card_lines > 0 {
            reasons.push(format!(
                "{:.0}% of lines look like {game} card lines",
                fraction * 100.0
            ));
        }
        LINE_WEIGHT * fraction
    };

    GameScore {
        game,
        score: keyword_score + header_score + line_score,
        reasons,
    }
}

/// Guesses which game a deck list belongs to. Accepts any input; text with no
/// recognisable content falls back to the primary game with zero confidence.
#[must_use]
pub fn classify(text: &str) -> ClassificationResult {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !parser::is_skippable(line))
        .collect();

    let scores: Vec<GameScore> = Game::ALL
        .into_iter()
        .map(|game| score_game(game, text, &lines))
        .collect();
    let raw_scores = scores.iter().map(|s| (s.game, s.score)).collect();

    let best = scores.iter().map(|s| s.score).fold(0.0, f64::max);
    if best <= 0.0 {
        return ClassificationResult {
            game: Game::primary(),
            confidence: 0,
            reasons: vec![format!(
                "no recognisable deck content; defaulting to {}",
                Game::primary()
            )],
            raw_scores,
        };
    }

    let tied = scores.iter().filter(|s| s.score == best).count() > 1;
    let position = scores
        .iter()
        .position(|s| s.score == best && (!tied || s.game == Game::primary()))
        .or_else(|| scores.iter().position(|s| s.score == best))
        .unwrap_or(0);
    let mut scores = scores;
    let mut winner = scores.swap_remove(position);
    if tied {
        winner
            .reasons
            .push(format!("scores tied; defaulting to {}", winner.game));
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let confidence = (100.0 * winner.score / MAX_SCORE).round().clamp(0.0, 100.0) as u8;

    log::debug!(
        "Classified deck as {} with {confidence}% confidence",
        winner.game
    );

    ClassificationResult {
        game: winner.game,
        confidence,
        reasons: winner.reasons,
        raw_scores,
    }
}
