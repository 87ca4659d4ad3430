use crate::domain::game::Game;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;

const SET_CODE_TABLE: &str = include_str!("../../data/set_codes.ron");

pub static SET_CODES: LazyLock<SetCodeTable> = LazyLock::new(|| {
    ron::from_str::<SetCodeTable>(SET_CODE_TABLE).expect("Invalid set code table")
});

/// Versioned mapping from typed print-run abbreviations to canonical set codes.
#[derive(Debug, Deserialize)]
pub struct SetCodeTable {
    pub version: u32,
    games: HashMap<String, HashMap<String, Vec<String>>>,
}

impl SetCodeTable {
    /// Canonical codes for an abbreviation, preferred first. Unknown
    /// abbreviations fall back to the abbreviation itself, lowercased.
    #[must_use]
    pub fn canonical_codes(&self, game: Game, abbreviation: &str) -> Vec<String> {
        let abbreviation = abbreviation.trim().to_uppercase();
        match self
            .games
            .get(game.id())
            .and_then(|codes| codes.get(&abbreviation))
        {
            Some(codes) if !codes.is_empty() => {
                codes.iter().map(|code| code.to_lowercase()).collect()
            }
            _ => vec![abbreviation.to_lowercase()],
        }
    }

    #[must_use]
    pub fn is_known(&self, game: Game, abbreviation: &str) -> bool {
        self.games
            .get(game.id())
            .is_some_and(|codes| codes.contains_key(&abbreviation.trim().to_uppercase()))
    }

    /// Preferred identifier for a printing, e.g. `PAL 185` -> `sv2-185`.
    #[must_use]
    pub fn identifier(&self, game: Game, abbreviation: &str, number: &str) -> String {
        let code = self
            .canonical_codes(game, abbreviation)
            .into_iter()
            .next()
            .unwrap_or_default();
        format!("{code}-{}", pad_number(number))
    }

    /// Every identifier a printing might be stored under: each canonical code
    /// combined with the padded, unpadded and as-typed card number.
    #[must_use]
    pub fn candidate_identifiers(&self, game: Game, abbreviation: &str, number: &str) -> Vec<String> {
        let numbers = [
            pad_number(number),
            strip_number(number),
            number.trim().to_lowercase(),
        ];

        let mut candidates = Vec::new();
        for code in self.canonical_codes(game, abbreviation) {
            for number in &numbers {
                let candidate = format!("{code}-{number}");
                if !candidates.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
        }
        candidates
    }
}

fn pad_number(number: &str) -> String {
    let number = number.trim();
    if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
        format!("{number:0>3}")
    } else {
        number.to_lowercase()
    }
}

fn strip_number(number: &str) -> String {
    let number = number.trim();
    if number.chars().all(|c| c.is_ascii_digit()) {
        let stripped = number.trim_start_matches('0');
        if stripped.is_empty() {
            String::from("0")
        } else {
            stripped.to_string()
        }
    } else {
        number.to_lowercase()
    }
}
