use crate::domain::card::{EnrichedCardLine, SectionHint};
use crate::domain::utils;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Game {
    Pokemon,
    Riftbound,
}

impl Game {
    /// Every supported game, primary game first.
    pub const ALL: [Game; 2] = [Game::Pokemon, Game::Riftbound];

    #[must_use]
    pub fn primary() -> Self {
        Game::Pokemon
    }

    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Game::Pokemon => "pokemon",
            Game::Riftbound => "riftbound",
        }
    }

    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|game| game.id().eq_ignore_ascii_case(id.trim()))
    }

    #[must_use]
    pub fn rules(&self) -> &'static GameRules {
        match self {
            Game::Pokemon => &POKEMON,
            Game::Riftbound => &RIFTBOUND,
        }
    }
}

impl Display for Game {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    /// Lines below belong to this bucket; `None` means "work it out from the card".
    Section(Option<SectionHint>),
    Sideboard,
}

/// Declarative description of one game: everything the classifier, parser and
/// validator need to know that differs between games.
pub struct GameRules {
    pub game: Game,
    pub vocabulary: Regex,
    pub card_line: Regex,
    pub headers: &'static [(&'static str, HeaderKind)],
    pub categories: &'static [(&'static str, SectionHint)],
    pub fallback_section: SectionHint,
    pub basic_resources: &'static [&'static str],
    pub rule_box_markers: &'static [&'static str],
    pub rule_box_prefixes: &'static [&'static str],
    pub archetypes: &'static [(&'static str, &'static [&'static str])],
    pub primary_format: &'static str,
}

impl GameRules {
    #[must_use]
    pub fn header_kind(&self, word: &str) -> Option<HeaderKind> {
        let word = utils::canonical_name(word);
        self.headers
            .iter()
            .find(|(header, _)| *header == word)
            .map(|(_, kind)| *kind)
    }

    #[must_use]
    pub fn section_for_category(&self, category: &str) -> Option<SectionHint> {
        let category = utils::canonical_name(category);
        self.categories
            .iter()
            .find(|(name, _)| *name == category)
            .map(|(_, section)| *section)
    }

    /// Bucket a card counts towards: the section it was listed under, then the
    /// bucket its category belongs to, then the game's fallback.
    #[must_use]
    pub fn section_of(&self, line: &EnrichedCardLine) -> SectionHint {
        line.raw
            .section
            .or_else(|| {
                line.category
                    .as_deref()
                    .and_then(|category| self.section_for_category(category))
            })
            .unwrap_or_else(|| {
                if self.is_basic_resource(line.name()) {
                    SectionHint::Resource
                } else {
                    self.fallback_section
                }
            })
    }

    /// Whether the name is a basic resource, exempt from copy limits.
    #[must_use]
    pub fn is_basic_resource(&self, name: &str) -> bool {
        let name = utils::canonical_name(name);
        self.basic_resources.contains(&name.as_str())
    }

    /// Rule-box marker spelled out in a card name, e.g. the `ex` in `Pikachu ex`
    /// or the `Radiant` in `Radiant Greninja`.
    #[must_use]
    pub fn rule_box_in_name(&self, name: &str) -> Option<&'static str> {
        let words: Vec<&str> = name.split_whitespace().collect();
        if words.len() < 2 {
            return None;
        }

        let ends_with = |marker: &str| {
            let marker: Vec<&str> = marker.split_whitespace().collect();
            marker.len() < words.len()
                && words[words.len() - marker.len()..]
                    .iter()
                    .zip(&marker)
                    .all(|(word, part)| word.eq_ignore_ascii_case(part))
        };

        self.rule_box_prefixes
            .iter()
            .find(|marker| words[0].eq_ignore_ascii_case(marker))
            .or_else(|| self.rule_box_markers.iter().find(|marker| ends_with(marker)))
            .copied()
    }

    /// Rule-box marker a card carries, from its subtypes or, when the store
    /// knows nothing about it, from its name.
    #[must_use]
    pub fn rule_box_of(&self, line: &EnrichedCardLine) -> Option<&'static str> {
        self.rule_box_markers
            .iter()
            .find(|marker| line.has_subtype(marker))
            .copied()
            .or_else(|| self.rule_box_in_name(line.name()))
    }

    /// Whether a card carries `marker`, either as a subtype or spelled out in
    /// its name.
    #[must_use]
    pub fn carries_marker(&self, line: &EnrichedCardLine, marker: &str) -> bool {
        line.has_subtype(marker)
            || self
                .rule_box_in_name(line.name())
                .is_some_and(|found| found.eq_ignore_ascii_case(marker))
    }

    /// Distinct vocabulary hits in `text`, lowercased.
    #[must_use]
    pub fn vocabulary_hits(&self, text: &str) -> BTreeSet<String> {
        self.vocabulary
            .find_iter(text)
            .map(|hit| hit.as_str().to_lowercase())
            .collect()
    }
}

static POKEMON: LazyLock<GameRules> = LazyLock::new(|| GameRules {
    game: Game::Pokemon,
    vocabulary: Regex::new(
        r"(?i)\b(?:pok[eé]mon|trainers?|energy|supporter|stadium|item|ex|vstar|vmax|ace spec|professor|ball|regulation)\b",
    )
    .expect("Invalid regex"),
    card_line: Regex::new(
        r"^\d+\s+.+\s+[A-Z][A-Z0-9]{1,4}(?:-[A-Z0-9]{2,3})?\s+[A-Z]{0,4}\d{1,4}[a-z]?$",
    )
    .expect("Invalid regex"),
    headers: &[
        ("pokémon", HeaderKind::Section(Some(SectionHint::PrimaryUnit))),
        ("pokemon", HeaderKind::Section(Some(SectionHint::PrimaryUnit))),
        ("trainer", HeaderKind::Section(Some(SectionHint::SupportUnit))),
        ("trainers", HeaderKind::Section(Some(SectionHint::SupportUnit))),
        ("energy", HeaderKind::Section(Some(SectionHint::Resource))),
        ("energies", HeaderKind::Section(Some(SectionHint::Resource))),
    ],
    categories: &[
        ("pokémon", SectionHint::PrimaryUnit),
        ("pokemon", SectionHint::PrimaryUnit),
        ("trainer", SectionHint::SupportUnit),
        ("energy", SectionHint::Resource),
    ],
    fallback_section: SectionHint::SupportUnit,
    basic_resources: &[
        "grass energy",
        "fire energy",
        "water energy",
        "lightning energy",
        "psychic energy",
        "fighting energy",
        "darkness energy",
        "metal energy",
        "fairy energy",
        "basic grass energy",
        "basic fire energy",
        "basic water energy",
        "basic lightning energy",
        "basic psychic energy",
        "basic fighting energy",
        "basic darkness energy",
        "basic metal energy",
        "basic fairy energy",
        "basic {g} energy",
        "basic {r} energy",
        "basic {w} energy",
        "basic {l} energy",
        "basic {p} energy",
        "basic {f} energy",
        "basic {d} energy",
        "basic {m} energy",
        "basic {y} energy",
    ],
    rule_box_markers: &[
        "ex", "GX", "V", "VMAX", "VSTAR", "V-UNION", "BREAK", "LEGEND", "Radiant", "Prism Star",
    ],
    rule_box_prefixes: &["Radiant"],
    archetypes: &[
        (
            "lost-zone",
            &["lost city", "lost vacuum", "mirage gate", "colress's experiment", "comfey"],
        ),
        (
            "ancient",
            &["ancient booster energy capsule", "professor sada's vitality", "explorer's guidance"],
        ),
        (
            "future",
            &["future booster energy capsule", "professor turo's scenario", "techno radar"],
        ),
        (
            "energy-acceleration",
            &["earthen vessel", "energy retrieval", "superior energy retrieval", "energy search"],
        ),
    ],
    primary_format: "standard",
});

static RIFTBOUND: LazyLock<GameRules> = LazyLock::new(|| GameRules {
    game: Game::Riftbound,
    vocabulary: Regex::new(
        r"(?i)\b(?:legend|champion|battlefields?|runes?|main ?deck|sideboard|fury|calm|mind|body|chaos|order)\b",
    )
    .expect("Invalid regex"),
    card_line: Regex::new(r"^\d+\s*[xX]?\s+.+\s+[A-Z]{2,4}-\d{1,3}[a-z*]?$")
        .expect("Invalid regex"),
    headers: &[
        ("legend", HeaderKind::Section(Some(SectionHint::Leader))),
        ("champion", HeaderKind::Section(Some(SectionHint::PrimaryUnit))),
        ("chosen champion", HeaderKind::Section(Some(SectionHint::PrimaryUnit))),
        ("main deck", HeaderKind::Section(None)),
        ("maindeck", HeaderKind::Section(None)),
        ("main", HeaderKind::Section(None)),
        ("battlefield", HeaderKind::Section(Some(SectionHint::Site))),
        ("battlefields", HeaderKind::Section(Some(SectionHint::Site))),
        ("rune", HeaderKind::Section(Some(SectionHint::Resource))),
        ("runes", HeaderKind::Section(Some(SectionHint::Resource))),
        ("sideboard", HeaderKind::Sideboard),
    ],
    categories: &[
        ("unit", SectionHint::PrimaryUnit),
        ("champion unit", SectionHint::PrimaryUnit),
        ("spell", SectionHint::SupportUnit),
        ("gear", SectionHint::SupportUnit),
        ("legend", SectionHint::Leader),
        ("battlefield", SectionHint::Site),
        ("rune", SectionHint::Resource),
    ],
    fallback_section: SectionHint::PrimaryUnit,
    basic_resources: &[
        "fury rune",
        "calm rune",
        "mind rune",
        "body rune",
        "chaos rune",
        "order rune",
    ],
    rule_box_markers: &[],
    rule_box_prefixes: &[],
    archetypes: &[
        ("yordle", &["teemo", "tristana", "poppy", "lulu", "heimerdinger"]),
        ("noxus", &["darius", "draven", "katarina", "sion"]),
    ],
    primary_format: "riftbound-constructed",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id() {
        assert_eq!(Game::from_id("pokemon"), Some(Game::Pokemon));
        assert_eq!(Game::from_id(" Riftbound "), Some(Game::Riftbound));
        assert_eq!(Game::from_id("yugioh"), None);
    }

    #[test]
    fn test_header_kind() {
        let rules = Game::Pokemon.rules();
        assert_eq!(
            rules.header_kind("Pokémon"),
            Some(HeaderKind::Section(Some(SectionHint::PrimaryUnit)))
        );
        assert_eq!(
            rules.header_kind("TRAINER"),
            Some(HeaderKind::Section(Some(SectionHint::SupportUnit)))
        );
        assert_eq!(rules.header_kind("Ultra Ball"), None);
        assert_eq!(
            Game::Riftbound.rules().header_kind("Sideboard"),
            Some(HeaderKind::Sideboard)
        );
    }

    #[test]
    fn test_basic_resources() {
        let rules = Game::Pokemon.rules();
        assert!(rules.is_basic_resource("Basic Fire Energy"));
        assert!(rules.is_basic_resource("Psychic Energy (Holo)"));
        assert!(rules.is_basic_resource("Basic {L} Energy"));
        assert!(!rules.is_basic_resource("Double Turbo Energy"));
        assert!(Game::Riftbound.rules().is_basic_resource("Fury Rune"));
    }

    #[test]
    fn test_rule_box_in_name() {
        let rules = Game::Pokemon.rules();
        assert_eq!(rules.rule_box_in_name("Charizard ex"), Some("ex"));
        assert_eq!(rules.rule_box_in_name("Lugia VSTAR"), Some("VSTAR"));
        assert_eq!(rules.rule_box_in_name("Radiant Greninja"), Some("Radiant"));
        assert_eq!(rules.rule_box_in_name("Pidgeot V"), Some("V"));
        assert_eq!(rules.rule_box_in_name("Bidoof"), None);
        assert_eq!(rules.rule_box_in_name("Rare Candy"), None);
        assert_eq!(rules.rule_box_in_name(""), None);
    }

    #[test]
    fn test_section_for_category() {
        let rules = Game::Riftbound.rules();
        assert_eq!(rules.section_for_category("Legend"), Some(SectionHint::Leader));
        assert_eq!(rules.section_for_category("Spell"), Some(SectionHint::SupportUnit));
        assert_eq!(rules.section_for_category("Token"), None);
    }

    #[test]
    fn test_section_of_prefers_listed_section() {
        use crate::domain::card::fixtures;

        let rules = Game::Pokemon.rules();
        let mut listed = fixtures::trainer("Ultra Ball", 4, &["Item"]);
        listed.raw.section = Some(SectionHint::PrimaryUnit);
        assert_eq!(rules.section_of(&listed), SectionHint::PrimaryUnit);

        let by_category = fixtures::pokemon("Pikachu ex", 2, "Basic", &["Lightning"]);
        assert_eq!(rules.section_of(&by_category), SectionHint::PrimaryUnit);

        let energy = EnrichedCardLine::unresolved(fixtures::raw("Fire Energy", 8, None));
        assert_eq!(rules.section_of(&energy), SectionHint::Resource);

        let unknown = EnrichedCardLine::unresolved(fixtures::raw("Mystery Card", 1, None));
        assert_eq!(rules.section_of(&unknown), SectionHint::SupportUnit);
    }

    #[test]
    fn test_rule_box_of() {
        use crate::domain::card::fixtures;

        let rules = Game::Pokemon.rules();
        let mut lugia = fixtures::pokemon("Lugia VSTAR", 2, "VSTAR", &["Colorless"]);
        assert_eq!(rules.rule_box_of(&lugia), Some("VSTAR"));
        lugia.subtypes.clear();
        assert_eq!(rules.rule_box_of(&lugia), Some("VSTAR"));

        let unresolved = EnrichedCardLine::unresolved(fixtures::raw("Radiant Charizard", 1, None));
        assert!(rules.carries_marker(&unresolved, "radiant"));
        assert!(!rules.carries_marker(&unresolved, "ex"));

        let plain = fixtures::pokemon("Pidgey", 2, "Basic", &["Colorless"]);
        assert_eq!(rules.rule_box_of(&plain), None);
    }

    #[test]
    fn test_rule_box_in_name_multi_word_marker() {
        let rules = Game::Pokemon.rules();

        assert_eq!(rules.rule_box_in_name("Cyrus Prism Star"), Some("Prism Star"));
        assert_eq!(rules.rule_box_in_name("Lunala prism star"), Some("Prism Star"));
        assert_eq!(rules.rule_box_in_name("Prism Star"), None);
        assert_eq!(rules.rule_box_in_name("Shooting Star"), None);
        assert_eq!(rules.rule_box_in_name("Pikachu ex"), Some("ex"));
    }

    #[test]
    fn test_vocabulary_hits() {
        let hits = Game::Pokemon
            .rules()
            .vocabulary_hits("Pokémon: 12\nTrainer: 36\nEnergy: 12\n4 Ultra Ball SVI 196");
        assert!(hits.contains("pokémon"));
        assert!(hits.contains("trainer"));
        assert!(hits.contains("energy"));
        assert!(hits.contains("ball"));
    }
}
