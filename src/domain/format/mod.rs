pub mod detect;

use crate::domain::card::{EnrichedCardLine, SectionHint};
use crate::domain::game::{Game, GameRules};
use serde::Serialize;

/// A bucket whose copies must add up to exactly `target`.
#[derive(Debug)]
pub struct BucketTarget {
    pub label: &'static str,
    pub sections: &'static [SectionHint],
    pub target: u32,
}

#[derive(Debug, Clone, Copy)]
pub enum Predicate {
    Stage(&'static str),
    Subtype(&'static str),
}

impl Predicate {
    #[must_use]
    pub fn matches(&self, line: &EnrichedCardLine) -> bool {
        match self {
            Predicate::Stage(stage) => {
                line.stage
                    .as_deref()
                    .is_some_and(|found| found.eq_ignore_ascii_case(stage))
                    || line.has_subtype(stage)
            }
            Predicate::Subtype(subtype) => line.has_subtype(subtype),
        }
    }
}

/// At least `min` copies in `section` must satisfy `predicate`.
#[derive(Debug)]
pub struct Minimum {
    pub label: &'static str,
    pub section: SectionHint,
    pub predicate: Predicate,
    pub min: u32,
}

/// Combined copies carrying `marker` may not exceed `max`; zero bans it.
#[derive(Debug)]
pub struct SubtypeCap {
    pub marker: &'static str,
    pub max: u32,
}

/// Distinct cards that count as one card for the copy limit.
#[derive(Debug)]
pub struct SingletonGroup {
    pub name: &'static str,
    pub members: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub enum IdentitySource {
    /// Union of the types printed on the cards in this section.
    Section(SectionHint),
    /// The type carried by the most copies in this section.
    DominantType(SectionHint),
}

#[derive(Debug)]
pub struct DomainRule {
    pub source: IdentitySource,
    pub applies_to: &'static [SectionHint],
    pub neutral_types: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub enum DetectionSignal {
    /// Every non-resource group is a single copy, across at least `min_groups`
    /// groups, and no rule-box card is present.
    Singleton { min_groups: usize },
    /// Some group was only ever printed with marks outside `allowed`.
    MarksOutside { allowed: &'static [&'static str] },
}

#[derive(Debug)]
pub struct Detection {
    pub signal: DetectionSignal,
    pub confidence: u8,
}

/// Declarative legality rules for one tournament format.
#[derive(Debug)]
pub struct FormatRuleSet {
    pub id: &'static str,
    pub name: &'static str,
    pub game: Game,
    pub buckets: &'static [BucketTarget],
    pub copy_limit: u32,
    pub section_copy_limits: &'static [(SectionHint, u32)],
    pub minimums: &'static [Minimum],
    pub subtype_caps: &'static [SubtypeCap],
    pub singleton_groups: &'static [SingletonGroup],
    pub domain: Option<DomainRule>,
    pub allowed_legality_marks: Option<&'static [&'static str]>,
    pub detection: Option<Detection>,
}

impl FormatRuleSet {
    #[must_use]
    pub fn game_rules(&self) -> &'static GameRules {
        self.game.rules()
    }

    /// Copy limit for a card counted in `section`.
    #[must_use]
    pub fn copy_limit_for(&self, section: SectionHint) -> u32 {
        self.section_copy_limits
            .iter()
            .find(|(capped, _)| *capped == section)
            .map_or(self.copy_limit, |(_, limit)| *limit)
    }
}

impl PartialEq for FormatRuleSet {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FormatRuleSet {}

/// Format id and display name, as reported back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatId {
    pub id: &'static str,
    pub name: &'static str,
    pub game: Game,
}

impl From<&FormatRuleSet> for FormatId {
    fn from(rules: &FormatRuleSet) -> Self {
        Self {
            id: rules.id,
            name: rules.name,
            game: rules.game,
        }
    }
}

const POKEMON_DECK: &[BucketTarget] = &[BucketTarget {
    label: "deck",
    sections: &[
        SectionHint::PrimaryUnit,
        SectionHint::SupportUnit,
        SectionHint::Resource,
    ],
    target: 60,
}];

const BASIC_POKEMON: &[Minimum] = &[Minimum {
    label: "Basic Pokémon",
    section: SectionHint::PrimaryUnit,
    predicate: Predicate::Stage("Basic"),
    min: 1,
}];

const STANDARD_MARKS: &[&str] = &["G", "H", "I"];

const POKEMON_CAPS: &[SubtypeCap] = &[
    SubtypeCap {
        marker: "ACE SPEC",
        max: 1,
    },
    SubtypeCap {
        marker: "Radiant",
        max: 1,
    },
];

/// Formats are checked for auto-detection in the order listed here.
pub static FORMATS: &[FormatRuleSet] = &[
    FormatRuleSet {
        id: "glc",
        name: "Gym Leader Challenge",
        game: Game::Pokemon,
        buckets: POKEMON_DECK,
        copy_limit: 1,
        section_copy_limits: &[],
        minimums: BASIC_POKEMON,
        subtype_caps: &[
            SubtypeCap { marker: "ex", max: 0 },
            SubtypeCap { marker: "GX", max: 0 },
            SubtypeCap { marker: "V", max: 0 },
            SubtypeCap { marker: "VMAX", max: 0 },
            SubtypeCap { marker: "VSTAR", max: 0 },
            SubtypeCap { marker: "V-UNION", max: 0 },
            SubtypeCap { marker: "BREAK", max: 0 },
            SubtypeCap { marker: "LEGEND", max: 0 },
            SubtypeCap { marker: "Radiant", max: 0 },
            SubtypeCap { marker: "Prism Star", max: 0 },
            SubtypeCap { marker: "ACE SPEC", max: 0 },
        ],
        singleton_groups: &[
            SingletonGroup {
                name: "Professor",
                members: &["Professor's Research", "Professor Juniper", "Professor Sycamore"],
            },
            SingletonGroup {
                name: "Boss",
                members: &["Boss's Orders", "Lysandre"],
            },
        ],
        domain: Some(DomainRule {
            source: IdentitySource::DominantType(SectionHint::PrimaryUnit),
            applies_to: &[SectionHint::PrimaryUnit],
            neutral_types: &["Colorless"],
        }),
        allowed_legality_marks: None,
        detection: Some(Detection {
            signal: DetectionSignal::Singleton { min_groups: 10 },
            confidence: 85,
        }),
    },
    FormatRuleSet {
        id: "expanded",
        name: "Expanded",
        game: Game::Pokemon,
        buckets: POKEMON_DECK,
        copy_limit: 4,
        section_copy_limits: &[],
        minimums: BASIC_POKEMON,
        subtype_caps: POKEMON_CAPS,
        singleton_groups: &[],
        domain: None,
        allowed_legality_marks: None,
        detection: Some(Detection {
            signal: DetectionSignal::MarksOutside {
                allowed: STANDARD_MARKS,
            },
            confidence: 75,
        }),
    },
    FormatRuleSet {
        id: "standard",
        name: "Standard",
        game: Game::Pokemon,
        buckets: POKEMON_DECK,
        copy_limit: 4,
        section_copy_limits: &[],
        minimums: BASIC_POKEMON,
        subtype_caps: POKEMON_CAPS,
        singleton_groups: &[],
        domain: None,
        allowed_legality_marks: Some(STANDARD_MARKS),
        detection: None,
    },
    FormatRuleSet {
        id: "riftbound-constructed",
        name: "Riftbound Constructed",
        game: Game::Riftbound,
        buckets: &[
            BucketTarget {
                label: "main",
                sections: &[SectionHint::PrimaryUnit, SectionHint::SupportUnit],
                target: 40,
            },
            BucketTarget {
                label: "legend",
                sections: &[SectionHint::Leader],
                target: 1,
            },
            BucketTarget {
                label: "battlefields",
                sections: &[SectionHint::Site],
                target: 3,
            },
            BucketTarget {
                label: "runes",
                sections: &[SectionHint::Resource],
                target: 12,
            },
        ],
        copy_limit: 3,
        section_copy_limits: &[(SectionHint::Site, 1)],
        minimums: &[Minimum {
            label: "Champion unit",
            section: SectionHint::PrimaryUnit,
            predicate: Predicate::Subtype("Champion"),
            min: 1,
        }],
        subtype_caps: &[SubtypeCap {
            marker: "Signature",
            max: 3,
        }],
        singleton_groups: &[],
        domain: Some(DomainRule {
            source: IdentitySource::Section(SectionHint::Leader),
            applies_to: &[
                SectionHint::PrimaryUnit,
                SectionHint::SupportUnit,
                SectionHint::Resource,
            ],
            neutral_types: &["Colorless"],
        }),
        allowed_legality_marks: None,
        detection: None,
    },
];

/// Looks a format up by id, ignoring case.
#[must_use]
pub fn find(id: &str) -> Option<&'static FormatRuleSet> {
    let id = id.trim();
    FORMATS
        .iter()
        .find(|format| format.id.eq_ignore_ascii_case(id))
}

/// The format a game's lists are validated against when nothing else applies.
#[must_use]
pub fn primary_for(game: Game) -> &'static FormatRuleSet {
    find(game.rules().primary_format)
        .or_else(|| FORMATS.iter().find(|format| format.game == game))
        .unwrap_or(&FORMATS[0])
}

#[must_use]
pub fn for_game(game: Game) -> impl Iterator<Item = &'static FormatRuleSet> {
    FORMATS.iter().filter(move |format| format.game == game)
}
