use crate::domain::card::{CardRef, RawCardLine, SectionHint};
use crate::domain::game::{Game, GameRules, HeaderKind};
use crate::domain::set_codes::SET_CODES;
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

/// Largest quantity accepted on a single line.
pub const MAX_LINE_QUANTITY: u32 = 60;

const COMMENT_PREFIXES: [&str; 3] = ["//", "#", "--"];

pub(crate) static LINE_PATTERNS: LazyLock<LinePatterns> = LazyLock::new(|| LinePatterns {
    header: Regex::new(
        r"^(?P<word>\p{L}[\p{L} ]*?)\s*(?:\(\s*(?P<paren>\d+)\s*\))?\s*:?\s*(?P<count>\d+)?$",
    )
    .expect("Invalid regex"),
    quantity_prefix: Regex::new(r"^(?P<qty>\d+)\s*[xX×]?\s+(?P<rest>.+)$").expect("Invalid regex"),
    quantity_suffix: Regex::new(r"^(?P<rest>.+?)\s+[xX×]\s*(?P<qty>\d+)$").expect("Invalid regex"),
    spaced_printing: Regex::new(
        r"^(?P<name>.+?)\s+(?P<set>[A-Z][A-Z0-9]{1,5}(?:-[A-Z0-9]{2,3})?)\s+(?P<number>[A-Z]{0,4}\d{1,4}[a-z]?)$",
    )
    .expect("Invalid regex"),
    joined_printing: Regex::new(
        r"^(?P<name>.+?)\s+(?P<set>[A-Z]{2,4})-(?P<number>\d{1,4}[a-z*]?)$",
    )
    .expect("Invalid regex"),
    summary: Regex::new(r"(?i)^total\s+cards\b").expect("Invalid regex"),
});

pub(crate) struct LinePatterns {
    pub header: Regex,
    pub quantity_prefix: Regex,
    pub quantity_suffix: Regex,
    pub spaced_printing: Regex,
    pub joined_printing: Regex,
    pub summary: Regex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Headed blocks such as `Pokémon: 12` / `Trainer: 36`.
    Sectioned,
    /// `Name x4`.
    SuffixCount,
    /// `4 Name SET 123`, `4 Name`, `4x Name`.
    NumericPrefix,
}

impl Display for Dialect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Dialect::Sectioned => "sectioned",
            Dialect::SuffixCount => "suffix_count",
            Dialect::NumericPrefix => "numeric_prefix",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseIssueKind {
    UnrecognisedLine,
    QuantityOutOfRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseIssue {
    pub line_number: usize,
    pub line: String,
    pub kind: ParseIssueKind,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDeck {
    pub dialect: Dialect,
    pub lines: Vec<RawCardLine>,
    pub issues: Vec<ParseIssue>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Printing {
    set_code: String,
    number: String,
}

pub(crate) fn is_skippable(line: &str) -> bool {
    line.is_empty()
        || COMMENT_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
        || LINE_PATTERNS.summary.is_match(line)
}

/// Section header of `rules`' game: its kind, the count it declares if any,
/// and the header word as written.
pub(crate) fn header<'a>(
    line: &'a str,
    rules: &GameRules,
) -> Option<(HeaderKind, Option<u32>, &'a str)> {
    let capture = LINE_PATTERNS.header.captures(line)?;
    let word = capture.name("word")?.as_str();
    let kind = rules.header_kind(word)?;
    let declared = capture
        .name("paren")
        .or_else(|| capture.name("count"))
        .and_then(|count| count.as_str().parse().ok());
    Some((kind, declared, word))
}

fn detect_dialect(lines: &[(usize, &str)], rules: &GameRules) -> Dialect {
    if lines.iter().any(|(_, line)| header(line, rules).is_some()) {
        return Dialect::Sectioned;
    }

    let suffixed = lines
        .iter()
        .filter(|(_, line)| LINE_PATTERNS.quantity_suffix.is_match(line))
        .count();
    let prefixed = lines
        .iter()
        .filter(|(_, line)| LINE_PATTERNS.quantity_prefix.is_match(line))
        .count();

    if suffixed > prefixed {
        Dialect::SuffixCount
    } else {
        Dialect::NumericPrefix
    }
}

fn split_quantity<'a>(line: &'a str, dialect: Dialect) -> Option<Captures<'a>> {
    match dialect {
        Dialect::NumericPrefix => LINE_PATTERNS.quantity_prefix.captures(line),
        Dialect::SuffixCount => LINE_PATTERNS.quantity_suffix.captures(line),
        Dialect::Sectioned => LINE_PATTERNS
            .quantity_prefix
            .captures(line)
            .or_else(|| LINE_PATTERNS.quantity_suffix.captures(line)),
    }
}

fn split_printing(rest: &str) -> (String, Option<Printing>) {
    let capture = LINE_PATTERNS
        .spaced_printing
        .captures(rest)
        .or_else(|| LINE_PATTERNS.joined_printing.captures(rest));

    match capture {
        Some(capture) => (
            capture["name"].trim().to_string(),
            Some(Printing {
                set_code: capture["set"].to_string(),
                number: capture["number"].to_string(),
            }),
        ),
        None => (rest.trim().to_string(), None),
    }
}

fn parse_card_line(
    line: &str,
    line_number: usize,
    dialect: Dialect,
    game: Game,
    section: Option<SectionHint>,
) -> Result<RawCardLine, ParseIssue> {
    let issue = |kind, reason: String| ParseIssue {
        line_number,
        line: line.to_string(),
        kind,
        reason,
    };

    let Some(capture) = split_quantity(line, dialect) else {
        return Err(issue(
            ParseIssueKind::UnrecognisedLine,
            format!("line does not match any {dialect} card format"),
        ));
    };

    let quantity = match capture["qty"].parse::<u32>() {
        Ok(quantity) if (1..=MAX_LINE_QUANTITY).contains(&quantity) => quantity,
        _ => {
            return Err(issue(
                ParseIssueKind::QuantityOutOfRange,
                format!(
                    "quantity '{}' must be between 1 and {MAX_LINE_QUANTITY}",
                    &capture["qty"]
                ),
            ))
        }
    };

    let (name, printing) = split_printing(&capture["rest"]);
    let reference = match printing {
        Some(Printing { set_code, number }) => CardRef::Resolved {
            id: SET_CODES.identifier(game, &set_code, &number),
            set_code,
            set_number: number,
        },
        None => CardRef::Unresolved,
    };

    Ok(RawCardLine {
        reference,
        name,
        quantity,
        section,
        line_number,
        original_text: line.to_string(),
    })
}

/// Accumulates card lines, merging repeated references by summing copies.
#[derive(Default)]
struct DeckBuilder {
    lines: Vec<RawCardLine>,
    index: HashMap<String, usize>,
}

impl DeckBuilder {
    fn add(&mut self, line: RawCardLine) {
        let key = line.merge_key();
        if let Some(&existing) = self.index.get(&key) {
            let merged = &mut self.lines[existing];
            merged.quantity = merged.quantity.saturating_add(line.quantity);
        } else {
            self.index.insert(key, self.lines.len());
            self.lines.push(line);
        }
    }
}

struct DeclaredSection {
    label: String,
    declared: u32,
    parsed: u32,
}

/// Splits a deck list into card lines. Never fails: lines that cannot be read
/// are reported as issues and skipped.
#[must_use]
pub fn parse(text: &str, game: Game) -> ParsedDeck {
    let rules = game.rules();
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !is_skippable(line))
        .collect();

    let dialect = detect_dialect(&lines, rules);
    log::debug!("Parsing {} lines as {game} in {dialect} dialect", lines.len());

    let mut builder = DeckBuilder::default();
    let mut issues = Vec::new();
    let mut warnings = Vec::new();
    let mut declared_sections: Vec<DeclaredSection> = Vec::new();
    let mut current_declared: Option<usize> = None;
    let mut section = None;
    let mut in_sideboard = false;
    let mut sideboard_lines = 0;

    for (line_number, line) in lines {
        if dialect == Dialect::Sectioned {
            if let Some((kind, declared, word)) = header(line, rules) {
                match kind {
                    HeaderKind::Section(hint) => {
                        section = hint;
                        in_sideboard = false;
                        current_declared = declared.map(|declared| {
                            declared_sections.push(DeclaredSection {
                                label: word.to_string(),
                                declared,
                                parsed: 0,
                            });
                            declared_sections.len() - 1
                        });
                    }
                    HeaderKind::Sideboard => {
                        in_sideboard = true;
                        current_declared = None;
                    }
                }
                continue;
            }
        }

        if in_sideboard {
            sideboard_lines += 1;
            continue;
        }

        match parse_card_line(line, line_number, dialect, game, section) {
            Ok(card) => {
                if let Some(index) = current_declared {
                    declared_sections[index].parsed += card.quantity;
                }
                builder.add(card);
            }
            Err(issue) => issues.push(issue),
        }
    }

    if sideboard_lines > 0 {
        warnings.push(format!(
            "{sideboard_lines} sideboard line(s) were ignored; only the main deck is validated"
        ));
    }

    for declared in declared_sections {
        if declared.declared != declared.parsed {
            warnings.push(format!(
                "section '{}' declares {} cards but {} were read",
                declared.label, declared.declared, declared.parsed
            ));
        }
    }

    ParsedDeck {
        dialect,
        lines: builder.lines,
        issues,
        warnings,
    }
}
