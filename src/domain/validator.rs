use crate::domain::card::EnrichedCardLine;
use crate::domain::format::{DomainRule, FormatRuleSet, IdentitySource};
use crate::domain::game::GameRules;
use crate::domain::grouping::ReprintGroup;
use crate::domain::utils::{canonical_name, normalise};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    EmptyDeck,
    BucketCount,
    CopyLimit,
    MissingMinimum,
    SubtypeCap,
    BannedSubtype,
    SingletonGroup,
    DomainMismatch,
    NotLegal,
    UnresolvedCards,
    IdentityUnresolved,
    AmbiguousIdentity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub message: String,
    pub card: Option<String>,
    pub current: Option<u32>,
    pub expected: Option<u32>,
    pub cards: Vec<String>,
}

impl ValidationIssue {
    fn new(kind: IssueKind, message: String) -> Self {
        Self {
            kind,
            message,
            card: None,
            current: None,
            expected: None,
            cards: Vec::new(),
        }
    }

    fn card(mut self, card: &str) -> Self {
        self.card = Some(card.to_string());
        self
    }

    fn counts(mut self, current: u32, expected: u32) -> Self {
        self.current = Some(current);
        self.expected = Some(expected);
        self
    }

    fn cards(mut self, cards: Vec<String>) -> Self {
        self.cards = cards;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub format: &'static str,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub summary: BTreeMap<String, u32>,
}

impl ValidationResult {
    #[must_use]
    pub fn has_error(&self, kind: IssueKind) -> bool {
        self.errors.iter().any(|issue| issue.kind == kind)
    }

    #[must_use]
    pub fn has_warning(&self, kind: IssueKind) -> bool {
        self.warnings.iter().any(|issue| issue.kind == kind)
    }
}

/// Copies per bucket label of `format`, in table order.
#[must_use]
pub fn breakdown(lines: &[EnrichedCardLine], format: &FormatRuleSet) -> Vec<(&'static str, u32)> {
    let rules = format.game_rules();
    format
        .buckets
        .iter()
        .map(|bucket| {
            let copies = lines
                .iter()
                .filter(|line| bucket.sections.contains(&rules.section_of(line)))
                .map(EnrichedCardLine::quantity)
                .sum();
            (bucket.label, copies)
        })
        .collect()
}

struct Validation<'a> {
    lines: &'a [EnrichedCardLine],
    groups: &'a [ReprintGroup],
    format: &'a FormatRuleSet,
    rules: &'static GameRules,
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validation<'_> {
    fn copies_where<F>(&self, predicate: F) -> (u32, Vec<String>)
    where
        F: Fn(&EnrichedCardLine) -> bool,
    {
        let mut names = Vec::new();
        let mut copies = 0;
        for line in self.lines.iter().filter(|line| predicate(line)) {
            copies += line.quantity();
            if !names.iter().any(|name: &String| name == line.name()) {
                names.push(line.name().to_string());
            }
        }
        (copies, names)
    }

    fn check_buckets(&mut self) {
        for (label, copies) in breakdown(self.lines, self.format) {
            let Some(bucket) = self.format.buckets.iter().find(|b| b.label == label) else {
                continue;
            };
            if copies != bucket.target {
                self.errors.push(
                    ValidationIssue::new(
                        IssueKind::BucketCount,
                        format!(
                            "{label} has {copies} cards but {} requires exactly {}",
                            self.format.name, bucket.target
                        ),
                    )
                    .counts(copies, bucket.target),
                );
            }
        }
    }

    fn check_copy_limits(&mut self) {
        for group in self.groups.iter().filter(|group| group.exceeds_limit()) {
            self.errors.push(
                ValidationIssue::new(
                    IssueKind::CopyLimit,
                    format!(
                        "{} copies of {} exceed the limit of {}",
                        group.total_quantity, group.display_name, group.copy_limit
                    ),
                )
                .card(&group.display_name)
                .counts(group.total_quantity, group.copy_limit),
            );
        }
    }

    fn check_minimums(&mut self) {
        for minimum in self.format.minimums {
            let (copies, _) = self.copies_where(|line| {
                self.rules.section_of(line) == minimum.section && minimum.predicate.matches(line)
            });
            if copies < minimum.min {
                self.errors.push(
                    ValidationIssue::new(
                        IssueKind::MissingMinimum,
                        format!(
                            "deck needs at least {} {} but has {copies}",
                            minimum.min, minimum.label
                        ),
                    )
                    .counts(copies, minimum.min),
                );
            }
        }
    }

    fn check_subtype_caps(&mut self) {
        for cap in self.format.subtype_caps {
            let (copies, cards) =
                self.copies_where(|line| self.rules.carries_marker(line, cap.marker));
            if cap.max == 0 && copies > 0 {
                self.errors.push(
                    ValidationIssue::new(
                        IssueKind::BannedSubtype,
                        format!("{} cards are not allowed in {}", cap.marker, self.format.name),
                    )
                    .counts(copies, 0)
                    .cards(cards),
                );
            } else if copies > cap.max {
                self.errors.push(
                    ValidationIssue::new(
                        IssueKind::SubtypeCap,
                        format!(
                            "{copies} {} cards exceed the combined limit of {}",
                            cap.marker, cap.max
                        ),
                    )
                    .counts(copies, cap.max)
                    .cards(cards),
                );
            }
        }
    }

    fn check_singleton_groups(&mut self) {
        for group in self.format.singleton_groups {
            let members: BTreeSet<String> = group
                .members
                .iter()
                .map(|member| normalise(&canonical_name(member)))
                .collect();
            let (copies, cards) = self.copies_where(|line| {
                members.contains(&normalise(&canonical_name(line.name())))
            });
            if copies > 1 {
                self.errors.push(
                    ValidationIssue::new(
                        IssueKind::SingletonGroup,
                        format!(
                            "only one {} card is allowed, found {copies}",
                            group.name
                        ),
                    )
                    .counts(copies, 1)
                    .cards(cards),
                );
            }
        }
    }

    fn identity(&mut self, domain: &DomainRule) -> Option<BTreeSet<String>> {
        let neutral = |t: &String| domain.neutral_types.iter().any(|n| n.eq_ignore_ascii_case(t));

        match domain.source {
            IdentitySource::Section(section) => {
                let identity: BTreeSet<String> = self
                    .lines
                    .iter()
                    .filter(|line| line.resolved() && self.rules.section_of(line) == section)
                    .flat_map(|line| line.types.iter())
                    .filter(|t| !neutral(*t))
                    .cloned()
                    .collect();
                if identity.is_empty() {
                    self.warnings.push(ValidationIssue::new(
                        IssueKind::IdentityUnresolved,
                        String::from("identity card is missing or unresolved; domain checks skipped"),
                    ));
                    return None;
                }
                Some(identity)
            }
            IdentitySource::DominantType(section) => {
                let mut copies: BTreeMap<&str, u32> = BTreeMap::new();
                for line in self
                    .lines
                    .iter()
                    .filter(|line| line.resolved() && self.rules.section_of(line) == section)
                {
                    for t in line.types.iter().filter(|t| !neutral(*t)) {
                        *copies.entry(t.as_str()).or_default() += line.quantity();
                    }
                }

                let Some(top) = copies.values().max().copied() else {
                    self.warnings.push(ValidationIssue::new(
                        IssueKind::IdentityUnresolved,
                        String::from("no typed cards resolved; domain checks skipped"),
                    ));
                    return None;
                };
                let leaders: Vec<String> = copies
                    .iter()
                    .filter(|(_, count)| **count == top)
                    .map(|(t, _)| (*t).to_string())
                    .collect();
                if leaders.len() > 1 {
                    self.warnings.push(
                        ValidationIssue::new(
                            IssueKind::AmbiguousIdentity,
                            format!("deck type is ambiguous between {}", leaders.join(", ")),
                        )
                        .cards(leaders),
                    );
                    return None;
                }
                Some(leaders.into_iter().collect())
            }
        }
    }

    fn check_domain(&mut self) {
        let Some(domain) = &self.format.domain else {
            return;
        };
        let Some(identity) = self.identity(domain) else {
            return;
        };

        for line in self
            .lines
            .iter()
            .filter(|line| line.resolved() && domain.applies_to.contains(&self.rules.section_of(line)))
        {
            let typed: Vec<String> = line
                .types
                .iter()
                .filter(|t| !domain.neutral_types.iter().any(|n| n.eq_ignore_ascii_case(t)))
                .cloned()
                .collect();
            if typed.is_empty() || typed.iter().any(|t| identity.contains(t)) {
                continue;
            }
            let expected: Vec<&str> = identity.iter().map(String::as_str).collect();
            self.errors.push(
                ValidationIssue::new(
                    IssueKind::DomainMismatch,
                    format!(
                        "{} ({}) is outside the deck's identity ({})",
                        line.name(),
                        typed.join(", "),
                        expected.join(", ")
                    ),
                )
                .card(line.name())
                .cards(typed),
            );
        }
    }

    fn check_legality(&mut self) {
        let Some(allowed) = self.format.allowed_legality_marks else {
            return;
        };

        for group in self.groups.iter().filter(|group| !group.is_unlimited_resource) {
            let resolved: Vec<&EnrichedCardLine> =
                group.members(self.lines).filter(|line| line.resolved()).collect();
            if resolved.is_empty() {
                continue;
            }
            let legal = resolved.iter().any(|line| {
                line.legality_marker
                    .as_deref()
                    .is_some_and(|mark| allowed.iter().any(|a| a.eq_ignore_ascii_case(mark)))
            });
            if !legal {
                self.errors.push(
                    ValidationIssue::new(
                        IssueKind::NotLegal,
                        format!(
                            "{} has no printing legal in {} (marks {})",
                            group.display_name,
                            self.format.name,
                            allowed.join("/")
                        ),
                    )
                    .card(&group.display_name),
                );
            }
        }
    }

    fn check_unresolved(&mut self) {
        let unresolved: Vec<String> = self
            .lines
            .iter()
            .filter(|line| !line.resolved())
            .map(|line| line.name().to_string())
            .collect();
        if unresolved.is_empty() {
            return;
        }

        #[allow(clippy::cast_possible_truncation)]
        let count = unresolved.len() as u32;
        self.warnings.push(
            ValidationIssue::new(
                IssueKind::UnresolvedCards,
                format!("{count} card(s) could not be matched; some checks may be incomplete"),
            )
            .counts(count, 0)
            .cards(unresolved),
        );
    }

    fn summary(&self) -> BTreeMap<String, u32> {
        #[allow(clippy::cast_possible_truncation)]
        let count = |n: usize| n as u32;
        let resolved = self.lines.iter().filter(|line| line.resolved()).count();

        let mut summary = BTreeMap::from([
            (
                String::from("total_cards"),
                self.lines.iter().map(EnrichedCardLine::quantity).sum(),
            ),
            (String::from("unique_cards"), count(self.groups.len())),
            (String::from("resolved_lines"), count(resolved)),
            (
                String::from("unresolved_lines"),
                count(self.lines.len() - resolved),
            ),
            (
                String::from("groups_exceeding_limit"),
                count(self.groups.iter().filter(|g| g.exceeds_limit()).count()),
            ),
        ]);
        for (label, copies) in breakdown(self.lines, self.format) {
            summary.insert(format!("bucket:{label}"), copies);
        }
        summary
    }
}

/// Checks a deck against `format`. Every check runs; the result lists every
/// problem found rather than stopping at the first.
#[must_use]
pub fn validate(
    lines: &[EnrichedCardLine],
    groups: &[ReprintGroup],
    format: &FormatRuleSet,
) -> ValidationResult {
    let mut validation = Validation {
        lines,
        groups,
        format,
        rules: format.game_rules(),
        errors: Vec::new(),
        warnings: Vec::new(),
    };
    let summary = validation.summary();

    if summary.get("total_cards").copied().unwrap_or_default() == 0 {
        validation.errors.push(ValidationIssue::new(
            IssueKind::EmptyDeck,
            String::from("deck contains no cards"),
        ));
    } else {
        validation.check_buckets();
        validation.check_copy_limits();
        validation.check_minimums();
        validation.check_subtype_caps();
        validation.check_singleton_groups();
        validation.check_domain();
        validation.check_legality();
        validation.check_unresolved();
    }

    ValidationResult {
        is_valid: validation.errors.is_empty(),
        format: format.id,
        errors: validation.errors,
        warnings: validation.warnings,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::{fixtures, ResolvedVia, SectionHint};
    use crate::domain::format;
    use crate::domain::grouping::group_reprints;

    fn check(lines: &[EnrichedCardLine], format_id: &str) -> ValidationResult {
        let format = format::find(format_id).unwrap();
        let groups = group_reprints(lines, format);
        validate(lines, &groups, format)
    }

    fn standard_deck() -> Vec<EnrichedCardLine> {
        vec![
            fixtures::pokemon("Pikachu", 4, "Basic", &["Lightning"]),
            fixtures::pokemon("Raichu", 4, "Stage 1", &["Lightning"]),
            fixtures::trainer("Iono", 4, &["Supporter"]),
            fixtures::trainer("Ultra Ball", 4, &["Item"]),
            fixtures::trainer("Prime Catcher", 1, &["Item", "ACE SPEC"]),
            fixtures::energy("Basic Lightning Energy", 43),
        ]
    }

    fn riftbound(name: &str, qty: u32, category: &str, subtypes: &[&str], types: &[&str]) -> EnrichedCardLine {
        let mut meta = fixtures::metadata(&name.to_lowercase(), name, category);
        meta.subtypes = subtypes.iter().map(|s| (*s).to_string()).collect();
        meta.types = types.iter().map(|t| (*t).to_string()).collect();
        EnrichedCardLine::with_metadata(fixtures::raw(name, qty, None), meta, ResolvedVia::ById)
    }

    fn riftbound_deck() -> Vec<EnrichedCardLine> {
        let mut lines = vec![
            riftbound("Jinx, Loose Cannon", 1, "Legend", &[], &["Fury", "Chaos"]),
            riftbound("Jinx, Demolitionist", 3, "Champion Unit", &["Champion"], &["Fury"]),
        ];
        for i in 0..12 {
            lines.push(riftbound(&format!("Unit {i}"), 3, "Unit", &[], &["Chaos"]));
        }
        lines.push(riftbound("Get Excited!", 1, "Spell", &["Signature"], &["Fury"]));
        for site in ["The Grand Plaza", "Void Gate", "Zaun Warrens"] {
            lines.push(riftbound(site, 1, "Battlefield", &[], &[]));
        }
        lines.push(EnrichedCardLine::unresolved(fixtures::raw(
            "Fury Rune",
            6,
            Some(SectionHint::Resource),
        )));
        lines.push(EnrichedCardLine::unresolved(fixtures::raw(
            "Chaos Rune",
            6,
            Some(SectionHint::Resource),
        )));
        lines
    }

    #[test]
    fn test_valid_standard_deck() {
        let result = check(&standard_deck(), "standard");

        assert!(result.is_valid, "{:?}", result.errors);
        assert_eq!(result.summary["total_cards"], 60);
        assert_eq!(result.summary["bucket:deck"], 60);
        assert_eq!(result.summary["unique_cards"], 6);
    }

    #[test]
    fn test_empty_deck_stops_early() {
        let result = check(&[], "standard");

        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, IssueKind::EmptyDeck);
    }

    #[test]
    fn test_copy_limit_reported_once_per_group() {
        let mut lines = standard_deck();
        lines.pop();
        lines.push(fixtures::trainer("Iono", 2, &["Supporter"]));
        lines.push(fixtures::energy("Basic Lightning Energy", 41));

        let result = check(&lines, "standard");
        let copy_errors: Vec<_> = result
            .errors
            .iter()
            .filter(|issue| issue.kind == IssueKind::CopyLimit)
            .collect();

        assert_eq!(copy_errors.len(), 1);
        assert_eq!(copy_errors[0].card.as_deref(), Some("Iono"));
        assert_eq!(copy_errors[0].current, Some(6));
        assert_eq!(result.summary["groups_exceeding_limit"], 1);
    }

    #[test]
    fn test_bucket_count() {
        let mut lines = standard_deck();
        lines.pop();

        let result = check(&lines, "standard");

        assert!(result.has_error(IssueKind::BucketCount));
        assert_eq!(result.errors[0].current, Some(17));
        assert_eq!(result.errors[0].expected, Some(60));
    }

    #[test]
    fn test_missing_basic() {
        let mut lines = standard_deck();
        lines[0] = fixtures::pokemon("Raichu", 4, "Stage 1", &["Lightning"]);

        let result = check(&lines, "standard");

        assert!(result.has_error(IssueKind::MissingMinimum));
    }

    #[test]
    fn test_ace_spec_cap() {
        let mut lines = standard_deck();
        lines.pop();
        lines.push(fixtures::trainer("Master Ball", 1, &["Item", "ACE SPEC"]));
        lines.push(fixtures::energy("Basic Lightning Energy", 42));

        let result = check(&lines, "standard");
        let issue = result
            .errors
            .iter()
            .find(|issue| issue.kind == IssueKind::SubtypeCap)
            .unwrap();

        assert_eq!(issue.current, Some(2));
        assert_eq!(issue.cards, vec!["Prime Catcher", "Master Ball"]);
    }

    #[test]
    fn test_standard_legality_marks() {
        let mut lines = standard_deck();
        lines[3].legality_marker = Some(String::from("D"));

        let result = check(&lines, "standard");

        assert!(result.has_error(IssueKind::NotLegal));
        assert!(check(&lines, "expanded").is_valid);
    }

    #[test]
    fn test_unresolved_lines_warn() {
        let mut lines = standard_deck();
        lines.pop();
        lines.push(EnrichedCardLine::unresolved(fixtures::raw("Mystery Card", 1, None)));
        lines.push(fixtures::energy("Basic Lightning Energy", 42));

        let result = check(&lines, "standard");

        assert!(result.is_valid, "{:?}", result.errors);
        assert!(result.has_warning(IssueKind::UnresolvedCards));
        assert_eq!(result.summary["unresolved_lines"], 1);
    }

    #[test]
    fn test_glc_bans_rule_boxes_and_enforces_singleton_groups() {
        let lines = vec![
            fixtures::pokemon("Charmander", 1, "Basic", &["Fire"]),
            fixtures::pokemon("Charizard ex", 1, "Stage 2", &["Fire"]),
            fixtures::trainer("Professor's Research", 1, &["Supporter"]),
            fixtures::trainer("Professor Sycamore", 1, &["Supporter"]),
            fixtures::energy("Basic Fire Energy", 56),
        ];

        let result = check(&lines, "glc");

        assert!(result.has_error(IssueKind::BannedSubtype));
        assert!(result.has_error(IssueKind::SingletonGroup));
        assert!(!result.has_error(IssueKind::BucketCount));
    }

    #[test]
    fn test_glc_bans_unresolved_prism_star() {
        let lines = vec![
            fixtures::pokemon("Charmander", 1, "Basic", &["Fire"]),
            EnrichedCardLine::unresolved(fixtures::raw("Lunala Prism Star", 1, None)),
            fixtures::energy("Basic Fire Energy", 58),
        ];

        let result = check(&lines, "glc");

        assert!(result
            .errors
            .iter()
            .any(|issue| issue.kind == IssueKind::BannedSubtype && issue.message.contains("Prism Star")));
    }

    #[test]
    fn test_glc_domain_mismatch() {
        let lines = vec![
            fixtures::pokemon("Charmander", 1, "Basic", &["Fire"]),
            fixtures::pokemon("Vulpix", 1, "Basic", &["Fire"]),
            fixtures::pokemon("Squirtle", 1, "Basic", &["Water"]),
            fixtures::pokemon("Pidgey", 1, "Basic", &["Colorless"]),
            fixtures::energy("Basic Fire Energy", 56),
        ];

        let result = check(&lines, "glc");
        let mismatches: Vec<_> = result
            .errors
            .iter()
            .filter(|issue| issue.kind == IssueKind::DomainMismatch)
            .collect();

        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].card.as_deref(), Some("Squirtle"));
    }

    #[test]
    fn test_glc_tied_type_warns() {
        let lines = vec![
            fixtures::pokemon("Charmander", 1, "Basic", &["Fire"]),
            fixtures::pokemon("Squirtle", 1, "Basic", &["Water"]),
            fixtures::energy("Basic Fire Energy", 58),
        ];

        let result = check(&lines, "glc");

        assert!(result.has_warning(IssueKind::AmbiguousIdentity));
        assert!(!result.has_error(IssueKind::DomainMismatch));
    }

    #[test]
    fn test_valid_riftbound_deck() {
        let result = check(&riftbound_deck(), "riftbound-constructed");

        assert!(result.is_valid, "{:?}", result.errors);
        assert_eq!(result.summary["bucket:main"], 40);
        assert_eq!(result.summary["bucket:legend"], 1);
        assert_eq!(result.summary["bucket:battlefields"], 3);
        assert_eq!(result.summary["bucket:runes"], 12);
    }

    #[test]
    fn test_riftbound_domain_and_battlefield_limit() {
        let mut lines = riftbound_deck();
        lines[2] = riftbound("Unit 0", 3, "Unit", &[], &["Order"]);
        lines.push(riftbound("The Grand Plaza", 1, "Battlefield", &[], &[]));

        let result = check(&lines, "riftbound-constructed");

        assert!(result.has_error(IssueKind::DomainMismatch));
        assert!(result.has_error(IssueKind::CopyLimit));
        assert!(result.has_error(IssueKind::BucketCount));
    }

    #[test]
    fn test_riftbound_missing_legend_warns() {
        let lines: Vec<EnrichedCardLine> = riftbound_deck().into_iter().skip(1).collect();

        let result = check(&lines, "riftbound-constructed");

        assert!(result.has_warning(IssueKind::IdentityUnresolved));
        assert!(result.has_error(IssueKind::BucketCount));
    }

    #[test]
    fn test_validation_is_deterministic() {
        let lines = standard_deck();
        assert_eq!(check(&lines, "glc"), check(&lines, "glc"));
    }
}
