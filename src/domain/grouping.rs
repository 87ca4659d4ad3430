use crate::domain::card::EnrichedCardLine;
use crate::domain::format::FormatRuleSet;
use crate::domain::utils::canonical_name;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    Unlimited,
    Valid,
    AtLimit,
    Exceeded,
}

impl GroupStatus {
    #[must_use]
    pub fn of(total: u32, limit: u32, unlimited: bool) -> Self {
        if unlimited {
            GroupStatus::Unlimited
        } else if total > limit {
            GroupStatus::Exceeded
        } else if total == limit {
            GroupStatus::AtLimit
        } else {
            GroupStatus::Valid
        }
    }
}

/// Every printing of one card in a list, counted together against the copy
/// limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReprintGroup {
    pub normalized_name: String,
    pub display_name: String,
    pub total_quantity: u32,
    pub is_unlimited_resource: bool,
    /// Indices into the enriched lines the group was built from.
    pub member_lines: Vec<usize>,
    pub copy_limit: u32,
    pub status: GroupStatus,
}

impl ReprintGroup {
    #[must_use]
    pub fn exceeds_limit(&self) -> bool {
        self.status == GroupStatus::Exceeded
    }

    pub fn members<'a>(
        &'a self,
        lines: &'a [EnrichedCardLine],
    ) -> impl Iterator<Item = &'a EnrichedCardLine> + 'a {
        self.member_lines.iter().filter_map(|i| lines.get(*i))
    }
}

/// Groups lines by canonical card name, in order of first appearance.
#[must_use]
pub fn group_reprints(lines: &[EnrichedCardLine], format: &FormatRuleSet) -> Vec<ReprintGroup> {
    let rules = format.game_rules();
    let mut groups: Vec<ReprintGroup> = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        let key = canonical_name(line.name());
        if let Some(group) = groups.iter_mut().find(|g| g.normalized_name == key) {
            group.total_quantity += line.quantity();
            group.member_lines.push(index);
            continue;
        }

        groups.push(ReprintGroup {
            normalized_name: key,
            display_name: line.name().to_string(),
            total_quantity: line.quantity(),
            is_unlimited_resource: rules.is_basic_resource(line.name()),
            member_lines: vec![index],
            copy_limit: format.copy_limit_for(rules.section_of(line)),
            status: GroupStatus::Valid,
        });
    }

    for group in &mut groups {
        group.status = GroupStatus::of(
            group.total_quantity,
            group.copy_limit,
            group.is_unlimited_resource,
        );
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::fixtures;
    use crate::domain::format;

    #[test]
    fn test_status_of() {
        assert_eq!(GroupStatus::of(3, 4, false), GroupStatus::Valid);
        assert_eq!(GroupStatus::of(4, 4, false), GroupStatus::AtLimit);
        assert_eq!(GroupStatus::of(5, 4, false), GroupStatus::Exceeded);
        assert_eq!(GroupStatus::of(40, 4, true), GroupStatus::Unlimited);
    }

    #[test]
    fn test_reprints_are_summed() {
        let standard = format::find("standard").unwrap();
        let mut full_art = fixtures::trainer("Iono (Full Art)", 2, &["Supporter"]);
        full_art.display_name = None;
        let lines = vec![
            fixtures::trainer("Iono", 3, &["Supporter"]),
            fixtures::energy("Basic Fire Energy", 20),
            full_art,
        ];

        let groups = group_reprints(&lines, standard);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].normalized_name, "iono");
        assert_eq!(groups[0].total_quantity, 5);
        assert_eq!(groups[0].member_lines, vec![0, 2]);
        assert_eq!(groups[0].status, GroupStatus::Exceeded);
        assert_eq!(groups[1].status, GroupStatus::Unlimited);
        assert!(groups[1].is_unlimited_resource);
    }

    #[test]
    fn test_group_totals_match_members() {
        let standard = format::find("standard").unwrap();
        let lines = vec![
            fixtures::pokemon("Pikachu", 2, "Basic", &["Lightning"]),
            fixtures::pokemon("Pikachu", 2, "Basic", &["Lightning"]),
            fixtures::trainer("Nest Ball", 4, &["Item"]),
        ];

        for group in group_reprints(&lines, standard) {
            let sum: u32 = group.members(&lines).map(EnrichedCardLine::quantity).sum();
            assert_eq!(sum, group.total_quantity);
        }
    }

    #[test]
    fn test_section_specific_limit() {
        let constructed = format::find("riftbound-constructed").unwrap();
        let mut battlefield = fixtures::metadata("ogn-290", "The Grand Plaza", "Battlefield");
        battlefield.types = Vec::new();
        let line = EnrichedCardLine::with_metadata(
            fixtures::raw("The Grand Plaza", 2, None),
            battlefield,
            crate::domain::card::ResolvedVia::ById,
        );

        let groups = group_reprints(&[line], constructed);

        assert_eq!(groups[0].copy_limit, 1);
        assert_eq!(groups[0].status, GroupStatus::Exceeded);
    }
}
