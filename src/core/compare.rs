use std::collections::BTreeMap;

use super::types::{ComparisonRow, ProjectionRow, Slot};

pub fn merge_projections(left: &[ProjectionRow], right: &[ProjectionRow]) -> Vec<ComparisonRow> {
    let mut by_period: BTreeMap<i64, (Slot, Slot)> = BTreeMap::new();
    for row in left {
        by_period
            .entry(row.period)
            .or_insert((Slot::Missing, Slot::Missing))
            .0 = Slot::Present(*row);
    }
    for row in right {
        by_period
            .entry(row.period)
            .or_insert((Slot::Missing, Slot::Missing))
            .1 = Slot::Present(*row);
    }

    by_period
        .into_iter()
        .map(|(period, (l, r))| ComparisonRow::new(period, l, r))
        .collect()
}
