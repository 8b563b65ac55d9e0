use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionRequest {
    pub principal: f64,
    /// Already divided by the compounding frequency; see `CompoundingPlan`.
    pub periodic_rate: f64,
    pub horizon_periods: i64,
    pub contribution_amount: f64,
    pub contribution_frequency: i64,
    /// Inclusive, 1-indexed.
    pub contribution_start_period: i64,
    /// Inclusive, 1-indexed.
    pub contribution_stop_period: i64,
}

impl ProjectionRequest {
    pub fn without_contributions(principal: f64, periodic_rate: f64, horizon_periods: i64) -> Self {
        Self {
            principal,
            periodic_rate,
            horizon_periods,
            contribution_amount: 0.0,
            contribution_frequency: 1,
            contribution_start_period: 1,
            contribution_stop_period: horizon_periods,
        }
    }

    pub fn contributes_in(&self, period: i64) -> bool {
        self.contribution_frequency > 0
            && period % self.contribution_frequency == 0
            && period >= self.contribution_start_period
            && period <= self.contribution_stop_period
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRow {
    pub period: i64,
    pub opening_principal: f64,
    pub closing_balance: f64,
    pub period_interest: f64,
    pub cumulative_interest: f64,
    pub period_contribution: f64,
    pub cumulative_contribution: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub periods: usize,
    pub final_balance: f64,
    pub total_interest: f64,
    pub total_contributions: f64,
}

/// One side of a comparison row. `Missing` means the scenario has already
/// ended at this period, which is different from a zero balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot {
    Present(ProjectionRow),
    Missing,
}

impl Slot {
    pub fn row(&self) -> Option<&ProjectionRow> {
        match self {
            Slot::Present(row) => Some(row),
            Slot::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Slot::Missing)
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.row().serialize(serializer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub period: i64,
    pub left: Slot,
    pub right: Slot,
    pub left_missing: bool,
    pub right_missing: bool,
}

impl ComparisonRow {
    pub fn new(period: i64, left: Slot, right: Slot) -> Self {
        Self {
            period,
            left,
            right,
            left_missing: left.is_missing(),
            right_missing: right.is_missing(),
        }
    }
}
