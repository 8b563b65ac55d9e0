use std::fmt::Write;

use serde::Serialize;

use crate::core::{ComparisonRow, ProjectionRow, ProjectionSummary, Slot};

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn round_row(row: &ProjectionRow) -> ProjectionRow {
    ProjectionRow {
        period: row.period,
        opening_principal: round2(row.opening_principal),
        closing_balance: round2(row.closing_balance),
        period_interest: round2(row.period_interest),
        cumulative_interest: round2(row.cumulative_interest),
        period_contribution: round2(row.period_contribution),
        cumulative_contribution: round2(row.cumulative_contribution),
    }
}

pub fn round_summary(summary: &ProjectionSummary) -> ProjectionSummary {
    ProjectionSummary {
        periods: summary.periods,
        final_balance: round2(summary.final_balance),
        total_interest: round2(summary.total_interest),
        total_contributions: round2(summary.total_contributions),
    }
}

pub fn round_comparison(row: &ComparisonRow) -> ComparisonRow {
    let round_slot = |slot: &Slot| match slot {
        Slot::Present(inner) => Slot::Present(round_row(inner)),
        Slot::Missing => Slot::Missing,
    };
    ComparisonRow::new(row.period, round_slot(&row.left), round_slot(&row.right))
}

/// Bar-stack projection of a ledger: principal, cumulative contribution and
/// cumulative interest stack up to the closing balance of each period.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackedSeries {
    pub periods: Vec<i64>,
    pub principal: Vec<f64>,
    pub contribution: Vec<f64>,
    pub interest: Vec<f64>,
    pub total: Vec<f64>,
}

impl StackedSeries {
    pub fn from_rows(rows: &[ProjectionRow]) -> Self {
        let mut series = StackedSeries::default();
        for row in rows {
            series.periods.push(row.period);
            series.principal.push(round2(row.opening_principal));
            series.contribution.push(round2(row.cumulative_contribution));
            series.interest.push(round2(row.cumulative_interest));
            series.total.push(round2(row.closing_balance));
        }
        series
    }
}

pub fn render_table(rows: &[ProjectionRow], summary: &ProjectionSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>7} {:>16} {:>14} {:>16} {:>14} {:>16} {:>18}",
        "Period", "Principal", "Contribution", "Cum_Contribution", "Interest", "Cum_Interest", "Amount"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:>7} {:>16.2} {:>14.2} {:>16.2} {:>14.2} {:>16.2} {:>18.2}",
            row.period,
            row.opening_principal,
            row.period_contribution,
            row.cumulative_contribution,
            row.period_interest,
            row.cumulative_interest,
            row.closing_balance,
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Final amount:          {:.2}", summary.final_balance);
    let _ = writeln!(out, "Total interest earned: {:.2}", summary.total_interest);
    let _ = writeln!(out, "Total contributions:   {:.2}", summary.total_contributions);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ProjectionRequest, merge_projections, run_projection, summarize};

    fn sample_rows() -> Vec<ProjectionRow> {
        let request = ProjectionRequest {
            principal: 100.0,
            periodic_rate: 0.1,
            horizon_periods: 3,
            contribution_amount: 10.0,
            contribution_frequency: 1,
            contribution_start_period: 1,
            contribution_stop_period: 3,
        };
        run_projection(&request).expect("valid request")
    }

    #[test]
    fn round2_rounds_to_cents() {
        assert_eq!(round2(169.50999999), 169.51);
        assert_eq!(round2(-60.504), -60.5);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn stacked_series_sums_to_closing_balance() {
        let rows = sample_rows();
        let series = StackedSeries::from_rows(&rows);
        assert_eq!(series.periods, vec![1, 2, 3]);
        for idx in 0..rows.len() {
            let stacked = series.principal[idx] + series.contribution[idx] + series.interest[idx];
            assert!(
                (stacked - series.total[idx]).abs() <= 0.011,
                "stack {stacked} vs total {}",
                series.total[idx]
            );
        }
    }

    #[test]
    fn rounding_comparison_keeps_missing_slots() {
        let rows = sample_rows();
        let merged = merge_projections(&rows[..1], &rows);
        let rounded: Vec<_> = merged.iter().map(round_comparison).collect();
        assert_eq!(rounded.len(), 3);
        assert!(!rounded[0].left_missing);
        assert!(rounded[1].left_missing);
        assert_eq!(rounded[2].right.row().map(|r| r.closing_balance), Some(169.51));
    }

    #[test]
    fn table_lists_every_period_and_summary() {
        let rows = sample_rows();
        let summary = summarize(100.0, &rows);
        let table = render_table(&rows, &summary);
        let lines: Vec<_> = table.lines().collect();
        assert!(lines[0].contains("Cum_Interest"));
        assert!(lines[3].trim_start().starts_with('3'));
        assert!(lines[3].ends_with("169.51"));
        assert!(table.contains("Final amount:          169.51"));
        assert!(table.contains("Total contributions:   30.00"));
    }
}
