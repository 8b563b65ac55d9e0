use super::error::{ProjectionError, Result};
use super::types::{ProjectionRequest, ProjectionRow, ProjectionSummary};

const MAX_PREALLOCATED_ROWS: usize = 1 << 16;

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    balance: f64,
    cumulative_interest: f64,
    cumulative_contribution: f64,
}

pub fn run_projection(request: &ProjectionRequest) -> Result<Vec<ProjectionRow>> {
    validate_request(request)?;

    let horizon = request.horizon_periods;
    let capacity = usize::try_from(horizon).unwrap_or(0).min(MAX_PREALLOCATED_ROWS);
    let mut rows = Vec::with_capacity(capacity);
    let mut acc = Accumulator {
        balance: request.principal,
        cumulative_interest: 0.0,
        cumulative_contribution: 0.0,
    };

    for period in 1..=horizon {
        let contribution = apply_contribution(request, &mut acc, period);
        let interest = apply_interest(request.periodic_rate, &mut acc);
        rows.push(ProjectionRow {
            period,
            opening_principal: request.principal,
            closing_balance: acc.balance,
            period_interest: interest,
            cumulative_interest: acc.cumulative_interest,
            period_contribution: contribution,
            cumulative_contribution: acc.cumulative_contribution,
        });
    }

    Ok(rows)
}

pub fn summarize(principal: f64, rows: &[ProjectionRow]) -> ProjectionSummary {
    match rows.last() {
        Some(last) => ProjectionSummary {
            periods: rows.len(),
            final_balance: last.closing_balance,
            total_interest: last.cumulative_interest,
            total_contributions: last.cumulative_contribution,
        },
        None => ProjectionSummary {
            periods: 0,
            final_balance: principal,
            total_interest: 0.0,
            total_contributions: 0.0,
        },
    }
}

fn validate_request(request: &ProjectionRequest) -> Result<()> {
    if request.contribution_frequency <= 0 {
        return Err(ProjectionError::invalid(
            "contribution_frequency",
            format!("must be > 0, got {}", request.contribution_frequency),
        ));
    }
    if request.horizon_periods < 0 {
        return Err(ProjectionError::invalid(
            "horizon_periods",
            format!("must be >= 0, got {}", request.horizon_periods),
        ));
    }
    if request.horizon_periods as u128 > max_ledger_rows() {
        return Err(ProjectionError::invalid(
            "horizon_periods",
            format!("{} rows cannot be held in memory", request.horizon_periods),
        ));
    }
    for (field, value) in [
        ("principal", request.principal),
        ("periodic_rate", request.periodic_rate),
        ("contribution_amount", request.contribution_amount),
    ] {
        if !value.is_finite() {
            return Err(ProjectionError::invalid(field, "must be a finite number"));
        }
    }
    Ok(())
}

fn max_ledger_rows() -> u128 {
    isize::MAX as u128 / std::mem::size_of::<ProjectionRow>() as u128
}

fn apply_contribution(request: &ProjectionRequest, acc: &mut Accumulator, period: i64) -> f64 {
    if !request.contributes_in(period) {
        return 0.0;
    }
    acc.cumulative_contribution += request.contribution_amount;
    // At a zero rate the balance must equal principal + cumulative contribution bit for bit.
    if request.periodic_rate == 0.0 {
        acc.balance = request.principal + acc.cumulative_contribution;
    } else {
        acc.balance += request.contribution_amount;
    }
    request.contribution_amount
}

fn apply_interest(periodic_rate: f64, acc: &mut Accumulator) -> f64 {
    let before = acc.balance;
    acc.balance = before * (1.0 + periodic_rate);
    let interest = acc.balance - before;
    acc.cumulative_interest += interest;
    interest
}
