use super::error::{ProjectionError, Result};
use super::types::ProjectionRequest;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RateUnit {
    Decimal,
    Percent,
}

impl RateUnit {
    pub fn to_decimal(self, rate: f64) -> f64 {
        match self {
            RateUnit::Decimal => rate,
            RateUnit::Percent => rate / 100.0,
        }
    }
}

/// Caller-facing description of a scenario: an annual rate compounded
/// `compounds_per_year` times over `years`, with contribution timing given
/// in compounding periods.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompoundingPlan {
    pub principal: f64,
    pub annual_rate: f64,
    pub rate_unit: RateUnit,
    pub years: i64,
    pub compounds_per_year: i64,
    pub contribution_amount: f64,
    pub contribution_frequency: i64,
    pub contribution_start_period: i64,
    pub contribution_stop_period: Option<i64>,
}

impl CompoundingPlan {
    pub fn horizon_periods(&self) -> Result<i64> {
        if self.years < 0 {
            return Err(ProjectionError::invalid(
                "years",
                format!("must be >= 0, got {}", self.years),
            ));
        }
        if self.compounds_per_year <= 0 {
            return Err(ProjectionError::invalid(
                "compounds_per_year",
                format!("must be > 0, got {}", self.compounds_per_year),
            ));
        }
        self.years
            .checked_mul(self.compounds_per_year)
            .ok_or_else(|| ProjectionError::invalid("years", "horizon overflows"))
    }

    pub fn periodic_rate(&self) -> Result<f64> {
        if !self.annual_rate.is_finite() {
            return Err(ProjectionError::invalid("annual_rate", "must be a finite number"));
        }
        if self.compounds_per_year <= 0 {
            return Err(ProjectionError::invalid(
                "compounds_per_year",
                format!("must be > 0, got {}", self.compounds_per_year),
            ));
        }
        Ok(self.rate_unit.to_decimal(self.annual_rate) / self.compounds_per_year as f64)
    }

    pub fn into_request(self) -> Result<ProjectionRequest> {
        let horizon_periods = self.horizon_periods()?;
        let periodic_rate = self.periodic_rate()?;
        Ok(ProjectionRequest {
            principal: self.principal,
            periodic_rate,
            horizon_periods,
            contribution_amount: self.contribution_amount,
            contribution_frequency: self.contribution_frequency,
            contribution_start_period: self.contribution_start_period,
            contribution_stop_period: self.contribution_stop_period.unwrap_or(horizon_periods),
        })
    }
}

/// Future value when every period receives `contribution` before interest.
pub fn future_value_closed_form(
    principal: f64,
    periodic_rate: f64,
    periods: i64,
    contribution: f64,
) -> f64 {
    let n = periods.max(0) as f64;
    if periodic_rate == 0.0 {
        return principal + contribution * n;
    }
    let growth = (1.0 + periodic_rate).powf(n);
    principal * growth + contribution * (1.0 + periodic_rate) * (growth - 1.0) / periodic_rate
}
