use clap::{Args, ValueEnum};
use serde::Deserialize;

use crate::core::{CompoundingPlan, RateUnit};

pub const MAX_HORIZON_PERIODS: i64 = 100_000;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliRateUnit {
    Decimal,
    Percent,
}

impl From<CliRateUnit> for RateUnit {
    fn from(value: CliRateUnit) -> Self {
        match value {
            CliRateUnit::Decimal => RateUnit::Decimal,
            CliRateUnit::Percent => RateUnit::Percent,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiRateUnit {
    #[serde(alias = "dec", alias = "fraction")]
    Decimal,
    #[serde(alias = "pct", alias = "%")]
    Percent,
}

impl From<ApiRateUnit> for CliRateUnit {
    fn from(value: ApiRateUnit) -> Self {
        match value {
            ApiRateUnit::Decimal => CliRateUnit::Decimal,
            ApiRateUnit::Percent => CliRateUnit::Percent,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ScenarioArgs {
    #[arg(long, allow_negative_numbers = true, help = "Starting balance")]
    pub principal: f64,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Annual interest rate, e.g. 0.0375 or 3.75 with --rate-unit percent"
    )]
    pub rate: f64,
    #[arg(long, value_enum, default_value_t = CliRateUnit::Decimal)]
    pub rate_unit: CliRateUnit,
    #[arg(long, help = "Time horizon in years")]
    pub years: i64,
    #[arg(
        long,
        default_value_t = 1,
        help = "Compounding periods per year (12 for monthly, 365 for daily)"
    )]
    pub compounds_per_year: i64,
    #[arg(
        long,
        allow_negative_numbers = true,
        default_value_t = 0.0,
        help = "Amount added at each eligible period; negative models withdrawals"
    )]
    pub contribution: f64,
    #[arg(
        long,
        default_value_t = 1,
        help = "Contribute every Nth period (1 = every period, 3 = quarterly when monthly)"
    )]
    pub contribution_frequency: i64,
    #[arg(
        long,
        default_value_t = 1,
        help = "First period that may receive a contribution (inclusive)"
    )]
    pub start_period: i64,
    #[arg(
        long,
        help = "Last period that may receive a contribution (inclusive); defaults to the horizon"
    )]
    pub stop_period: Option<i64>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScenarioPayload {
    pub principal: Option<f64>,
    pub rate: Option<f64>,
    pub rate_unit: Option<ApiRateUnit>,
    pub years: Option<i64>,
    pub compounds_per_year: Option<i64>,
    pub contribution: Option<f64>,
    pub contribution_frequency: Option<i64>,
    pub start_period: Option<i64>,
    pub stop_period: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ComparePayload {
    pub left: ScenarioPayload,
    pub right: ScenarioPayload,
}

/// Flat query-string form of a comparison: the right-hand scenario's keys
/// carry a `2` suffix, mirroring the dashboard's second input panel.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompareQuery {
    principal: Option<f64>,
    rate: Option<f64>,
    rate_unit: Option<ApiRateUnit>,
    years: Option<i64>,
    compounds_per_year: Option<i64>,
    contribution: Option<f64>,
    contribution_frequency: Option<i64>,
    start_period: Option<i64>,
    stop_period: Option<i64>,

    principal2: Option<f64>,
    rate2: Option<f64>,
    rate_unit2: Option<ApiRateUnit>,
    years2: Option<i64>,
    compounds_per_year2: Option<i64>,
    contribution2: Option<f64>,
    contribution_frequency2: Option<i64>,
    start_period2: Option<i64>,
    stop_period2: Option<i64>,
}

impl From<CompareQuery> for ComparePayload {
    fn from(q: CompareQuery) -> Self {
        ComparePayload {
            left: ScenarioPayload {
                principal: q.principal,
                rate: q.rate,
                rate_unit: q.rate_unit,
                years: q.years,
                compounds_per_year: q.compounds_per_year,
                contribution: q.contribution,
                contribution_frequency: q.contribution_frequency,
                start_period: q.start_period,
                stop_period: q.stop_period,
            },
            right: ScenarioPayload {
                principal: q.principal2,
                rate: q.rate2,
                rate_unit: q.rate_unit2,
                years: q.years2,
                compounds_per_year: q.compounds_per_year2,
                contribution: q.contribution2,
                contribution_frequency: q.contribution_frequency2,
                start_period: q.start_period2,
                stop_period: q.stop_period2,
            },
        }
    }
}

pub fn build_plan(args: ScenarioArgs) -> Result<CompoundingPlan, String> {
    if !args.principal.is_finite() {
        return Err("--principal must be a finite number".to_string());
    }
    if !args.rate.is_finite() {
        return Err("--rate must be a finite number".to_string());
    }
    if !args.contribution.is_finite() {
        return Err("--contribution must be a finite number".to_string());
    }
    if args.years < 0 {
        return Err("--years must be >= 0".to_string());
    }
    if args.compounds_per_year <= 0 {
        return Err("--compounds-per-year must be > 0".to_string());
    }
    if args.contribution_frequency <= 0 {
        return Err("--contribution-frequency must be > 0".to_string());
    }

    let horizon = args.years.saturating_mul(args.compounds_per_year);
    if horizon > MAX_HORIZON_PERIODS {
        return Err(format!(
            "--years x --compounds-per-year must be <= {MAX_HORIZON_PERIODS} periods, got {horizon}"
        ));
    }

    Ok(CompoundingPlan {
        principal: args.principal,
        annual_rate: args.rate,
        rate_unit: args.rate_unit.into(),
        years: args.years,
        compounds_per_year: args.compounds_per_year,
        contribution_amount: args.contribution,
        contribution_frequency: args.contribution_frequency,
        contribution_start_period: args.start_period,
        contribution_stop_period: args.stop_period,
    })
}

pub fn plan_from_payload(
    payload: ScenarioPayload,
    defaults: ScenarioArgs,
) -> Result<CompoundingPlan, String> {
    let mut args = defaults;

    if let Some(v) = payload.principal {
        args.principal = v;
    }
    if let Some(v) = payload.rate {
        args.rate = v;
    }
    if let Some(v) = payload.rate_unit {
        args.rate_unit = v.into();
    }
    if let Some(v) = payload.years {
        args.years = v;
    }
    if let Some(v) = payload.compounds_per_year {
        args.compounds_per_year = v;
    }
    if let Some(v) = payload.contribution {
        args.contribution = v;
    }
    if let Some(v) = payload.contribution_frequency {
        args.contribution_frequency = v;
    }
    if let Some(v) = payload.start_period {
        args.start_period = v;
    }
    if let Some(v) = payload.stop_period {
        args.stop_period = Some(v);
    }

    build_plan(args)
}

pub const DEFAULT_STOP_PERIOD: i64 = 36;

// Dashboard defaults: a penny doubling every year against a flat million.
pub fn default_left_scenario() -> ScenarioArgs {
    ScenarioArgs {
        principal: 0.01,
        rate: 1.0,
        rate_unit: CliRateUnit::Decimal,
        years: 30,
        compounds_per_year: 1,
        contribution: 0.0,
        contribution_frequency: 1,
        start_period: 1,
        stop_period: Some(DEFAULT_STOP_PERIOD),
    }
}

pub fn default_right_scenario() -> ScenarioArgs {
    ScenarioArgs {
        principal: 1_000_000.0,
        rate: 0.0,
        ..default_left_scenario()
    }
}
