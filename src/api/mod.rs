mod payload;
mod report;

use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, Subcommand};
use log::{debug, info, warn};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    ComparisonRow, ProjectionRow, ProjectionSummary, merge_projections, run_projection, summarize,
};

pub use payload::{
    ApiRateUnit, CliRateUnit, ComparePayload, CompareQuery, MAX_HORIZON_PERIODS, ScenarioArgs,
    ScenarioPayload, build_plan, default_left_scenario, default_right_scenario, plan_from_payload,
};
pub use report::{StackedSeries, render_table, round2};

#[derive(Parser, Debug)]
#[command(
    name = "compound",
    about = "Compound-interest projections with recurring contributions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON projection API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Print the period-by-period ledger of one scenario
    Project {
        #[command(flatten)]
        scenario: ScenarioArgs,
        #[arg(long, help = "Emit JSON instead of a table")]
        json: bool,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    summary: ProjectionSummary,
    series: StackedSeries,
    rows: Vec<ProjectionRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    left: ProjectResponse,
    right: ProjectResponse,
    merged: Vec<ComparisonRow>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Serve { port } => run_http_server(port)
            .await
            .map_err(|e| format!("Server error: {e}")),
        Command::Project { scenario, json } => {
            let output = project_to_string(scenario, json)?;
            print!("{output}");
            Ok(())
        }
    }
}

fn project_to_string(scenario: ScenarioArgs, json: bool) -> Result<String, String> {
    let plan = build_plan(scenario)?;
    let request = plan.into_request().map_err(|e| e.to_string())?;
    let rows = run_projection(&request).map_err(|e| e.to_string())?;
    let summary = summarize(request.principal, &rows);

    if json {
        let response = ledger_response(&rows, &summary);
        let mut out = serde_json::to_string_pretty(&response).map_err(|e| e.to_string())?;
        out.push('\n');
        return Ok(out);
    }
    Ok(render_table(&rows, &summary))
}

pub fn app() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route(
            "/api/compare",
            get(compare_get_handler).post(compare_post_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("compound HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/api/project");

    axum::serve(listener, app()).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<ScenarioPayload>) -> Response {
    project_handler_impl(payload).await
}

async fn project_post_handler(Json(payload): Json<ScenarioPayload>) -> Response {
    project_handler_impl(payload).await
}

async fn compare_get_handler(Query(query): Query<CompareQuery>) -> Response {
    compare_handler_impl(query.into()).await
}

async fn compare_post_handler(Json(payload): Json<ComparePayload>) -> Response {
    compare_handler_impl(payload).await
}

async fn project_handler_impl(payload: ScenarioPayload) -> Response {
    debug!("project request: {payload:?}");
    match project_scenario(payload, default_left_scenario()) {
        Ok((response, _)) => json_response(StatusCode::OK, response),
        Err(msg) => {
            warn!("rejected project request: {msg}");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

async fn compare_handler_impl(payload: ComparePayload) -> Response {
    debug!("compare request: {payload:?}");
    match build_compare_response(payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => {
            warn!("rejected compare request: {msg}");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn project_scenario(
    payload: ScenarioPayload,
    defaults: ScenarioArgs,
) -> Result<(ProjectResponse, Vec<ProjectionRow>), String> {
    let plan = plan_from_payload(payload, defaults)?;
    let request = plan.into_request().map_err(|e| e.to_string())?;
    let rows = run_projection(&request).map_err(|e| e.to_string())?;
    let summary = summarize(request.principal, &rows);
    Ok((ledger_response(&rows, &summary), rows))
}

fn build_compare_response(payload: ComparePayload) -> Result<CompareResponse, String> {
    let (left, left_rows) = project_scenario(payload.left, default_left_scenario())
        .map_err(|msg| format!("left scenario: {msg}"))?;
    let (right, right_rows) = project_scenario(payload.right, default_right_scenario())
        .map_err(|msg| format!("right scenario: {msg}"))?;
    let merged = merge_projections(&left_rows, &right_rows)
        .iter()
        .map(report::round_comparison)
        .collect();

    Ok(CompareResponse {
        left,
        right,
        merged,
    })
}

fn ledger_response(rows: &[ProjectionRow], summary: &ProjectionSummary) -> ProjectResponse {
    ProjectResponse {
        summary: report::round_summary(summary),
        series: StackedSeries::from_rows(rows),
        rows: rows.iter().map(report::round_row).collect(),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn seven_year_payload() -> ScenarioPayload {
        ScenarioPayload {
            principal: Some(0.0),
            rate: Some(0.1),
            years: Some(7),
            contribution: Some(2000.0),
            ..ScenarioPayload::default()
        }
    }

    #[test]
    fn default_scenarios_compare_a_doubling_penny_with_a_flat_million() {
        let response = build_compare_response(ComparePayload::default()).expect("defaults");
        assert_eq!(response.merged.len(), 30);
        // 0.01 * 2^30
        assert_approx(response.left.summary.final_balance, 10_737_418.24);
        assert_approx(response.right.summary.final_balance, 1_000_000.0);
    }

    #[test]
    fn compare_marks_shorter_scenario_missing() {
        let payload = ComparePayload {
            left: seven_year_payload(),
            right: ScenarioPayload {
                years: Some(40),
                ..ScenarioPayload::default()
            },
        };
        let response = build_compare_response(payload).expect("valid compare");
        assert_eq!(response.left.rows.len(), 7);
        assert_eq!(response.right.rows.len(), 40);
        assert_eq!(response.merged.len(), 40);
        assert!(response.merged[..7].iter().all(|row| !row.left_missing));
        assert!(response.merged[7..].iter().all(|row| row.left_missing && row.left.row().is_none()));
        assert_approx(response.left.summary.final_balance, 20_871.78);
    }

    #[test]
    fn compare_errors_name_the_offending_side() {
        let payload = ComparePayload {
            left: ScenarioPayload::default(),
            right: ScenarioPayload {
                contribution_frequency: Some(0),
                ..ScenarioPayload::default()
            },
        };
        let err = build_compare_response(payload).expect_err("must reject");
        assert!(err.starts_with("right scenario:"));
        assert!(err.contains("--contribution-frequency"));
    }

    #[test]
    fn project_to_string_renders_table_and_json() {
        let mut args = default_left_scenario();
        args.principal = 100.0;
        args.rate = 10.0;
        args.rate_unit = CliRateUnit::Percent;
        args.years = 3;
        args.contribution = 10.0;

        let table = project_to_string(args.clone(), false).expect("valid scenario");
        assert!(table.contains("Final amount:          169.51"));

        let json = project_to_string(args, true).expect("valid scenario");
        let value: Value = serde_json::from_str(&json).expect("json output");
        assert_eq!(value["rows"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["summary"]["finalBalance"], 169.51);
        assert_eq!(value["series"]["total"][2], 169.51);
    }

    #[test]
    fn cli_parses_project_subcommand() {
        let cli = Cli::try_parse_from([
            "compound",
            "project",
            "--principal",
            "-50",
            "--rate",
            "3.75",
            "--rate-unit",
            "percent",
            "--years",
            "10",
            "--compounds-per-year",
            "12",
            "--stop-period",
            "36",
        ])
        .expect("valid args");
        let Command::Project { scenario, json } = cli.command else {
            panic!("expected project subcommand");
        };
        assert!(!json);
        assert_approx(scenario.principal, -50.0);
        assert_eq!(scenario.rate_unit, CliRateUnit::Percent);
        assert_eq!(scenario.compounds_per_year, 12);
        assert_eq!(scenario.contribution_frequency, 1);
        assert_eq!(scenario.stop_period, Some(36));
    }

    #[test]
    fn cli_parses_serve_with_default_port() {
        let cli = Cli::try_parse_from(["compound", "serve"]).expect("valid args");
        assert!(matches!(cli.command, Command::Serve { port: 8080 }));
    }

    #[tokio::test]
    async fn project_handler_returns_ledger_with_no_store() {
        let response = project_handler_impl(seven_year_payload()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
        let body = body_json(response).await;
        assert_eq!(body["rows"].as_array().map(Vec::len), Some(7));
        assert_eq!(body["rows"][0]["periodContribution"], 2000.0);
        assert_eq!(body["summary"]["totalContributions"], 14_000.0);
        assert_eq!(body["summary"]["finalBalance"], 20_871.78);
    }

    #[tokio::test]
    async fn project_handler_rejects_invalid_frequency() {
        let payload = ScenarioPayload {
            contribution_frequency: Some(0),
            ..ScenarioPayload::default()
        };
        let response = project_handler_impl(payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        let msg = body["error"].as_str().expect("error message");
        assert!(msg.contains("--contribution-frequency"));
    }

    #[tokio::test]
    async fn zero_year_projection_is_empty_not_an_error() {
        let payload = ScenarioPayload {
            years: Some(0),
            principal: Some(42.0),
            ..ScenarioPayload::default()
        };
        let response = project_handler_impl(payload).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["rows"].as_array().map(Vec::len), Some(0));
        assert_eq!(body["summary"]["finalBalance"], 42.0);
    }

    #[tokio::test]
    async fn compare_handler_serializes_missing_as_null() {
        let payload = ComparePayload {
            left: seven_year_payload(),
            right: ScenarioPayload {
                years: Some(40),
                ..ScenarioPayload::default()
            },
        };
        let response = compare_handler_impl(payload).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let merged = body["merged"].as_array().expect("merged rows");
        assert_eq!(merged.len(), 40);
        assert_eq!(merged[7]["period"], 8);
        assert!(merged[7]["left"].is_null());
        assert_eq!(merged[7]["leftMissing"], true);
        assert_eq!(merged[7]["right"]["closingBalance"], 1_000_000.0);
    }

    #[tokio::test]
    async fn compare_query_string_routes_suffixed_keys_to_right_scenario() {
        let uri: axum::http::Uri = "/api/compare?principal=0&rate=0.1&years=7&contribution=2000\
            &principal2=100&rate2=12&rateUnit2=percent&years2=2&compoundsPerYear2=12\
            &contributionFrequency2=3&stopPeriod2=12"
            .parse()
            .expect("valid uri");
        let query = Query::<CompareQuery>::try_from_uri(&uri).expect("query should parse");
        let payload = ComparePayload::from(query.0.clone());
        assert_eq!(payload.right.rate_unit, Some(ApiRateUnit::Percent));
        assert_eq!(payload.right.compounds_per_year, Some(12));
        assert_eq!(payload.right.stop_period, Some(12));
        assert_eq!(payload.left.rate_unit, None);

        let response = compare_get_handler(query).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["left"]["rows"].as_array().map(Vec::len), Some(7));
        assert_eq!(body["right"]["rows"].as_array().map(Vec::len), Some(24));
        assert_eq!(body["right"]["summary"]["totalContributions"], 0.0);
        assert_eq!(body["merged"].as_array().map(Vec::len), Some(24));
        assert_eq!(body["merged"][8]["rightMissing"], false);
        assert_eq!(body["merged"][8]["leftMissing"], true);
    }

    #[tokio::test]
    async fn health_and_fallback_handlers() {
        let response = health_handler().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");

        let response = not_found_handler().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Not found");
    }
}
