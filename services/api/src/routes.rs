use crate::infra::{deserialize_optional_date, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{Local, NaiveDate};
use posting_match::error::AppError;
use posting_match::matching::{MatchEngine, MatchReport};
use posting_match::tables::{MatchTableImporter, MatchTableSources};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

/// CSV tables posted inline; optional tables default to empty.
#[derive(Debug, Deserialize)]
pub(crate) struct MatchRequest {
    pub(crate) posts_csv: String,
    pub(crate) officers_csv: String,
    #[serde(default)]
    pub(crate) license_requirements_csv: Option<String>,
    #[serde(default)]
    pub(crate) first_cohort_csv: Option<String>,
    #[serde(default)]
    pub(crate) second_cohort_csv: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) run_date: Option<NaiveDate>,
}

pub(crate) fn router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/match", post(match_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn match_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<MatchRequest>,
) -> Result<Json<MatchReport>, AppError> {
    let MatchRequest {
        posts_csv,
        officers_csv,
        license_requirements_csv,
        first_cohort_csv,
        second_cohort_csv,
        run_date,
    } = payload;

    let importer = MatchTableImporter::new(state.matching.layout());
    let input = importer.load(MatchTableSources {
        posts: posts_csv.as_bytes(),
        officers: officers_csv.as_bytes(),
        license_requirements: license_requirements_csv.as_deref().map(str::as_bytes),
        first_cohort: first_cohort_csv.as_deref().map(str::as_bytes),
        second_cohort: second_cohort_csv.as_deref().map(str::as_bytes),
    })?;

    let outcome = MatchEngine::new(state.matching.settings()).run(&input)?;
    let run_date = run_date.unwrap_or_else(|| Local::now().date_naive());
    let report = MatchReport::build(&outcome, run_date);

    info!(
        matched = report.final_matches.len(),
        unmatched = report.unmatched_officers.len(),
        exceptions = report.exceptions.len(),
        "match request served"
    );

    Ok(Json(report))
}
