//! Health check endpoint
//!
//! Reports build identity and how many configured cohorts are being served,
//! so a deployment with missing result files shows up without a query.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::service::CohortSummary;
use crate::AppState;

/// Compile-time identity of this binary
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub revision: &'static str,
    pub built_on: &'static str,
    pub profile: &'static str,
}

pub const BUILD_INFO: BuildInfo = BuildInfo {
    version: env!("CARGO_PKG_VERSION"),
    revision: env!("EXAM_LOOKUP_REVISION"),
    built_on: env!("EXAM_LOOKUP_BUILT_ON"),
    profile: env!("EXAM_LOOKUP_PROFILE"),
};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when every configured cohort is loaded, `degraded` otherwise
    pub status: &'static str,
    pub module: &'static str,
    pub build: BuildInfo,
    pub cohorts: CohortSummary,
}

/// GET /health
///
/// Does not require the update secret.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let cohorts = state.service.cohort_summary().await;
    Json(HealthResponse {
        status: if cohorts.loaded < cohorts.configured {
            "degraded"
        } else {
            "ok"
        },
        module: "exam-lookup",
        build: BUILD_INFO,
        cohorts,
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
