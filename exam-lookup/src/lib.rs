//! exam-lookup library - exam results lookup service
//!
//! Loads yearly result tables, answers identifier and name queries with a
//! text summary plus a printable transcript, and accepts secret-gated
//! dataset updates.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod dispatch;
pub mod error;
pub mod render;
pub mod resolver;
pub mod search;
pub mod service;
pub mod session;
pub mod stats;
pub mod store;
pub mod update;
pub mod vocab;

pub use error::{LookupError, Result};
pub use service::LookupService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LookupService>,
}

impl AppState {
    pub fn new(service: LookupService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let update = Router::new()
        .route("/api/update/:cohort", post(api::post_update))
        .layer(DefaultBodyLimit::max(api::MAX_UPLOAD_BYTES));

    Router::new()
        .route("/api/query", post(api::post_query))
        .route("/api/more", post(api::post_more))
        .route("/api/welcome", get(api::get_welcome))
        .route("/api/stats", get(api::get_stats))
        .merge(update)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
