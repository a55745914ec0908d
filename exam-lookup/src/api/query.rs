//! Message channel endpoints: queries, continuation, welcome, statistics

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::dispatch::{handle_more, handle_query, Reply};
use crate::stats::StatsSnapshot;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub requester_id: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct MoreRequest {
    pub requester_id: String,
}

#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub text: String,
}

/// POST /api/query
///
/// Failures are part of the reply (a single text message), so this always
/// answers 200.
pub async fn post_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Json<Reply> {
    Json(handle_query(&state.service, &request.requester_id, &request.text).await)
}

/// POST /api/more
pub async fn post_more(
    State(state): State<AppState>,
    Json(request): Json<MoreRequest>,
) -> Json<Reply> {
    Json(handle_more(&state.service, &request.requester_id).await)
}

/// GET /api/welcome
pub async fn get_welcome(State(state): State<AppState>) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        text: state.service.welcome_text().await,
    })
}

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.service.stats())
}
