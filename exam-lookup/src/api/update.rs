//! Dataset upload endpoint

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use tracing::info;

use crate::error::Result;
use crate::update::UpdateReport;
use crate::AppState;

/// Header carrying the update secret
pub const UPDATE_SECRET_HEADER: &str = "x-update-secret";

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// POST /api/update/:cohort
///
/// Body is the workbook or CSV upload. 401 on a bad secret, 404 on an
/// unknown cohort, 400 when the upload or the stored source does not parse.
pub async fn post_update(
    State(state): State<AppState>,
    Path(cohort): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UpdateReport>> {
    let secret = headers
        .get(UPDATE_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    info!("Update requested for cohort {} ({} bytes)", cohort, body.len());
    let report = state.service.apply_update(&cohort, secret, &body).await?;
    Ok(Json(report))
}
