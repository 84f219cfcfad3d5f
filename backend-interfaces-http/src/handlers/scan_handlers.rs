use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use backend_application::commands::scan_commands;
use backend_application::AppState;
use backend_domain::{ScanOutcome, ScanRequest};

use crate::error::HttpError;
use crate::middleware::authorize;

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    #[serde(flatten)]
    pub outcome: ScanOutcome,
    pub message: String,
}

impl From<ScanOutcome> for ScanResponse {
    fn from(outcome: ScanOutcome) -> Self {
        let message = outcome.message();
        Self { outcome, message }
    }
}

pub async fn submit_scan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ScanRequest>,
) -> Result<Json<ScanResponse>, HttpError> {
    let operator = authorize(&state, &headers)
        .await
        .ok_or(HttpError::Unauthorized)?;
    let outcome = scan_commands::process_scan(&state, &payload.token, &operator).await;
    Ok(Json(outcome.into()))
}

pub async fn submit_frame(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<ScanResponse>, HttpError> {
    let operator = authorize(&state, &headers)
        .await
        .ok_or(HttpError::Unauthorized)?;
    let outcome = scan_commands::scan_frame(&state, &body, &operator).await?;
    Ok(Json(outcome.into()))
}
