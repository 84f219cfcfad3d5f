use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::IntoResponse;
use axum::Json;
use tracing::warn;

use backend_application::commands::upload_commands;
use backend_application::queries::ticket_queries;
use backend_application::AppState;
use backend_domain::UploadReport;

use crate::error::HttpError;
use crate::middleware::{authorize, read_text_body};

pub async fn upload_roster(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<UploadReport>, HttpError> {
    let operator = authorize(&state, &headers)
        .await
        .ok_or(HttpError::Unauthorized)?;

    let text = read_text_body(&headers, &body, state.config.max_body_bytes).map_err(|err| {
        warn!("unreadable roster body: {}", err);
        HttpError::BadRequest(err.to_string())
    })?;
    let report = upload_commands::upload_roster(&state, &operator, &text).await?;
    Ok(Json(report))
}

pub async fn sample_roster(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HttpError> {
    authorize(&state, &headers)
        .await
        .ok_or(HttpError::Unauthorized)?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    response_headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"roster-sample.csv\""),
    );
    Ok((response_headers, ticket_queries::sample_roster_csv()))
}
