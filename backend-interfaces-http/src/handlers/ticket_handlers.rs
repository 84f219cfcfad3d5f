use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::IntoResponse;

use backend_application::queries::ticket_queries;
use backend_application::AppState;
use backend_domain::utils::sanitize_path_segment;
use backend_domain::{ExportQuery, TicketQuery};

use crate::error::HttpError;
use crate::middleware::authorize;

fn attachment_headers(content_type: &'static str, file_name: &str) -> Result<HeaderMap, HttpError> {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file_name))
        .map_err(|err| HttpError::Internal(err.to_string()))?;
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    Ok(headers)
}

pub async fn ticket_qr(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TicketQuery>,
) -> Result<impl IntoResponse, HttpError> {
    authorize(&state, &headers)
        .await
        .ok_or(HttpError::Unauthorized)?;
    let ticket = ticket_queries::render_ticket(&state, query).await?;
    let response_headers = attachment_headers("image/png", &ticket.file_name)?;
    Ok((response_headers, ticket.png))
}

pub async fn export_tickets(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, HttpError> {
    authorize(&state, &headers)
        .await
        .ok_or(HttpError::Unauthorized)?;
    let file_name = match query.contact.as_deref().map(str::trim) {
        Some(contact) if !contact.is_empty() => {
            format!("tickets-{}.zip", sanitize_path_segment(contact))
        }
        _ => "tickets.zip".to_string(),
    };
    let archive = ticket_queries::export_archive(&state, query).await?;
    let response_headers = attachment_headers("application/zip", &file_name)?;
    Ok((response_headers, archive))
}
