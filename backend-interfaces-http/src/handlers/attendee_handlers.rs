use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;

use backend_application::queries::attendee_queries;
use backend_application::AppState;
use backend_domain::{AttendeeOverview, AttendeeQuery};

use crate::error::HttpError;
use crate::middleware::authorize;

pub async fn list_attendees(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AttendeeQuery>,
) -> Result<Json<AttendeeOverview>, HttpError> {
    authorize(&state, &headers)
        .await
        .ok_or(HttpError::Unauthorized)?;
    let overview = attendee_queries::list_attendees(&state, query).await?;
    Ok(Json(overview))
}
