use std::collections::HashMap;

use tracing::error;

use crate::{AppError, AppState};
use backend_domain::{AttendeeFilter, AttendeeOverview, AttendeeQuery, AttendeeStatus};

const DEFAULT_LIMIT: usize = 200;
const MAX_LIMIT: usize = 1000;

/// Newest attendees first with their scan time. `total` and `scanned`
/// always describe the whole roster, not the filtered page.
pub async fn list_attendees(
    state: &AppState,
    query: AttendeeQuery,
) -> Result<AttendeeOverview, AppError> {
    let mut attendees = state
        .gateway
        .list_attendees(&AttendeeFilter::default())
        .await
        .map_err(|err| {
            error!("failed to list attendees: {}", err);
            AppError::from(err)
        })?;
    let scans = state.gateway.list_scans().await.map_err(|err| {
        error!("failed to list scans: {}", err);
        AppError::from(err)
    })?;

    let scanned_at: HashMap<_, _> = scans
        .into_iter()
        .map(|scan| (scan.attendee_id, scan.scanned_at))
        .collect();
    let total = attendees.len();
    let scanned = attendees
        .iter()
        .filter(|attendee| scanned_at.contains_key(&attendee.id))
        .count();

    let needle = query
        .search
        .as_deref()
        .map(|value| value.trim().to_lowercase())
        .unwrap_or_default();
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    attendees.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let attendees = attendees
        .into_iter()
        .filter(|attendee| attendee.matches_search(&needle))
        .take(limit)
        .map(|attendee| AttendeeStatus {
            scanned_at: scanned_at.get(&attendee.id).copied(),
            attendee,
        })
        .collect();

    Ok(AttendeeOverview {
        total,
        scanned,
        attendees,
    })
}
