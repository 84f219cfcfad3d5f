use sha2::{Digest, Sha256};
use tracing::{error, info, warn};

use crate::{AppError, AppState};
use backend_domain::services::{assign_tickets, contact_keys, parse_roster};
use backend_domain::{OperatorId, UploadReport};

/// Parses a roster, assigns one ticket per requested unit and persists the
/// whole batch in a single gateway call.
pub async fn upload_roster(
    state: &AppState,
    operator: &OperatorId,
    csv_text: &str,
) -> Result<UploadReport, AppError> {
    let roster_sha256 = checksum_sha256(csv_text.as_bytes());

    let roster = parse_roster(csv_text).map_err(|err| {
        state.metrics.record_upload_error();
        warn!("roster {} rejected: {}", short_digest(&roster_sha256), err);
        AppError::from(err)
    })?;
    if roster.dropped > 0 {
        warn!(
            "roster {} dropped {} rows missing a name or location",
            short_digest(&roster_sha256),
            roster.dropped
        );
    }
    if roster.rows.is_empty() {
        state.metrics.record_upload_error();
        return Err(AppError::Validation(
            "roster contains no rows with a name and a gate or seat".to_string(),
        ));
    }

    let requested = roster.total_tickets();
    let limit = state.config.max_tickets_per_upload;
    if requested > limit {
        state.metrics.record_upload_error();
        return Err(AppError::Validation(format!(
            "roster requests {} tickets, limit is {}",
            requested, limit
        )));
    }

    let keys = contact_keys(&roster.rows);
    let cursors = state.gateway.contact_cursors(&keys).await.map_err(|err| {
        state.metrics.record_upload_error();
        error!("failed to load contact cursors: {}", err);
        AppError::from(err)
    })?;

    let units = assign_tickets(&roster.rows, &cursors, operator);
    let attendees = state.gateway.insert_attendees(&units).await.map_err(|err| {
        state.metrics.record_upload_error();
        error!("failed to insert {} tickets: {}", units.len(), err);
        AppError::from(err)
    })?;

    state.metrics.record_upload(attendees.len());
    info!(
        "roster {} imported by {}: {} tickets for {} contacts",
        short_digest(&roster_sha256),
        operator,
        attendees.len(),
        keys.len()
    );

    Ok(UploadReport {
        tickets: attendees.len(),
        dropped_rows: roster.dropped,
        roster_sha256,
        attendees,
    })
}

fn checksum_sha256(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

fn short_digest(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}
