use chrono::Utc;
use tracing::{error, info, warn};

use crate::{AppError, AppState};
use backend_domain::{AttendeeRecord, NewScan, OperatorId, ScanInsert, ScanOutcome, TicketToken};

/// Admits the holder of `raw_token` at most once. Never returns an error:
/// gateway failures are reported as `ScanOutcome::Error`.
pub async fn process_scan(state: &AppState, raw_token: &str, operator: &OperatorId) -> ScanOutcome {
    let outcome = resolve_scan(state, raw_token, operator).await;
    state.metrics.record_scan(&outcome);
    outcome
}

async fn resolve_scan(state: &AppState, raw_token: &str, operator: &OperatorId) -> ScanOutcome {
    // Scanners often append CR/LF or padding.
    let token = raw_token.trim();
    if token.is_empty() {
        warn!("empty token scanned by {}", operator);
        return ScanOutcome::NotFound;
    }
    let token = TicketToken::new(token);

    let attendee = match state.gateway.find_attendee_by_token(&token).await {
        Ok(Some(attendee)) => attendee,
        Ok(None) => {
            warn!("unknown token {} scanned by {}", token, operator);
            return ScanOutcome::NotFound;
        }
        Err(err) => return gateway_failure("ticket lookup", err),
    };

    match state.gateway.find_scan_for_attendee(&attendee.id).await {
        Ok(Some(previous)) => return already_scanned(&attendee, previous.scanned_at),
        Ok(None) => {}
        Err(err) => return gateway_failure("scan lookup", err),
    }

    let scan = NewScan {
        attendee_id: attendee.id,
        scanned_at: Utc::now(),
        scanned_by: operator.clone(),
    };
    match state.gateway.insert_scan_if_absent(scan).await {
        Ok(ScanInsert::Created(record)) => {
            info!(
                "admitted {} ({}) at {} by {}",
                attendee.display_name, token, record.scanned_at, operator
            );
            ScanOutcome::Success {
                attendee: attendee.summary(),
            }
        }
        Ok(ScanInsert::Conflict(winner)) => already_scanned(&attendee, winner.scanned_at),
        Err(err) => gateway_failure("scan insert", err),
    }
}

fn already_scanned(attendee: &AttendeeRecord, previous: chrono::DateTime<Utc>) -> ScanOutcome {
    warn!(
        "{} already scanned at {}",
        attendee.ticket_token, previous
    );
    ScanOutcome::AlreadyScanned {
        attendee: attendee.summary(),
        previous_scanned_at: previous,
    }
}

fn gateway_failure(step: &str, err: backend_domain::GatewayError) -> ScanOutcome {
    error!("{} failed: {}", step, err);
    ScanOutcome::Error {
        reason: err.to_string(),
    }
}

/// Decodes a camera frame and processes the first code found in it.
pub async fn scan_frame(
    state: &AppState,
    image: &[u8],
    operator: &OperatorId,
) -> Result<ScanOutcome, AppError> {
    let codes = state
        .decoder
        .decode_image(image)
        .map_err(|err| AppError::Validation(format!("unreadable frame: {}", err)))?;
    let Some(first) = codes.into_iter().next() else {
        return Err(AppError::Validation("no code found in frame".to_string()));
    };
    Ok(process_scan(state, &first, operator).await)
}
