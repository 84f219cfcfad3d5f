// Scan entity
// A scan record is the admission itself; at most one exists per attendee

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::AttendeeSummary;
use crate::value_objects::{AttendeeId, OperatorId, ScanId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScan {
    pub attendee_id: AttendeeId,
    pub scanned_at: DateTime<Utc>,
    pub scanned_by: OperatorId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: ScanId,
    pub attendee_id: AttendeeId,
    pub scanned_at: DateTime<Utc>,
    pub scanned_by: OperatorId,
}

impl ScanRecord {
    pub fn from_new(id: ScanId, scan: NewScan) -> Self {
        Self {
            id,
            attendee_id: scan.attendee_id,
            scanned_at: scan.scanned_at,
            scanned_by: scan.scanned_by,
        }
    }
}

/// Result of an atomic conditional insert. `Conflict` carries the record
/// that won.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanInsert {
    Created(ScanRecord),
    Conflict(ScanRecord),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
    Success {
        attendee: AttendeeSummary,
    },
    AlreadyScanned {
        attendee: AttendeeSummary,
        previous_scanned_at: DateTime<Utc>,
    },
    NotFound,
    Error {
        reason: String,
    },
}

impl ScanOutcome {
    pub fn is_admitted(&self) -> bool {
        matches!(self, ScanOutcome::Success { .. })
    }

    pub fn status(&self) -> &'static str {
        match self {
            ScanOutcome::Success { .. } => "success",
            ScanOutcome::AlreadyScanned { .. } => "already_scanned",
            ScanOutcome::NotFound => "not_found",
            ScanOutcome::Error { .. } => "error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ScanOutcome::Success { .. } => "Entry allowed".to_string(),
            ScanOutcome::AlreadyScanned { .. } => "Already scanned".to_string(),
            ScanOutcome::NotFound => "Ticket not found".to_string(),
            ScanOutcome::Error { reason } => format!("Scan failed: {}", reason),
        }
    }
}
