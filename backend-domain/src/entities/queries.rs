// Query and response payloads shared by the application and HTTP layers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::AttendeeRecord;

#[derive(Debug, Default, Deserialize)]
pub struct AttendeeQuery {
    pub search: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct AttendeeFilter {
    pub contact_key: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendeeStatus {
    #[serde(flatten)]
    pub attendee: AttendeeRecord,
    pub scanned_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendeeOverview {
    pub total: usize,
    pub scanned: usize,
    pub attendees: Vec<AttendeeStatus>,
}

#[derive(Debug, Deserialize)]
pub struct TicketQuery {
    pub token: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub contact: Option<String>,
    pub grouped: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub tickets: usize,
    pub dropped_rows: usize,
    pub roster_sha256: String,
    pub attendees: Vec<AttendeeRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RenderedTicket {
    pub file_name: String,
    pub png: Vec<u8>,
}
