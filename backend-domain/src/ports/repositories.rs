use std::collections::HashMap;

use async_trait::async_trait;

use crate::entities::{
    AttendeeFilter,
    AttendeeRecord,
    ContactCursor,
    NewAttendee,
    NewScan,
    ScanInsert,
    ScanRecord,
};
use crate::errors::GatewayError;
use crate::value_objects::{AttendeeId, TicketToken};

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Durable storage for attendees and scans. Implementations must enforce
/// uniqueness of `ticket_token` and of `attendee_id` among scans.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    async fn ensure_schema(&self) -> GatewayResult<()>;
    async fn ping(&self) -> GatewayResult<()>;

    /// All-or-nothing: either every unit is persisted or none is.
    async fn insert_attendees(&self, units: &[NewAttendee]) -> GatewayResult<Vec<AttendeeRecord>>;
    async fn find_attendee_by_token(&self, token: &TicketToken) -> GatewayResult<Option<AttendeeRecord>>;
    async fn list_attendees(&self, filter: &AttendeeFilter) -> GatewayResult<Vec<AttendeeRecord>>;
    async fn contact_cursors(
        &self,
        contact_keys: &[String],
    ) -> GatewayResult<HashMap<String, ContactCursor>>;

    async fn find_scan_for_attendee(&self, attendee_id: &AttendeeId) -> GatewayResult<Option<ScanRecord>>;
    /// Atomic conditional insert keyed on `attendee_id`.
    async fn insert_scan_if_absent(&self, scan: NewScan) -> GatewayResult<ScanInsert>;
    async fn list_scans(&self) -> GatewayResult<Vec<ScanRecord>>;
}
