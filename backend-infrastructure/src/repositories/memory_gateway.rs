use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use backend_domain::ports::{BackendGateway, GatewayResult};
use backend_domain::{
    AttendeeFilter,
    AttendeeId,
    AttendeeRecord,
    ContactCursor,
    GatewayError,
    NewAttendee,
    NewScan,
    ScanId,
    ScanInsert,
    ScanRecord,
    TicketToken,
};

#[derive(Default)]
struct Store {
    attendees: Vec<AttendeeRecord>,
    by_token: HashMap<TicketToken, usize>,
    scans: Vec<ScanRecord>,
    scan_by_attendee: HashMap<AttendeeId, usize>,
}

/// Process-local gateway. A single lock makes batch inserts all-or-nothing
/// and the scan insert a true compare-and-set.
#[derive(Default)]
pub struct InMemoryGateway {
    store: Mutex<Store>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BackendGateway for InMemoryGateway {
    async fn ensure_schema(&self) -> GatewayResult<()> {
        Ok(())
    }

    async fn ping(&self) -> GatewayResult<()> {
        Ok(())
    }

    async fn insert_attendees(&self, units: &[NewAttendee]) -> GatewayResult<Vec<AttendeeRecord>> {
        let mut store = self.store.lock().await;
        let mut batch_tokens = std::collections::HashSet::new();
        for unit in units {
            if store.by_token.contains_key(&unit.ticket_token) || !batch_tokens.insert(&unit.ticket_token) {
                return Err(GatewayError::Conflict(format!(
                    "ticket token '{}' already exists",
                    unit.ticket_token
                )));
            }
        }

        let created_at = Utc::now();
        let mut records = Vec::with_capacity(units.len());
        for unit in units {
            let record = AttendeeRecord::from_new(AttendeeId::new(), unit.clone(), created_at);
            let index = store.attendees.len();
            store.by_token.insert(record.ticket_token.clone(), index);
            store.attendees.push(record.clone());
            records.push(record);
        }
        Ok(records)
    }

    async fn find_attendee_by_token(&self, token: &TicketToken) -> GatewayResult<Option<AttendeeRecord>> {
        let store = self.store.lock().await;
        Ok(store
            .by_token
            .get(token)
            .and_then(|index| store.attendees.get(*index))
            .cloned())
    }

    async fn list_attendees(&self, filter: &AttendeeFilter) -> GatewayResult<Vec<AttendeeRecord>> {
        let store = self.store.lock().await;
        Ok(store
            .attendees
            .iter()
            .filter(|attendee| match &filter.contact_key {
                Some(key) => &attendee.contact_key == key,
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn contact_cursors(&self, contact_keys: &[String]) -> GatewayResult<HashMap<String, ContactCursor>> {
        let store = self.store.lock().await;
        let mut cursors: HashMap<String, ContactCursor> = HashMap::new();
        for attendee in &store.attendees {
            if !contact_keys.contains(&attendee.contact_key) {
                continue;
            }
            let cursor = cursors.entry(attendee.contact_key.clone()).or_default();
            cursor.last_ticket_number = cursor.last_ticket_number.max(attendee.ticket_number);
            cursor.last_batch = cursor.last_batch.max(attendee.contact_batch);
        }
        Ok(cursors)
    }

    async fn find_scan_for_attendee(&self, attendee_id: &AttendeeId) -> GatewayResult<Option<ScanRecord>> {
        let store = self.store.lock().await;
        Ok(store
            .scan_by_attendee
            .get(attendee_id)
            .and_then(|index| store.scans.get(*index))
            .cloned())
    }

    async fn insert_scan_if_absent(&self, scan: NewScan) -> GatewayResult<ScanInsert> {
        let mut store = self.store.lock().await;
        if let Some(existing) = store
            .scan_by_attendee
            .get(&scan.attendee_id)
            .and_then(|index| store.scans.get(*index))
        {
            return Ok(ScanInsert::Conflict(existing.clone()));
        }
        let record = ScanRecord::from_new(ScanId::new(), scan);
        let index = store.scans.len();
        store.scan_by_attendee.insert(record.attendee_id, index);
        store.scans.push(record.clone());
        Ok(ScanInsert::Created(record))
    }

    async fn list_scans(&self) -> GatewayResult<Vec<ScanRecord>> {
        Ok(self.store.lock().await.scans.clone())
    }
}
