// In-process fakes for application tests

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;

use crate::commands::upload_commands::upload_roster;
use crate::{AppState, Metrics};
use backend_domain::ports::{
    ArchivePackager,
    BackendGateway,
    CodeDecoder,
    CodeRenderer,
    DecodeFeed,
    GatewayResult,
    HealthCheckService,
    OperatorDirectory,
    ScannerDevice,
};
use backend_domain::{
    ArchiveEntry,
    AttendeeFilter,
    AttendeeId,
    AttendeeRecord,
    ContactCursor,
    DeviceError,
    GatewayError,
    NewAttendee,
    NewScan,
    OperatorId,
    RuntimeConfig,
    ScanId,
    ScanInsert,
    ScanRecord,
    TicketToken,
};

#[derive(Default)]
struct Tables {
    attendees: Vec<AttendeeRecord>,
    scans: Vec<ScanRecord>,
}

#[derive(Default)]
pub struct FakeGateway {
    tables: Mutex<Tables>,
    hide_cursors: AtomicBool,
    hide_scans_on_read: AtomicBool,
    fail_reads: AtomicBool,
}

impl FakeGateway {
    pub fn attendee_count(&self) -> usize {
        self.lock().attendees.len()
    }

    pub fn scan_count(&self) -> usize {
        self.lock().scans.len()
    }

    pub fn scans(&self) -> Vec<ScanRecord> {
        self.lock().scans.clone()
    }

    pub fn hide_cursors(&self) {
        self.hide_cursors.store(true, Ordering::SeqCst);
    }

    pub fn hide_scans_on_read(&self) {
        self.hide_scans_on_read.store(true, Ordering::SeqCst);
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().expect("fake gateway lock")
    }

    fn check_reads(&self) -> GatewayResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(GatewayError::Backend(anyhow!("connection reset")));
        }
        Ok(())
    }
}

#[async_trait]
impl BackendGateway for FakeGateway {
    async fn ensure_schema(&self) -> GatewayResult<()> {
        Ok(())
    }

    async fn ping(&self) -> GatewayResult<()> {
        self.check_reads()
    }

    async fn insert_attendees(&self, units: &[NewAttendee]) -> GatewayResult<Vec<AttendeeRecord>> {
        let mut tables = self.lock();
        for unit in units {
            if tables
                .attendees
                .iter()
                .any(|existing| existing.ticket_token == unit.ticket_token)
            {
                return Err(GatewayError::Conflict(unit.ticket_token.to_string()));
            }
        }
        let now = Utc::now();
        let records: Vec<AttendeeRecord> = units
            .iter()
            .cloned()
            .map(|unit| AttendeeRecord::from_new(AttendeeId::new(), unit, now))
            .collect();
        tables.attendees.extend(records.iter().cloned());
        Ok(records)
    }

    async fn find_attendee_by_token(&self, token: &TicketToken) -> GatewayResult<Option<AttendeeRecord>> {
        self.check_reads()?;
        Ok(self
            .lock()
            .attendees
            .iter()
            .find(|attendee| &attendee.ticket_token == token)
            .cloned())
    }

    async fn list_attendees(&self, filter: &AttendeeFilter) -> GatewayResult<Vec<AttendeeRecord>> {
        self.check_reads()?;
        Ok(self
            .lock()
            .attendees
            .iter()
            .filter(|attendee| {
                filter
                    .contact_key
                    .as_ref()
                    .map(|key| &attendee.contact_key == key)
                    .unwrap_or(true)
            })
            .cloned()
            .collect())
    }

    async fn contact_cursors(&self, contact_keys: &[String]) -> GatewayResult<HashMap<String, ContactCursor>> {
        let mut cursors: HashMap<String, ContactCursor> = HashMap::new();
        if self.hide_cursors.load(Ordering::SeqCst) {
            return Ok(cursors);
        }
        for attendee in &self.lock().attendees {
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
        self.check_reads()?;
        if self.hide_scans_on_read.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self
            .lock()
            .scans
            .iter()
            .find(|scan| &scan.attendee_id == attendee_id)
            .cloned())
    }

    async fn insert_scan_if_absent(&self, scan: NewScan) -> GatewayResult<ScanInsert> {
        let mut tables = self.lock();
        if let Some(existing) = tables
            .scans
            .iter()
            .find(|existing| existing.attendee_id == scan.attendee_id)
        {
            return Ok(ScanInsert::Conflict(existing.clone()));
        }
        let record = ScanRecord::from_new(ScanId::new(), scan);
        tables.scans.push(record.clone());
        Ok(ScanInsert::Created(record))
    }

    async fn list_scans(&self) -> GatewayResult<Vec<ScanRecord>> {
        self.check_reads()?;
        Ok(self.lock().scans.clone())
    }
}

/// Renders a ticket as the raw token bytes.
struct EchoCodec;

impl CodeRenderer for EchoCodec {
    fn render_png(&self, token: &TicketToken) -> anyhow::Result<Vec<u8>> {
        Ok(token.as_str().as_bytes().to_vec())
    }
}

impl CodeDecoder for EchoCodec {
    fn decode_image(&self, image: &[u8]) -> anyhow::Result<Vec<String>> {
        if image.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![String::from_utf8(image.to_vec())?])
    }
}

/// Archive as newline separated paths.
struct ListingPackager;

impl ArchivePackager for ListingPackager {
    fn package_files(&self, entries: &[ArchiveEntry]) -> anyhow::Result<Vec<u8>> {
        let listing: Vec<&str> = entries.iter().map(|entry| entry.path.as_str()).collect();
        Ok(listing.join("\n").into_bytes())
    }
}

pub fn unpack(archive: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(archive)
        .lines()
        .map(ToString::to_string)
        .collect()
}

struct AlwaysHealthy;

#[async_trait]
impl HealthCheckService for AlwaysHealthy {
    async fn check_database(&self) -> anyhow::Result<bool> {
        Ok(true)
    }
}

struct DefaultOperator;

#[async_trait]
impl OperatorDirectory for DefaultOperator {
    async fn current_operator(&self, _bearer: Option<&str>) -> Option<OperatorId> {
        Some(OperatorId::new("organizer"))
    }
}

pub fn runtime_config(max_tickets_per_upload: usize) -> RuntimeConfig {
    RuntimeConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        default_operator: "organizer".to_string(),
        operators: Vec::new(),
        qr_module_pixels: 4,
        qr_quiet_zone: true,
        max_tickets_per_upload,
        max_body_bytes: 1024 * 1024,
        request_timeout_seconds: 5,
    }
}

pub fn test_state() -> (AppState, Arc<FakeGateway>) {
    test_state_with_limit(10_000)
}

pub fn test_state_with_limit(max_tickets_per_upload: usize) -> (AppState, Arc<FakeGateway>) {
    let gateway = Arc::new(FakeGateway::default());
    let state = AppState {
        config: runtime_config(max_tickets_per_upload),
        gateway: gateway.clone(),
        operators: Arc::new(DefaultOperator),
        renderer: Arc::new(EchoCodec),
        decoder: Arc::new(EchoCodec),
        packager: Arc::new(ListingPackager),
        health: Arc::new(AlwaysHealthy),
        metrics: Arc::new(Metrics::default()),
    };
    (state, gateway)
}

pub async fn seed(state: &AppState, csv: &str) {
    upload_roster(state, &OperatorId::new("organizer"), csv)
        .await
        .expect("seed roster");
}

struct ScannerInner {
    decodes: Mutex<VecDeque<String>>,
    open: AtomicBool,
    never_decodes: bool,
}

pub struct FakeScanner {
    inner: Arc<ScannerInner>,
}

impl FakeScanner {
    pub fn with_decodes(decodes: &[&str]) -> Self {
        Self::build(decodes, false)
    }

    pub fn pending() -> Self {
        Self::build(&[], true)
    }

    fn build(decodes: &[&str], never_decodes: bool) -> Self {
        Self {
            inner: Arc::new(ScannerInner {
                decodes: Mutex::new(decodes.iter().map(ToString::to_string).collect()),
                open: AtomicBool::new(false),
                never_decodes,
            }),
        }
    }

    pub fn is_open(&self) -> bool {
        self.inner.open.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScannerDevice for FakeScanner {
    async fn open(&self) -> Result<Box<dyn DecodeFeed>, DeviceError> {
        if self.inner.open.swap(true, Ordering::SeqCst) {
            return Err(DeviceError::Busy);
        }
        Ok(Box::new(FakeFeed {
            inner: self.inner.clone(),
            released: false,
        }))
    }
}

struct FakeFeed {
    inner: Arc<ScannerInner>,
    released: bool,
}

#[async_trait]
impl DecodeFeed for FakeFeed {
    async fn next_decode(&mut self) -> Option<String> {
        if self.inner.never_decodes {
            std::future::pending::<()>().await;
        }
        self.inner.decodes.lock().expect("decodes lock").pop_front()
    }

    async fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.inner.open.store(false, Ordering::SeqCst);
        }
    }
}
