use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::info;
use uuid::Uuid;

use backend_domain::ports::{BackendGateway, GatewayResult};
use backend_domain::{
    AttendeeFilter,
    AttendeeId,
    AttendeeRecord,
    ContactCursor,
    DbConfig,
    GatewayError,
    NewAttendee,
    NewScan,
    OperatorId,
    ScanId,
    ScanInsert,
    ScanRecord,
    TicketToken,
};

const CURSOR_CHUNK: usize = 500;

const ATTENDEE_COLUMNS: &str = "id, display_name, entry_gate, seating_position, pass_type, \
contact_email, contact_key, quantity_requested, ticket_number, contact_batch, ticket_token, \
created_by, created_at";

const SCAN_COLUMNS: &str = "id, attendee_id, scanned_at, scanned_by";

#[derive(Clone)]
pub struct SqliteGateway {
    pool: SqlitePool,
}

impl SqliteGateway {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DbConfig) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .with_context(|| format!("invalid database_url '{}'", config.database_url))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        // Every connection to an in-memory database sees its own empty
        // database, so the single connection must never be recycled.
        let in_memory = is_memory_url(&config.database_url);
        let max_connections = if in_memory {
            1
        } else {
            config.max_connections.max(1)
        };
        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
        if in_memory {
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open {}", config.database_url))?;
        info!(
            "sqlite gateway connected ({} connections)",
            max_connections
        );
        Ok(Self::new(pool))
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn backend_err(context: &str, err: sqlx::Error) -> GatewayError {
    GatewayError::Backend(anyhow!("{}: {}", context, err))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}

fn parse_uuid(raw: &str) -> GatewayResult<Uuid> {
    Uuid::parse_str(raw).map_err(|err| GatewayError::Backend(anyhow!("corrupt id '{}': {}", raw, err)))
}

fn column_u32(row: &SqliteRow, column: &str) -> GatewayResult<u32> {
    let value: i64 = row
        .try_get(column)
        .map_err(|err| backend_err(column, err))?;
    u32::try_from(value).map_err(|_| GatewayError::Backend(anyhow!("{} out of range: {}", column, value)))
}

fn attendee_from_row(row: &SqliteRow) -> GatewayResult<AttendeeRecord> {
    let get_text = |column: &str| -> GatewayResult<String> {
        row.try_get::<String, _>(column)
            .map_err(|err| backend_err(column, err))
    };
    let get_optional = |column: &str| -> GatewayResult<Option<String>> {
        row.try_get::<Option<String>, _>(column)
            .map_err(|err| backend_err(column, err))
    };
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|err| backend_err("created_at", err))?;

    Ok(AttendeeRecord {
        id: AttendeeId(parse_uuid(&get_text("id")?)?),
        display_name: get_text("display_name")?,
        entry_gate: get_optional("entry_gate")?,
        seating_position: get_optional("seating_position")?,
        pass_type: get_optional("pass_type")?,
        contact_email: get_optional("contact_email")?,
        contact_key: get_text("contact_key")?,
        quantity_requested: column_u32(row, "quantity_requested")?,
        ticket_number: column_u32(row, "ticket_number")?,
        contact_batch: column_u32(row, "contact_batch")?,
        ticket_token: TicketToken::new(get_text("ticket_token")?),
        created_by: OperatorId::new(get_text("created_by")?),
        created_at,
    })
}

fn scan_from_row(row: &SqliteRow) -> GatewayResult<ScanRecord> {
    let id: String = row.try_get("id").map_err(|err| backend_err("id", err))?;
    let attendee_id: String = row
        .try_get("attendee_id")
        .map_err(|err| backend_err("attendee_id", err))?;
    let scanned_at: DateTime<Utc> = row
        .try_get("scanned_at")
        .map_err(|err| backend_err("scanned_at", err))?;
    let scanned_by: String = row
        .try_get("scanned_by")
        .map_err(|err| backend_err("scanned_by", err))?;
    Ok(ScanRecord {
        id: ScanId(parse_uuid(&id)?),
        attendee_id: AttendeeId(parse_uuid(&attendee_id)?),
        scanned_at,
        scanned_by: OperatorId::new(scanned_by),
    })
}

#[async_trait]
impl BackendGateway for SqliteGateway {
    async fn ensure_schema(&self) -> GatewayResult<()> {
        let create_attendees = r#"
CREATE TABLE IF NOT EXISTS attendees (
    id TEXT PRIMARY KEY NOT NULL,
    display_name TEXT NOT NULL,
    entry_gate TEXT,
    seating_position TEXT,
    pass_type TEXT,
    contact_email TEXT,
    contact_key TEXT NOT NULL,
    quantity_requested INTEGER NOT NULL,
    ticket_number INTEGER NOT NULL,
    contact_batch INTEGER NOT NULL,
    ticket_token TEXT NOT NULL UNIQUE,
    created_by TEXT NOT NULL,
    created_at TEXT NOT NULL
)
"#;
        sqlx::query(create_attendees)
            .execute(&self.pool)
            .await
            .map_err(|err| backend_err("create attendees", err))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS attendees_contact_key ON attendees (contact_key)")
            .execute(&self.pool)
            .await
            .map_err(|err| backend_err("create attendees index", err))?;

        let create_scans = r#"
CREATE TABLE IF NOT EXISTS scans (
    id TEXT PRIMARY KEY NOT NULL,
    attendee_id TEXT NOT NULL UNIQUE REFERENCES attendees (id),
    scanned_at TEXT NOT NULL,
    scanned_by TEXT NOT NULL
)
"#;
        sqlx::query(create_scans)
            .execute(&self.pool)
            .await
            .map_err(|err| backend_err("create scans", err))?;
        Ok(())
    }

    async fn ping(&self) -> GatewayResult<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|err| backend_err("ping", err))?;
        Ok(())
    }

    async fn insert_attendees(&self, units: &[NewAttendee]) -> GatewayResult<Vec<AttendeeRecord>> {
        let created_at = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| backend_err("begin", err))?;
        let mut records = Vec::with_capacity(units.len());

        for unit in units {
            let record = AttendeeRecord::from_new(AttendeeId::new(), unit.clone(), created_at);
            let inserted = sqlx::query(
                "INSERT INTO attendees (id, display_name, entry_gate, seating_position, pass_type, \
contact_email, contact_key, quantity_requested, ticket_number, contact_batch, ticket_token, \
created_by, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(record.id.to_string())
            .bind(&record.display_name)
            .bind(&record.entry_gate)
            .bind(&record.seating_position)
            .bind(&record.pass_type)
            .bind(&record.contact_email)
            .bind(&record.contact_key)
            .bind(i64::from(record.quantity_requested))
            .bind(i64::from(record.ticket_number))
            .bind(i64::from(record.contact_batch))
            .bind(record.ticket_token.as_str())
            .bind(record.created_by.as_str())
            .bind(record.created_at)
            .execute(&mut *tx)
            .await;

            if let Err(err) = inserted {
                if is_unique_violation(&err) {
                    return Err(GatewayError::Conflict(format!(
                        "ticket token '{}' already exists",
                        record.ticket_token
                    )));
                }
                return Err(backend_err("insert attendee", err));
            }
            records.push(record);
        }

        tx.commit().await.map_err(|err| backend_err("commit", err))?;
        Ok(records)
    }

    async fn find_attendee_by_token(&self, token: &TicketToken) -> GatewayResult<Option<AttendeeRecord>> {
        let sql = format!("SELECT {} FROM attendees WHERE ticket_token = ?", ATTENDEE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(token.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| backend_err("find attendee", err))?;
        row.as_ref().map(attendee_from_row).transpose()
    }

    async fn list_attendees(&self, filter: &AttendeeFilter) -> GatewayResult<Vec<AttendeeRecord>> {
        let rows = match &filter.contact_key {
            Some(contact_key) => {
                let sql = format!(
                    "SELECT {} FROM attendees WHERE contact_key = ? ORDER BY rowid",
                    ATTENDEE_COLUMNS
                );
                sqlx::query(&sql)
                    .bind(contact_key)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!("SELECT {} FROM attendees ORDER BY rowid", ATTENDEE_COLUMNS);
                sqlx::query(&sql).fetch_all(&self.pool).await
            }
        }
        .map_err(|err| backend_err("list attendees", err))?;
        rows.iter().map(attendee_from_row).collect()
    }

    async fn contact_cursors(&self, contact_keys: &[String]) -> GatewayResult<HashMap<String, ContactCursor>> {
        let mut cursors = HashMap::new();
        for chunk in contact_keys.chunks(CURSOR_CHUNK) {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
                "SELECT contact_key, MAX(ticket_number) AS ticket_number, \
MAX(contact_batch) AS contact_batch FROM attendees WHERE contact_key IN (",
            );
            let mut separated = builder.separated(", ");
            for key in chunk {
                separated.push_bind(key);
            }
            separated.push_unseparated(") GROUP BY contact_key");

            let rows = builder
                .build()
                .fetch_all(&self.pool)
                .await
                .map_err(|err| backend_err("contact cursors", err))?;
            for row in &rows {
                let key: String = row
                    .try_get("contact_key")
                    .map_err(|err| backend_err("contact_key", err))?;
                cursors.insert(
                    key,
                    ContactCursor {
                        last_ticket_number: column_u32(row, "ticket_number")?,
                        last_batch: column_u32(row, "contact_batch")?,
                    },
                );
            }
        }
        Ok(cursors)
    }

    async fn find_scan_for_attendee(&self, attendee_id: &AttendeeId) -> GatewayResult<Option<ScanRecord>> {
        let sql = format!("SELECT {} FROM scans WHERE attendee_id = ?", SCAN_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(attendee_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| backend_err("find scan", err))?;
        row.as_ref().map(scan_from_row).transpose()
    }

    async fn insert_scan_if_absent(&self, scan: NewScan) -> GatewayResult<ScanInsert> {
        let record = ScanRecord::from_new(ScanId::new(), scan);
        let result = sqlx::query(
            "INSERT INTO scans (id, attendee_id, scanned_at, scanned_by) VALUES (?, ?, ?, ?) \
ON CONFLICT (attendee_id) DO NOTHING",
        )
        .bind(record.id.to_string())
        .bind(record.attendee_id.to_string())
        .bind(record.scanned_at)
        .bind(record.scanned_by.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| backend_err("insert scan", err))?;

        if result.rows_affected() == 1 {
            return Ok(ScanInsert::Created(record));
        }
        let winner = self
            .find_scan_for_attendee(&record.attendee_id)
            .await?
            .ok_or_else(|| GatewayError::Backend(anyhow!("scan conflict without a stored scan")))?;
        Ok(ScanInsert::Conflict(winner))
    }

    async fn list_scans(&self) -> GatewayResult<Vec<ScanRecord>> {
        let sql = format!("SELECT {} FROM scans ORDER BY rowid", SCAN_COLUMNS);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| backend_err("list scans", err))?;
        rows.iter().map(scan_from_row).collect()
    }
}
