// Attendee entity
// One persisted ticket unit: a roster row with quantity N becomes N of these

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{AttendeeId, OperatorId, TicketToken};

pub const DEFAULT_PASS_TYPE: &str = "Regular";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttendee {
    pub display_name: String,
    pub entry_gate: Option<String>,
    pub seating_position: Option<String>,
    pub pass_type: Option<String>,
    pub contact_email: Option<String>,
    pub contact_key: String,
    pub quantity_requested: u32,
    pub ticket_number: u32,
    pub contact_batch: u32,
    pub ticket_token: TicketToken,
    pub created_by: OperatorId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeRecord {
    pub id: AttendeeId,
    pub display_name: String,
    pub entry_gate: Option<String>,
    pub seating_position: Option<String>,
    pub pass_type: Option<String>,
    pub contact_email: Option<String>,
    pub contact_key: String,
    pub quantity_requested: u32,
    pub ticket_number: u32,
    pub contact_batch: u32,
    pub ticket_token: TicketToken,
    pub created_by: OperatorId,
    pub created_at: DateTime<Utc>,
}

impl AttendeeRecord {
    pub fn from_new(id: AttendeeId, unit: NewAttendee, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            display_name: unit.display_name,
            entry_gate: unit.entry_gate,
            seating_position: unit.seating_position,
            pass_type: unit.pass_type,
            contact_email: unit.contact_email,
            contact_key: unit.contact_key,
            quantity_requested: unit.quantity_requested,
            ticket_number: unit.ticket_number,
            contact_batch: unit.contact_batch,
            ticket_token: unit.ticket_token,
            created_by: unit.created_by,
            created_at,
        }
    }

    pub fn pass_label(&self) -> &str {
        self.pass_type.as_deref().unwrap_or(DEFAULT_PASS_TYPE)
    }

    pub fn summary(&self) -> AttendeeSummary {
        AttendeeSummary {
            name: self.display_name.clone(),
            gate: self.entry_gate.clone(),
            seat: self.seating_position.clone(),
            pass: self.pass_label().to_string(),
        }
    }

    pub fn matches_search(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.display_name.to_lowercase().contains(needle)
            || self
                .entry_gate
                .as_ref()
                .map(|gate| gate.to_lowercase().contains(needle))
                .unwrap_or(false)
            || self.pass_label().to_lowercase().contains(needle)
    }
}

/// What gate staff see after a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeSummary {
    pub name: String,
    pub gate: Option<String>,
    pub seat: Option<String>,
    pub pass: String,
}

/// Highest ticket number and batch already persisted for one contact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactCursor {
    pub last_ticket_number: u32,
    pub last_batch: u32,
}
