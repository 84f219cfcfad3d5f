// Roster entity
// Parsed CSV rows with normalized field names

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRow {
    pub display_name: String,
    pub entry_gate: Option<String>,
    pub seating_position: Option<String>,
    pub pass_type: Option<String>,
    pub contact_email: Option<String>,
    pub quantity: u32,
}

impl RosterRow {
    /// Lowercased email when present, otherwise the display name.
    pub fn contact_key(&self) -> String {
        match &self.contact_email {
            Some(email) => email.to_lowercase(),
            None => self.display_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRoster {
    pub rows: Vec<RosterRow>,
    pub dropped: usize,
}

impl ParsedRoster {
    pub fn total_tickets(&self) -> usize {
        self.rows.iter().map(|row| row.quantity as usize).sum()
    }
}
