// Ticket assignment
// Tokens are "{contact_key}-{n}" where n is a per-contact counter that
// continues after the highest number already persisted for that contact.
// The suffix after the last '-' is always the decimal counter, so distinct
// (contact, n) pairs never produce the same token.

use std::collections::HashMap;

use crate::entities::{ContactCursor, NewAttendee, RosterRow};
use crate::value_objects::{OperatorId, TicketToken};

pub fn ticket_token_for(contact_key: &str, ticket_number: u32) -> TicketToken {
    TicketToken::new(format!("{}-{}", contact_key, ticket_number))
}

pub fn assign_tickets(
    rows: &[RosterRow],
    cursors: &HashMap<String, ContactCursor>,
    created_by: &OperatorId,
) -> Vec<NewAttendee> {
    let mut running: HashMap<String, ContactCursor> = HashMap::new();
    let mut units = Vec::with_capacity(rows.iter().map(|row| row.quantity as usize).sum());

    for row in rows {
        let contact_key = row.contact_key();
        let cursor = running
            .entry(contact_key.clone())
            .or_insert_with(|| cursors.get(&contact_key).copied().unwrap_or_default());
        cursor.last_batch += 1;
        let batch = cursor.last_batch;

        for _ in 0..row.quantity {
            cursor.last_ticket_number += 1;
            units.push(NewAttendee {
                display_name: row.display_name.clone(),
                entry_gate: row.entry_gate.clone(),
                seating_position: row.seating_position.clone(),
                pass_type: row.pass_type.clone(),
                contact_email: row.contact_email.clone(),
                contact_key: contact_key.clone(),
                quantity_requested: row.quantity,
                ticket_number: cursor.last_ticket_number,
                contact_batch: batch,
                ticket_token: ticket_token_for(&contact_key, cursor.last_ticket_number),
                created_by: created_by.clone(),
            });
        }
    }
    units
}

/// Distinct contact keys in first-seen order.
pub fn contact_keys(rows: &[RosterRow]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for row in rows {
        let key = row.contact_key();
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}
