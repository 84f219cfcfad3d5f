// Roster CSV ingestion
// Header names are case-insensitive and order-independent; rows missing a
// name or every location field are dropped and counted.

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::entities::{ParsedRoster, RosterRow};
use crate::errors::RosterError;

#[derive(Debug, Default)]
struct ColumnMap {
    name: Option<usize>,
    gate: Option<usize>,
    seat: Option<usize>,
    pass_type: Option<usize>,
    quantity: Option<usize>,
    contact: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &StringRecord) -> Self {
        let mut map = Self::default();
        for (idx, raw) in header.iter().enumerate() {
            let key = raw.trim_start_matches('\u{feff}').trim().to_lowercase();
            let slot = match key.as_str() {
                "name" | "display_name" | "full_name" => &mut map.name,
                "gate" | "entry_gate" => &mut map.gate,
                "seat" | "seating_position" => &mut map.seat,
                "pass_type" | "passtype" | "pass" => &mut map.pass_type,
                "quantity" | "qty" => &mut map.quantity,
                "email" | "contact" | "contact_email" => &mut map.contact,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(idx);
            }
        }
        map
    }

    fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("name");
        }
        if self.gate.is_none() && self.seat.is_none() {
            missing.push("gate or seat");
        }
        missing
    }

    fn row_from(&self, record: &StringRecord) -> Option<RosterRow> {
        let display_name = cell(record, self.name)?;
        let entry_gate = cell(record, self.gate);
        let seating_position = cell(record, self.seat);
        if entry_gate.is_none() && seating_position.is_none() {
            return None;
        }
        let quantity = cell(record, self.quantity)
            .and_then(|raw| raw.parse::<u32>().ok())
            .filter(|qty| *qty > 0)
            .unwrap_or(1);
        Some(RosterRow {
            display_name,
            entry_gate,
            seating_position,
            pass_type: cell(record, self.pass_type),
            contact_email: cell(record, self.contact),
            quantity,
        })
    }
}

fn cell(record: &StringRecord, idx: Option<usize>) -> Option<String> {
    let value = record.get(idx?)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub fn parse_roster(text: &str) -> Result<ParsedRoster, RosterError> {
    if text.trim().is_empty() {
        return Err(RosterError::Empty);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let header = reader
        .headers()
        .map_err(|err| RosterError::Malformed(err.to_string()))?
        .clone();
    let columns = ColumnMap::from_header(&header);
    let missing = columns.missing();
    if !missing.is_empty() {
        return Err(RosterError::MissingColumns(missing.join(", ")));
    }

    let mut roster = ParsedRoster::default();
    for record in reader.records() {
        let Ok(record) = record else {
            roster.dropped += 1;
            continue;
        };
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        match columns.row_from(&record) {
            Some(row) => roster.rows.push(row),
            None => roster.dropped += 1,
        }
    }
    Ok(roster)
}
