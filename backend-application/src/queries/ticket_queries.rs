use std::collections::HashSet;

use tracing::{error, info};

use crate::{AppError, AppState};
use backend_domain::utils::{archive_folder, ticket_file_name};
use backend_domain::{ArchiveEntry, AttendeeFilter, AttendeeRecord, ExportQuery, RenderedTicket, TicketQuery, TicketToken};

pub const SAMPLE_ROSTER_CSV: &str = "name,gate,seat,pass_type,quantity,email\n\
John Doe,Gate A,A-12,VIP,2,john@example.com\n\
Jane Smith,Gate B,,Regular,1,jane@example.com\n\
Sam Lee,,Balcony 3,,1,\n";

pub fn sample_roster_csv() -> &'static str {
    SAMPLE_ROSTER_CSV
}

/// Renders the QR image for one ticket. The token must match a stored
/// ticket exactly.
pub async fn render_ticket(state: &AppState, query: TicketQuery) -> Result<RenderedTicket, AppError> {
    let token = TicketToken::new(query.token);
    let attendee = state
        .gateway
        .find_attendee_by_token(&token)
        .await
        .map_err(|err| {
            error!("ticket lookup failed: {}", err);
            AppError::from(err)
        })?
        .ok_or_else(|| AppError::NotFound(format!("ticket '{}'", token)))?;

    let png = state.renderer.render_png(&attendee.ticket_token)?;
    Ok(RenderedTicket {
        file_name: ticket_file_name(&attendee.ticket_token),
        png,
    })
}

/// Packs one PNG per ticket into an archive, optionally restricted to one
/// contact and grouped into per-batch folders.
pub async fn export_archive(state: &AppState, query: ExportQuery) -> Result<Vec<u8>, AppError> {
    let contact_key = query
        .contact
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());
    let grouped = query.grouped.unwrap_or(false);

    let mut attendees = list_for_contact(state, contact_key.clone()).await?;
    // Email keys are stored lowercased, name keys verbatim.
    if attendees.is_empty() {
        if let Some(lowered) = contact_key
            .as_ref()
            .map(|key| key.to_lowercase())
            .filter(|lowered| Some(lowered) != contact_key.as_ref())
        {
            attendees = list_for_contact(state, Some(lowered)).await?;
        }
    }
    if attendees.is_empty() {
        return Err(AppError::NotFound(match contact_key {
            Some(key) => format!("no tickets for contact '{}'", key),
            None => "no tickets issued yet".to_string(),
        }));
    }

    let mut used_paths = HashSet::new();
    let mut entries = Vec::with_capacity(attendees.len());
    for attendee in &attendees {
        let file_name = ticket_file_name(&attendee.ticket_token);
        let base = if grouped {
            format!(
                "{}/{}",
                archive_folder(&attendee.contact_key, attendee.contact_batch),
                file_name
            )
        } else {
            file_name
        };
        let path = unique_path(&mut used_paths, base);
        let bytes = state.renderer.render_png(&attendee.ticket_token)?;
        entries.push(ArchiveEntry { path, bytes });
    }

    let archive = state.packager.package_files(&entries)?;
    info!(
        "exported {} tickets ({} bytes, grouped={})",
        entries.len(),
        archive.len(),
        grouped
    );
    Ok(archive)
}

async fn list_for_contact(
    state: &AppState,
    contact_key: Option<String>,
) -> Result<Vec<AttendeeRecord>, AppError> {
    state
        .gateway
        .list_attendees(&AttendeeFilter { contact_key })
        .await
        .map_err(|err| {
            error!("failed to list attendees for export: {}", err);
            AppError::from(err)
        })
}

// Sanitizing can map distinct tokens onto one file name.
fn unique_path(used: &mut HashSet<String>, base: String) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let stem = base.strip_suffix(".png").unwrap_or(&base).to_string();
    let mut n = 2;
    loop {
        let candidate = format!("{}~{}.png", stem, n);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
