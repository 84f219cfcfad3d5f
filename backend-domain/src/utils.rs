use crate::value_objects::TicketToken;

/// Deterministic image file name for a ticket. The token itself is never
/// altered; only the file name is made path-safe.
pub fn ticket_file_name(token: &TicketToken) -> String {
    format!("{}.png", sanitize_path_segment(token.as_str()))
}

pub fn archive_folder(contact_key: &str, batch: u32) -> String {
    format!("{}-{}", sanitize_path_segment(contact_key), batch)
}

pub fn sanitize_path_segment(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '@' | '-') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|ch| ch == '.') {
        return "_".to_string();
    }
    cleaned
}

pub fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
