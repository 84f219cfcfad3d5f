use std::io::Read;

use anyhow::{anyhow, Result};
use axum::http::HeaderMap;
use flate2::read::GzDecoder;

use backend_application::AppState;
use backend_domain::OperatorId;

/// Resolves the calling operator from the bearer token, if the directory
/// accepts it.
pub async fn authorize(state: &AppState, headers: &HeaderMap) -> Option<OperatorId> {
    let bearer = extract_bearer(headers);
    state.operators.current_operator(bearer.as_deref()).await
}

/// Request body as UTF-8 text, gunzipped when `Content-Encoding: gzip`.
/// Decompressed output is capped at `limit` bytes.
pub fn read_text_body(headers: &HeaderMap, body: &[u8], limit: u64) -> Result<String> {
    let content = maybe_gunzip(headers, body, limit)?;
    String::from_utf8(content).map_err(|_| anyhow!("body is not valid UTF-8"))
}

fn maybe_gunzip(headers: &HeaderMap, body: &[u8], limit: u64) -> Result<Vec<u8>> {
    if let Some(encoding) = headers.get("Content-Encoding") {
        if encoding.to_str().unwrap_or("").trim().eq_ignore_ascii_case("gzip") {
            let mut out = Vec::new();
            GzDecoder::new(body)
                .take(limit.saturating_add(1))
                .read_to_end(&mut out)?;
            if out.len() as u64 > limit {
                return Err(anyhow!("decompressed body exceeds {} bytes", limit));
            }
            return Ok(out);
        }
    }
    Ok(body.to_vec())
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let prefix = "Bearer ";
    if !value.starts_with(prefix) {
        return None;
    }
    let token = value[prefix.len()..].trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
