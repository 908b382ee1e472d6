//! Identifier codec (component A).
//!
//! The device emits ids as either wire form (`*a3`) or already-normalized
//! form (`a3`); it accepts either back. The rest of the core works with
//! plain `u64`s and only touches the hex encoding at the edges, via the two
//! functions below.
//!
//! Both are pure; `parse_id` memoizes its result behind a small process-wide
//! cache since it sits in the hot path of every identity comparison the
//! reconciler and the imagined list do.

use std::collections::HashMap;
use std::sync::Mutex;

use mtsync_error::{MtsyncError, Result};
use once_cell::sync::Lazy;

static PARSE_CACHE: Lazy<Mutex<HashMap<String, u64>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Parses a wire-form or normalized hex id string into an integer.
/// A leading `*` is stripped before parsing; otherwise the string is
/// interpreted as bare hex, matching the device's own leniency about which
/// form it was handed.
pub fn parse_id(raw: &str) -> Result<u64> {
    if let Some(cached) = PARSE_CACHE.lock().unwrap().get(raw) {
        return Ok(*cached);
    }

    let stripped = raw.strip_prefix('*').unwrap_or(raw);
    let value = u64::from_str_radix(stripped, 16)
        .map_err(|_| MtsyncError::invariant(format!("not a valid hex id: {raw:?}")))?;

    PARSE_CACHE.lock().unwrap().insert(raw.to_string(), value);
    Ok(value)
}

/// Formats an integer id as lowercase hex with no `0x` prefix and no `*`
/// prefix — the normalized form the core hands back to the device.
pub fn format_id(id: u64) -> String {
    format!("{id:x}")
}
