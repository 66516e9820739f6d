//! Log sanitization utilities
//!
//! Fill responses can carry hundreds of project or stream names; only a prefix of the
//! body goes to the log.

/// Maximum number of characters of a body included in a log line.
const TRUNCATE_LIMIT: usize = 256;

/// Truncate a response body for logging.
///
/// Bodies within the limit are returned unchanged. Longer ones keep the first
/// `TRUNCATE_LIMIT` characters and note the full byte length.
pub fn truncate_for_log(s: &str) -> String {
    match s.char_indices().nth(TRUNCATE_LIMIT) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}... [truncated, total {} bytes]", &s[..cut], s.len()),
    }
}
