//! Utility modules.

/// Keeps response bodies from flooding the log.
pub mod log_sanitizer;
