//! Utility functions for formatting and identifier generation.
//!
//! This module provides general-purpose helpers used by the catalog, the
//! timeline and the CLI: human-readable sizes and durations, and the
//! generation-time identifiers assigned to media files and clips.

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};

/// Formats a byte count with 1024-based units ("0 Bytes", "1.5 KB", "2 MB").
///
/// Values carry at most two decimals with trailing zeros dropped. Sizes past
/// the gigabyte range stay expressed in GB.
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut exponent = 0;
    while value >= 1024.0 && exponent < UNITS.len() - 1 {
        value /= 1024.0;
        exponent += 1;
    }

    let rendered = format!("{value:.2}");
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", rendered, UNITS[exponent])
}

/// Formats seconds as M:SS (e.g., 125.7 -> "2:05"). Invalid input renders as "0:00".
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Generates an identifier of the form `<prefix>_<unix millis>_<9 random chars>`.
pub fn generate_id(prefix: &str) -> String {
    let suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{prefix}_{}_{suffix}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1024 * 1024 * 2), "2 MB");
        assert_eq!(format_file_size(1024 * 1024 * 1024), "1 GB");
        assert_eq!(format_file_size(1024u64.pow(4)), "1024 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0:00");
        assert_eq!(format_duration(5.9), "0:05");
        assert_eq!(format_duration(125.7), "2:05");
        assert_eq!(format_duration(3600.0), "60:00");
        assert_eq!(format_duration(-1.0), "0:00");
        assert_eq!(format_duration(f64::NAN), "0:00");
    }

    #[test]
    fn test_generate_id_is_unique_and_prefixed() {
        let ids: HashSet<String> = (0..200).map(|_| generate_id("clip")).collect();
        assert_eq!(ids.len(), 200);
        assert!(ids.iter().all(|id| id.starts_with("clip_")));
    }
}
