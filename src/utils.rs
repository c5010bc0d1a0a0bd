//! Utility functions for number formatting, log truncation, and output paths.
//!
//! This module provides helper functions used throughout the application:
//! - Compact human-readable view counts for chart titles and axes
//! - String truncation for logging raw API payloads
//! - File system preparation for output files

use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};

/// Format a number with a magnitude suffix.
///
/// Values are scaled by 1000 until they drop below 1000 or the largest unit
/// (`T`) is reached, then printed with two decimals.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(human_format(999.0), "999.00");
/// assert_eq!(human_format(1_234_567.0), "1.23M");
/// ```
pub fn human_format(num: f64) -> String {
    const UNITS: [&str; 5] = ["", "K", "M", "B", "T"];

    let mut num = num;
    let mut magnitude = 0;
    while num.abs() >= 1000.0 && magnitude < UNITS.len() - 1 {
        magnitude += 1;
        num /= 1000.0;
    }
    format!("{:.2}{}", num, UNITS[magnitude])
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at the last character boundary at or below `max`
/// bytes, with an ellipsis and byte count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Make sure the directory an output file will be written into exists.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn ensure_parent_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).await?;
            debug!(parent = %parent.display(), "Output directory ready");
        }
        _ => {}
    }
    Ok(())
}
