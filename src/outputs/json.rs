//! JSON summary of a run.
//!
//! The summary mirrors what the chart shows so other tools can consume the
//! selection without parsing SVG:
//!
//! ```json
//! {
//!   "start": "2024-01-01",
//!   "end": "2024-01-31",
//!   "days_queried": 31,
//!   "metrics": { "max_views": 5000000, "mean_daily_views": 1.2e7, "unique_articles": 812 },
//!   "top": [ { "article": "Main_Page", "total_views": 150000000 } ]
//! }
//! ```

use crate::metrics::ReportMetrics;
use crate::models::{DateRange, TopSelection};
use crate::utils::ensure_parent_dir;
use chrono::NaiveDate;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

#[derive(Debug, Serialize)]
pub struct ReportSummary<'a> {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days_queried: usize,
    pub metrics: &'a ReportMetrics,
    pub top: &'a TopSelection,
}

impl<'a> ReportSummary<'a> {
    pub fn new(range: &DateRange, metrics: &'a ReportMetrics, top: &'a TopSelection) -> Self {
        Self {
            start: range.start(),
            end: range.end(),
            days_queried: range.num_days(),
            metrics,
            top,
        }
    }
}

/// Write a [`ReportSummary`] as pretty-printed JSON, creating parent
/// directories as needed.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_summary(summary: &ReportSummary<'_>, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(summary)?;

    ensure_parent_dir(path).await?;
    fs::write(path, json).await?;
    info!(entries = summary.top.len(), "Wrote JSON summary");

    Ok(())
}
