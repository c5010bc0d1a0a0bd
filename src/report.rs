//! One complete reporting run over a validated range.
//!
//! The pipeline:
//! 1. **Fetching**: [`aggregate`] queries every day and builds the view table
//! 2. **Selection**: [`select`] picks the most viewed articles
//! 3. **Metrics**: [`ReportMetrics`] summarises the whole table
//! 4. **Output**: the SVG chart, plus the JSON summary when configured
//!
//! Generic over the fetcher so the whole run can be driven by a stub.

use crate::aggregate::{AggregateStats, ProgressObserver, aggregate};
use crate::api::DailyTopFetch;
use crate::config::Settings;
use crate::metrics::ReportMetrics;
use crate::models::{DateRange, TopSelection, ViewTable};
use crate::outputs::chart::{RenderOutcome, render_chart};
use crate::outputs::json::{ReportSummary, write_summary};
use crate::select::select;
use crate::utils::ensure_parent_dir;
use std::error::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Debug)]
pub struct Report {
    pub table: ViewTable,
    pub stats: AggregateStats,
    pub selection: TopSelection,
    pub metrics: ReportMetrics,
    pub chart: RenderOutcome,
}

#[instrument(level = "info", skip_all, fields(start = %range.start(), end = %range.end()))]
pub async fn run_report<F, O>(
    settings: &Settings,
    range: &DateRange,
    fetcher: &F,
    observer: &mut O,
) -> Result<Report, Box<dyn Error>>
where
    F: DailyTopFetch,
    O: ProgressObserver + ?Sized,
{
    let (table, stats) = aggregate(
        range,
        fetcher,
        &settings.project,
        settings.access_mode,
        observer,
    )
    .await;

    if table.is_empty() {
        warn!(days = stats.days, "No rankings received for any day in range");
    }

    let selection = select(&table, settings.top_articles);
    let metrics = ReportMetrics::from_table(&table);
    info!(
        selected = selection.len(),
        unique_articles = metrics.unique_articles,
        max_views = metrics.max_views,
        mean_daily_views = metrics.mean_daily_views,
        "Selected top articles"
    );
    for (rank, entry) in selection.entries().iter().enumerate() {
        debug!(rank = rank + 1, article = %entry.article, total_views = entry.total_views, "Top article");
    }

    ensure_parent_dir(&settings.output_path).await?;
    let chart = render_chart(&settings.output_path, range, &selection, &table, &metrics)?;

    if let Some(json_path) = &settings.json_output_path {
        write_summary(&ReportSummary::new(range, &metrics, &selection), json_path).await?;
    }

    Ok(Report {
        table,
        stats,
        selection,
        metrics,
        chart,
    })
}
