//! # wiki_top_articles
//!
//! Charts the most viewed English Wikipedia articles over a date range,
//! using the daily "top articles" rankings from the Wikimedia pageview API.
//!
//! ## Usage
//!
//! ```sh
//! wiki_top_articles 20240101 20240131
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Validation**: Parse and check the two boundary dates
//! 2. **Fetching**: Request each day's ranking, one day at a time
//! 3. **Aggregation**: Fold rankings into a per-article, per-day table
//! 4. **Selection**: Keep the articles with the most total views
//! 5. **Output**: Write an SVG chart and, optionally, a JSON summary
//!
//! Days that are missing or fail are skipped with a warning; only invalid
//! dates or a failure to write output end the run with a non-zero status.

use chrono::Local;
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod api;
mod cli;
mod config;
mod metrics;
mod models;
mod outputs;
mod report;
mod select;
mod utils;
mod validate;

use aggregate::LogProgress;
use api::{RetryFetch, WikimediaFetcher};
use cli::Cli;
use config::Settings;
use report::run_report;
use validate::validate;

#[tokio::main]
#[instrument]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("wiki_top_articles starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");
    let settings = Settings::from_cli(&args);

    // ---- Validate range ----
    let today = Local::now().date_naive();
    let range = match validate(
        &args.start,
        &args.end,
        today,
        settings.earliest_supported,
        settings.max_days_range,
    ) {
        Ok(range) => range,
        Err(e) => {
            error!(start = %args.start, end = %args.end, error = %e, "Invalid date range");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        start = %range.start(),
        end = %range.end(),
        days = range.num_days(),
        access = %settings.access_mode,
        "Validated date range"
    );

    // ---- Fetch, select, render ----
    let fetcher = RetryFetch::new(
        WikimediaFetcher::new(&settings),
        settings.max_retries,
        settings.retry_base_delay,
    );

    let report = match run_report(&settings, &range, &fetcher, &mut LogProgress).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Report failed");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if report.selection.is_empty() {
        println!("No data found for the specified date range");
    }
    println!("Visualization saved to {}", report.chart.path.display());

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        days_ok = report.stats.ok_days,
        days_missing = report.stats.missing_days,
        days_failed = report.stats.failed_days,
        articles = report.table.article_count(),
        max_views = report.metrics.max_views,
        "Execution complete"
    );

    ExitCode::SUCCESS
}
