//! Process-wide run settings.
//!
//! Every tunable lives in [`Settings`], built once from compiled-in defaults
//! and the CLI, then passed by reference to the validator, fetcher,
//! aggregator and renderer. Nothing here is mutated after startup.

use crate::cli::Cli;
use chrono::NaiveDate;
use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const API_BASE_URL: &str = "https://wikimedia.org/api/rest_v1/metrics/pageviews/top";
pub const PROJECT: &str = "en.wikipedia.org";
pub const TOP_ARTICLES_COUNT: usize = 20;
pub const MAX_DAYS_RANGE: i64 = 365;
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_OUTPUT: &str = "top_articles.svg";
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// First day the pageview API has data for.
pub fn api_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 7, 1).expect("2015-07-01 is a valid date")
}

/// Which traffic the ranking counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AccessMode {
    #[default]
    AllAccess,
    Desktop,
    MobileApp,
    MobileWeb,
}

impl AccessMode {
    /// Path segment used by the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::AllAccess => "all-access",
            AccessMode::Desktop => "desktop",
            AccessMode::MobileApp => "mobile-app",
            AccessMode::MobileWeb => "mobile-web",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable settings for one run.
///
/// Built from the compiled-in defaults, optionally overlaid by CLI flags,
/// and never changed afterwards.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Endpoint prefix; the project, access mode and date are appended as path segments.
    pub api_base_url: String,
    /// Wiki to rank, e.g. `en.wikipedia.org`.
    pub project: String,
    /// Which traffic the ranking counts.
    pub access_mode: AccessMode,
    /// How many articles get a panel in the chart.
    pub top_articles: usize,
    /// Largest allowed `end - start`, in days. The range is inclusive, so up
    /// to one more day than this is queried.
    pub max_days_range: i64,
    /// Earliest start date the API has data for.
    pub earliest_supported: NaiveDate,
    /// Sent as `User-Agent` on every request.
    pub user_agent: String,
    /// Per-request limit covering connect, send and body download.
    pub request_timeout: Duration,
    /// Extra attempts for a day that failed transiently. Zero disables retry.
    pub max_retries: usize,
    /// First backoff delay; doubles with each retry.
    pub retry_base_delay: Duration,
    /// Where the SVG chart is written.
    pub output_path: PathBuf,
    /// Where the JSON summary is written, if anywhere.
    pub json_output_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: API_BASE_URL.to_string(),
            project: PROJECT.to_string(),
            access_mode: AccessMode::default(),
            top_articles: TOP_ARTICLES_COUNT,
            max_days_range: MAX_DAYS_RANGE,
            earliest_supported: api_start_date(),
            user_agent: USER_AGENT.to_string(),
            request_timeout: REQUEST_TIMEOUT,
            max_retries: 0,
            retry_base_delay: RETRY_BASE_DELAY,
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            json_output_path: None,
        }
    }
}

impl Settings {
    /// Defaults overlaid with whatever the command line supplied.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            access_mode: cli.access_mode,
            top_articles: cli.top,
            max_retries: cli.retries,
            output_path: cli.output.clone(),
            json_output_path: cli.json_output.clone(),
            ..Self::default()
        }
    }
}
