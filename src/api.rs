//! Pageview API access with optional retry.
//!
//! This module fetches one day's "top articles" ranking and classifies the
//! outcome into a [`DailyResult`]. It uses a trait-based design so the
//! aggregator can run against the real API or a stub:
//! - [`DailyTopFetch`]: Core trait fetching one day
//! - [`WikimediaFetcher`]: Talks to the Wikimedia REST API over HTTP
//! - [`RetryFetch`]: Decorator that retries transient failures of any fetcher
//!
//! # Retry Strategy
//!
//! Retry is off unless configured. When enabled:
//! - Only [`DailyResult::TransientError`] outcomes are retried
//! - Exponential backoff starting at the configured base delay
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to each delay

use crate::config::{AccessMode, Settings};
use crate::models::{DailyResult, TopArticlesResponse};
use crate::utils::truncate_for_log;
use chrono::NaiveDate;
use rand::{rng, Rng};
use reqwest::StatusCode;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};
use url::Url;

/// Fetches the ranking for a single calendar day.
///
/// Implementations never fail outright: every outcome, including network
/// trouble, is folded into a [`DailyResult`].
pub trait DailyTopFetch {
    async fn fetch(&self, date: NaiveDate, project: &str, access: AccessMode) -> DailyResult;
}

/// Build the endpoint for one day: `{base}/{project}/{access}/{YYYY}/{MM}/{DD}`.
pub fn daily_url(
    base: &str,
    project: &str,
    access: AccessMode,
    date: NaiveDate,
) -> Result<Url, url::ParseError> {
    let year = date.format("%Y").to_string();
    let month = date.format("%m").to_string();
    let day = date.format("%d").to_string();

    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend([project, access.as_str(), &year, &month, &day]);
    Ok(url)
}

/// Classify a completed HTTP exchange.
///
/// 404 means the API has nothing for that day. Any other non-success status
/// and any body that does not carry a ranking are transient errors.
pub fn classify_response(status: StatusCode, body: &str) -> DailyResult {
    if status == StatusCode::NOT_FOUND {
        return DailyResult::Missing;
    }
    if !status.is_success() {
        return DailyResult::TransientError(format!("HTTP status {status}"));
    }

    match serde_json::from_str::<TopArticlesResponse>(body) {
        Ok(response) => match response.items.into_iter().next() {
            Some(item) => {
                debug!(
                    project = item.project.as_deref().unwrap_or("-"),
                    access = item.access.as_deref().unwrap_or("-"),
                    count = item.articles.len(),
                    "Parsed daily ranking"
                );
                DailyResult::Ok(item.articles)
            }
            None => DailyResult::TransientError("response contained no items".to_string()),
        },
        Err(e) => DailyResult::TransientError(format!(
            "unparseable payload: {e} (body: {})",
            truncate_for_log(body, 200)
        )),
    }
}

fn describe_request_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("timeout: {e}")
    } else if e.is_connect() {
        format!("connection error: {e}")
    } else {
        format!("request failed: {e}")
    }
}

/// HTTP fetcher for the Wikimedia pageview API.
///
/// A fresh client, with idle pooling disabled, is built for every request so
/// no connection or state carries over between days.
#[derive(Debug, Clone)]
pub struct WikimediaFetcher {
    base_url: String,
    user_agent: String,
    timeout: StdDuration,
}

impl WikimediaFetcher {
    pub fn new(settings: &Settings) -> Self {
        Self {
            base_url: settings.api_base_url.clone(),
            user_agent: settings.user_agent.clone(),
            timeout: settings.request_timeout,
        }
    }

    fn client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .pool_max_idle_per_host(0)
            .build()
    }
}

impl DailyTopFetch for WikimediaFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, date: NaiveDate, project: &str, access: AccessMode) -> DailyResult {
        let url = match daily_url(&self.base_url, project, access, date) {
            Ok(url) => url,
            Err(e) => return DailyResult::TransientError(format!("invalid endpoint: {e}")),
        };
        let client = match self.client() {
            Ok(client) => client,
            Err(e) => return DailyResult::TransientError(format!("client setup failed: {e}")),
        };

        let t0 = Instant::now();
        let response = match client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => return DailyResult::TransientError(describe_request_error(&e)),
        };
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return DailyResult::TransientError(describe_request_error(&e)),
        };

        debug!(
            %url,
            %status,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched daily ranking"
        );
        classify_response(status, &body)
    }
}

/// Wrapper that retries transient failures of any [`DailyTopFetch`].
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
/// With `max_retries == 0` the inner fetcher is called exactly once.
pub struct RetryFetch<T> {
    /// The underlying fetcher to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: DailyTopFetch,
{
    /// Wrap `inner`, allowing up to `max_retries` extra attempts per day.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let fetcher = RetryFetch::new(WikimediaFetcher::new(&settings), 3, Duration::from_secs(1));
    /// ```
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    fn backoff(&self, attempt: usize) -> StdDuration {
        let shift = (attempt.saturating_sub(1)).min(16) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=250);
        delay + StdDuration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> DailyTopFetch for RetryFetch<T>
where
    T: DailyTopFetch,
{
    #[instrument(level = "info", skip_all, fields(%date))]
    async fn fetch(&self, date: NaiveDate, project: &str, access: AccessMode) -> DailyResult {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            let result = self.inner.fetch(date, project, access).await;
            let Some(reason) = result.error_reason().map(str::to_string) else {
                return result;
            };

            attempt += 1;
            let attempt_dt = attempt_t0.elapsed();
            let total_dt = total_t0.elapsed();

            if attempt > self.max_retries {
                // with retry disabled the aggregator's warning is enough
                if self.max_retries > 0 {
                    error!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        error = %reason,
                        "fetch exhausted retries"
                    );
                }
                return result;
            }

            let delay = self.backoff(attempt);
            warn!(
                attempt,
                max = self.max_retries,
                elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                elapsed_ms_total = total_dt.as_millis() as u64,
                ?delay,
                error = %reason,
                "fetch attempt failed; backing off"
            );
            sleep(delay).await;
        }
    }
}
