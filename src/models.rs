//! Data models for pageview rankings and their aggregated representations.
//!
//! This module defines the core data structures used throughout the application:
//! - [`TopArticlesResponse`]: Raw JSON payload returned by the pageview API
//! - [`ArticleViews`]: One ranked article and its view count for a single day
//! - [`DailyResult`]: Classified outcome of fetching one day
//! - [`DateRange`]: A validated, inclusive range of calendar days
//! - [`ViewTable`]: Per-article, per-day view counts built across the range
//! - [`TopSelection`]: The ranked articles chosen for display

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Top-level body of a `metrics/pageviews/top` response.
///
/// The API wraps a single day's ranking in a one-element `items` array.
#[derive(Debug, Deserialize)]
pub struct TopArticlesResponse {
    pub items: Vec<TopArticlesItem>,
}

/// One ranking entry inside [`TopArticlesResponse::items`].
#[derive(Debug, Deserialize)]
pub struct TopArticlesItem {
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub access: Option<String>,
    pub articles: Vec<ArticleViews>,
}

/// A single article and the number of views it received on one day.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleViews {
    /// Article title as reported by the API (underscored, e.g. `Main_Page`).
    pub article: String,
    /// Views for the day.
    pub views: u64,
    /// Rank within the day, when the API includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

impl ArticleViews {
    #[cfg(test)]
    pub fn new(article: impl Into<String>, views: u64) -> Self {
        Self {
            article: article.into(),
            views,
            rank: None,
        }
    }
}

/// Outcome of fetching the ranking for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DailyResult {
    /// The day's ranking, in API order.
    Ok(Vec<ArticleViews>),
    /// The API has no data for that day.
    Missing,
    /// The request failed or the payload could not be parsed.
    TransientError(String),
}

impl DailyResult {
    #[cfg(test)]
    pub fn is_transient(&self) -> bool {
        matches!(self, DailyResult::TransientError(_))
    }

    pub fn error_reason(&self) -> Option<&str> {
        match self {
            DailyResult::TransientError(reason) => Some(reason),
            _ => None,
        }
    }
}

/// A validated range of calendar days, inclusive of both `start` and `end`.
///
/// Only [`crate::validate::validate`] constructs one, so holding a
/// `DateRange` means the boundaries already passed every policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub(crate) fn new_unchecked(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days queried, counting both boundaries.
    pub fn num_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    /// Every day from `start` through `end`, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }

    /// Zero-based position of `day` within the range.
    pub fn offset_of(&self, day: NaiveDate) -> i64 {
        (day - self.start).num_days()
    }

    /// Day at a zero-based offset from `start`, if it lies inside the range.
    pub fn day_at(&self, offset: i64) -> Option<NaiveDate> {
        if offset < 0 {
            return None;
        }
        self.start
            .checked_add_days(Days::new(offset as u64))
            .filter(|day| *day <= self.end)
    }
}

/// Daily view series for one article, ascending by date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSeries {
    pub article: String,
    pub points: Vec<(NaiveDate, u64)>,
}

impl ArticleSeries {
    pub fn total_views(&self) -> u64 {
        self.points.iter().map(|(_, views)| views).sum()
    }

    pub fn max_views(&self) -> u64 {
        self.points.iter().map(|(_, views)| *views).max().unwrap_or(0)
    }
}

/// Per-article, per-day view counts accumulated over a run.
///
/// Articles keep the order in which they were first seen. Days that produced
/// no data have no entries at all; nothing is interpolated.
#[derive(Debug, Default, Clone)]
pub struct ViewTable {
    series: Vec<ArticleSeries>,
    index: HashMap<String, usize>,
    daily_totals: BTreeMap<NaiveDate, u64>,
}

impl ViewTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `views` for `article` on `date`.
    ///
    /// Returns `false` and leaves the table untouched if that pair was already
    /// recorded.
    pub fn record(&mut self, article: &str, date: NaiveDate, views: u64) -> bool {
        let idx = match self.index.get(article) {
            Some(&idx) => idx,
            None => {
                self.series.push(ArticleSeries {
                    article: article.to_string(),
                    points: Vec::new(),
                });
                let idx = self.series.len() - 1;
                self.index.insert(article.to_string(), idx);
                idx
            }
        };

        let points = &mut self.series[idx].points;
        match points.binary_search_by_key(&date, |(day, _)| *day) {
            Ok(_) => false,
            Err(pos) => {
                points.insert(pos, (date, views));
                *self.daily_totals.entry(date).or_insert(0) += views;
                true
            }
        }
    }

    /// Fold one day's ranking into the table.
    pub fn record_day(&mut self, date: NaiveDate, articles: &[ArticleViews]) -> usize {
        articles
            .iter()
            .filter(|entry| self.record(&entry.article, date, entry.views))
            .count()
    }

    pub fn get(&self, article: &str) -> Option<&ArticleSeries> {
        self.index.get(article).map(|&idx| &self.series[idx])
    }

    /// All series, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &ArticleSeries> {
        self.series.iter()
    }

    /// Sum of all recorded views per day, for days that produced data.
    pub fn daily_totals(&self) -> &BTreeMap<NaiveDate, u64> {
        &self.daily_totals
    }

    pub fn article_count(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// One selected article and its total views across the range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopEntry {
    pub article: String,
    pub total_views: u64,
}

/// Articles chosen for display, most viewed first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TopSelection {
    entries: Vec<TopEntry>,
}

impl TopSelection {
    pub(crate) fn from_entries(entries: Vec<TopEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[TopEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn articles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.article.as_str())
    }
}
