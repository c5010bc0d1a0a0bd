//! Headline numbers shown above the chart.

use crate::models::ViewTable;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ReportMetrics {
    /// Largest views any single article got on any single day.
    pub max_views: u64,
    /// Mean over days with data of the total views across all ranked articles.
    pub mean_daily_views: f64,
    /// Distinct articles seen anywhere in the range.
    pub unique_articles: usize,
}

impl ReportMetrics {
    /// Computed over the whole table, not just the charted selection.
    pub fn from_table(table: &ViewTable) -> Self {
        let max_views = table.iter().map(|s| s.max_views()).max().unwrap_or(0);

        let totals = table.daily_totals();
        let mean_daily_views = if totals.is_empty() {
            0.0
        } else {
            totals.values().map(|v| *v as f64).sum::<f64>() / totals.len() as f64
        };

        Self {
            max_views,
            mean_daily_views,
            unique_articles: table.article_count(),
        }
    }
}
