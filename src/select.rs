//! Picks the articles worth charting.

use crate::models::{TopEntry, TopSelection, ViewTable};
use itertools::Itertools;
use std::cmp::Reverse;

/// The `n` articles with the most total views, most viewed first.
///
/// Ties keep the order in which the articles first appeared in the table.
/// Fewer than `n` articles in the table means fewer than `n` entries out.
pub fn select(table: &ViewTable, n: usize) -> TopSelection {
    let entries = table
        .iter()
        .map(|series| TopEntry {
            article: series.article.clone(),
            total_views: series.total_views(),
        })
        // sorted_by_key is a stable sort
        .sorted_by_key(|entry| Reverse(entry.total_views))
        .take(n)
        .collect();

    TopSelection::from_entries(entries)
}
