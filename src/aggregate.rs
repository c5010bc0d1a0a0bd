//! Day-by-day acquisition loop.
//!
//! [`aggregate`] walks the validated range in ascending order, awaiting one
//! fetch per day before starting the next, and folds every successful
//! ranking into a [`ViewTable`]. Failed and empty days are skipped without
//! placeholders.

use crate::api::DailyTopFetch;
use crate::config::AccessMode;
use crate::models::{DailyResult, DateRange, ViewTable};
use chrono::NaiveDate;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// How a single day turned out, as reported to a [`ProgressObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOutcome {
    /// Ranking received; `recorded` entries were added to the table.
    Ok { recorded: usize },
    Missing,
    TransientError,
}

/// One progress tick. Emitted once per day whatever the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayProgress {
    /// One-based position of `date` in the range.
    pub index: usize,
    pub total: usize,
    pub date: NaiveDate,
    pub outcome: DayOutcome,
}

pub trait ProgressObserver {
    fn on_day(&mut self, progress: &DayProgress);
}

/// Reports progress through the log, roughly every tenth of the range.
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_day(&mut self, progress: &DayProgress) {
        let step = (progress.total / 10).max(1);
        if progress.index % step == 0 || progress.index == progress.total {
            info!(
                done = progress.index,
                total = progress.total,
                date = %progress.date,
                "Fetching data"
            );
        }
    }
}

/// Counts of each outcome over a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AggregateStats {
    pub days: usize,
    pub ok_days: usize,
    pub missing_days: usize,
    pub failed_days: usize,
}

/// Fetch every day of `range` sequentially and build the view table.
///
/// Never returns early: an all-failed range yields an empty table.
#[instrument(level = "info", skip_all, fields(start = %range.start(), end = %range.end(), %project, %access))]
pub async fn aggregate<F, O>(
    range: &DateRange,
    fetcher: &F,
    project: &str,
    access: AccessMode,
    observer: &mut O,
) -> (ViewTable, AggregateStats)
where
    F: DailyTopFetch,
    O: ProgressObserver + ?Sized,
{
    let t0 = Instant::now();
    let total = range.num_days();
    let mut table = ViewTable::new();
    let mut stats = AggregateStats::default();

    for (i, date) in range.days().enumerate() {
        let outcome = match fetcher.fetch(date, project, access).await {
            DailyResult::Ok(articles) => {
                let recorded = table.record_day(date, &articles);
                stats.ok_days += 1;
                debug!(%date, received = articles.len(), recorded, "Recorded daily ranking");
                DayOutcome::Ok { recorded }
            }
            DailyResult::Missing => {
                stats.missing_days += 1;
                debug!(%date, "No data for date");
                DayOutcome::Missing
            }
            DailyResult::TransientError(reason) => {
                stats.failed_days += 1;
                warn!(%date, error = %reason, "Skipping date after fetch failure");
                DayOutcome::TransientError
            }
        };
        stats.days += 1;

        observer.on_day(&DayProgress {
            index: i + 1,
            total,
            date,
            outcome,
        });
    }

    info!(
        days = stats.days,
        ok = stats.ok_days,
        missing = stats.missing_days,
        failed = stats.failed_days,
        articles = table.article_count(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Finished fetching range"
    );
    (table, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleViews;
    use std::sync::Mutex;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Replays canned outcomes in order and remembers which dates were asked for.
    struct StubFetcher {
        outcomes: Mutex<Vec<DailyResult>>,
        requested: Mutex<Vec<NaiveDate>>,
    }

    impl StubFetcher {
        fn new(mut outcomes: Vec<DailyResult>) -> Self {
            outcomes.reverse();
            Self {
                outcomes: Mutex::new(outcomes),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<NaiveDate> {
            self.requested.lock().unwrap().clone()
        }
    }

    impl DailyTopFetch for StubFetcher {
        async fn fetch(&self, date: NaiveDate, _project: &str, _access: AccessMode) -> DailyResult {
            self.requested.lock().unwrap().push(date);
            self.outcomes
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(DailyResult::Missing)
        }
    }

    #[derive(Default)]
    struct Recorder(Vec<DayProgress>);

    impl ProgressObserver for Recorder {
        fn on_day(&mut self, progress: &DayProgress) {
            self.0.push(*progress);
        }
    }

    async fn run(
        range: DateRange,
        fetcher: &StubFetcher,
    ) -> (ViewTable, AggregateStats, Vec<DayProgress>) {
        let mut recorder = Recorder::default();
        let (table, stats) = aggregate(
            &range,
            fetcher,
            "en.wikipedia.org",
            AccessMode::AllAccess,
            &mut recorder,
        )
        .await;
        (table, stats, recorder.0)
    }

    #[tokio::test]
    async fn test_mixed_outcomes() {
        let range = DateRange::new_unchecked(day(2024, 1, 1), day(2024, 1, 4));
        let fetcher = StubFetcher::new(vec![
            DailyResult::Ok(vec![ArticleViews::new("A", 10), ArticleViews::new("B", 5)]),
            DailyResult::Missing,
            DailyResult::Ok(vec![ArticleViews::new("A", 3)]),
            DailyResult::TransientError("timeout".into()),
        ]);

        let (table, stats, events) = run(range, &fetcher).await;

        let a = table.get("A").unwrap();
        assert_eq!(a.points, vec![(day(2024, 1, 1), 10), (day(2024, 1, 3), 3)]);
        let b = table.get("B").unwrap();
        assert_eq!(b.points, vec![(day(2024, 1, 1), 5)]);
        assert_eq!(table.article_count(), 2);

        assert_eq!(stats.days, 4);
        assert_eq!(stats.ok_days, 2);
        assert_eq!(stats.missing_days, 1);
        assert_eq!(stats.failed_days, 1);

        assert_eq!(events.len(), 4);
        assert_eq!(events[0].outcome, DayOutcome::Ok { recorded: 2 });
        assert_eq!(events[1].outcome, DayOutcome::Missing);
        assert_eq!(events[3].outcome, DayOutcome::TransientError);
        assert!(events.iter().all(|e| e.total == 4));
        assert_eq!(
            events.iter().map(|e| e.index).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[tokio::test]
    async fn test_queries_every_day_inclusive_ascending() {
        let range = DateRange::new_unchecked(day(2024, 1, 1), day(2024, 1, 3));
        let fetcher = StubFetcher::new(vec![]);

        let (_, stats, events) = run(range, &fetcher).await;

        let expected = vec![day(2024, 1, 1), day(2024, 1, 2), day(2024, 1, 3)];
        assert_eq!(fetcher.requested(), expected);
        assert_eq!(events.iter().map(|e| e.date).collect::<Vec<_>>(), expected);
        assert_eq!(stats.days, range.num_days());
    }

    #[tokio::test]
    async fn test_all_failed_range_yields_empty_table() {
        let range = DateRange::new_unchecked(day(2024, 5, 1), day(2024, 5, 3));
        let fetcher = StubFetcher::new(vec![
            DailyResult::TransientError("connection refused".into()),
            DailyResult::Missing,
            DailyResult::TransientError("HTTP status 503".into()),
        ]);

        let (table, stats, events) = run(range, &fetcher).await;

        assert!(table.is_empty());
        assert!(table.daily_totals().is_empty());
        assert_eq!(stats.ok_days, 0);
        assert_eq!(events.len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_article_in_one_day_recorded_once() {
        let range = DateRange::new_unchecked(day(2024, 1, 1), day(2024, 1, 2));
        let fetcher = StubFetcher::new(vec![
            DailyResult::Ok(vec![ArticleViews::new("A", 10), ArticleViews::new("A", 50)]),
            DailyResult::Ok(vec![ArticleViews::new("A", 1)]),
        ]);

        let (table, _, events) = run(range, &fetcher).await;

        assert_eq!(
            table.get("A").unwrap().points,
            vec![(day(2024, 1, 1), 10), (day(2024, 1, 2), 1)]
        );
        assert_eq!(events[0].outcome, DayOutcome::Ok { recorded: 1 });
    }

    #[test]
    fn test_log_progress_accepts_events() {
        let mut observer = LogProgress;
        observer.on_day(&DayProgress {
            index: 1,
            total: 1,
            date: day(2024, 1, 1),
            outcome: DayOutcome::Missing,
        });
    }
}
