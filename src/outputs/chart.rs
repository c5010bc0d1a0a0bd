//! SVG chart of the selected articles.
//!
//! One small-multiple panel per article, each showing daily views across the
//! whole validated range, under a two-line title with the period and the
//! headline metrics.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Top Wikipedia Articles (start to end)        │
//! │ Mean Daily Views | Max Article Views | ...   │
//! ├─────────┬─────────┬─────────┬─────────┬──────┤
//! │ panel 1 │ panel 2 │ panel 3 │ panel 4 │ ...  │  at most 5 columns
//! ├─────────┼─────────┼─────────┼─────────┼──────┤
//! │ panel 6 │   ...   │         │         │      │
//! └─────────┴─────────┴─────────┴─────────┴──────┘
//! ```
//!
//! Panels are ordered by each article's single-day peak, highest first.

use crate::metrics::ReportMetrics;
use crate::models::{ArticleSeries, DateRange, TopSelection, ViewTable};
use crate::utils::human_format;
use itertools::Itertools;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::cmp::Reverse;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

const MAX_COLUMNS: usize = 5;
const PANEL_WIDTH: u32 = 360;
const PANEL_HEIGHT: u32 = 270;
const TITLE_HEIGHT: u32 = 70;
const FONT: &str = "sans-serif";

/// What [`render_chart`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    pub path: PathBuf,
    pub panels: usize,
}

/// X-axis labelling chosen from the length of the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPlan {
    pub format: &'static str,
    pub labels: usize,
}

pub fn tick_plan(num_days: usize) -> TickPlan {
    if num_days <= 7 {
        TickPlan {
            format: "%m/%d",
            labels: num_days,
        }
    } else if num_days <= 30 {
        TickPlan {
            format: "%m/%d",
            labels: num_days / 5 + 1,
        }
    } else if num_days <= 90 {
        TickPlan {
            format: "%b %d",
            labels: num_days / 14 + 1,
        }
    } else {
        let months = num_days / 30;
        let interval = (months / 4).max(1);
        TickPlan {
            format: "%b %Y",
            labels: months / interval + 1,
        }
    }
}

/// `(rows, columns)` for `panels` small multiples.
pub fn grid_shape(panels: usize) -> (usize, usize) {
    if panels == 0 {
        return (0, 0);
    }
    let cols = panels.min(MAX_COLUMNS);
    (panels.div_ceil(cols), cols)
}

pub fn chart_title(range: &DateRange, metrics: &ReportMetrics) -> (String, String) {
    (
        format!(
            "Top Wikipedia Articles ({} to {})",
            range.start().format("%Y-%m-%d"),
            range.end().format("%Y-%m-%d")
        ),
        format!(
            "Mean Daily Views: {} | Max Article Views: {} | Unique Articles: {}",
            human_format(metrics.mean_daily_views),
            human_format(metrics.max_views as f64),
            metrics.unique_articles
        ),
    )
}

/// Render the selection to an SVG file at `path`.
///
/// An empty selection still produces a file carrying the title and a
/// "no data" notice.
#[instrument(level = "info", skip_all, fields(path = %path.display(), selected = selection.len()))]
pub fn render_chart(
    path: &Path,
    range: &DateRange,
    selection: &TopSelection,
    table: &ViewTable,
    metrics: &ReportMetrics,
) -> Result<RenderOutcome, Box<dyn Error>> {
    let panels: Vec<&ArticleSeries> = selection
        .articles()
        .filter_map(|article| table.get(article))
        .sorted_by_key(|series| Reverse(series.max_views()))
        .collect();

    let (rows, cols) = grid_shape(panels.len());
    let width = PANEL_WIDTH * cols.max(2) as u32;
    let height = TITLE_HEIGHT + PANEL_HEIGHT * rows.max(1) as u32;

    let root = SVGBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let (headline, summary) = chart_title(range, metrics);
    let (title_area, body) = root.split_vertically(TITLE_HEIGHT);
    let below_headline = title_area.titled(&headline, (FONT, 22))?;
    below_headline.titled(&summary, (FONT, 15))?;

    if panels.is_empty() {
        warn!("Nothing to chart; writing empty report");
        body.titled("No data found for the specified date range", (FONT, 18))?;
    } else {
        let ticks = tick_plan(range.num_days());
        let areas = body.split_evenly((rows, cols));
        for (idx, (area, series)) in areas.iter().zip(&panels).enumerate() {
            draw_panel(area, range, series, ticks, idx)?;
        }
    }

    root.present()?;
    info!(panels = panels.len(), "Wrote chart");

    Ok(RenderOutcome {
        path: path.to_path_buf(),
        panels: panels.len(),
    })
}

fn draw_panel(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    range: &DateRange,
    series: &ArticleSeries,
    ticks: TickPlan,
    idx: usize,
) -> Result<(), Box<dyn Error>> {
    let x_max = range.offset_of(range.end());
    // y starts at zero with 5% headroom
    let y_max = ((series.max_views() as f64) * 1.05).ceil().max(1.0) as u64;

    let caption = series.article.replace('_', " ");
    let mut chart = ChartBuilder::on(area)
        .caption(caption, (FONT, 14))
        .margin(8)
        .x_label_area_size(34)
        .y_label_area_size(56)
        .build_cartesian_2d(0i64..x_max, 0u64..y_max)?;

    let x_fmt = |x: &i64| {
        range
            .day_at(*x)
            .map(|day| day.format(ticks.format).to_string())
            .unwrap_or_default()
    };
    let y_fmt = |y: &u64| human_format(*y as f64);

    chart
        .configure_mesh()
        .x_labels(ticks.labels)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .y_desc("Views")
        .label_style((FONT, 10))
        .draw()?;

    let color = Palette99::pick(idx);
    let points: Vec<(i64, u64)> = series
        .points
        .iter()
        .map(|(day, views)| (range.offset_of(*day), *views))
        .collect();

    // markers matter for articles with a single data point
    chart.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?;
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::select;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_tick_plan_buckets() {
        assert_eq!(tick_plan(5), TickPlan { format: "%m/%d", labels: 5 });
        assert_eq!(tick_plan(30), TickPlan { format: "%m/%d", labels: 7 });
        assert_eq!(tick_plan(60).format, "%b %d");
        assert_eq!(tick_plan(366), TickPlan { format: "%b %Y", labels: 5 });
    }

    #[test]
    fn test_grid_shape() {
        assert_eq!(grid_shape(0), (0, 0));
        assert_eq!(grid_shape(3), (1, 3));
        assert_eq!(grid_shape(5), (1, 5));
        assert_eq!(grid_shape(6), (2, 5));
        assert_eq!(grid_shape(20), (4, 5));
    }

    #[test]
    fn test_chart_title() {
        let range = DateRange::new_unchecked(day(2024, 1, 1), day(2024, 1, 31));
        let metrics = ReportMetrics {
            max_views: 4_560_000,
            mean_daily_views: 12_346.0,
            unique_articles: 321,
        };
        let (headline, summary) = chart_title(&range, &metrics);
        assert_eq!(headline, "Top Wikipedia Articles (2024-01-01 to 2024-01-31)");
        assert_eq!(
            summary,
            "Mean Daily Views: 12.35K | Max Article Views: 4.56M | Unique Articles: 321"
        );
    }

    #[test]
    fn test_render_chart_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("top.svg");
        let range = DateRange::new_unchecked(day(2024, 1, 1), day(2024, 1, 3));

        let mut table = ViewTable::new();
        table.record("Main_Page", day(2024, 1, 1), 500);
        table.record("Main_Page", day(2024, 1, 3), 700);
        table.record("Rust_(programming_language)", day(2024, 1, 2), 90);
        let selection = select(&table, 20);
        let metrics = ReportMetrics::from_table(&table);

        let outcome = render_chart(&path, &range, &selection, &table, &metrics).unwrap();
        assert_eq!(outcome.panels, 2);

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Main Page"));
        assert!(svg.contains("Top Wikipedia Articles (2024-01-01 to 2024-01-03)"));
    }

    #[test]
    fn test_render_chart_empty_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.svg");
        let range = DateRange::new_unchecked(day(2024, 1, 1), day(2024, 1, 3));
        let table = ViewTable::new();

        let outcome = render_chart(
            &path,
            &range,
            &TopSelection::default(),
            &table,
            &ReportMetrics::default(),
        )
        .unwrap();
        assert_eq!(outcome.panels, 0);

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("No data found"));
    }
}
