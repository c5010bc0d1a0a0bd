//! Command-line interface definitions for wiki_top_articles.
//!
//! Two positional dates select the range; everything else has a default
//! matching the compiled-in [`crate::config::Settings`].

use crate::config::{AccessMode, DEFAULT_OUTPUT, TOP_ARTICLES_COUNT};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for wiki_top_articles.
///
/// # Examples
///
/// ```sh
/// # Chart January 2024
/// wiki_top_articles 20240101 20240131
///
/// # Desktop traffic only, top 10, with a JSON summary
/// wiki_top_articles 20240101 20240131 --access-mode desktop --top 10 --json-output top.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Start date in YYYYMMDD format
    pub start: String,

    /// End date in YYYYMMDD format (inclusive)
    pub end: String,

    /// Traffic to count
    #[arg(short, long, value_enum, default_value_t = AccessMode::AllAccess)]
    pub access_mode: AccessMode,

    /// Number of articles to chart
    #[arg(short, long, default_value_t = TOP_ARTICLES_COUNT)]
    pub top: usize,

    /// Path of the SVG chart to write
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Optional path for a JSON summary of the selection
    #[arg(short, long)]
    pub json_output: Option<PathBuf>,

    /// Extra attempts for days that fail transiently (0 disables retry)
    #[arg(long, default_value_t = 0)]
    pub retries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(&["wiki_top_articles", "20240101", "20240131"]);

        assert_eq!(cli.start, "20240101");
        assert_eq!(cli.end, "20240131");
        assert_eq!(cli.access_mode, AccessMode::AllAccess);
        assert_eq!(cli.top, 20);
        assert_eq!(cli.output, PathBuf::from("top_articles.svg"));
        assert!(cli.json_output.is_none());
        assert_eq!(cli.retries, 0);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(&[
            "wiki_top_articles",
            "20240101",
            "20240131",
            "-a",
            "mobile-web",
            "-t",
            "7",
            "-o",
            "/tmp/chart.svg",
            "-j",
            "/tmp/top.json",
        ]);

        assert_eq!(cli.access_mode, AccessMode::MobileWeb);
        assert_eq!(cli.top, 7);
        assert_eq!(cli.output, PathBuf::from("/tmp/chart.svg"));
        assert_eq!(cli.json_output, Some(PathBuf::from("/tmp/top.json")));
    }

    #[test]
    fn test_cli_requires_both_dates() {
        assert!(Cli::try_parse_from(&["wiki_top_articles", "20240101"]).is_err());
    }
}
