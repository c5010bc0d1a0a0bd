//! Output generation for the rendered chart and the optional JSON summary.
//!
//! # Submodules
//!
//! - [`chart`]: Draws the selected articles as an SVG of small multiples
//! - [`json`]: Writes the period, metrics and selection for other tools
//!
//! # Output Structure
//!
//! ```text
//! ./
//! ├── top_articles.svg   # always written
//! └── <json-output>      # only with --json-output
//! ```

pub mod chart;
pub mod json;
