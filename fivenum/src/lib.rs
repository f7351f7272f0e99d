//! # Fivenum - Grouped Statistical Summaries for Rust
//!
//! Fivenum computes five-number summaries (quartiles, IQR, Tukey fences) for
//! every group in a dataset, flags the records that fall outside their
//! group's fences, and sorts measurements into labelled percentile bins. It
//! leverages DataFusion for data access, so the same summarizer runs over
//! CSV exports, in-memory tables, or anything else a `SessionContext` can
//! serve.
//!
//! ## Overview
//!
//! Box-plot statistics are the standard first look at grouped measurements:
//! per-season attendance, per-city pollution readings, per-segment response
//! times. Fivenum scans the grouping and value columns once, coerces messy
//! raw fields ("52,389", "NA") under explicit policies, and produces one
//! summary per group plus record-level outlier flags that line up with the
//! scanned rows.
//!
//! ## Quick Start
//!
//! ```rust
//! use datafusion::prelude::*;
//! use fivenum::prelude::*;
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! // Register the dataset (CSV here, but any DataFusion table works)
//! let ctx = SessionContext::new();
//! CsvSource::new("data/attendance.csv")
//!     .register(&ctx, "data")
//!     .await?;
//!
//! // Summarize attendance per season and venue
//! let summarizer = GroupSummarizer::new("attendance").with_grouping(GroupingConfig::new(vec![
//!     "season".to_string(),
//!     "venue".to_string(),
//! ]));
//! let report = summarizer.compute_summary(&ctx).await?;
//!
//! for (group, summary) in &report.groups {
//!     println!(
//!         "{}: median {:?}, fences [{:.0}, {:.0}]",
//!         group.join("/"),
//!         summary.median,
//!         summary.fence_low,
//!         summary.fence_high
//!     );
//! }
//!
//! // Flag the records that fall outside their group's fences
//! let flags = summarizer.flag_outliers(&ctx, &report).await?;
//! println!("{} outliers", flags.iter().filter(|f| **f).count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Features
//!
//! ### Exact quartiles
//!
//! Quartiles use linear interpolation between order statistics (the R type 7
//! convention), not an approximation sketch, so fences match what
//! statistical environments report for the same data.
//!
//! ### Explicit value-handling policies
//!
//! Real exports carry missing markers and junk fields. Nothing is silently
//! guessed: missing values are dropped or zero-filled per
//! [`MissingValuePolicy`](parse::MissingValuePolicy), and non-numeric fields
//! either fail the computation or are dropped per
//! [`ParseFailurePolicy`](parse::ParseFailurePolicy), with drop counts
//! reported in the summary metadata.
//!
//! ### Percentile bins
//!
//! Measurements can be sorted into labelled bins over `(lower, upper]`
//! intervals, with a configurable label for values no bin covers:
//!
//! ```rust
//! use fivenum::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let bins = PercentileBins::builder()
//!     .bin(0.0, 25.0, "low")
//!     .bin(25.0, 75.0, "mid")
//!     .bin(75.0, 100.0, "high")
//!     .undefined_label("out of range")
//!     .build()?;
//!
//! assert_eq!(bins.assign(25.0), "low"); // intervals are closed on the right
//! assert_eq!(bins.assign(25.1), "mid");
//! assert_eq!(bins.assign(-3.0), "out of range");
//! # Ok(())
//! # }
//! ```
//!
//! ### Data sources
//!
//! The `sources` module registers CSV files (single files, explicit path
//! lists, or glob patterns over weekly exports) with schema inference and
//! structured logging along the way.
//!
//! ## Architecture
//!
//! - **`stats`**: pure quartile interpolation and percentile-bin assignment
//! - **`parse`**: numeric field coercion and the value-handling policies
//! - **`summary`**: the [`GroupSummarizer`](summary::GroupSummarizer),
//!   summary reports, and outlier flagging
//! - **`sources`**: data source connectors and loaders
//! - **`error`**: the [`FivenumError`](error::FivenumError) family
//! - **`security`**: SQL identifier validation for generated queries
//! - **`logging`**: logging configuration and setup helpers
//!
//! ## Examples
//!
//! See the `demos` directory for complete examples:
//!
//! - `attendance_outliers.rs`: season attendance summaries with outlier
//!   flagging over a messy CSV export
//! - `pollution_bins.rs`: city air-quality summaries with percentile
//!   binning

pub mod error;
pub mod logging;
pub mod parse;
pub mod prelude;
pub mod security;
pub mod sources;
pub mod stats;
pub mod summary;
