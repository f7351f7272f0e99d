//! Prelude for commonly used types and traits in fivenum.

pub use crate::error::{ErrorContext, FivenumError, Result};
pub use crate::logging::LogConfig;
pub use crate::parse::{MissingValuePolicy, NumericParser, ParseFailurePolicy};
pub use crate::sources::{CsvOptions, CsvSource, DataSource};
pub use crate::stats::{BinSpec, PercentileBins, PercentileBinsBuilder, Quartiles};
pub use crate::summary::{
    GroupSummarizer, GroupSummary, GroupingConfig, SummaryRecord, SummaryReport,
};
