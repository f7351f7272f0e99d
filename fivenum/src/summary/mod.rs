//! Grouped five-number summaries and the report types they produce.
//!
//! A [`GroupSummarizer`] scans a registered table, partitions records by the
//! configured grouping columns, and computes per-group quartiles, IQR, and
//! Tukey fences. Results land in a [`SummaryReport`] keyed by group value,
//! which also drives record-level outlier flagging.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{FivenumError, Result};

mod extract;
mod outliers;
mod summarizer;

pub use summarizer::GroupSummarizer;

/// Default cap on the number of groups tracked per summary.
pub const DEFAULT_MAX_GROUPS: usize = 10_000;

/// Multiplier applied to the IQR when deriving Tukey fences.
pub const TUKEY_FENCE_MULTIPLIER: f64 = 1.5;

/// Configuration for how records are partitioned into groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingConfig {
    /// Columns to group by. Empty means one overall group.
    pub columns: Vec<String>,

    /// Maximum number of groups to track (for memory management).
    /// When exceeded, groups are kept in ascending key order and the
    /// report is marked truncated.
    pub max_groups: Option<usize>,
}

impl GroupingConfig {
    /// Creates a new grouping configuration with default settings.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            max_groups: Some(DEFAULT_MAX_GROUPS),
        }
    }

    /// Sets the maximum number of groups to track.
    pub fn with_max_groups(mut self, max: usize) -> Self {
        self.max_groups = Some(max);
        self
    }

    /// Removes the group cap entirely.
    pub fn without_group_limit(mut self) -> Self {
        self.max_groups = None;
        self
    }
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Five-number profile of a single group's values.
///
/// Quartiles follow the linear-interpolation convention (R type 7), and the
/// fences are the classic Tukey bounds `q1 - 1.5 * IQR` / `q3 + 1.5 * IQR`.
/// Values exactly on a fence are inliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Number of values that contributed to the statistics.
    pub count: u64,

    /// First quartile (25th percentile).
    pub q1: f64,

    /// Third quartile (75th percentile).
    pub q3: f64,

    /// Interquartile range, `q3 - q1`.
    pub iqr: f64,

    /// Lower Tukey fence.
    pub fence_low: f64,

    /// Upper Tukey fence.
    pub fence_high: f64,

    /// Median, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,

    /// Arithmetic mean, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
}

impl GroupSummary {
    /// Returns true when `value` falls strictly outside the Tukey fences.
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.fence_low || value > self.fence_high
    }

    /// Returns true when `value` lies within the fences (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        !self.is_outlier(value)
    }
}

/// A group's summary paired with the group key, for flat serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Group key, one value per grouping column.
    pub group: Vec<String>,

    /// Statistics for the group.
    #[serde(flatten)]
    pub summary: GroupSummary,
}

/// Metadata about a summary computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryMetadata {
    /// Grouping columns used.
    pub group_columns: Vec<String>,

    /// Column the statistics were computed over.
    pub value_column: String,

    /// Total number of groups found in the data.
    pub total_groups: usize,

    /// Number of groups included in the report.
    pub included_groups: usize,

    /// Whether results were truncated by the group cap.
    pub truncated: bool,

    /// Records excluded under the missing-value or parse-failure policy.
    pub dropped_values: u64,

    /// Missing records substituted with zero under the zero-fill policy.
    pub zero_filled_values: u64,

    /// RFC 3339 timestamp of when the summary was computed.
    pub generated_at: String,
}

impl SummaryMetadata {
    /// Creates new metadata for a summary computation.
    pub fn new(
        group_columns: Vec<String>,
        value_column: String,
        total_groups: usize,
        included_groups: usize,
    ) -> Self {
        Self {
            group_columns,
            value_column,
            total_groups,
            included_groups,
            truncated: total_groups > included_groups,
            dropped_values: 0,
            zero_filled_values: 0,
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Result of a grouped summary computation.
#[derive(Debug, Clone)]
pub struct SummaryReport {
    /// Summaries per group value, in ascending key order.
    /// Key is a vector of group values (one per grouping column).
    pub groups: BTreeMap<Vec<String>, GroupSummary>,

    /// Summary over every value regardless of group (if requested).
    pub overall: Option<GroupSummary>,

    /// Metadata about the computation.
    pub metadata: SummaryMetadata,
}

impl SummaryReport {
    /// Creates a new summary report.
    pub fn new(
        groups: BTreeMap<Vec<String>, GroupSummary>,
        overall: Option<GroupSummary>,
        metadata: SummaryMetadata,
    ) -> Self {
        Self {
            groups,
            overall,
            metadata,
        }
    }

    /// Returns the number of groups in the report.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Returns true when the report holds no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Gets the summary for a specific group.
    pub fn get_group(&self, key: &[String]) -> Option<&GroupSummary> {
        self.groups.get(key)
    }

    /// Checks if grouping was truncated due to the group cap.
    pub fn is_truncated(&self) -> bool {
        self.metadata.truncated
    }

    /// Flattens the report into one record per group, in key order.
    pub fn records(&self) -> Vec<SummaryRecord> {
        self.groups
            .iter()
            .map(|(group, summary)| SummaryRecord {
                group: group.clone(),
                summary: summary.clone(),
            })
            .collect()
    }

    /// Serializes the report to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.json_view())
            .map_err(|e| FivenumError::Serialization(e.to_string()))
    }

    /// Serializes the report to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.json_view())
            .map_err(|e| FivenumError::Serialization(e.to_string()))
    }

    fn json_view(&self) -> ReportJson<'_> {
        ReportJson {
            metadata: &self.metadata,
            overall: self.overall.as_ref(),
            groups: self.records(),
        }
    }
}

/// JSON shape of a report: group keys move out of the map position,
/// which JSON cannot key by.
#[derive(Serialize)]
struct ReportJson<'a> {
    metadata: &'a SummaryMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    overall: Option<&'a GroupSummary>,
    groups: Vec<SummaryRecord>,
}
