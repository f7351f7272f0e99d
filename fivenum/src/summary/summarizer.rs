//! The grouped summarizer: one table scan, one summary per group.

use datafusion::arrow::record_batch::RecordBatch;
use datafusion::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

use crate::error::{FivenumError, Result};
use crate::parse::{MissingValuePolicy, NumericParser, ParseFailurePolicy, ParsedValue};
use crate::security::{InputValidator, SqlSecurity};
use crate::stats::quartiles_sorted;

use super::extract;
use super::{
    GroupSummary, GroupingConfig, SummaryMetadata, SummaryReport, TUKEY_FENCE_MULTIPLIER,
};

/// Table name summaries read from unless overridden.
pub(crate) const DEFAULT_TABLE: &str = "data";

/// Computes per-group five-number summaries over a registered table.
///
/// The summarizer scans the grouping and value columns once, coerces raw
/// values through its [`NumericParser`], applies the configured missing-value
/// and parse-failure policies, and derives quartiles, IQR, and Tukey fences
/// for every group.
///
/// # Examples
///
/// ```rust,no_run
/// use datafusion::prelude::*;
/// use fivenum::prelude::*;
///
/// # async fn example() -> Result<()> {
/// let ctx = SessionContext::new();
/// ctx.register_csv("data", "attendance.csv", CsvReadOptions::new())
///     .await?;
///
/// let report = GroupSummarizer::new("attendance")
///     .with_grouping(GroupingConfig::new(vec!["season".to_string()]))
///     .compute_summary(&ctx)
///     .await?;
///
/// for (group, summary) in &report.groups {
///     println!(
///         "{}: fences [{:.1}, {:.1}]",
///         group.join("/"),
///         summary.fence_low,
///         summary.fence_high
///     );
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GroupSummarizer {
    pub(super) value_column: String,
    pub(super) table: String,
    pub(super) grouping: GroupingConfig,
    pub(super) parser: NumericParser,
    pub(super) missing_values: MissingValuePolicy,
    pub(super) parse_failures: ParseFailurePolicy,
    pub(super) fence_multiplier: f64,
    pub(super) include_median: bool,
    pub(super) include_mean: bool,
    pub(super) include_overall: bool,
}

impl GroupSummarizer {
    /// Creates a summarizer for the given value column with default settings:
    /// no grouping, table `"data"`, drop missing values, fail on parse
    /// errors, Tukey's 1.5 fence multiplier, median included.
    pub fn new(value_column: impl Into<String>) -> Self {
        Self {
            value_column: value_column.into(),
            table: DEFAULT_TABLE.to_string(),
            grouping: GroupingConfig::default(),
            parser: NumericParser::default(),
            missing_values: MissingValuePolicy::default(),
            parse_failures: ParseFailurePolicy::default(),
            fence_multiplier: TUKEY_FENCE_MULTIPLIER,
            include_median: true,
            include_mean: false,
            include_overall: false,
        }
    }

    /// Sets the grouping configuration.
    pub fn with_grouping(mut self, grouping: GroupingConfig) -> Self {
        self.grouping = grouping;
        self
    }

    /// Sets the table name to read from.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Sets the parser used to coerce raw string values.
    pub fn with_parser(mut self, parser: NumericParser) -> Self {
        self.parser = parser;
        self
    }

    /// Sets the missing-value policy.
    pub fn with_missing_values(mut self, policy: MissingValuePolicy) -> Self {
        self.missing_values = policy;
        self
    }

    /// Sets the parse-failure policy.
    pub fn with_parse_failures(mut self, policy: ParseFailurePolicy) -> Self {
        self.parse_failures = policy;
        self
    }

    /// Sets the fence multiplier. Tukey's 1.5 flags "out" values; 3.0 is
    /// the conventional choice for "far out" values only.
    pub fn with_fence_multiplier(mut self, multiplier: f64) -> Self {
        self.fence_multiplier = multiplier;
        self
    }

    /// Sets whether group medians are included in the report.
    pub fn with_median(mut self, include: bool) -> Self {
        self.include_median = include;
        self
    }

    /// Sets whether group means are included in the report.
    pub fn with_mean(mut self, include: bool) -> Self {
        self.include_mean = include;
        self
    }

    /// Sets whether an overall summary across every group is included.
    pub fn with_overall(mut self, include: bool) -> Self {
        self.include_overall = include;
        self
    }

    /// Returns the column the statistics are computed over.
    pub fn value_column(&self) -> &str {
        &self.value_column
    }

    /// Scans the registered table and computes the grouped summary.
    #[instrument(skip(ctx), fields(
        table = %self.table,
        value_column = %self.value_column,
        group_columns = ?self.grouping.columns
    ))]
    pub async fn compute_summary(&self, ctx: &SessionContext) -> Result<SummaryReport> {
        let batches = self.scan(ctx).await?;
        let report = self.compute_summary_from_batches(&batches)?;

        info!(
            groups = report.group_count(),
            truncated = report.is_truncated(),
            dropped = report.metadata.dropped_values,
            "Computed grouped summary"
        );
        Ok(report)
    }

    /// Computes the grouped summary from record batches already in hand.
    ///
    /// [`compute_summary`](Self::compute_summary) is the table-scanning
    /// wrapper around this.
    pub fn compute_summary_from_batches(&self, batches: &[RecordBatch]) -> Result<SummaryReport> {
        self.validate_stats_config()?;

        let mut group_values: BTreeMap<Vec<String>, Vec<f64>> = BTreeMap::new();
        let mut overall_values: Vec<f64> = Vec::new();
        let mut counters = ScanCounters::default();

        for batch in batches {
            if batch.num_rows() == 0 {
                continue;
            }

            let keys = extract::group_keys(batch, &self.grouping.columns)?;
            let cells = extract::value_cells(batch, &self.value_column, &self.parser)?;

            for (key, cell) in keys.into_iter().zip(cells) {
                if let Some(value) = self.resolve_cell(cell, &mut counters)? {
                    group_values.entry(key).or_default().push(value);
                    if self.include_overall {
                        overall_values.push(value);
                    }
                }
            }
        }

        let total_groups = group_values.len();
        let cap = self.grouping.max_groups.unwrap_or(usize::MAX);

        let mut groups = BTreeMap::new();
        for (key, mut values) in group_values.into_iter().take(cap) {
            if let Some(summary) = self.summarize_values(&mut values) {
                groups.insert(key, summary);
            }
        }

        let overall = if self.include_overall {
            self.summarize_values(&mut overall_values)
        } else {
            None
        };

        let mut metadata = SummaryMetadata::new(
            self.grouping.columns.clone(),
            self.value_column.clone(),
            total_groups,
            groups.len(),
        );
        metadata.dropped_values = counters.dropped;
        metadata.zero_filled_values = counters.zero_filled;

        debug!(
            total_groups,
            included = metadata.included_groups,
            dropped = counters.dropped,
            zero_filled = counters.zero_filled,
            "Summarized batches"
        );

        Ok(SummaryReport::new(groups, overall, metadata))
    }

    /// Applies the value-handling policies to one classified cell.
    pub(crate) fn resolve_cell(
        &self,
        cell: ParsedValue,
        counters: &mut ScanCounters,
    ) -> Result<Option<f64>> {
        match cell {
            ParsedValue::Numeric(value) => Ok(Some(value)),
            ParsedValue::Missing => match self.missing_values {
                MissingValuePolicy::Drop => {
                    counters.dropped += 1;
                    Ok(None)
                }
                MissingValuePolicy::ZeroFill => {
                    counters.zero_filled += 1;
                    Ok(Some(0.0))
                }
            },
            ParsedValue::Invalid(raw) => match self.parse_failures {
                ParseFailurePolicy::Fail => {
                    Err(FivenumError::non_numeric(self.value_column.as_str(), raw))
                }
                ParseFailurePolicy::Drop => {
                    counters.dropped += 1;
                    Ok(None)
                }
            },
        }
    }

    fn summarize_values(&self, values: &mut Vec<f64>) -> Option<GroupSummary> {
        values.sort_by(f64::total_cmp);
        let quartiles = quartiles_sorted(values)?;

        let iqr = quartiles.iqr();
        let reach = self.fence_multiplier * iqr;
        let mean = self
            .include_mean
            .then(|| values.iter().sum::<f64>() / values.len() as f64);

        Some(GroupSummary {
            count: values.len() as u64,
            q1: quartiles.q1,
            q3: quartiles.q3,
            iqr,
            fence_low: quartiles.q1 - reach,
            fence_high: quartiles.q3 + reach,
            median: self.include_median.then_some(quartiles.median),
            mean,
        })
    }

    /// Runs the column scan that feeds summary computation and flagging.
    pub(crate) async fn scan(&self, ctx: &SessionContext) -> Result<Vec<RecordBatch>> {
        self.validate_identifiers()?;

        let table = ctx.table(self.table.as_str()).await?;
        let schema = table.schema();
        for column in self
            .grouping
            .columns
            .iter()
            .chain(std::iter::once(&self.value_column))
        {
            if !schema.fields().iter().any(|f| f.name() == column) {
                return Err(FivenumError::column_not_found(column));
            }
        }

        let mut select_cols = Vec::with_capacity(self.grouping.columns.len() + 1);
        for column in &self.grouping.columns {
            select_cols.push(SqlSecurity::escape_identifier(column)?);
        }
        select_cols.push(SqlSecurity::escape_identifier(&self.value_column)?);

        let sql = format!(
            "SELECT {} FROM {}",
            select_cols.join(", "),
            SqlSecurity::escape_identifier(&self.table)?
        );
        debug!("Executing summary scan: {}", sql);

        let df = ctx.sql(&sql).await?;
        let batches = df.collect().await?;
        Ok(batches)
    }

    fn validate_identifiers(&self) -> Result<()> {
        SqlSecurity::validate_identifier(&self.table)?;
        SqlSecurity::validate_identifier(&self.value_column)?;
        for column in &self.grouping.columns {
            SqlSecurity::validate_identifier(column)?;
        }
        Ok(())
    }

    fn validate_stats_config(&self) -> Result<()> {
        InputValidator::validate_threshold(self.fence_multiplier, "fence multiplier")?;
        if self.fence_multiplier < 0.0 {
            return Err(FivenumError::Configuration(format!(
                "Fence multiplier must be non-negative, got {}",
                self.fence_multiplier
            )));
        }
        Ok(())
    }
}

/// Running totals of values excluded or substituted during a scan.
#[derive(Debug, Default)]
pub(crate) struct ScanCounters {
    pub(crate) dropped: u64,
    pub(crate) zero_filled: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use datafusion::arrow::array::{Float64Array, Int64Array, StringArray};
    use datafusion::arrow::datatypes::{DataType, Field, Schema};
    use datafusion::datasource::MemTable;
    use std::sync::Arc;

    async fn ctx_with_batch(name: &str, batch: RecordBatch) -> SessionContext {
        let ctx = SessionContext::new();
        let table = MemTable::try_new(batch.schema(), vec![vec![batch]]).unwrap();
        ctx.register_table(name, Arc::new(table)).unwrap();
        ctx
    }

    fn attendance_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("season", DataType::Utf8, false),
            Field::new("attendance", DataType::Float64, false),
        ]));
        let seasons: Vec<&str> = std::iter::repeat("2023").take(10).collect();
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(seasons)),
                Arc::new(Float64Array::from(values)),
            ],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_reference_quartiles_and_fences() {
        let ctx = ctx_with_batch("data", attendance_batch()).await;

        let report = GroupSummarizer::new("attendance")
            .with_grouping(GroupingConfig::new(vec!["season".to_string()]))
            .compute_summary(&ctx)
            .await
            .unwrap();

        assert_eq!(report.group_count(), 1);
        let summary = report.get_group(&["2023".to_string()]).unwrap();
        assert_eq!(summary.count, 10);
        assert_eq!(summary.q1, 3.25);
        assert_eq!(summary.q3, 7.75);
        assert_eq!(summary.iqr, 4.5);
        assert_eq!(summary.fence_low, -3.5);
        assert_eq!(summary.fence_high, 14.5);
        // median is on by default, mean is opt-in
        assert_eq!(summary.median, Some(5.5));
        assert_eq!(summary.mean, None);
    }

    #[tokio::test]
    async fn test_groups_report_in_ascending_key_order() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("city", DataType::Utf8, false),
            Field::new("pm25", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec![
                    "delhi", "austin", "delhi", "austin", "delhi", "austin",
                ])),
                Arc::new(Float64Array::from(vec![
                    180.0, 12.0, 190.0, 14.0, 210.0, 16.0,
                ])),
            ],
        )
        .unwrap();
        let ctx = ctx_with_batch("data", batch).await;

        let report = GroupSummarizer::new("pm25")
            .with_grouping(GroupingConfig::new(vec!["city".to_string()]))
            .compute_summary(&ctx)
            .await
            .unwrap();

        let keys: Vec<Vec<String>> = report.groups.keys().cloned().collect();
        assert_eq!(
            keys,
            vec![vec!["austin".to_string()], vec!["delhi".to_string()]]
        );
        assert_eq!(report.get_group(&["austin".to_string()]).unwrap().count, 3);
    }

    #[tokio::test]
    async fn test_string_values_coerced_and_missing_dropped() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("season", DataType::Utf8, false),
            Field::new("attendance", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["2023"; 6])),
                Arc::new(StringArray::from(vec![
                    Some("41,234"),
                    Some("52,389"),
                    Some("NA"),
                    Some(""),
                    None,
                    Some("47,000"),
                ])),
            ],
        )
        .unwrap();
        let ctx = ctx_with_batch("data", batch).await;

        let report = GroupSummarizer::new("attendance")
            .with_grouping(GroupingConfig::new(vec!["season".to_string()]))
            .compute_summary(&ctx)
            .await
            .unwrap();

        let summary = report.get_group(&["2023".to_string()]).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.median, Some(47000.0));
        assert_eq!(report.metadata.dropped_values, 3);
        assert_eq!(report.metadata.zero_filled_values, 0);
    }

    #[tokio::test]
    async fn test_zero_fill_policy_substitutes_missing() {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "reading",
            DataType::Float64,
            true,
        )]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(Float64Array::from(vec![
                Some(10.0),
                None,
                Some(20.0),
                None,
            ]))],
        )
        .unwrap();
        let ctx = ctx_with_batch("data", batch).await;

        let report = GroupSummarizer::new("reading")
            .with_missing_values(MissingValuePolicy::ZeroFill)
            .compute_summary(&ctx)
            .await
            .unwrap();

        // ungrouped data lands in a single empty-key group
        let summary = report.get_group(&[]).unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.median, Some(5.0));
        assert_eq!(report.metadata.zero_filled_values, 2);
        assert_eq!(report.metadata.dropped_values, 0);
    }

    #[tokio::test]
    async fn test_fail_policy_raises_on_non_numeric() {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "attendance",
            DataType::Utf8,
            false,
        )]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(StringArray::from(vec!["41,234", "postponed"]))],
        )
        .unwrap();
        let ctx = ctx_with_batch("data", batch).await;

        let err = GroupSummarizer::new("attendance")
            .compute_summary(&ctx)
            .await
            .unwrap_err();

        match err {
            FivenumError::NonNumeric { column, value } => {
                assert_eq!(column, "attendance");
                assert_eq!(value, "postponed");
            }
            other => panic!("expected NonNumeric, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_drop_policy_skips_non_numeric() {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "attendance",
            DataType::Utf8,
            false,
        )]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(StringArray::from(vec![
                "100", "200", "postponed", "300",
            ]))],
        )
        .unwrap();
        let ctx = ctx_with_batch("data", batch).await;

        let report = GroupSummarizer::new("attendance")
            .with_parse_failures(ParseFailurePolicy::Drop)
            .compute_summary(&ctx)
            .await
            .unwrap();

        let summary = report.get_group(&[]).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(report.metadata.dropped_values, 1);
    }

    #[tokio::test]
    async fn test_group_cap_keeps_first_groups_in_key_order() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("city", DataType::Utf8, false),
            Field::new("pm25", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["c", "a", "b", "c", "a", "b"])),
                Arc::new(Float64Array::from(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])),
            ],
        )
        .unwrap();
        let ctx = ctx_with_batch("data", batch).await;

        let report = GroupSummarizer::new("pm25")
            .with_grouping(GroupingConfig::new(vec!["city".to_string()]).with_max_groups(2))
            .compute_summary(&ctx)
            .await
            .unwrap();

        assert!(report.is_truncated());
        assert_eq!(report.metadata.total_groups, 3);
        assert_eq!(report.metadata.included_groups, 2);
        let keys: Vec<Vec<String>> = report.groups.keys().cloned().collect();
        assert_eq!(keys, vec![vec!["a".to_string()], vec!["b".to_string()]]);
    }

    #[tokio::test]
    async fn test_empty_table_gives_empty_report() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("season", DataType::Utf8, false),
            Field::new("attendance", DataType::Float64, false),
        ]));
        let ctx = SessionContext::new();
        let table = MemTable::try_new(schema, vec![vec![]]).unwrap();
        ctx.register_table("data", Arc::new(table)).unwrap();

        let report = GroupSummarizer::new("attendance")
            .with_grouping(GroupingConfig::new(vec!["season".to_string()]))
            .with_overall(true)
            .compute_summary(&ctx)
            .await
            .unwrap();

        assert!(report.is_empty());
        assert!(report.overall.is_none());
        assert!(!report.is_truncated());
        assert_eq!(report.metadata.total_groups, 0);
        assert_eq!(report.metadata.dropped_values, 0);
    }

    #[tokio::test]
    async fn test_single_value_group_degenerates_cleanly() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("venue", DataType::Utf8, false),
            Field::new("attendance", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["away"])),
                Arc::new(Int64Array::from(vec![42])),
            ],
        )
        .unwrap();
        let ctx = ctx_with_batch("data", batch).await;

        let report = GroupSummarizer::new("attendance")
            .with_grouping(GroupingConfig::new(vec!["venue".to_string()]))
            .compute_summary(&ctx)
            .await
            .unwrap();

        let summary = report.get_group(&["away".to_string()]).unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.q1, 42.0);
        assert_eq!(summary.q3, 42.0);
        assert_eq!(summary.iqr, 0.0);
        assert_eq!(summary.fence_low, 42.0);
        assert_eq!(summary.fence_high, 42.0);
        assert!(!summary.is_outlier(42.0));
        assert!(summary.is_outlier(43.0));
    }

    #[tokio::test]
    async fn test_overall_and_mean_opt_ins() {
        let ctx = ctx_with_batch("data", attendance_batch()).await;

        let report = GroupSummarizer::new("attendance")
            .with_grouping(GroupingConfig::new(vec!["season".to_string()]))
            .with_overall(true)
            .with_mean(true)
            .with_median(false)
            .compute_summary(&ctx)
            .await
            .unwrap();

        let summary = report.get_group(&["2023".to_string()]).unwrap();
        assert_eq!(summary.median, None);
        assert_eq!(summary.mean, Some(14.5));

        let overall = report.overall.as_ref().unwrap();
        assert_eq!(overall.count, 10);
        assert_eq!(overall.mean, Some(14.5));
    }

    #[tokio::test]
    async fn test_missing_value_column_is_reported() {
        let ctx = ctx_with_batch("data", attendance_batch()).await;

        let err = GroupSummarizer::new("tickets")
            .compute_summary(&ctx)
            .await
            .unwrap_err();

        match err {
            FivenumError::ColumnNotFound { column } => assert_eq!(column, "tickets"),
            other => panic!("expected ColumnNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_custom_table_name() {
        let ctx = ctx_with_batch("games", attendance_batch()).await;

        let report = GroupSummarizer::new("attendance")
            .with_table("games")
            .with_grouping(GroupingConfig::new(vec!["season".to_string()]))
            .compute_summary(&ctx)
            .await
            .unwrap();

        assert_eq!(report.group_count(), 1);
        assert_eq!(report.metadata.value_column, "attendance");
    }

    #[tokio::test]
    async fn test_wider_fence_multiplier() {
        let ctx = ctx_with_batch("data", attendance_batch()).await;

        let report = GroupSummarizer::new("attendance")
            .with_grouping(GroupingConfig::new(vec!["season".to_string()]))
            .with_fence_multiplier(3.0)
            .compute_summary(&ctx)
            .await
            .unwrap();

        let summary = report.get_group(&["2023".to_string()]).unwrap();
        assert_eq!(summary.fence_low, 3.25 - 13.5);
        assert_eq!(summary.fence_high, 7.75 + 13.5);
    }

    #[tokio::test]
    async fn test_invalid_fence_multiplier_rejected() {
        let ctx = ctx_with_batch("data", attendance_batch()).await;

        let err = GroupSummarizer::new("attendance")
            .with_fence_multiplier(f64::NAN)
            .compute_summary(&ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, FivenumError::Configuration(_)));

        let err = GroupSummarizer::new("attendance")
            .with_fence_multiplier(-1.0)
            .compute_summary(&ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, FivenumError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_hostile_column_name_rejected() {
        let ctx = ctx_with_batch("data", attendance_batch()).await;

        let err = GroupSummarizer::new("attendance; DROP TABLE data")
            .compute_summary(&ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, FivenumError::SecurityError(_)));
    }
}
