//! Record-level outlier flagging against a computed summary.

use datafusion::arrow::record_batch::RecordBatch;
use datafusion::prelude::*;
use tracing::{debug, info, instrument};

use super::summarizer::{GroupSummarizer, ScanCounters};
use super::{extract, SummaryReport};
use crate::error::{FivenumError, Result};

impl GroupSummarizer {
    /// Scans the registered table and flags each record whose value falls
    /// strictly outside its group's Tukey fences.
    ///
    /// The returned vector holds one flag per scanned record, in the order
    /// the scan yields them; pair it with an ordered scan of the same table
    /// when record identity matters. Records whose value is excluded by the
    /// configured policies are flagged `false`, as are records whose group
    /// was dropped by the group cap (the report has no fences for them).
    /// When the report is not truncated, a record whose group has no
    /// summary in `report` raises [`FivenumError::GroupNotFound`].
    #[instrument(skip(ctx, report), fields(
        table = %self.table,
        value_column = %self.value_column
    ))]
    pub async fn flag_outliers(
        &self,
        ctx: &SessionContext,
        report: &SummaryReport,
    ) -> Result<Vec<bool>> {
        let batches = self.scan(ctx).await?;
        let flags = self.flag_outliers_from_batches(&batches, report)?;

        info!(
            records = flags.len(),
            outliers = flags.iter().filter(|flag| **flag).count(),
            "Flagged outliers"
        );
        Ok(flags)
    }

    /// Flags outliers in record batches already in hand, one flag per row
    /// in batch order.
    ///
    /// [`flag_outliers`](Self::flag_outliers) is the table-scanning wrapper
    /// around this.
    pub fn flag_outliers_from_batches(
        &self,
        batches: &[RecordBatch],
        report: &SummaryReport,
    ) -> Result<Vec<bool>> {
        let mut flags = Vec::new();
        let mut counters = ScanCounters::default();

        for batch in batches {
            if batch.num_rows() == 0 {
                continue;
            }

            let keys = extract::group_keys(batch, &self.grouping.columns)?;
            let cells = extract::value_cells(batch, &self.value_column, &self.parser)?;

            for (key, cell) in keys.into_iter().zip(cells) {
                match self.resolve_cell(cell, &mut counters)? {
                    Some(value) => match report.groups.get(&key) {
                        Some(summary) => flags.push(summary.is_outlier(value)),
                        // the group cap left this group without fences
                        None if report.is_truncated() => flags.push(false),
                        None => return Err(FivenumError::group_not_found(&key)),
                    },
                    // excluded by policy, so it cannot be an outlier
                    None => flags.push(false),
                }
            }
        }

        debug!(
            records = flags.len(),
            excluded = counters.dropped,
            "Flagged batches"
        );
        Ok(flags)
    }
}
