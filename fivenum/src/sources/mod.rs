//! Data source connectors for registering datasets with DataFusion.
//!
//! Summaries read from tables registered on a [`SessionContext`]; the
//! connectors here take raw measurement files (CSV being the interchange
//! format for attendance and sensor exports) to a queryable table in one
//! call, with schema inference and glob expansion handled along the way.

use async_trait::async_trait;
use datafusion::arrow::datatypes::Schema;
use datafusion::prelude::SessionContext;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::{FivenumError, Result};

mod csv;

pub use csv::{CsvOptions, CsvSource};

/// A data source that can be registered with a DataFusion context.
///
/// # Examples
///
/// ```rust,no_run
/// use datafusion::prelude::SessionContext;
/// use fivenum::prelude::*;
///
/// # async fn example() -> Result<()> {
/// let source = CsvSource::new("data/attendance.csv");
/// let ctx = SessionContext::new();
/// source.register(&ctx, "data").await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait DataSource: Debug + Send + Sync {
    /// Registers this data source with the given session context under
    /// `table_name`.
    ///
    /// Implementations handle schema inference and loading; failures
    /// surface as [`FivenumError::DataSource`] with the underlying cause
    /// attached.
    async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()>;

    /// Returns the schema of this data source if explicitly provided.
    fn schema(&self) -> Option<&Arc<Schema>>;

    /// Returns a human-readable description of this data source.
    fn description(&self) -> String;
}

/// Utility function to expand glob patterns into file paths.
pub(crate) async fn expand_globs(patterns: &[String]) -> Result<Vec<String>> {
    use glob::glob;

    let mut paths = Vec::new();
    for pattern in patterns {
        let matches = glob(pattern).map_err(|e| {
            FivenumError::Configuration(format!("Invalid glob pattern '{pattern}': {e}"))
        })?;

        for entry in matches {
            let path = entry.map_err(|e| {
                FivenumError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
            })?;

            if path.is_file() {
                if let Some(path_str) = path.to_str() {
                    paths.push(path_str.to_string());
                }
            }
        }
    }

    if paths.is_empty() {
        return Err(FivenumError::data_source(
            "file",
            "No files found matching glob patterns",
        ));
    }

    Ok(paths)
}
