//! CSV file source implementation.

use super::{expand_globs, DataSource};
use crate::error::{FivenumError, Result};
use async_trait::async_trait;
use datafusion::arrow::datatypes::Schema;
use datafusion::datasource::file_format::csv::CsvFormat;
use datafusion::datasource::listing::{
    ListingOptions, ListingTable, ListingTableConfig, ListingTableUrl,
};
use datafusion::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Options for configuring CSV file reading.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the CSV file has a header row
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Escape character (default: None)
    pub escape: Option<u8>,
    /// Comment prefix (lines starting with this are ignored)
    pub comment: Option<u8>,
    /// Schema to use (if None, will be inferred)
    pub schema: Option<Arc<Schema>>,
    /// Maximum records to read for schema inference
    pub schema_infer_max_records: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            escape: None,
            comment: None,
            schema: None,
            schema_infer_max_records: 1000,
        }
    }
}

/// A CSV file data source with schema inference and glob support.
///
/// Raw exports often carry formatted numbers ("52,389") that schema
/// inference types as strings; the summarizer's parser coerces those
/// downstream, so registering them as-is is fine.
///
/// # Examples
///
/// ```rust,no_run
/// use fivenum::prelude::*;
///
/// # async fn example() -> Result<()> {
/// // Simple CSV file
/// let source = CsvSource::new("data/attendance.csv");
///
/// // Tab-separated file with custom options
/// let options = CsvOptions {
///     delimiter: b'\t',
///     has_header: false,
///     ..Default::default()
/// };
/// let source = CsvSource::with_options("data/readings.tsv", options);
///
/// // One logical table over many weekly exports
/// let source = CsvSource::from_glob("data/week_*.csv").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CsvSource {
    paths: Vec<String>,
    options: CsvOptions,
}

impl CsvSource {
    /// Creates a new CSV source from a single file path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            paths: vec![path.into()],
            options: CsvOptions::default(),
        }
    }

    /// Creates a new CSV source with custom options.
    pub fn with_options(path: impl Into<String>, options: CsvOptions) -> Self {
        Self {
            paths: vec![path.into()],
            options,
        }
    }

    /// Creates a CSV source from multiple file paths.
    pub fn from_paths(paths: Vec<String>) -> Result<Self> {
        if paths.is_empty() {
            return Err(FivenumError::Configuration(
                "At least one path must be provided".to_string(),
            ));
        }
        Ok(Self {
            paths,
            options: CsvOptions::default(),
        })
    }

    /// Creates a CSV source from a glob pattern.
    pub async fn from_glob(pattern: impl Into<String>) -> Result<Self> {
        let patterns = vec![pattern.into()];
        let paths = expand_globs(&patterns).await?;
        Self::from_paths(paths)
    }

    /// Creates a CSV source from multiple glob patterns.
    pub async fn from_globs(patterns: &[String]) -> Result<Self> {
        let paths = expand_globs(patterns).await?;
        Self::from_paths(paths)
    }

    /// Sets custom options for this CSV source.
    pub fn with_custom_options(mut self, options: CsvOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the file paths this source reads from.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Registers a single plain `.csv` file through the session's CSV
    /// reader.
    async fn register_single_csv(
        &self,
        ctx: &SessionContext,
        table_name: &str,
        path: &str,
    ) -> Result<()> {
        let mut csv_options = CsvReadOptions::new()
            .has_header(self.options.has_header)
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .schema_infer_max_records(self.options.schema_infer_max_records);

        if let Some(escape) = self.options.escape {
            csv_options = csv_options.escape(escape);
        }
        if let Some(comment) = self.options.comment {
            csv_options = csv_options.comment(comment);
        }
        if let Some(schema) = &self.options.schema {
            csv_options = csv_options.schema(schema);
        }

        ctx.register_csv(table_name, path, csv_options)
            .await
            .map_err(|e| {
                FivenumError::data_source_with_source(
                    "csv",
                    format!("Failed to register CSV file '{path}'"),
                    Box::new(e),
                )
            })
    }

    /// Registers multi-file or odd-extension sources through a listing
    /// table.
    async fn register_listing(&self, ctx: &SessionContext, table_name: &str) -> Result<()> {
        let mut format = CsvFormat::default()
            .with_has_header(self.options.has_header)
            .with_delimiter(self.options.delimiter)
            .with_quote(self.options.quote)
            .with_schema_infer_max_rec(self.options.schema_infer_max_records);

        if let Some(escape) = self.options.escape {
            format = format.with_escape(Some(escape));
        }
        if let Some(comment) = self.options.comment {
            format = format.with_comment(Some(comment));
        }

        let extension = file_extension(&self.paths[0]);
        let listing_options = ListingOptions::new(Arc::new(format)).with_file_extension(&extension);

        let mut urls = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            let url = ListingTableUrl::parse(path).map_err(|e| {
                FivenumError::data_source_with_source(
                    "csv",
                    format!("Invalid file path '{path}'"),
                    Box::new(e),
                )
            })?;
            urls.push(url);
        }

        let config =
            ListingTableConfig::new_with_multi_paths(urls).with_listing_options(listing_options);
        let config = if let Some(schema) = &self.options.schema {
            config.with_schema(schema.clone())
        } else {
            config.infer_schema(&ctx.state()).await.map_err(|e| {
                FivenumError::data_source_with_source(
                    "csv",
                    "Failed to infer CSV schema".to_string(),
                    Box::new(e),
                )
            })?
        };

        let table = ListingTable::try_new(config).map_err(|e| {
            FivenumError::data_source_with_source(
                "csv",
                "Failed to build CSV listing table".to_string(),
                Box::new(e),
            )
        })?;
        ctx.register_table(table_name, Arc::new(table))
            .map_err(|e| {
                FivenumError::data_source_with_source(
                    "csv",
                    format!("Failed to register table '{table_name}'"),
                    Box::new(e),
                )
            })?;
        Ok(())
    }
}

#[async_trait]
impl DataSource for CsvSource {
    #[instrument(skip(self, ctx), fields(
        table.name = %table_name,
        source.type = "csv",
        source.files = self.paths.len(),
        csv.delimiter = %self.options.delimiter as char,
        csv.has_header = self.options.has_header
    ))]
    async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()> {
        info!(
            table.name = %table_name,
            source.type = "csv",
            source.paths = ?self.paths,
            "Registering CSV data source"
        );

        if self.paths.len() == 1 && self.paths[0].ends_with(".csv") {
            self.register_single_csv(ctx, table_name, &self.paths[0])
                .await?;
        } else {
            self.register_listing(ctx, table_name).await?;
        }

        debug!(
            table.name = %table_name,
            source.files = self.paths.len(),
            "CSV data source registered successfully"
        );

        Ok(())
    }

    fn schema(&self) -> Option<&Arc<Schema>> {
        self.options.schema.as_ref()
    }

    fn description(&self) -> String {
        if self.paths.len() == 1 {
            let path = &self.paths[0];
            format!("CSV file: {path}")
        } else {
            let count = self.paths.len();
            format!("CSV files: {count} files")
        }
    }
}

fn file_extension(path: &str) -> String {
    std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| ".csv".to_string())
}
