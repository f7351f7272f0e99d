//! Error types for the fivenum summarization library.
//!
//! All fallible operations in the crate return [`Result`], whose error type
//! is the [`FivenumError`] enum defined here. The variants separate the
//! three failure families callers need to tell apart: data loading
//! failures (fatal), value coercion failures, and summary lookup misses.

use thiserror::Error;

/// The main error type for the fivenum library.
#[derive(Error, Debug)]
pub enum FivenumError {
    /// Error from DataFusion query execution.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow array handling.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error while loading or registering a dataset. Always fatal: a
    /// summary computed over a partially loaded dataset would be wrong.
    #[error("Data source error: {message}")]
    DataSource {
        /// Kind of data source (e.g. "CSV", "file")
        source_type: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A raw field could not be coerced to a numeric value. Raised when
    /// the parse failure policy is strict.
    #[error("Non-numeric value '{value}' in column '{column}'")]
    NonNumeric {
        /// Column the value came from
        column: String,
        /// The offending raw value
        value: String,
    },

    /// A record's group key has no entry in the summary report it is
    /// being evaluated against.
    #[error("No summary for group '{group}'")]
    GroupNotFound {
        /// The missing group key, joined for display
        group: String,
    },

    /// A required column is missing from the dataset.
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// A column holds a type the operation cannot work with.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Invalid configuration supplied by the caller.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Rejected identifier or other unsafe input.
    #[error("Security error: {0}")]
    SecurityError(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, FivenumError>`.
///
/// This is the standard `Result` type used throughout the library.
pub type Result<T> = std::result::Result<T, FivenumError>;

impl FivenumError {
    /// Creates a new data source error.
    pub fn data_source(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new data source error with an underlying cause.
    pub fn data_source_with_source(
        source_type: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a new non-numeric value error.
    pub fn non_numeric(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::NonNumeric {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Creates a new group lookup error from the key parts.
    pub fn group_not_found(key: &[String]) -> Self {
        Self::GroupNotFound {
            group: key.join(", "),
        }
    }

    /// Creates a new column lookup error.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
        }
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazily built message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<FivenumError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let base_error = e.into();
            FivenumError::Internal(format!("{}: {}", msg, base_error))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let base_error = e.into();
            FivenumError::Internal(format!("{}: {}", f(), base_error))
        })
    }
}
