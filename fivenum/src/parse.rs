//! Numeric field coercion and value-handling policies.
//!
//! Raw tabular data rarely arrives as clean numbers: attendance columns
//! carry thousands separators ("12,345"), missing readings are spelled
//! "NA" or left empty. [`NumericParser`] classifies raw fields without
//! erroring; the two policy enums say what the summarizer should do with
//! each class of field.

use serde::{Deserialize, Serialize};

/// What a raw field turned out to be after coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    /// A finite numeric value.
    Numeric(f64),
    /// A recognised missing-value marker (empty field, NA token, SQL NULL).
    Missing,
    /// Neither numeric nor a recognised missing-value marker; carries the
    /// raw field so error reports can name the offending value.
    Invalid(String),
}

/// How to handle missing values when summarizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingValuePolicy {
    /// Exclude the record from the group's statistics.
    Drop,
    /// Substitute 0.0 for the missing value.
    ZeroFill,
}

impl Default for MissingValuePolicy {
    fn default() -> Self {
        Self::Drop
    }
}

/// How to handle values that fail numeric coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseFailurePolicy {
    /// Fail the whole operation with a non-numeric value error.
    Fail,
    /// Exclude the record, the same way a missing value is dropped.
    Drop,
}

impl Default for ParseFailurePolicy {
    fn default() -> Self {
        Self::Fail
    }
}

/// Coerces raw string fields into numeric values.
///
/// The defaults accept the common CSV conventions for human-entered
/// numbers: surrounding whitespace, `,` as a thousands separator, and
/// empty or `NA` fields as missing markers.
///
/// # Examples
///
/// ```rust
/// use fivenum::parse::{NumericParser, ParsedValue};
///
/// let parser = NumericParser::default();
/// assert_eq!(parser.parse("12,345"), ParsedValue::Numeric(12345.0));
/// assert_eq!(parser.parse("NA"), ParsedValue::Missing);
/// assert_eq!(parser.parse("sold out"), ParsedValue::Invalid("sold out".to_string()));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericParser {
    /// Trim surrounding whitespace before any other handling
    trim: bool,
    /// Thousands separator to strip before numeric parsing
    thousands_separator: Option<char>,
    /// Tokens (compared after trimming) that mean "no value"
    na_tokens: Vec<String>,
}

impl Default for NumericParser {
    fn default() -> Self {
        Self {
            trim: true,
            thousands_separator: Some(','),
            na_tokens: vec![String::new(), "NA".to_string()],
        }
    }
}

impl NumericParser {
    /// Creates a parser that accepts only plain numeric literals:
    /// no trimming, no separator stripping, no missing-value tokens.
    pub fn strict() -> Self {
        Self {
            trim: false,
            thousands_separator: None,
            na_tokens: Vec::new(),
        }
    }

    /// Sets whether surrounding whitespace is trimmed first.
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Sets the thousands separator to strip, or `None` to disable.
    pub fn with_thousands_separator(mut self, separator: Option<char>) -> Self {
        self.thousands_separator = separator;
        self
    }

    /// Replaces the set of missing-value tokens.
    pub fn with_na_tokens(mut self, tokens: Vec<String>) -> Self {
        self.na_tokens = tokens;
        self
    }

    /// Classifies a raw field.
    ///
    /// Only finite values count as numeric; literals like "NaN" or "inf"
    /// classify as invalid so they cannot slip into quartile input.
    pub fn parse(&self, raw: &str) -> ParsedValue {
        let field = if self.trim { raw.trim() } else { raw };

        if self.na_tokens.iter().any(|token| token == field) {
            return ParsedValue::Missing;
        }

        let cleaned: std::borrow::Cow<'_, str> = match self.thousands_separator {
            Some(sep) if field.contains(sep) => field.replace(sep, "").into(),
            _ => field.into(),
        };

        match cleaned.parse::<f64>() {
            Ok(value) if value.is_finite() => ParsedValue::Numeric(value),
            _ => ParsedValue::Invalid(field.to_string()),
        }
    }
}
