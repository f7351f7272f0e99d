//! Input hardening for generated SQL.
//!
//! Column and table names supplied by callers are interpolated into the
//! SQL this crate generates, so they are validated and escaped here before
//! any query is built.

use crate::error::{FivenumError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// SQL identifier validation and escaping utilities.
pub struct SqlSecurity;

impl SqlSecurity {
    /// Validates and escapes a SQL identifier (table or column name).
    ///
    /// Returns the identifier wrapped in double quotes, ready for safe use
    /// in a generated query.
    ///
    /// # Examples
    /// ```rust
    /// use fivenum::security::SqlSecurity;
    ///
    /// assert!(SqlSecurity::escape_identifier("attendance").is_ok());
    /// assert!(SqlSecurity::escape_identifier("season; DROP TABLE matches--").is_err());
    /// ```
    pub fn escape_identifier(identifier: &str) -> Result<String> {
        Self::validate_identifier(identifier)?;

        let escaped = identifier.replace('"', "\"\"");
        Ok(format!("\"{escaped}\""))
    }

    /// Validates a SQL identifier without escaping it.
    ///
    /// Useful where the identifier is needed in a non-SQL context (schema
    /// lookups, error messages) but must still be known-safe.
    pub fn validate_identifier(identifier: &str) -> Result<()> {
        if identifier.is_empty() || identifier.trim().is_empty() {
            return Err(FivenumError::SecurityError(
                "SQL identifier cannot be empty or whitespace-only".to_string(),
            ));
        }

        // Length cap keeps pathological inputs out of query plans
        if identifier.len() > 128 {
            return Err(FivenumError::SecurityError(
                "SQL identifier too long (max 128 characters)".to_string(),
            ));
        }

        if identifier.contains('\0') {
            return Err(FivenumError::SecurityError(
                "SQL identifier cannot contain null bytes".to_string(),
            ));
        }

        static IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
            // Letters, digits, underscores, dots for qualified names;
            // must start with a letter or underscore.
            #[allow(clippy::expect_used)]
            Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*(\.[a-zA-Z_][a-zA-Z0-9_]*)*$")
                .expect("Hard-coded regex pattern should be valid")
        });

        if !IDENTIFIER_REGEX.is_match(identifier) {
            return Err(FivenumError::SecurityError(format!(
                "Invalid SQL identifier format: '{identifier}'. Identifiers must start with a letter or underscore and contain only letters, numbers, underscores, and dots"
            )));
        }

        Self::check_dangerous_patterns(identifier)?;

        Ok(())
    }

    /// Rejects identifiers containing SQL injection markers or keywords.
    fn check_dangerous_patterns(identifier: &str) -> Result<()> {
        let identifier_lower = identifier.to_lowercase();

        let dangerous_patterns = &[
            ";", "--", "/*", "*/", "'", "xp_", "sp_", "union", "select", "insert", "update",
            "delete", "drop", "create", "alter", "exec", "execute", "declare", "cursor", "fetch",
            "open", "close",
        ];

        for pattern in dangerous_patterns {
            if identifier_lower.contains(pattern) {
                return Err(FivenumError::SecurityError(format!(
                    "SQL identifier contains dangerous pattern: '{pattern}'"
                )));
            }
        }

        Ok(())
    }
}

/// Validation utilities for numeric caller inputs.
pub struct InputValidator;

impl InputValidator {
    /// Validates that a numeric argument is finite.
    pub fn validate_threshold(value: f64, name: &str) -> Result<()> {
        if !value.is_finite() {
            return Err(FivenumError::Configuration(format!(
                "Invalid {name} value: must be finite (not NaN or infinite)"
            )));
        }
        Ok(())
    }

    /// Validates a fraction argument (0.0 to 1.0), e.g. a quantile.
    pub fn validate_fraction(value: f64, name: &str) -> Result<()> {
        Self::validate_threshold(value, name)?;

        if !(0.0..=1.0).contains(&value) {
            return Err(FivenumError::Configuration(format!(
                "Invalid {name} value: must be between 0.0 and 1.0, got {value}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_sql_identifiers() {
        assert!(SqlSecurity::validate_identifier("attendance").is_ok());
        assert!(SqlSecurity::validate_identifier("season_2024").is_ok());
        assert!(SqlSecurity::validate_identifier("_hidden").is_ok());
        assert!(SqlSecurity::validate_identifier("stats.attendance").is_ok());
    }

    #[test]
    fn test_invalid_sql_identifiers() {
        assert!(SqlSecurity::validate_identifier("").is_err());
        assert!(SqlSecurity::validate_identifier("   ").is_err());
        assert!(SqlSecurity::validate_identifier(&"a".repeat(200)).is_err());

        assert!(SqlSecurity::validate_identifier("season; DROP TABLE matches").is_err());
        assert!(SqlSecurity::validate_identifier("col--comment").is_err());
        assert!(SqlSecurity::validate_identifier("union_all").is_err());

        assert!(SqlSecurity::validate_identifier("col name").is_err());
        assert!(SqlSecurity::validate_identifier("col-name").is_err());
        assert!(SqlSecurity::validate_identifier("2024season").is_err());
    }

    #[test]
    fn test_sql_identifier_escaping() {
        let result = SqlSecurity::escape_identifier("attendance").unwrap();
        assert_eq!(result, "\"attendance\"");

        // Embedded quotes never reach the escaping step
        assert!(SqlSecurity::escape_identifier("col\"quoted\"").is_err());
    }

    #[test]
    fn test_input_validation() {
        assert!(InputValidator::validate_threshold(1.5, "fence multiplier").is_ok());
        assert!(InputValidator::validate_fraction(0.25, "quantile").is_ok());

        assert!(InputValidator::validate_threshold(f64::NAN, "fence multiplier").is_err());
        assert!(InputValidator::validate_threshold(f64::INFINITY, "fence multiplier").is_err());
        assert!(InputValidator::validate_fraction(1.25, "quantile").is_err());
        assert!(InputValidator::validate_fraction(-0.1, "quantile").is_err());
    }
}
