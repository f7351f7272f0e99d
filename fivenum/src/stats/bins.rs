//! Labelled percentile bins with closed-right intervals.
//!
//! A value belongs to the first bin whose `(lower, upper]` interval
//! contains it. Values contained by no bin get a caller-supplied sentinel
//! label instead of an error, so binning stays total over messy data.

use serde::{Deserialize, Serialize};

use crate::error::{FivenumError, Result};
use crate::security::InputValidator;

/// One labelled interval, open on the left and closed on the right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinSpec {
    /// Exclusive lower bound
    pub lower: f64,
    /// Inclusive upper bound
    pub upper: f64,
    /// Label assigned to values inside the interval
    pub label: String,
}

/// An ordered set of labelled bins plus a sentinel for everything else.
///
/// Bins are checked in declaration order and the first match wins, so
/// adjacent bins sharing a boundary behave predictably: the shared value
/// belongs to the earlier bin (whose inclusive upper bound it is).
///
/// # Examples
///
/// ```rust
/// use fivenum::stats::PercentileBins;
///
/// # fn main() -> fivenum::error::Result<()> {
/// let bins = PercentileBins::builder()
///     .bin(0.0, 5.0, "low")
///     .bin(5.0, 10.0, "high")
///     .undefined_label("UNDEFINED")
///     .build()?;
///
/// assert_eq!(bins.assign(5.0), "low");
/// assert_eq!(bins.assign(5.0001), "high");
/// assert_eq!(bins.assign(0.0), "UNDEFINED");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileBins {
    bins: Vec<BinSpec>,
    undefined_label: String,
}

impl PercentileBins {
    /// Starts building a bin set.
    pub fn builder() -> PercentileBinsBuilder {
        PercentileBinsBuilder::new()
    }

    /// Returns the label for a value.
    ///
    /// Total over all of `f64`: values outside every bin, including NaN,
    /// get the sentinel label.
    pub fn assign(&self, value: f64) -> &str {
        for bin in &self.bins {
            if value > bin.lower && value <= bin.upper {
                return &bin.label;
            }
        }
        &self.undefined_label
    }

    /// Bin labels in declaration order, sentinel excluded.
    pub fn labels(&self) -> Vec<&str> {
        self.bins.iter().map(|bin| bin.label.as_str()).collect()
    }

    /// The sentinel label for out-of-range values.
    pub fn undefined_label(&self) -> &str {
        &self.undefined_label
    }

    /// The configured bins.
    pub fn bins(&self) -> &[BinSpec] {
        &self.bins
    }
}

/// Builder for [`PercentileBins`].
#[derive(Debug, Clone, Default)]
pub struct PercentileBinsBuilder {
    bins: Vec<BinSpec>,
    undefined_label: Option<String>,
}

impl PercentileBinsBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Appends a bin covering `(lower, upper]`.
    pub fn bin(mut self, lower: f64, upper: f64, label: impl Into<String>) -> Self {
        self.bins.push(BinSpec {
            lower,
            upper,
            label: label.into(),
        });
        self
    }

    /// Sets the sentinel label for values outside every bin.
    /// Defaults to `"UNDEFINED"`.
    pub fn undefined_label(mut self, label: impl Into<String>) -> Self {
        self.undefined_label = Some(label.into());
        self
    }

    /// Validates the configuration and builds the bin set.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no bins were declared, when a
    /// bin's bounds are not finite, or when a bin's lower bound is not
    /// strictly below its upper bound.
    pub fn build(self) -> Result<PercentileBins> {
        if self.bins.is_empty() {
            return Err(FivenumError::Configuration(
                "At least one bin is required".to_string(),
            ));
        }

        for bin in &self.bins {
            InputValidator::validate_threshold(bin.lower, "bin lower bound")?;
            InputValidator::validate_threshold(bin.upper, "bin upper bound")?;
            if bin.lower >= bin.upper {
                return Err(FivenumError::Configuration(format!(
                    "Bin '{}' has lower bound {} not below upper bound {}",
                    bin.label, bin.lower, bin.upper
                )));
            }
        }

        Ok(PercentileBins {
            bins: self.bins,
            undefined_label: self
                .undefined_label
                .unwrap_or_else(|| "UNDEFINED".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_bins() -> PercentileBins {
        PercentileBins::builder()
            .bin(0.0, 5.0, "A")
            .bin(5.0, 10.0, "B")
            .undefined_label("UNDEFINED")
            .build()
            .unwrap()
    }

    #[test]
    fn test_closed_right_boundaries() {
        let bins = two_bins();

        // A shared boundary belongs to the earlier bin
        assert_eq!(bins.assign(5.0), "A");
        assert_eq!(bins.assign(5.0001), "B");
        assert_eq!(bins.assign(10.0), "B");

        // Lower bounds are exclusive
        assert_eq!(bins.assign(0.0), "UNDEFINED");
    }

    #[test]
    fn test_out_of_range_gets_sentinel() {
        let bins = two_bins();
        assert_eq!(bins.assign(-1.0), "UNDEFINED");
        assert_eq!(bins.assign(11.0), "UNDEFINED");
        assert_eq!(bins.assign(f64::NAN), "UNDEFINED");
    }

    #[test]
    fn test_first_match_wins_on_overlap() {
        let bins = PercentileBins::builder()
            .bin(0.0, 10.0, "wide")
            .bin(4.0, 6.0, "narrow")
            .build()
            .unwrap();

        assert_eq!(bins.assign(5.0), "wide");
    }

    #[test]
    fn test_default_sentinel() {
        let bins = PercentileBins::builder().bin(0.0, 1.0, "only").build().unwrap();
        assert_eq!(bins.undefined_label(), "UNDEFINED");
        assert_eq!(bins.assign(2.0), "UNDEFINED");
    }

    #[test]
    fn test_labels_in_order() {
        let bins = two_bins();
        assert_eq!(bins.labels(), vec!["A", "B"]);
    }

    #[test]
    fn test_build_rejects_empty() {
        assert!(PercentileBins::builder().build().is_err());
    }

    #[test]
    fn test_build_rejects_inverted_bounds() {
        let result = PercentileBins::builder().bin(5.0, 5.0, "flat").build();
        assert!(result.is_err());

        let result = PercentileBins::builder().bin(7.0, 3.0, "backwards").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_build_rejects_non_finite_bounds() {
        let result = PercentileBins::builder()
            .bin(f64::NEG_INFINITY, 0.0, "everything below")
            .build();
        assert!(result.is_err());

        let result = PercentileBins::builder().bin(0.0, f64::NAN, "nan").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let bins = two_bins();
        let json = serde_json::to_string(&bins).unwrap();
        let back: PercentileBins = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bins);
    }
}
