//! Exact quantile estimation over in-memory values.
//!
//! SQL engines typically expose approximate percentiles only, which is not
//! good enough when downstream fences and bin boundaries must reproduce a
//! known reference exactly. The functions here implement the
//! linear-interpolation estimator (R type 7, the default of R, NumPy and
//! polars): `h = (n - 1) * q`, interpolating between the two order
//! statistics around `h`.
//!
//! Inputs are plain `f64` slices; non-finite values are skipped so a
//! stray NaN or infinity cannot poison fence arithmetic.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::security::InputValidator;

/// The three quartiles of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    /// First quartile (25th percentile)
    pub q1: f64,
    /// Median (50th percentile)
    pub median: f64,
    /// Third quartile (75th percentile)
    pub q3: f64,
}

impl Quartiles {
    /// Interquartile range, `q3 - q1`.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Computes the type 7 quantile of an ascending-sorted, finite slice.
///
/// Returns `None` for an empty slice. The fraction is clamped to
/// `0.0..=1.0`; `0.0` yields the minimum and `1.0` the maximum.
///
/// The caller guarantees ordering; use [`quantile`] for raw data.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n == 1 {
        return Some(sorted[0]);
    }

    let q = q.clamp(0.0, 1.0);
    let h = (n - 1) as f64 * q;
    let lo = h.floor() as usize;
    if lo + 1 >= n {
        return Some(sorted[n - 1]);
    }

    let frac = h - lo as f64;
    Some(sorted[lo] + frac * (sorted[lo + 1] - sorted[lo]))
}

/// Computes q1, median and q3 of an ascending-sorted, finite slice.
pub fn quartiles_sorted(sorted: &[f64]) -> Option<Quartiles> {
    Some(Quartiles {
        q1: quantile_sorted(sorted, 0.25)?,
        median: quantile_sorted(sorted, 0.5)?,
        q3: quantile_sorted(sorted, 0.75)?,
    })
}

/// Computes an arbitrary quantile of raw values.
///
/// Non-finite values are skipped; `None` means no finite values remained.
/// The fraction must lie in `0.0..=1.0`.
///
/// # Examples
///
/// ```rust
/// use fivenum::stats::quantile;
///
/// let wages = vec![15.0, 20.0, 35.0, 40.0, 50.0];
/// let p10 = quantile(&wages, 0.10).unwrap();
/// assert_eq!(p10, Some(17.0));
/// ```
pub fn quantile(values: &[f64], q: f64) -> Result<Option<f64>> {
    InputValidator::validate_fraction(q, "quantile")?;
    Ok(quantile_sorted(&sorted_finite(values), q))
}

/// Computes the quartiles of raw values.
///
/// Non-finite values are skipped; `None` means no finite values remained.
pub fn quartiles(values: &[f64]) -> Option<Quartiles> {
    quartiles_sorted(&sorted_finite(values))
}

fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    finite.sort_by(f64::total_cmp);
    finite
}
