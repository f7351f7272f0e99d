//! Pure statistical building blocks: exact quantiles and percentile bins.
//!
//! Everything here operates on plain in-memory values with no I/O or
//! async; the `summary` module layers dataset access on top.

mod bins;
mod quantile;

pub use bins::{BinSpec, PercentileBins, PercentileBinsBuilder};
pub use quantile::{quantile, quantile_sorted, quartiles, quartiles_sorted, Quartiles};
