#![warn(missing_docs)]
//! Numbench Statistics
//!
//! Simple summary statistics over timing samples:
//! - Central tendency (mean, median, stddev) from optionally trimmed data
//! - Extremes (min, max) always from ALL data
//! - Percentile helper with linear interpolation
//!
//! Deliberately small: no bootstrap resampling, no outlier modelling. A
//! symmetric trim is the only cleaning this harness applies.

mod percentiles;
mod summary;

pub use percentiles::compute_percentile;
pub use summary::{compute_summary, SummaryStatistics};
