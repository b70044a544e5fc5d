//! Summary Statistics
//!
//! Computes per-cell timing statistics with one design rule carried
//! throughout: mean, median and stddev come from the trimmed data, while
//! min and max always come from ALL data, so extreme iterations stay
//! visible even when trimming is enabled.

use crate::percentiles::compute_percentile;
use serde::{Deserialize, Serialize};

/// Summary statistics for one cell's timing sample, in nanoseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Mean of the (trimmed) sample.
    pub mean_ns: f64,
    /// Median of the (trimmed) sample.
    pub median_ns: f64,
    /// Sample standard deviation of the (trimmed) sample.
    pub std_dev_ns: f64,
    /// Minimum over ALL recorded iterations.
    pub min_ns: f64,
    /// Maximum over ALL recorded iterations.
    pub max_ns: f64,
    /// Number of recorded iterations, before trimming.
    pub sample_count: usize,
    /// Iterations excluded from the central-tendency statistics.
    pub trimmed_count: usize,
}

/// Compute summary statistics for one timing sample.
///
/// `trim_fraction` is the fraction of samples dropped from EACH tail before
/// computing mean/median/stddev; it is clamped to `[0, 0.25]`. Extremes are
/// always computed from the untrimmed data.
pub fn compute_summary(samples: &[f64], trim_fraction: f64) -> SummaryStatistics {
    if samples.is_empty() {
        return SummaryStatistics {
            mean_ns: 0.0,
            median_ns: 0.0,
            std_dev_ns: 0.0,
            min_ns: 0.0,
            max_ns: 0.0,
            sample_count: 0,
            trimmed_count: 0,
        };
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let trim_fraction = trim_fraction.clamp(0.0, 0.25);
    let cut = (sorted.len() as f64 * trim_fraction).floor() as usize;
    // Never trim the whole sample away.
    let cleaned = if cut * 2 >= sorted.len() {
        &sorted[..]
    } else {
        &sorted[cut..sorted.len() - cut]
    };

    let mean = cleaned.iter().sum::<f64>() / cleaned.len() as f64;
    let median = compute_percentile(cleaned, 50.0);
    let std_dev = if cleaned.len() < 2 {
        0.0
    } else {
        let variance = cleaned.iter().map(|x| (x - mean).powi(2)).sum::<f64>()
            / (cleaned.len() - 1) as f64;
        variance.sqrt()
    };

    SummaryStatistics {
        mean_ns: mean,
        median_ns: median,
        std_dev_ns: std_dev,
        min_ns: sorted[0],
        max_ns: sorted[sorted.len() - 1],
        sample_count: samples.len(),
        trimmed_count: samples.len() - cleaned.len(),
    }
}

impl SummaryStatistics {
    /// Coefficient of variation (relative stddev, in percent).
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean_ns == 0.0 {
            0.0
        } else {
            (self.std_dev_ns / self.mean_ns) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_summary() {
        let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let summary = compute_summary(&samples, 0.0);

        assert!((summary.mean_ns - 3.0).abs() < 0.01);
        assert!((summary.median_ns - 3.0).abs() < 0.01);
        assert_eq!(summary.min_ns, 1.0);
        assert_eq!(summary.max_ns, 5.0);
        assert_eq!(summary.sample_count, 5);
        assert_eq!(summary.trimmed_count, 0);
    }

    #[test]
    fn test_trim_excludes_tails_from_mean_but_not_extremes() {
        // 1000.0 is a gross outlier
        let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 1000.0];
        let summary = compute_summary(&samples, 0.1);

        // One sample cut from each tail: mean over 2..=9
        assert!(summary.mean_ns < 10.0);
        assert_eq!(summary.trimmed_count, 2);

        // Extremes come from ALL data
        assert_eq!(summary.min_ns, 1.0);
        assert_eq!(summary.max_ns, 1000.0);
        assert_eq!(summary.sample_count, 10);
    }

    #[test]
    fn test_trim_never_consumes_whole_sample() {
        let samples = vec![1.0, 2.0];
        let summary = compute_summary(&samples, 0.25);

        assert_eq!(summary.trimmed_count, 0);
        assert!((summary.mean_ns - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_sample() {
        let summary = compute_summary(&[42.0], 0.0);

        assert_eq!(summary.mean_ns, 42.0);
        assert_eq!(summary.std_dev_ns, 0.0);
        assert_eq!(summary.sample_count, 1);
    }

    #[test]
    fn test_empty_samples() {
        let summary = compute_summary(&[], 0.0);

        assert_eq!(summary.sample_count, 0);
        assert!((summary.mean_ns - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_coefficient_of_variation() {
        let samples = vec![100.0, 100.0, 100.0, 100.0];
        let summary = compute_summary(&samples, 0.0);

        assert!((summary.coefficient_of_variation() - 0.0).abs() < f64::EPSILON);
    }
}
