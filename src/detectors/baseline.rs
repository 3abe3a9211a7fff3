//! Rolling Baseline
//!
//! Bounded window of recently observed values with z-score deviation
//! scoring. Each detector owns its baselines exclusively - the window
//! is behind a lock only because evaluation (read) and post-sample
//! observation (write) happen from different tasks, never concurrently
//! for the same sample.

use std::collections::VecDeque;

use parking_lot::RwLock;

/// Observations required before the baseline scores deviations.
/// Below this the detector reports zero confidence (warmup).
pub const MIN_BASELINE_SAMPLES: usize = 8;

/// z-scores saturate here; a 4-sigma deviation is already full confidence.
const Z_FULL_SCALE: f32 = 4.0;

/// Hard cap for the degenerate zero-variance baseline.
const Z_CAP: f32 = 8.0;

/// Bounded rolling window with mean/std tracking.
#[derive(Debug)]
pub struct RollingBaseline {
    window: usize,
    values: RwLock<VecDeque<f32>>,
}

impl RollingBaseline {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            values: RwLock::new(VecDeque::with_capacity(window.max(1))),
        }
    }

    /// Record a value after evaluation has completed. Memory stays
    /// constant: the oldest value falls out once the window is full.
    pub fn observe(&self, value: f32) {
        if !value.is_finite() {
            return;
        }
        let mut values = self.values.write();
        if values.len() == self.window {
            values.pop_front();
        }
        values.push_back(value);
    }

    /// Deviation of `value` from the window, in capped sigmas.
    /// `None` during warmup.
    pub fn zscore(&self, value: f32) -> Option<f32> {
        let values = self.values.read();
        if values.len() < MIN_BASELINE_SAMPLES {
            return None;
        }

        let n = values.len() as f32;
        let mean: f32 = values.iter().sum::<f32>() / n;
        let variance: f32 = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
        let std = variance.sqrt();

        if std > 0.0 {
            Some(((value - mean) / std).clamp(-Z_CAP, Z_CAP))
        } else if value == mean {
            Some(0.0)
        } else {
            // Any departure from a perfectly flat history is maximal.
            Some(if value > mean { Z_CAP } else { -Z_CAP })
        }
    }

    /// Two-sided confidence in [0, 1]: |z| saturating at four sigmas.
    pub fn confidence(&self, value: f32) -> f32 {
        match self.zscore(value) {
            Some(z) => (z.abs() / Z_FULL_SCALE).clamp(0.0, 1.0),
            None => 0.0,
        }
    }

    /// One-sided confidence in [0, 1]: only positive deviations count.
    pub fn confidence_above(&self, value: f32) -> f32 {
        match self.zscore(value) {
            Some(z) if z > 0.0 => (z / Z_FULL_SCALE).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    pub fn is_warm(&self) -> bool {
        self.len() >= MIN_BASELINE_SAMPLES
    }

    /// Mean and standard deviation snapshot, for stats strings.
    pub fn mean_std(&self) -> (f32, f32) {
        let values = self.values.read();
        if values.is_empty() {
            return (0.0, 0.0);
        }
        let n = values.len() as f32;
        let mean: f32 = values.iter().sum::<f32>() / n;
        let variance: f32 = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
        (mean, variance.sqrt())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn warmed(values: &[f32]) -> RollingBaseline {
        let baseline = RollingBaseline::new(100);
        for &v in values {
            baseline.observe(v);
        }
        baseline
    }

    #[test]
    fn test_warmup_returns_zero_confidence() {
        let baseline = warmed(&[1.0; 4]);
        assert!(!baseline.is_warm());
        assert_eq!(baseline.zscore(100.0), None);
        assert_eq!(baseline.confidence(100.0), 0.0);
    }

    #[test]
    fn test_window_is_bounded() {
        let baseline = RollingBaseline::new(10);
        for i in 0..50 {
            baseline.observe(i as f32);
        }
        assert_eq!(baseline.len(), 10);

        // Only the last 10 values (40..49) remain.
        let (mean, _) = baseline.mean_std();
        assert!((mean - 44.5).abs() < 1e-4);
    }

    #[test]
    fn test_zscore_of_outlier() {
        let baseline = warmed(&[10.0, 11.0, 9.0, 10.5, 9.5, 10.0, 10.2, 9.8, 10.1, 9.9]);
        let z = baseline.zscore(20.0).unwrap();
        assert!(z > 3.0);
        assert_eq!(baseline.confidence(20.0), 1.0);
    }

    #[test]
    fn test_flat_history_in_range_value() {
        let baseline = warmed(&[5.0; 20]);
        assert_eq!(baseline.zscore(5.0), Some(0.0));
        assert_eq!(baseline.confidence(5.0), 0.0);
    }

    #[test]
    fn test_flat_history_deviation_is_maximal() {
        let baseline = warmed(&[5.0; 20]);
        let z = baseline.zscore(5.1).unwrap();
        assert_eq!(z, 8.0);
        assert_eq!(baseline.confidence(5.1), 1.0);
    }

    #[test]
    fn test_one_sided_confidence() {
        let baseline = warmed(&[10.0, 11.0, 9.0, 10.5, 9.5, 10.0, 10.2, 9.8, 10.1, 9.9]);
        assert!(baseline.confidence_above(20.0) > 0.9);
        assert_eq!(baseline.confidence_above(1.0), 0.0); // below the mean
    }

    #[test]
    fn test_non_finite_observations_ignored() {
        let baseline = RollingBaseline::new(10);
        baseline.observe(f32::NAN);
        baseline.observe(f32::INFINITY);
        assert!(baseline.is_empty());
    }
}
