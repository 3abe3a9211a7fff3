//! Criticality Scoring (ICI)
//!
//! Maps the consensus verdict to the bounded 0-100 criticality index.
//!
//! Monotonicity is the defining correctness property and holds by
//! construction: the amplification table is validated nondecreasing,
//! both terms enter with nonnegative weight, and the sum is capped.
//! For fixed confidence, more detections never lower the index; for a
//! fixed detection count, more confidence never lowers it.

use serde::{Deserialize, Serialize};

use crate::consensus::ConsensusResult;
use crate::error::ConfigError;

// ============================================================================
// AMPLIFICATION TABLE
// ============================================================================

/// Nondecreasing multiplier indexed by detection count (0..=K).
///
/// Broad agreement among detectors is worth more than the raw ratio
/// suggests; the tail of the table leans into that. Values are tuning
/// parameters, not structural constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmplificationTable {
    values: Vec<f32>,
}

impl AmplificationTable {
    /// Build from raw values, enforcing length K+1 and monotonicity.
    pub fn new(values: Vec<f32>, detector_count: usize) -> Result<Self, ConfigError> {
        validate_table(&values, detector_count)?;
        Ok(Self { values })
    }

    /// Suggested defaults for a bank of `detector_count` detectors:
    /// 1.0 at low counts rising to 2.5 at full consensus, interpolated
    /// linearly in between.
    pub fn default_for(detector_count: usize) -> Self {
        Self {
            values: default_values(detector_count),
        }
    }

    pub fn get(&self, detection_count: usize) -> f32 {
        // Config validation pins len to K+1; clamp is for defensive reads.
        let index = detection_count.min(self.values.len() - 1);
        self.values[index]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

/// Default amplification values for a bank of `detector_count`.
pub fn default_values(detector_count: usize) -> Vec<f32> {
    let k = detector_count.max(1);
    (0..=k)
        .map(|n| {
            if n <= 1 {
                1.0
            } else {
                // Linear ramp from 1.0 at n=1 to 2.5 at n=K.
                1.0 + 1.5 * (n - 1) as f32 / (k - 1).max(1) as f32
            }
        })
        .collect()
}

/// Shared validation for configured tables.
pub fn validate_table(values: &[f32], detector_count: usize) -> Result<(), ConfigError> {
    if values.len() != detector_count + 1 {
        return Err(ConfigError::AmplificationLength {
            expected: detector_count + 1,
            got: values.len(),
        });
    }
    for (index, pair) in values.windows(2).enumerate() {
        if pair[1] < pair[0] {
            return Err(ConfigError::AmplificationNotMonotonic { index: index + 1 });
        }
    }
    if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(ConfigError::NonFiniteValue {
            location: "amplification table".to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// CRITICALITY INDEX
// ============================================================================

/// Compute the criticality index from a consensus verdict.
///
/// `ICI = min(100, 0.5 * (S_ratio + S_conf))` where
/// `S_ratio = (count / K) * 100 * A(count)`.
pub fn criticality_index(
    consensus: &ConsensusResult,
    detector_count: usize,
    amplification: &AmplificationTable,
) -> f32 {
    let k = detector_count.max(1) as f32;
    let count = consensus.detection_count as f32;

    let s_ratio = (count / k) * 100.0 * amplification.get(consensus.detection_count);
    let s_conf = consensus.weighted_confidence;

    (0.5 * (s_ratio + s_conf)).min(100.0).max(0.0)
}

// ============================================================================
// TESTS
// ============================================================================
