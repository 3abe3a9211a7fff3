//! Consensus Fusion
//!
//! Fan-in stage: counts detections across the bank, applies the quorum
//! threshold and blends the firing detectors' confidences into a single
//! 0-100 score. Detector results are borrowed read-only; ordering is
//! the bank's fixed detector order, so the weighted sums are
//! deterministic regardless of completion order upstream.

use serde::{Deserialize, Serialize};

use crate::detectors::DetectorResult;

// ============================================================================
// RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// Number of detectors that flagged the sample.
    pub detection_count: usize,
    /// True when `detection_count >= quorum`.
    pub consensus_reached: bool,
    /// Weighted mean confidence of the firing detectors, scaled to [0, 100].
    /// 0 when nothing fired.
    pub weighted_confidence: f32,
}

// ============================================================================
// FUSION
// ============================================================================

/// Fuse the bank's results into a consensus verdict.
///
/// `weights` is aligned with `results` (one configured weight per bank
/// slot). Quorum is validated at config load to be in [1, K].
pub fn fuse(results: &[DetectorResult], weights: &[f32], quorum: usize) -> ConsensusResult {
    debug_assert_eq!(results.len(), weights.len());

    let detection_count = results.iter().filter(|r| r.detected).count();

    let mut weighted_sum = 0.0f32;
    let mut weight_total = 0.0f32;
    for (result, &weight) in results.iter().zip(weights) {
        if result.detected {
            weighted_sum += weight * result.confidence;
            weight_total += weight;
        }
    }

    // No detections (or all-zero weights) blend to 0, not NaN.
    let weighted_confidence = if weight_total > 0.0 {
        (weighted_sum / weight_total) * 100.0
    } else {
        0.0
    };

    ConsensusResult {
        detection_count,
        consensus_reached: detection_count >= quorum,
        weighted_confidence: weighted_confidence.clamp(0.0, 100.0),
    }
}

// ============================================================================
// TESTS
// ============================================================================
