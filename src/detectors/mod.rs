//! Detector Bank - pluggable anomaly detectors
//!
//! Every detector implements one capability contract: look at the
//! feature vector (and the classified domain) and report a confidence.
//! Detectors own their rolling baseline state exclusively; nothing else
//! reads or writes it, and updates happen only after a sample's
//! evaluation has completed.
//!
//! The bank (see `bank.rs`) owns concurrency, deadlines, home-domain
//! amplification and fault substitution - detectors stay pure.

pub mod bank;
pub mod baseline;
pub mod builtin;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::ClassifiedDomain;
use crate::features::FeatureVector;

pub use bank::{BankIncident, DetectorBank, DetectorSlot, IncidentKind};

// ============================================================================
// AMPLIFICATION CONSTANTS
// ============================================================================

/// Confidence multiplier inside the detector's home domain.
pub const HOME_DOMAIN_FACTOR: f32 = 1.0;

/// Confidence multiplier outside the home domain. A specialist is still
/// heard off its turf, just dampened.
pub const FOREIGN_DOMAIN_FACTOR: f32 = 0.6;

// ============================================================================
// CAPABILITY CONTRACT
// ============================================================================

/// Raw output of one detector for one sample, before the bank applies
/// domain amplification and the detection threshold.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Raw confidence in [0, 1].
    pub confidence: f32,
    /// Short human-readable explanation for triage.
    pub reason: String,
}

impl Detection {
    pub fn quiet() -> Self {
        Self {
            confidence: 0.0,
            reason: String::new(),
        }
    }
}

/// Capability contract for all detectors.
///
/// `evaluate` must be pure apart from reading the detector's own
/// baseline; `observe` is the only mutation point and the bank calls it
/// strictly after the sample's fan-out has joined.
pub trait Detector: Send + Sync {
    fn id(&self) -> &str;
    fn evaluate(&self, features: &FeatureVector, domain: &ClassifiedDomain) -> Detection;
    fn observe(&self, features: &FeatureVector);
    fn stats(&self) -> String {
        String::new()
    }
}

// ============================================================================
// DETECTOR RESULT
// ============================================================================

/// Final per-detector verdict for one sample. Created once by the bank,
/// never mutated; fusion borrows it read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorResult {
    pub detector_id: String,
    /// Amplified confidence in [0, 1].
    pub confidence: f32,
    pub detected: bool,
    /// The detector's configured home domain.
    pub domain_specialization: String,
    /// Short human-readable explanation (empty for quiet/substituted results).
    pub reason: String,
}

impl DetectorResult {
    /// Zero-confidence stand-in for a timed-out or faulted detector.
    pub fn substituted(detector_id: &str, domain_specialization: &str, reason: &str) -> Self {
        Self {
            detector_id: detector_id.to_string(),
            confidence: 0.0,
            detected: false,
            domain_specialization: domain_specialization.to_string(),
            reason: reason.to_string(),
        }
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Instantiate a built-in detector by id.
///
/// Returns `None` for unknown ids; configuration validation turns that
/// into `ConfigError::UnknownDetector` before an engine is built.
pub fn build_detector(id: &str, baseline_window: usize) -> Option<Arc<dyn Detector>> {
    use builtin::*;

    let detector: Arc<dyn Detector> = match id {
        SPECTRAL_SHIFT_ID => Arc::new(SpectralShiftDetector::new(baseline_window)),
        GRADIENT_BURST_ID => Arc::new(GradientBurstDetector::new(baseline_window)),
        VARIANCE_REGIME_ID => Arc::new(VarianceRegimeDetector::new(baseline_window)),
        AMPLITUDE_ENTROPY_ID => Arc::new(AmplitudeEntropyDetector::new(baseline_window)),
        ENERGY_SURGE_ID => Arc::new(EnergySurgeDetector::new(baseline_window)),
        AUTOCORR_DRIFT_ID => Arc::new(AutocorrDriftDetector::new(baseline_window)),
        TAIL_SHAPE_ID => Arc::new(TailShapeDetector::new(baseline_window)),
        _ => return None,
    };
    Some(detector)
}

/// Ids of the built-in detector set, in bank order.
pub fn builtin_detector_ids() -> &'static [&'static str] {
    use builtin::*;
    &[
        SPECTRAL_SHIFT_ID,
        GRADIENT_BURST_ID,
        VARIANCE_REGIME_ID,
        AMPLITUDE_ENTROPY_ID,
        ENERGY_SURGE_ID,
        AUTOCORR_DRIFT_ID,
        TAIL_SHAPE_ID,
    ]
}
