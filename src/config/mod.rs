//! Engine Configuration
//!
//! The whole tuning surface in one validated struct: detector bank
//! composition, quorum threshold, domain weight vectors, amplification
//! table, response tiers. Loaded at startup, swapped only through the
//! engine's audited reconfiguration call.
//!
//! Validation is eager and atomic: a bad config is rejected as a whole
//! at load/reload time, never lazily per sample.

use serde::{Deserialize, Serialize};

use crate::detectors::builtin_detector_ids;
use crate::domain::DomainSpec;
use crate::error::ConfigError;
use crate::features::FEATURE_COUNT;
use crate::response::{self, ResponseTier};
use crate::scoring;

// ============================================================================
// DEFAULTS
// ============================================================================

/// Default rolling-baseline window per detector, in samples.
pub const DEFAULT_BASELINE_WINDOW: usize = 100;

/// Default per-detector deadline, in milliseconds.
pub const DEFAULT_DEADLINE_MS: u64 = 5;

/// Default per-detector detection threshold.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Default quorum for a bank of `k`: ceil(4/7 * K).
pub fn default_quorum(k: usize) -> usize {
    ((4 * k) + 6) / 7
}

// ============================================================================
// PER-DETECTOR CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Registry id of the detector implementation.
    pub id: String,
    /// Domain where this detector's confidence counts at full weight.
    pub home_domain: String,
    /// Detection threshold on the amplified confidence, in (0, 1).
    pub threshold: f32,
    /// Fusion weight, >= 0.
    pub weight: f32,
    /// Evaluation deadline; past it the result is substituted.
    pub deadline_ms: u64,
}

impl DetectorConfig {
    pub fn new(id: impl Into<String>, home_domain: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            home_domain: home_domain.into(),
            threshold: DEFAULT_THRESHOLD,
            weight: 1.0,
            deadline_ms: DEFAULT_DEADLINE_MS,
        }
    }
}

// ============================================================================
// ENGINE CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Monotonically increasing version stamped into every decision
    /// record, so records are traceable to the config that produced them.
    pub config_version: u32,
    /// Minimum detections for consensus, in [1, K].
    pub quorum: usize,
    /// Bank composition, in fixed evaluation order. K = len.
    pub detectors: Vec<DetectorConfig>,
    /// Named domains with positional weight vectors over the feature layout.
    pub domains: Vec<DomainSpec>,
    /// Amplification values indexed by detection count, length K + 1.
    pub amplification: Vec<f32>,
    /// Response tier table covering [0, 100].
    pub tiers: Vec<ResponseTier>,
    /// Rolling-baseline window shared by the built-in detectors.
    pub baseline_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let detectors = default_detectors();
        let k = detectors.len();
        Self {
            config_version: 1,
            quorum: default_quorum(k),
            detectors,
            domains: default_domains(),
            amplification: scoring::default_values(k),
            tiers: response::default_tiers(),
            baseline_window: DEFAULT_BASELINE_WINDOW,
        }
    }
}

impl EngineConfig {
    /// Number of detectors in the bank (K).
    pub fn detector_count(&self) -> usize {
        self.detectors.len()
    }

    /// Fusion weights in bank order.
    pub fn detector_weights(&self) -> Vec<f32> {
        self.detectors.iter().map(|d| d.weight).collect()
    }

    /// Full eager validation. Everything or nothing: a failing config
    /// must not be installed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let k = self.detector_count();

        if k == 0 {
            return Err(ConfigError::EmptyBank);
        }
        if self.baseline_window == 0 {
            return Err(ConfigError::BaselineWindowZero);
        }
        if self.quorum < 1 || self.quorum > k {
            return Err(ConfigError::QuorumOutOfRange {
                quorum: self.quorum,
                detector_count: k,
            });
        }

        for (index, detector) in self.detectors.iter().enumerate() {
            if self.detectors[..index].iter().any(|d| d.id == detector.id) {
                return Err(ConfigError::DuplicateDetector {
                    id: detector.id.clone(),
                });
            }
            if !(detector.threshold > 0.0 && detector.threshold < 1.0) {
                return Err(ConfigError::ThresholdOutOfRange {
                    detector: detector.id.clone(),
                    value: detector.threshold,
                });
            }
            if !detector.weight.is_finite() || detector.weight < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    detector: detector.id.clone(),
                });
            }
        }

        if self.domains.is_empty() {
            return Err(ConfigError::NoDomains);
        }
        for domain in &self.domains {
            if domain.weights.len() != FEATURE_COUNT {
                return Err(ConfigError::DimensionMismatch {
                    domain: domain.name.clone(),
                    got: domain.weights.len(),
                    expected: FEATURE_COUNT,
                });
            }
            if domain.weights.iter().any(|w| !w.is_finite()) {
                return Err(ConfigError::NonFiniteValue {
                    location: format!("domain '{}' weight vector", domain.name),
                });
            }
        }

        scoring::validate_table(&self.amplification, k)?;
        response::validate_tiers(&self.tiers)?;

        Ok(())
    }
}

// ============================================================================
// DEFAULT BANK / DOMAINS
// ============================================================================

/// Built-in seven-detector bank with home-domain assignments.
pub fn default_detectors() -> Vec<DetectorConfig> {
    let homes = [
        "network",    // spectral_shift
        "process",    // gradient_burst
        "compute",    // variance_regime
        "storage",    // amplitude_entropy
        "compute",    // energy_surge
        "network",    // autocorr_drift
        "storage",    // tail_shape
    ];

    builtin_detector_ids()
        .iter()
        .zip(homes)
        .map(|(id, home)| DetectorConfig::new(*id, home))
        .collect()
}

/// Default domain set with weight vectors emphasizing the sub-vector
/// most telling for each domain.
pub fn default_domains() -> Vec<DomainSpec> {
    vec![
        // Periodic traffic: spectral shape dominates.
        DomainSpec::new(
            "network",
            vec![0.9, 0.8, 0.6, 0.2, 0.1, 0.4, 0.2, 0.1, 0.0, 0.0],
        ),
        // Lifecycle churn: temporal dynamics dominate.
        DomainSpec::new(
            "process",
            vec![0.1, 0.2, 0.1, 0.9, 0.7, 0.6, 0.2, 0.1, 0.2, 0.1],
        ),
        // Load signals: energy and variance dominate.
        DomainSpec::new(
            "compute",
            vec![0.2, 0.1, 0.1, 0.3, 0.8, 0.1, 0.9, 0.2, 0.1, 0.3],
        ),
        // I/O patterns: distribution shape dominates.
        DomainSpec::new(
            "storage",
            vec![0.1, 0.3, 0.1, 0.2, 0.2, 0.2, 0.2, 0.9, 0.5, 0.5],
        ),
    ]
}

// ============================================================================
// TESTS
// ============================================================================
