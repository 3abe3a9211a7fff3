//! Error Taxonomy
//!
//! Three failure classes with different blast radii:
//! - `InputError`: sample rejected before feature extraction, caller retries with better data
//! - `ConfigError`: configuration rejected atomically at load/reload, old config stays active
//! - `PipelineError`: per-sample hard failure surfaced to the caller
//!
//! Detector timeouts and faults are NOT errors at this level - the bank
//! recovers them locally by substitution and they never fail a sample.

use thiserror::Error;

// ============================================================================
// INPUT ERRORS
// ============================================================================

/// Sample rejected before feature extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Gradient and autocorrelation need at least two points.
    #[error("telemetry sequence too short: {len} value(s), minimum is {min}")]
    TooShort { len: usize, min: usize },

    /// NaN/Inf in the raw sequence would poison every downstream stage.
    #[error("telemetry sequence contains a non-finite value at index {index}")]
    NonFinite { index: usize },
}

// ============================================================================
// CONFIG ERRORS
// ============================================================================

/// Configuration rejected at load or reload time.
///
/// Reconfiguration is atomic: any of these leaves the previous
/// configuration active.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Domain weight vector length must match the feature layout.
    #[error("domain '{domain}': weight vector has {got} entries, expected {expected}")]
    DimensionMismatch {
        domain: String,
        got: usize,
        expected: usize,
    },

    /// Per-detector detection threshold must lie strictly inside (0, 1).
    #[error("detector '{detector}': threshold {value} outside open interval (0, 1)")]
    ThresholdOutOfRange { detector: String, value: f32 },

    /// Quorum must be an integer in [1, K].
    #[error("quorum threshold {quorum} outside [1, {detector_count}]")]
    QuorumOutOfRange {
        quorum: usize,
        detector_count: usize,
    },

    /// Amplification table is indexed by detection count 0..=K.
    #[error("amplification table has {got} entries, expected {expected} (detector count + 1)")]
    AmplificationLength { expected: usize, got: usize },

    /// A decreasing amplification table would break score monotonicity.
    #[error("amplification table decreases at index {index}")]
    AmplificationNotMonotonic { index: usize },

    /// Response tiers must cover [0, 100] contiguously without overlap.
    #[error("invalid response tier table: {reason}")]
    InvalidTierTable { reason: String },

    /// Detector id not present in the registry.
    #[error("unknown detector id '{id}'")]
    UnknownDetector { id: String },

    /// Two bank slots with the same id would make results ambiguous.
    #[error("duplicate detector id '{id}'")]
    DuplicateDetector { id: String },

    #[error("detector weight for '{detector}' must be finite and non-negative")]
    InvalidWeight { detector: String },

    #[error("detector bank must not be empty")]
    EmptyBank,

    /// Caller-supplied detector instances must align one-to-one with
    /// the configured bank slots.
    #[error("detector instances do not match configuration: expected {expected}, got {got}")]
    BankMismatch { expected: usize, got: usize },

    #[error("at least one domain must be configured")]
    NoDomains,

    #[error("baseline window must be at least 1 sample")]
    BaselineWindowZero,

    #[error("non-finite value in {location}")]
    NonFiniteValue { location: String },
}

// ============================================================================
// PIPELINE ERRORS
// ============================================================================

/// Hard per-sample failure. The caller receives either a complete
/// `DecisionRecord` or one of these - never a partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),

    /// The sample cannot proceed without an identity; it is dropped with
    /// this explicit error, never silently skipped.
    #[error("state signature computation failed: {reason}")]
    SignatureComputation { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_display() {
        let err = InputError::TooShort { len: 1, min: 2 };
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::DimensionMismatch {
            domain: "network".to_string(),
            got: 8,
            expected: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("network"));
        assert!(msg.contains("8"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn test_pipeline_error_from_input() {
        let err: PipelineError = InputError::TooShort { len: 0, min: 2 }.into();
        assert!(matches!(err, PipelineError::Input(_)));
    }
}
