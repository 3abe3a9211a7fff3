//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! ## Why versioning matters:
//! - Decision records must be replayable across engine versions
//! - Detector baselines are only comparable within one layout
//! - Domain weight vectors are positional

use crc32fast::Hasher;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version.
/// MUST be incremented when the layout changes.
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in the exact order they appear in the vector.
/// This is the SINGLE SOURCE OF TRUTH for the feature layout.
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Spectral (0-2) ===
    "spectral_density",        // 0: Mean FFT magnitude
    "spectral_entropy",        // 1: Shannon entropy of the normalized spectrum
    "dominant_frequency_index", // 2: Bin index of the strongest spectral line

    // === Temporal (3-5) ===
    "mean_abs_gradient",       // 3: Mean absolute first difference
    "variance",                // 4: Population variance of the sequence
    "lag1_autocorrelation",    // 5: Lag-1 autocorrelation coefficient

    // === Statistical (6-9) ===
    "energy",                  // 6: Mean squared amplitude
    "entropy",                 // 7: Amplitude entropy over nonzero terms
    "skewness",                // 8: Third standardized moment
    "excess_kurtosis",         // 9: Fourth standardized moment minus 3
];

/// Total number of features.
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 10;

/// Index range of the spectral sub-vector.
pub const SPECTRAL_RANGE: std::ops::Range<usize> = 0..3;
/// Index range of the temporal sub-vector.
pub const TEMPORAL_RANGE: std::ops::Range<usize> = 3..6;
/// Index range of the statistical sub-vector.
pub const STATISTICAL_RANGE: std::ops::Range<usize> = 6..10;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute the CRC32 hash of the feature layout.
/// Used to detect layout mismatches at runtime.
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    // Include version in hash
    hasher.update(&[FEATURE_VERSION]);

    // Hash all feature names in order
    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

static LAYOUT_HASH: Lazy<u32> = Lazy::new(compute_layout_hash);

/// Get the layout hash (computed once; inputs are const).
pub fn layout_hash() -> u32 {
    *LAYOUT_HASH
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when a feature vector's layout doesn't match the current one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Feature layout mismatch: expected v{} (hash: {:08x}), got v{} (hash: {:08x})",
            self.expected_version, self.expected_hash, self.actual_version, self.actual_hash
        )
    }
}

impl std::error::Error for LayoutMismatchError {}

/// Validate that incoming data matches the current layout.
pub fn validate_layout(
    incoming_version: u8,
    incoming_hash: u32,
) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name (O(n) but features are few).
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index.
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 10);
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_sub_vector_ranges_cover_layout() {
        assert_eq!(SPECTRAL_RANGE.end, TEMPORAL_RANGE.start);
        assert_eq!(TEMPORAL_RANGE.end, STATISTICAL_RANGE.start);
        assert_eq!(STATISTICAL_RANGE.end, FEATURE_COUNT);
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(compute_layout_hash(), compute_layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_validate_layout() {
        assert!(validate_layout(FEATURE_VERSION, layout_hash()).is_ok());
        assert!(validate_layout(FEATURE_VERSION + 1, layout_hash()).is_err());
        assert!(validate_layout(FEATURE_VERSION, layout_hash().wrapping_add(1)).is_err());
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("spectral_density"), Some(0));
        assert_eq!(feature_index("variance"), Some(4));
        assert_eq!(feature_index("excess_kurtosis"), Some(9));
        assert_eq!(feature_index("nonexistent"), None);
    }

    #[test]
    fn test_feature_name() {
        assert_eq!(feature_name(0), Some("spectral_density"));
        assert_eq!(feature_name(9), Some("excess_kurtosis"));
        assert_eq!(feature_name(10), None);
    }
}
