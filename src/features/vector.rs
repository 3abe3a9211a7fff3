//! Feature Vector - Core data structure of the pipeline
//!
//! **Versioned feature vector with layout validation**
//!
//! Uses the centralized layout from `layout.rs` for:
//! - Consistent feature ordering
//! - Version tracking
//! - Layout hash for compatibility checks
//!
//! Immutable once extracted: every downstream stage reads it, nothing
//! mutates it.

use serde::{Deserialize, Serialize};

use super::layout::{
    layout_hash, validate_layout, LayoutMismatchError, FEATURE_COUNT, FEATURE_LAYOUT,
    FEATURE_VERSION, SPECTRAL_RANGE, STATISTICAL_RANGE, TEMPORAL_RANGE,
};

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

/// Versioned feature vector with layout metadata.
///
/// This struct MUST be used for all feature data. Never pass raw
/// `Vec<f32>` between stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    /// Feature values in the order defined by FEATURE_LAYOUT
    pub values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    /// Create from raw values with the current version.
    pub fn from_values(values: [f32; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    /// Get values as a slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Get a feature by index.
    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// Get a feature by name.
    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        super::layout::feature_index(name).and_then(|i| self.get(i))
    }

    /// True when every field is finite. Extraction guarantees this; the
    /// signature stage re-checks it before hashing.
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// Validate that this vector is compatible with the current layout.
    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.version, self.layout_hash)
    }

    /// The spectral sub-vector.
    pub fn spectral(&self) -> SpectralFeatures {
        SpectralFeatures {
            spectral_density: self.values[SPECTRAL_RANGE.start],
            spectral_entropy: self.values[SPECTRAL_RANGE.start + 1],
            dominant_frequency_index: self.values[SPECTRAL_RANGE.start + 2],
        }
    }

    /// The temporal sub-vector.
    pub fn temporal(&self) -> TemporalFeatures {
        TemporalFeatures {
            mean_abs_gradient: self.values[TEMPORAL_RANGE.start],
            variance: self.values[TEMPORAL_RANGE.start + 1],
            lag1_autocorrelation: self.values[TEMPORAL_RANGE.start + 2],
        }
    }

    /// The statistical sub-vector.
    pub fn statistical(&self) -> StatisticalFeatures {
        StatisticalFeatures {
            energy: self.values[STATISTICAL_RANGE.start],
            entropy: self.values[STATISTICAL_RANGE.start + 1],
            skewness: self.values[STATISTICAL_RANGE.start + 2],
            excess_kurtosis: self.values[STATISTICAL_RANGE.start + 3],
        }
    }

    /// Convert to a JSON-serializable format for logging.
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "values": self.values,
            "named_values": FEATURE_LAYOUT.iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<std::collections::HashMap<_, _>>(),
        })
    }
}

// ============================================================================
// SUB-VECTOR VIEWS
// ============================================================================

/// Frequency-domain summary of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralFeatures {
    pub spectral_density: f32,
    pub spectral_entropy: f32,
    pub dominant_frequency_index: f32,
}

/// Time-domain dynamics of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemporalFeatures {
    pub mean_abs_gradient: f32,
    pub variance: f32,
    pub lag1_autocorrelation: f32,
}

/// Distribution-shape summary of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatisticalFeatures {
    pub energy: f32,
    pub entropy: f32,
    pub skewness: f32,
    pub excess_kurtosis: f32,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values() {
        let vector = FeatureVector::from_values([1.0; FEATURE_COUNT]);
        assert_eq!(vector.version, FEATURE_VERSION);
        assert_eq!(vector.layout_hash, layout_hash());
        assert!(vector.validate().is_ok());
    }

    #[test]
    fn test_get_by_name() {
        let mut values = [0.0; FEATURE_COUNT];
        values[4] = 2.5;
        let vector = FeatureVector::from_values(values);
        assert_eq!(vector.get_by_name("variance"), Some(2.5));
        assert_eq!(vector.get_by_name("nonexistent"), None);
    }

    #[test]
    fn test_sub_vectors() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let vector = FeatureVector::from_values(values);

        let spectral = vector.spectral();
        assert_eq!(spectral.spectral_density, 0.0);
        assert_eq!(spectral.dominant_frequency_index, 2.0);

        let temporal = vector.temporal();
        assert_eq!(temporal.mean_abs_gradient, 3.0);
        assert_eq!(temporal.lag1_autocorrelation, 5.0);

        let statistical = vector.statistical();
        assert_eq!(statistical.energy, 6.0);
        assert_eq!(statistical.excess_kurtosis, 9.0);
    }

    #[test]
    fn test_is_finite() {
        let vector = FeatureVector::from_values([1.0; FEATURE_COUNT]);
        assert!(vector.is_finite());

        let mut bad = [1.0; FEATURE_COUNT];
        bad[3] = f32::NAN;
        assert!(!FeatureVector::from_values(bad).is_finite());
    }

    #[test]
    fn test_to_log_entry() {
        let vector = FeatureVector::from_values([1.0; FEATURE_COUNT]);
        let log = vector.to_log_entry();
        assert_eq!(log["feature_version"], FEATURE_VERSION);
        assert!(log["layout_hash"].as_u64().is_some());
        assert!(log["named_values"]["variance"].as_f64().is_some());
    }
}
