//! State Signature
//!
//! Deterministic SHA-256 digest over the classified domain, the full
//! domain score map and the feature vector. Identity and audit key
//! only - it never drives a detection decision and is never a source
//! of entropy.
//!
//! Canonical serialization: domain-score keys sorted by name, feature
//! fields in layout order, f32 values as little-endian bit patterns.
//! Same input always hashes to the same digest.

use sha2::{Digest, Sha256};

use crate::domain::{ClassifiedDomain, DomainScores};
use crate::error::PipelineError;
use crate::features::FeatureVector;

/// Domain separation tag; bump the suffix if the canonical form changes.
const SIGNATURE_TAG: &[u8] = b"signalshield.state.v1";

// ============================================================================
// SIGNATURE VALUE
// ============================================================================

/// Opaque 256-bit state identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateSignature {
    bytes: [u8; 32],
}

impl StateSignature {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Lowercase hex form used in decision records.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl std::fmt::Display for StateSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// ============================================================================
// COMPUTATION
// ============================================================================

/// Compute the state signature for one classified sample.
///
/// Fails only when the inputs cannot be canonicalized - a non-finite
/// value has no stable bit pattern contract across NaN payloads, so it
/// is rejected rather than hashed. The caller drops the sample with an
/// explicit error; it is never silently skipped.
pub fn compute(
    domain: &ClassifiedDomain,
    scores: &DomainScores,
    features: &FeatureVector,
) -> Result<StateSignature, PipelineError> {
    if !features.is_finite() {
        return Err(PipelineError::SignatureComputation {
            reason: "feature vector contains a non-finite value".to_string(),
        });
    }
    if !domain.score.is_finite() || scores.iter().any(|(_, s)| !s.is_finite()) {
        return Err(PipelineError::SignatureComputation {
            reason: "domain score contains a non-finite value".to_string(),
        });
    }

    let mut hasher = Sha256::new();
    hasher.update(SIGNATURE_TAG);

    // Classified domain: name, configured index, score.
    write_str(&mut hasher, &domain.name);
    hasher.update((domain.index as u64).to_le_bytes());
    hasher.update(domain.score.to_le_bytes());

    // Domain score map, keys sorted for order independence.
    let sorted = scores.sorted_by_name();
    hasher.update((sorted.len() as u64).to_le_bytes());
    for (name, score) in &sorted {
        write_str(&mut hasher, name);
        hasher.update(score.to_le_bytes());
    }

    // Feature vector: layout contract plus values in layout order.
    hasher.update([features.version]);
    hasher.update(features.layout_hash.to_le_bytes());
    for value in features.as_slice() {
        hasher.update(value.to_le_bytes());
    }

    Ok(StateSignature {
        bytes: hasher.finalize().into(),
    })
}

/// Length-prefixed string write; avoids ambiguity between adjacent names.
fn write_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{classify, DomainSpec};
    use crate::features::FEATURE_COUNT;

    fn classified(values: [f32; FEATURE_COUNT]) -> (DomainScores, ClassifiedDomain, FeatureVector) {
        let features = FeatureVector::from_values(values);
        let domains = vec![
            DomainSpec::new("network", vec![0.5; FEATURE_COUNT]),
            DomainSpec::new("process", vec![0.2; FEATURE_COUNT]),
        ];
        let (scores, domain) = classify(&features, &domains);
        (scores, domain, features)
    }

    #[test]
    fn test_signature_is_deterministic() {
        let (scores, domain, features) = classified([1.5; FEATURE_COUNT]);
        let a = compute(&domain, &scores, &features).unwrap();
        let b = compute(&domain, &scores, &features).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_hex(), b.to_hex());
    }

    #[test]
    fn test_signature_is_256_bit_hex() {
        let (scores, domain, features) = classified([0.25; FEATURE_COUNT]);
        let sig = compute(&domain, &scores, &features).unwrap();
        assert_eq!(sig.as_bytes().len(), 32);
        assert_eq!(sig.to_hex().len(), 64);
        assert!(sig.to_hex().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_different_features_different_signature() {
        let (scores_a, domain_a, features_a) = classified([1.0; FEATURE_COUNT]);
        let (scores_b, domain_b, features_b) = classified([2.0; FEATURE_COUNT]);
        let a = compute(&domain_a, &scores_a, &features_a).unwrap();
        let b = compute(&domain_b, &scores_b, &features_b).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_non_finite_feature_rejected() {
        let (scores, domain, _) = classified([1.0; FEATURE_COUNT]);
        let mut bad = [1.0; FEATURE_COUNT];
        bad[7] = f32::NAN;
        let features = FeatureVector::from_values(bad);

        let err = compute(&domain, &scores, &features).unwrap_err();
        assert!(matches!(err, PipelineError::SignatureComputation { .. }));
    }
}
