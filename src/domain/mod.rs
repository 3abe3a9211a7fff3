//! Domain Classification
//!
//! Scores the feature vector against a small set of named domains and
//! selects the best match. Weight vectors are positional over the
//! feature layout and validated at configuration load, never per sample.
//!
//! Tie-break is deterministic and documented: on an exact score tie the
//! domain with the lowest configured index wins.

use serde::{Deserialize, Serialize};

use crate::features::{FeatureVector, FEATURE_COUNT};

// ============================================================================
// TYPES
// ============================================================================

/// A named domain with its positional weight vector.
///
/// `weights` must have exactly one entry per feature; length is checked
/// by `EngineConfig::validate`, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainSpec {
    pub name: String,
    pub weights: Vec<f32>,
}

impl DomainSpec {
    pub fn new(name: impl Into<String>, weights: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            weights,
        }
    }
}

/// Per-domain scores in configured order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainScores {
    entries: Vec<(String, f32)>,
}

impl DomainScores {
    pub fn get(&self, name: &str) -> Option<f32> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| *s)
    }

    /// Entries in configured domain order.
    pub fn iter(&self) -> impl Iterator<Item = &(String, f32)> {
        self.entries.iter()
    }

    /// Entries sorted by domain name. Canonical form for hashing.
    pub fn sorted_by_name(&self) -> Vec<(String, f32)> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        sorted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The winning domain for one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedDomain {
    pub name: String,
    /// Position in the configured domain list.
    pub index: usize,
    pub score: f32,
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Score the vector against every domain and pick the winner.
///
/// Score is the dot product of the domain's weight vector with the
/// feature values. Caller guarantees `domains` is non-empty and each
/// weight vector has `FEATURE_COUNT` entries (config validation).
pub fn classify(features: &FeatureVector, domains: &[DomainSpec]) -> (DomainScores, ClassifiedDomain) {
    debug_assert!(!domains.is_empty());

    let mut entries = Vec::with_capacity(domains.len());
    let mut best_index = 0usize;
    let mut best_score = f32::NEG_INFINITY;

    for (index, domain) in domains.iter().enumerate() {
        debug_assert_eq!(domain.weights.len(), FEATURE_COUNT);

        let score: f32 = domain
            .weights
            .iter()
            .zip(features.as_slice())
            .map(|(w, v)| w * v)
            .sum();

        // Strict '>' keeps the lowest index on an exact tie.
        if score > best_score {
            best_score = score;
            best_index = index;
        }

        entries.push((domain.name.clone(), score));
    }

    let classified = ClassifiedDomain {
        name: domains[best_index].name.clone(),
        index: best_index,
        score: best_score,
    };

    (DomainScores { entries }, classified)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fv(values: [f32; FEATURE_COUNT]) -> FeatureVector {
        FeatureVector::from_values(values)
    }

    fn unit_weights() -> Vec<f32> {
        vec![1.0; FEATURE_COUNT]
    }

    #[test]
    fn test_max_score_wins() {
        let features = fv([1.0; FEATURE_COUNT]);
        let domains = vec![
            DomainSpec::new("low", vec![0.1; FEATURE_COUNT]),
            DomainSpec::new("high", vec![0.9; FEATURE_COUNT]),
        ];

        let (scores, classified) = classify(&features, &domains);
        assert_eq!(classified.name, "high");
        assert_eq!(classified.index, 1);
        assert!(scores.get("low").unwrap() < scores.get("high").unwrap());
    }

    #[test]
    fn test_exact_tie_selects_lowest_index() {
        let features = fv([1.0; FEATURE_COUNT]);
        let domains = vec![
            DomainSpec::new("alpha", unit_weights()),
            DomainSpec::new("beta", unit_weights()),
            DomainSpec::new("gamma", unit_weights()),
        ];

        let (_, classified) = classify(&features, &domains);
        assert_eq!(classified.name, "alpha");
        assert_eq!(classified.index, 0);
    }

    #[test]
    fn test_negative_scores_still_classify() {
        let features = fv([-1.0; FEATURE_COUNT]);
        let domains = vec![
            DomainSpec::new("a", vec![2.0; FEATURE_COUNT]),
            DomainSpec::new("b", vec![1.0; FEATURE_COUNT]),
        ];

        // -20 vs -10: "b" is the larger score.
        let (_, classified) = classify(&features, &domains);
        assert_eq!(classified.name, "b");
    }

    #[test]
    fn test_scores_preserve_configured_order() {
        let features = fv([1.0; FEATURE_COUNT]);
        let domains = vec![
            DomainSpec::new("zulu", unit_weights()),
            DomainSpec::new("alpha", unit_weights()),
        ];

        let (scores, _) = classify(&features, &domains);
        let order: Vec<&str> = scores.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(order, vec!["zulu", "alpha"]);

        let sorted: Vec<String> = scores.sorted_by_name().into_iter().map(|(n, _)| n).collect();
        assert_eq!(sorted, vec!["alpha".to_string(), "zulu".to_string()]);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let features = fv([0.3, 1.5, 2.0, 0.7, 0.2, -0.4, 3.3, 1.1, 0.0, -0.9]);
        let domains = vec![
            DomainSpec::new("a", vec![0.9, 0.8, 0.6, 0.2, 0.1, 0.3, 0.2, 0.1, 0.0, 0.0]),
            DomainSpec::new("b", vec![0.1, 0.2, 0.1, 0.9, 0.7, 0.6, 0.2, 0.1, 0.2, 0.1]),
        ];

        let (s1, c1) = classify(&features, &domains);
        let (s2, c2) = classify(&features, &domains);
        assert_eq!(s1, s2);
        assert_eq!(c1, c2);
    }
}
