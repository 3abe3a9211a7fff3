//! Detector Bank - concurrent fan-out with bulkhead isolation
//!
//! The only fan-out point of the pipeline. All K detectors run as
//! independent tasks against the same immutable feature vector and are
//! joined in fixed bank order, so downstream fusion is deterministic
//! regardless of completion order.
//!
//! A detector that overruns its deadline or panics is substituted with
//! a zero-confidence result on the spot: one slow or faulting detector
//! can neither delay nor crash fusion. Total bank latency is bounded by
//! the slowest deadline, not the sum.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::DetectorConfig;
use crate::domain::ClassifiedDomain;
use crate::features::FeatureVector;

use super::{Detector, DetectorResult, FOREIGN_DOMAIN_FACTOR, HOME_DOMAIN_FACTOR};

// ============================================================================
// SLOT
// ============================================================================

/// One bank position: a detector instance plus its configuration.
pub struct DetectorSlot {
    pub config: DetectorConfig,
    pub detector: Arc<dyn Detector>,
}

// ============================================================================
// INCIDENTS
// ============================================================================

/// Why a result was substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentKind {
    Timeout,
    Fault,
}

/// A substitution event, reported to the caller for the audit trail.
#[derive(Debug, Clone)]
pub struct BankIncident {
    pub detector_id: String,
    pub kind: IncidentKind,
}

// ============================================================================
// BANK
// ============================================================================

pub struct DetectorBank {
    slots: Vec<DetectorSlot>,
    timeout_count: Vec<AtomicU64>,
    fault_count: Vec<AtomicU64>,
}

impl DetectorBank {
    pub fn new(slots: Vec<DetectorSlot>) -> Self {
        let n = slots.len();
        Self {
            slots,
            timeout_count: (0..n).map(|_| AtomicU64::new(0)).collect(),
            fault_count: (0..n).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Evaluate all detectors concurrently against one sample.
    ///
    /// Returns K results in bank order plus the substitution incidents
    /// of this evaluation. Always K results - substitution, not absence.
    pub async fn evaluate_all(
        &self,
        features: &FeatureVector,
        domain: &ClassifiedDomain,
    ) -> (Vec<DetectorResult>, Vec<BankIncident>) {
        // Fan out: one task per detector, all sharing the immutable input.
        let handles: Vec<_> = self
            .slots
            .iter()
            .map(|slot| {
                let detector = Arc::clone(&slot.detector);
                let features = features.clone();
                let domain = domain.clone();
                tokio::spawn(async move { detector.evaluate(&features, &domain) })
            })
            .collect();

        // Fan in: fixed bank order, individual deadlines.
        let mut results = Vec::with_capacity(self.slots.len());
        let mut incidents = Vec::new();

        for (index, (slot, handle)) in self.slots.iter().zip(handles).enumerate() {
            let deadline = Duration::from_millis(slot.config.deadline_ms);
            let config = &slot.config;
            let abort_handle = handle.abort_handle();

            let result = match tokio::time::timeout(deadline, handle).await {
                Ok(Ok(detection)) => {
                    let factor = if domain.name == config.home_domain {
                        HOME_DOMAIN_FACTOR
                    } else {
                        FOREIGN_DOMAIN_FACTOR
                    };
                    let confidence = (detection.confidence.clamp(0.0, 1.0)) * factor;

                    DetectorResult {
                        detector_id: config.id.clone(),
                        confidence,
                        detected: confidence > config.threshold,
                        domain_specialization: config.home_domain.clone(),
                        reason: detection.reason,
                    }
                }
                Ok(Err(join_err)) => {
                    // Panic inside evaluate: isolated at the bank boundary.
                    log::warn!(
                        "detector '{}' faulted, substituting zero-confidence result: {}",
                        config.id,
                        join_err
                    );
                    self.fault_count[index].fetch_add(1, Ordering::Relaxed);
                    incidents.push(BankIncident {
                        detector_id: config.id.clone(),
                        kind: IncidentKind::Fault,
                    });
                    DetectorResult::substituted(
                        &config.id,
                        &config.home_domain,
                        "substituted: detector fault",
                    )
                }
                Err(_elapsed) => {
                    // The barrier moves on immediately; the task itself is
                    // cancelled at its next yield point.
                    abort_handle.abort();
                    log::warn!(
                        "detector '{}' exceeded its {}ms deadline, substituting zero-confidence result",
                        config.id,
                        config.deadline_ms
                    );
                    self.timeout_count[index].fetch_add(1, Ordering::Relaxed);
                    incidents.push(BankIncident {
                        detector_id: config.id.clone(),
                        kind: IncidentKind::Timeout,
                    });
                    DetectorResult::substituted(
                        &config.id,
                        &config.home_domain,
                        "substituted: deadline exceeded",
                    )
                }
            };

            results.push(result);
        }

        (results, incidents)
    }

    /// Feed the processed sample into every detector's baseline.
    /// Called strictly after `evaluate_all` has joined - baselines never
    /// move mid-evaluation.
    pub fn observe_all(&self, features: &FeatureVector) {
        for slot in &self.slots {
            slot.detector.observe(features);
        }
    }

    /// Per-detector diagnostics: (id, substitutions, internal stats).
    pub fn detector_stats(&self) -> Vec<DetectorStats> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| DetectorStats {
                detector_id: slot.config.id.clone(),
                home_domain: slot.config.home_domain.clone(),
                timeouts: self.timeout_count[index].load(Ordering::Relaxed),
                faults: self.fault_count[index].load(Ordering::Relaxed),
                baseline: slot.detector.stats(),
            })
            .collect()
    }
}

/// Snapshot of one detector's health.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DetectorStats {
    pub detector_id: String,
    pub home_domain: String,
    pub timeouts: u64,
    pub faults: u64,
    pub baseline: String,
}

// ============================================================================
// TESTS
// ============================================================================
