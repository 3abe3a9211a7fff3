//! Engine - pipeline wiring
//!
//! One logical pipeline instance per engine:
//!
//! `TelemetrySample -> extract -> {classify, sign} -> detector fan-out
//! -> consensus -> criticality -> response -> DecisionRecord`
//!
//! Every stage except the detector fan-out is a synchronous, bounded
//! pure computation. The caller always receives either a complete
//! record or a typed error - never a partial result.
//!
//! Configuration is swapped only through `reconfigure`, which validates
//! the replacement atomically and writes an audit entry; a rejected
//! config leaves the old one active. Each sample is processed entirely
//! under one config snapshot.

pub mod record;


use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

use crate::audit::{AuditAction, AuditEntry, AuditStats, AuditTrail};
use crate::config::EngineConfig;
use crate::consensus;
use crate::detectors::bank::DetectorStats;
use crate::detectors::{build_detector, Detector, DetectorBank, DetectorSlot, IncidentKind};
use crate::domain;
use crate::error::{ConfigError, PipelineError};
use crate::features;
use crate::response::TierTable;
use crate::sample::TelemetrySample;
use crate::scoring::{self, AmplificationTable};
use crate::signature;

pub use record::{DecisionRecord, MemorySink, RecordSink};

// ============================================================================
// ENGINE STATE
// ============================================================================

/// Immutable snapshot of one configuration generation. Samples clone
/// the `Arc` and run against a consistent view even across a
/// mid-flight reconfigure.
struct EngineState {
    config: EngineConfig,
    bank: DetectorBank,
    weights: Vec<f32>,
    amplification: AmplificationTable,
    tiers: TierTable,
}

impl EngineState {
    fn build(config: EngineConfig, detectors: Vec<Arc<dyn Detector>>) -> Result<Self, ConfigError> {
        config.validate()?;

        let slots: Vec<DetectorSlot> = config
            .detectors
            .iter()
            .cloned()
            .zip(detectors)
            .map(|(config, detector)| DetectorSlot { config, detector })
            .collect();

        let weights = config.detector_weights();
        let amplification =
            AmplificationTable::new(config.amplification.clone(), config.detector_count())?;
        let tiers = TierTable::new(config.tiers.clone())?;

        Ok(Self {
            config,
            bank: DetectorBank::new(slots),
            weights,
            amplification,
            tiers,
        })
    }

    fn build_from_registry(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let detectors = config
            .detectors
            .iter()
            .map(|d| {
                build_detector(&d.id, config.baseline_window).ok_or_else(|| {
                    ConfigError::UnknownDetector { id: d.id.clone() }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::build(config, detectors)
    }
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct Engine {
    state: RwLock<Arc<EngineState>>,
    audit: AuditTrail,
    sink: Option<Arc<dyn RecordSink>>,
    samples_processed: AtomicU64,
    consensus_hits: AtomicU64,
    last_ici: RwLock<Option<f32>>,
}

impl Engine {
    /// Build an engine from configuration, instantiating detectors from
    /// the built-in registry.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let state = EngineState::build_from_registry(config)?;
        Ok(Self::from_state(state))
    }

    /// Build an engine with caller-supplied detector instances, aligned
    /// one-to-one with `config.detectors`. This is the extension point
    /// for custom detectors outside the built-in registry.
    pub fn with_detectors(
        config: EngineConfig,
        detectors: Vec<Arc<dyn Detector>>,
    ) -> Result<Self, ConfigError> {
        if detectors.len() != config.detectors.len() {
            return Err(ConfigError::BankMismatch {
                expected: config.detectors.len(),
                got: detectors.len(),
            });
        }
        let state = EngineState::build(config, detectors)?;
        Ok(Self::from_state(state))
    }

    fn from_state(state: EngineState) -> Self {
        let audit = AuditTrail::new();
        audit.record(
            AuditEntry::new(AuditAction::EngineStart).with_detail(format!(
                "config v{}, {} detectors, quorum {}",
                state.config.config_version,
                state.config.detector_count(),
                state.config.quorum
            )),
        );
        log::info!(
            "engine started: config v{}, K={}, quorum={}",
            state.config.config_version,
            state.config.detector_count(),
            state.config.quorum
        );

        Self {
            state: RwLock::new(Arc::new(state)),
            audit,
            sink: None,
            samples_processed: AtomicU64::new(0),
            consensus_hits: AtomicU64::new(0),
            last_ici: RwLock::new(None),
        }
    }

    /// Attach the external record collaborator.
    pub fn with_sink(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    // ------------------------------------------------------------------
    // PROCESSING
    // ------------------------------------------------------------------

    /// Run one sample through the full pipeline.
    pub async fn process(&self, sample: &TelemetrySample) -> Result<DecisionRecord, PipelineError> {
        // Snapshot the config generation; the guard is dropped before
        // any await point.
        let state = Arc::clone(&self.state.read());

        // 1. Feature extraction (pure, rejects bad input)
        let feature_vector = features::extract(sample)?;

        // 2. Domain classification and state identity
        let (domain_scores, classified) = domain::classify(&feature_vector, &state.config.domains);
        let state_signature = signature::compute(&classified, &domain_scores, &feature_vector)?;

        // 3. Detector fan-out (the only concurrent stage)
        let (detector_results, incidents) =
            state.bank.evaluate_all(&feature_vector, &classified).await;

        for incident in &incidents {
            let action = match incident.kind {
                IncidentKind::Timeout => AuditAction::DetectorTimeout,
                IncidentKind::Fault => AuditAction::DetectorFault,
            };
            self.audit.record(
                AuditEntry::new(action).with_detail(format!("detector '{}'", incident.detector_id)),
            );
        }

        // 4. Fan-in: consensus, criticality, response
        let consensus_result =
            consensus::fuse(&detector_results, &state.weights, state.config.quorum);
        let ici = scoring::criticality_index(
            &consensus_result,
            state.config.detector_count(),
            &state.amplification,
        );
        let response_action = state.tiers.lookup(ici);

        let record = DecisionRecord {
            record_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source_id: sample.source_id.clone(),
            state_signature: state_signature.to_hex(),
            feature_version: feature_vector.version,
            layout_hash: feature_vector.layout_hash,
            feature_vector: feature_vector.clone(),
            domain: classified.name.clone(),
            domain_score: classified.score,
            detector_results,
            detection_count: consensus_result.detection_count,
            consensus_reached: consensus_result.consensus_reached,
            weighted_confidence: consensus_result.weighted_confidence,
            ici_score: ici,
            response_action,
            config_version: state.config.config_version,
        };

        if let Some(sink) = &self.sink {
            sink.emit(&record);
        }

        // 5. Baselines learn the sample only after its evaluation is done.
        state.bank.observe_all(&feature_vector);

        self.samples_processed.fetch_add(1, Ordering::Relaxed);
        if consensus_result.consensus_reached {
            self.consensus_hits.fetch_add(1, Ordering::Relaxed);
        }
        *self.last_ici.write() = Some(ici);

        log::debug!(
            "sample '{}': domain={}, detections={}/{}, ici={:.1}, action={}",
            sample.source_id,
            record.domain,
            record.detection_count,
            state.config.detector_count(),
            ici,
            response_action
        );

        Ok(record)
    }

    // ------------------------------------------------------------------
    // RECONFIGURATION
    // ------------------------------------------------------------------

    /// Replace the active configuration.
    ///
    /// Validation is atomic: on any error the old configuration stays
    /// active untouched. A successful swap writes audit entries with
    /// old and new values and the acting principal - there is no silent
    /// reconfiguration path. Detector baselines restart cold under the
    /// new configuration.
    pub fn reconfigure(&self, new_config: EngineConfig, actor: &str) -> Result<(), ConfigError> {
        let new_state = EngineState::build_from_registry(new_config)?;

        let mut state = self.state.write();
        let old_version = state.config.config_version;
        let old_quorum = state.config.quorum;

        if old_quorum != new_state.config.quorum {
            self.audit.record(
                AuditEntry::new(AuditAction::QuorumChanged)
                    .with_actor(actor)
                    .with_change(old_quorum, new_state.config.quorum),
            );
            log::info!(
                "quorum threshold changed: {} -> {} (actor: {})",
                old_quorum,
                new_state.config.quorum,
                actor
            );
        }

        self.audit.record(
            AuditEntry::new(AuditAction::Reconfigured)
                .with_actor(actor)
                .with_change(
                    format!("v{}", old_version),
                    format!("v{}", new_state.config.config_version),
                ),
        );
        log::info!(
            "reconfigured: v{} -> v{} (actor: {})",
            old_version,
            new_state.config.config_version,
            actor
        );

        *state = Arc::new(new_state);
        Ok(())
    }

    // ------------------------------------------------------------------
    // INTROSPECTION
    // ------------------------------------------------------------------

    /// Cheap status snapshot.
    pub fn status(&self) -> EngineStatus {
        let state = Arc::clone(&self.state.read());
        EngineStatus {
            config_version: state.config.config_version,
            detector_count: state.config.detector_count(),
            quorum: state.config.quorum,
            samples_processed: self.samples_processed.load(Ordering::Relaxed),
            consensus_hits: self.consensus_hits.load(Ordering::Relaxed),
            last_ici: *self.last_ici.read(),
            detectors: state.bank.detector_stats(),
            audit: self.audit.stats(),
        }
    }

    /// Recent audit entries, oldest first.
    pub fn audit_recent(&self, limit: usize) -> Vec<AuditEntry> {
        self.audit.recent(limit)
    }

    /// The active configuration (cloned snapshot).
    pub fn config(&self) -> EngineConfig {
        self.state.read().config.clone()
    }
}

// ============================================================================
// STATUS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub config_version: u32,
    pub detector_count: usize,
    pub quorum: usize,
    pub samples_processed: u64,
    pub consensus_hits: u64,
    pub last_ici: Option<f32>,
    pub detectors: Vec<DetectorStats>,
    pub audit: AuditStats,
}
