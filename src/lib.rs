//! SignalShield Core - Telemetry Threat Scoring Engine
//!
//! Real-time pipeline from raw telemetry to an auditable response
//! decision:
//!
//! ```text
//! TelemetrySample -> FeatureExtractor -> {DomainClassifier, StateSignature}
//!                 -> DetectorBank (parallel fan-out)
//!                 -> ConsensusFusion -> CriticalityScorer -> ResponseMapper
//!                 -> DecisionRecord
//! ```
//!
//! The engine is a library: it is invoked by a surrounding service and
//! hands every decision to an external audit collaborator through
//! [`RecordSink`]. Detector faults and timeouts are isolated inside the
//! bank; callers always receive a complete [`DecisionRecord`] or a
//! typed error.
//!
//! ## Quick start
//!
//! ```no_run
//! use signalshield_core::{Engine, EngineConfig, TelemetrySample};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Engine::new(EngineConfig::default())?;
//!
//! let sample = TelemetrySample::new("sensor-1", 100.0, vec![1.0, 3.0, 2.0, 5.0]);
//! let record = engine.process(&sample).await?;
//!
//! println!("ici={} action={}", record.ici_score, record.response_action);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod config;
pub mod consensus;
pub mod detectors;
pub mod domain;
pub mod engine;
pub mod error;
pub mod features;
pub mod response;
pub mod sample;
pub mod scoring;
pub mod signature;

// Re-export the main surface
pub use audit::{AuditAction, AuditEntry, AuditStats};
pub use config::{DetectorConfig, EngineConfig};
pub use consensus::ConsensusResult;
pub use detectors::{Detection, Detector, DetectorResult};
pub use domain::{ClassifiedDomain, DomainScores, DomainSpec};
pub use engine::{DecisionRecord, Engine, EngineStatus, MemorySink, RecordSink};
pub use error::{ConfigError, InputError, PipelineError};
pub use features::{FeatureVector, FEATURE_COUNT};
pub use response::{ResponseAction, ResponseTier, TierTable};
pub use sample::TelemetrySample;
pub use scoring::AmplificationTable;
pub use signature::StateSignature;
