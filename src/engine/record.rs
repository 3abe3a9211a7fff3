//! Decision Record
//!
//! The externally emitted result of one processed sample. Created once,
//! immutable, handed to the audit/log collaborator through `RecordSink`.
//! Carries the feature layout contract so stored records stay
//! replayable across engine versions.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consensus::ConsensusResult;
use crate::detectors::DetectorResult;
use crate::features::FeatureVector;
use crate::response::ResponseAction;

// ============================================================================
// RECORD
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub record_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub source_id: String,

    /// Hex form of the 256-bit state signature.
    pub state_signature: String,

    // Feature contract
    pub feature_version: u8,
    pub layout_hash: u32,
    pub feature_vector: FeatureVector,

    // Classification
    pub domain: String,
    pub domain_score: f32,

    // Detection
    pub detector_results: Vec<DetectorResult>,
    pub detection_count: usize,
    pub consensus_reached: bool,
    pub weighted_confidence: f32,

    // Decision
    pub ici_score: f32,
    pub response_action: ResponseAction,

    /// Configuration version active when this record was produced.
    pub config_version: u32,
}

impl DecisionRecord {
    /// Structured log form for the external collaborator.
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "record_id": self.record_id,
            "timestamp": self.timestamp.to_rfc3339(),
            "source_id": self.source_id,
            "state_signature": self.state_signature,
            "feature_vector": self.feature_vector.to_log_entry(),
            "domain": self.domain,
            "detector_results": self.detector_results.iter().map(|r| {
                serde_json::json!({
                    "detector_id": r.detector_id,
                    "confidence": r.confidence,
                    "detected": r.detected,
                })
            }).collect::<Vec<_>>(),
            "detection_count": self.detection_count,
            "consensus_reached": self.consensus_reached,
            "weighted_confidence": self.weighted_confidence,
            "ici_score": self.ici_score,
            "response_action": self.response_action.as_str(),
            "config_version": self.config_version,
        })
    }

    /// Convenience view of the consensus fields.
    pub fn consensus(&self) -> ConsensusResult {
        ConsensusResult {
            detection_count: self.detection_count,
            consensus_reached: self.consensus_reached,
            weighted_confidence: self.weighted_confidence,
        }
    }
}

// ============================================================================
// RECORD SINK
// ============================================================================

/// External audit/log collaborator boundary. Implementations must not
/// block the pipeline; heavy sinks should hand off internally.
pub trait RecordSink: Send + Sync {
    fn emit(&self, record: &DecisionRecord);
}

/// In-memory sink for tests and embedding without a collaborator.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: RwLock<Vec<DecisionRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<DecisionRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl RecordSink for MemorySink {
    fn emit(&self, record: &DecisionRecord) {
        self.records.write().push(record.clone());
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FEATURE_COUNT, FEATURE_VERSION};

    fn record() -> DecisionRecord {
        DecisionRecord {
            record_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source_id: "sensor-1".to_string(),
            state_signature: "ab".repeat(32),
            feature_version: FEATURE_VERSION,
            layout_hash: crate::features::layout::layout_hash(),
            feature_vector: FeatureVector::from_values([1.0; FEATURE_COUNT]),
            domain: "network".to_string(),
            domain_score: 3.2,
            detector_results: vec![],
            detection_count: 0,
            consensus_reached: false,
            weighted_confidence: 0.0,
            ici_score: 0.0,
            response_action: ResponseAction::ContinueMonitoring,
            config_version: 1,
        }
    }

    #[test]
    fn test_log_entry_shape() {
        let entry = record().to_log_entry();
        assert_eq!(entry["source_id"], "sensor-1");
        assert_eq!(entry["response_action"], "continue_monitoring");
        assert_eq!(entry["config_version"], 1);
        assert!(entry["feature_vector"]["values"].is_array());
    }

    #[test]
    fn test_serde_roundtrip() {
        let original = record();
        let json = serde_json::to_string(&original).unwrap();
        let back: DecisionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.record_id, original.record_id);
        assert_eq!(back.state_signature, original.state_signature);
    }

    #[test]
    fn test_memory_sink_collects() {
        let sink = MemorySink::new();
        sink.emit(&record());
        sink.emit(&record());
        assert_eq!(sink.len(), 2);
    }
}
