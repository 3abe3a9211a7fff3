//! Telemetry Sample
//!
//! Immutable input record from an external collector. Captured once,
//! consumed exactly once by feature extraction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum sequence length the pipeline accepts.
///
/// Gradient and lag-1 autocorrelation are undefined below two points.
pub const MIN_SEQUENCE_LEN: usize = 2;

/// A raw telemetry capture: an ordered sequence of real-valued measurements
/// plus provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Identifier of the emitting source (sensor, host, channel).
    pub source_id: String,
    /// Capture timestamp assigned by the collector.
    pub timestamp: DateTime<Utc>,
    /// Sampling rate of the sequence, in Hz.
    pub sample_rate_hz: f32,
    /// The measurement sequence, in capture order.
    pub values: Vec<f32>,
}

impl TelemetrySample {
    pub fn new(source_id: impl Into<String>, sample_rate_hz: f32, values: Vec<f32>) -> Self {
        Self {
            source_id: source_id.into(),
            timestamp: Utc::now(),
            sample_rate_hz,
            values,
        }
    }

    /// Same sample with an explicit timestamp (replay, testing).
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_construction() {
        let sample = TelemetrySample::new("sensor-1", 100.0, vec![1.0, 2.0, 3.0]);
        assert_eq!(sample.source_id, "sensor-1");
        assert_eq!(sample.len(), 3);
        assert!(!sample.is_empty());
    }
}
