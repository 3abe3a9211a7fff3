//! Audit Trail - engine-level event log
//!
//! Every configuration change, quorum move and detector substitution
//! leaves an immutable entry: no silent reconfiguration, ever. The
//! trail is a bounded in-memory ring; durable storage is the caller's
//! collaborator and receives the same entries via the JSON line form.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Entries kept in memory before the oldest fall out.
const MAX_IN_MEMORY: usize = 1_000;

// ============================================================================
// ENTRY TYPES
// ============================================================================

/// Kinds of auditable engine events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    /// Engine constructed with an initial configuration.
    EngineStart,
    /// Full configuration swap.
    Reconfigured,
    /// Quorum threshold changed (also logged inside a reconfigure).
    QuorumChanged,
    /// A detector missed its deadline and was substituted.
    DetectorTimeout,
    /// A detector panicked and was substituted.
    DetectorFault,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::EngineStart => "engine_start",
            AuditAction::Reconfigured => "reconfigured",
            AuditAction::QuorumChanged => "quorum_changed",
            AuditAction::DetectorTimeout => "detector_timeout",
            AuditAction::DetectorFault => "detector_fault",
        }
    }
}

/// One immutable audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    /// Who triggered the change, for reconfiguration events.
    pub actor: Option<String>,
    /// Value before the change, serialized.
    pub old_value: Option<String>,
    /// Value after the change, serialized.
    pub new_value: Option<String>,
    pub detail: String,
}

impl AuditEntry {
    pub fn new(action: AuditAction) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            action,
            actor: None,
            old_value: None,
            new_value: None,
            detail: String::new(),
        }
    }

    pub fn with_actor(mut self, actor: &str) -> Self {
        self.actor = Some(actor.to_string());
        self
    }

    pub fn with_change(mut self, old_value: impl ToString, new_value: impl ToString) -> Self {
        self.old_value = Some(old_value.to_string());
        self.new_value = Some(new_value.to_string());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    /// JSON line form for an external audit collaborator.
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

// ============================================================================
// TRAIL
// ============================================================================

/// Bounded in-memory audit trail.
#[derive(Debug, Default)]
pub struct AuditTrail {
    entries: RwLock<Vec<AuditEntry>>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and mirror it to the log.
    pub fn record(&self, entry: AuditEntry) {
        log::info!(
            "[audit] {} actor={} old={} new={} {}",
            entry.action.as_str(),
            entry.actor.as_deref().unwrap_or("-"),
            entry.old_value.as_deref().unwrap_or("-"),
            entry.new_value.as_deref().unwrap_or("-"),
            entry.detail
        );

        let mut entries = self.entries.write();
        entries.push(entry);

        let len = entries.len();
        if len > MAX_IN_MEMORY {
            entries.drain(0..len - MAX_IN_MEMORY);
        }
    }

    /// The most recent `limit` entries, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.read();
        let start = entries.len().saturating_sub(limit);
        entries[start..].to_vec()
    }

    /// The most recent `limit` entries of one kind, newest first.
    pub fn by_action(&self, action: AuditAction, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.read();
        entries
            .iter()
            .rev()
            .filter(|e| e.action == action)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

// ============================================================================
// STATS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AuditStats {
    pub total_entries: usize,
    pub reconfigurations: usize,
    pub quorum_changes: usize,
    pub detector_timeouts: usize,
    pub detector_faults: usize,
}

impl AuditTrail {
    pub fn stats(&self) -> AuditStats {
        let entries = self.entries.read();
        let mut stats = AuditStats {
            total_entries: entries.len(),
            reconfigurations: 0,
            quorum_changes: 0,
            detector_timeouts: 0,
            detector_faults: 0,
        };

        for entry in entries.iter() {
            match entry.action {
                AuditAction::Reconfigured => stats.reconfigurations += 1,
                AuditAction::QuorumChanged => stats.quorum_changes += 1,
                AuditAction::DetectorTimeout => stats.detector_timeouts += 1,
                AuditAction::DetectorFault => stats.detector_faults += 1,
                AuditAction::EngineStart => {}
            }
        }

        stats
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_builder() {
        let entry = AuditEntry::new(AuditAction::QuorumChanged)
            .with_actor("ops@example")
            .with_change(4, 5)
            .with_detail("tightened quorum");

        assert_eq!(entry.action, AuditAction::QuorumChanged);
        assert_eq!(entry.actor.as_deref(), Some("ops@example"));
        assert_eq!(entry.old_value.as_deref(), Some("4"));
        assert_eq!(entry.new_value.as_deref(), Some("5"));
    }

    #[test]
    fn test_trail_records_and_queries() {
        let trail = AuditTrail::new();
        trail.record(AuditEntry::new(AuditAction::EngineStart));
        trail.record(AuditEntry::new(AuditAction::DetectorTimeout).with_detail("d1"));
        trail.record(AuditEntry::new(AuditAction::DetectorTimeout).with_detail("d2"));

        assert_eq!(trail.len(), 3);
        assert_eq!(trail.recent(2).len(), 2);
        assert_eq!(trail.by_action(AuditAction::DetectorTimeout, 10).len(), 2);
        assert_eq!(trail.by_action(AuditAction::Reconfigured, 10).len(), 0);

        let stats = trail.stats();
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.detector_timeouts, 2);
    }

    #[test]
    fn test_trail_is_bounded() {
        let trail = AuditTrail::new();
        for _ in 0..(MAX_IN_MEMORY + 100) {
            trail.record(AuditEntry::new(AuditAction::DetectorFault));
        }
        assert_eq!(trail.len(), MAX_IN_MEMORY);
    }

    #[test]
    fn test_json_line_is_parseable() {
        let entry = AuditEntry::new(AuditAction::Reconfigured).with_change("v1", "v2");
        let line = entry.to_json_line();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["action"], "Reconfigured");
    }
}
