//! Response Mapping
//!
//! Deterministic lookup from the criticality index to one of a fixed,
//! ordered set of response actions. The mapper is a pure function: it
//! selects the action, an external collaborator executes it.
//!
//! Tiers are half-open `[lower, upper)` except the top tier, which
//! includes 100. A value sitting exactly on a boundary belongs to the
//! higher tier.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ============================================================================
// RESPONSE ACTIONS
// ============================================================================

/// Ordered escalation ladder. Variant order is severity order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResponseAction {
    /// Nominal: keep watching.
    ContinueMonitoring,
    /// Tighten sampling on the source.
    ElevatedMonitoring,
    /// Page a human.
    AlertOperators,
    /// Rate-limit the offending source.
    ThrottleSource,
    /// Cut the source off from the rest of the system.
    IsolateSource,
    /// Shift load to redundant capacity.
    FailoverRedundant,
    /// Stop everything.
    EmergencyShutdown,
}

impl ResponseAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseAction::ContinueMonitoring => "continue_monitoring",
            ResponseAction::ElevatedMonitoring => "elevated_monitoring",
            ResponseAction::AlertOperators => "alert_operators",
            ResponseAction::ThrottleSource => "throttle_source",
            ResponseAction::IsolateSource => "isolate_source",
            ResponseAction::FailoverRedundant => "failover_redundant",
            ResponseAction::EmergencyShutdown => "emergency_shutdown",
        }
    }

    pub fn severity_level(&self) -> u8 {
        match self {
            ResponseAction::ContinueMonitoring => 0,
            ResponseAction::ElevatedMonitoring => 1,
            ResponseAction::AlertOperators => 2,
            ResponseAction::ThrottleSource => 3,
            ResponseAction::IsolateSource => 4,
            ResponseAction::FailoverRedundant => 5,
            ResponseAction::EmergencyShutdown => 6,
        }
    }
}

impl std::fmt::Display for ResponseAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// TIER TABLE
// ============================================================================

/// One `[lower, upper)` band of the criticality range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseTier {
    pub lower: f32,
    pub upper: f32,
    pub action: ResponseAction,
}

impl ResponseTier {
    pub fn new(lower: f32, upper: f32, action: ResponseAction) -> Self {
        Self {
            lower,
            upper,
            action,
        }
    }
}

/// Validated, ordered, exhaustive cover of [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierTable {
    tiers: Vec<ResponseTier>,
}

impl TierTable {
    pub fn new(tiers: Vec<ResponseTier>) -> Result<Self, ConfigError> {
        validate_tiers(&tiers)?;
        Ok(Self { tiers })
    }

    /// Suggested seven-tier ladder.
    pub fn default_table() -> Self {
        Self {
            tiers: default_tiers(),
        }
    }

    /// Map a criticality index to its action. Out-of-range inputs are
    /// clamped into [0, 100] first; the pipeline only produces values in
    /// range, this keeps the mapper total.
    pub fn lookup(&self, ici: f32) -> ResponseAction {
        let ici = ici.clamp(0.0, 100.0);

        for tier in &self.tiers {
            if ici >= tier.lower && ici < tier.upper {
                return tier.action;
            }
        }
        // Only 100.0 itself falls through the half-open scan: top tier.
        self.tiers[self.tiers.len() - 1].action
    }

    pub fn tiers(&self) -> &[ResponseTier] {
        &self.tiers
    }
}

/// Suggested default boundaries.
pub fn default_tiers() -> Vec<ResponseTier> {
    vec![
        ResponseTier::new(0.0, 15.0, ResponseAction::ContinueMonitoring),
        ResponseTier::new(15.0, 30.0, ResponseAction::ElevatedMonitoring),
        ResponseTier::new(30.0, 45.0, ResponseAction::AlertOperators),
        ResponseTier::new(45.0, 60.0, ResponseAction::ThrottleSource),
        ResponseTier::new(60.0, 75.0, ResponseAction::IsolateSource),
        ResponseTier::new(75.0, 90.0, ResponseAction::FailoverRedundant),
        ResponseTier::new(90.0, 100.0, ResponseAction::EmergencyShutdown),
    ]
}

/// Shared validation for configured tier tables.
pub fn validate_tiers(tiers: &[ResponseTier]) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidTierTable {
        reason: reason.to_string(),
    };

    if tiers.is_empty() {
        return Err(invalid("no tiers configured"));
    }
    if tiers[0].lower != 0.0 {
        return Err(invalid("first tier must start at 0"));
    }
    if tiers[tiers.len() - 1].upper != 100.0 {
        return Err(invalid("last tier must end at 100"));
    }
    for tier in tiers {
        if !tier.lower.is_finite() || !tier.upper.is_finite() || tier.lower >= tier.upper {
            return Err(invalid("tier bounds must be finite and strictly increasing"));
        }
    }
    for pair in tiers.windows(2) {
        if pair[0].upper != pair[1].lower {
            return Err(invalid("tiers must be contiguous without gaps or overlap"));
        }
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
