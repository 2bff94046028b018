use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecisionSide {
    Long,
    Short,
    Flat,
}

/// Strategy-produced proposal. Immutable once constructed; `valid_until_ts`
/// must be at least `created_at + horizon_ms` (enforced by `new`, not by the
/// gate — a malformed decision is a strategy bug, not a gate rejection).
#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    pub decision_id: String,
    pub symbol: String,
    pub side: DecisionSide,
    pub confidence: f64,
    pub horizon_ms: i64,
    pub valid_until_ts: i64,
    pub model_hash: String,
    pub features_hash: String,
    pub policy_version: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyMode {
    DryRun,
    Prod,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PolicySnapshot {
    pub min_confidence: f64,
    pub allowed_policy_versions: BTreeSet<String>,
    pub ops_blacklist_symbols: BTreeSet<String>,
    pub cooldown_ms: i64,
    pub mode: PolicyMode,
}

/// Mutable gate state. Only the pipeline driver writes to it, and only on a
/// `WOULD_EXECUTE` outcome — `evaluate` itself never mutates anything, which
/// is what makes replay deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GateState {
    pub last_decision_ts_by_symbol: BTreeMap<String, i64>,
    pub active_decision_symbols: BTreeSet<String>,
}

impl GateState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the effect of a `WOULD_EXECUTE` outcome. Not called by
    /// `evaluate` itself; the driver calls this exactly once per accepted
    /// decision.
    pub fn record_execution(&mut self, symbol: &str, now: i64) {
        self.last_decision_ts_by_symbol.insert(symbol.to_string(), now);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionOutcome {
    WouldExecute,
    Rejected,
    Skipped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReasonCode {
    Passed,
    LowConfidence,
    ExpiredDecision,
    CooldownActive,
    PolicyRejected,
    OpsBlacklisted,
    NoActiveDecisionAllowed,
    InvalidMode,
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReasonCode::Passed => "PASSED",
            ReasonCode::LowConfidence => "LOW_CONFIDENCE",
            ReasonCode::ExpiredDecision => "EXPIRED_DECISION",
            ReasonCode::CooldownActive => "COOLDOWN_ACTIVE",
            ReasonCode::PolicyRejected => "POLICY_REJECTED",
            ReasonCode::OpsBlacklisted => "OPS_BLACKLISTED",
            ReasonCode::NoActiveDecisionAllowed => "NO_ACTIVE_DECISION_ALLOWED",
            ReasonCode::InvalidMode => "INVALID_MODE",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionResult {
    pub decision_id: String,
    pub symbol: String,
    pub outcome: ExecutionOutcome,
    pub reason_code: ReasonCode,
    pub evaluated_at: i64,
    pub policy_snapshot: PolicySnapshot,
    pub policy_version: String,
}
