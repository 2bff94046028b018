use std::fmt;

use exd_killswitch::{self, KillSwitchConfig, KillSwitchOutcome, KillSwitchReason};
use exd_schemas::{MarginMode, PositionSide, TradeMode};

use crate::context::FuturesIntentContext;

/// Maximum leverage this workspace will ever route through the canary path.
pub const CANARY_MAX_LEVERAGE: f64 = 3.0;
/// Worst-case adverse move (as a fraction of entry price) the estimated
/// liquidation price must clear before a canary order is allowed.
pub const CANARY_WORST_CASE_MOVE_PCT: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum CanaryReason {
    Passed,
    GlobalKillActive,
    SymbolKillActive,
    LiveModeBlocked,
    LeverageExceeded,
    NotIsolated,
    NotReduceOnly,
    NotOneWay,
    LiquidationTooClose,
}

impl fmt::Display for CanaryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CanaryReason::Passed => "PASSED",
            CanaryReason::GlobalKillActive => "GLOBAL_KILL_ACTIVE",
            CanaryReason::SymbolKillActive => "SYMBOL_KILL_ACTIVE",
            CanaryReason::LiveModeBlocked => "LIVE_MODE_BLOCKED",
            CanaryReason::LeverageExceeded => "LEVERAGE_EXCEEDED",
            CanaryReason::NotIsolated => "NOT_ISOLATED",
            CanaryReason::NotReduceOnly => "NOT_REDUCE_ONLY",
            CanaryReason::NotOneWay => "NOT_ONE_WAY",
            CanaryReason::LiquidationTooClose => "LIQUIDATION_TOO_CLOSE",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Rejected,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CanaryResult {
    pub outcome: Outcome,
    pub reason: CanaryReason,
    pub evaluated_at: i64,
    pub policy_snapshot_hash: String,
    /// Never `Live` — redacted even when the underlying intent was (and was
    /// therefore already rejected on that basis alone). Defence in depth:
    /// this field leaking `Live` would be a bug independent of R1.
    pub mode: TradeMode,
}

/// Canary safety gate (§4.4a). Rule order: kill switch -> mode -> leverage
/// -> isolated margin -> reduce-only -> one-way -> liquidation proximity.
pub fn evaluate(intent: &FuturesIntentContext, killswitch: &KillSwitchConfig, now: i64) -> CanaryResult {
    let redacted_mode = intent.mode.redact();
    let result = |outcome: Outcome, reason: CanaryReason| CanaryResult {
        outcome,
        reason,
        evaluated_at: now,
        policy_snapshot_hash: intent.policy_snapshot_hash.clone(),
        mode: redacted_mode,
    };

    match exd_killswitch::evaluate(killswitch, &intent.symbol) {
        KillSwitchOutcome::Fail { reason, .. } => {
            return match reason {
                KillSwitchReason::GlobalKillActive => {
                    result(Outcome::Rejected, CanaryReason::GlobalKillActive)
                }
                KillSwitchReason::SymbolKillActive => {
                    result(Outcome::Rejected, CanaryReason::SymbolKillActive)
                }
            };
        }
        KillSwitchOutcome::Pass => {}
    }

    if intent.mode.is_live() {
        return result(Outcome::Rejected, CanaryReason::LiveModeBlocked);
    }

    if intent.leverage > CANARY_MAX_LEVERAGE {
        return result(Outcome::Rejected, CanaryReason::LeverageExceeded);
    }

    if intent.margin_mode != MarginMode::Isolated {
        return result(Outcome::Rejected, CanaryReason::NotIsolated);
    }

    if !intent.reduce_only {
        return result(Outcome::Rejected, CanaryReason::NotReduceOnly);
    }

    if intent.position_side != PositionSide::OneWay {
        return result(Outcome::Rejected, CanaryReason::NotOneWay);
    }

    let worst_case_window = intent.entry_price * CANARY_WORST_CASE_MOVE_PCT;
    let liquidation_distance = (intent.estimated_liquidation_price - intent.entry_price).abs();
    if liquidation_distance <= worst_case_window {
        return result(Outcome::Rejected, CanaryReason::LiquidationTooClose);
    }

    result(Outcome::Passed, CanaryReason::Passed)
}
