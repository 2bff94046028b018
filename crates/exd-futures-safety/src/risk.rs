use std::fmt;

use exd_schemas::Side;

use crate::sizing::SizingOutput;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskReason {
    Passed,
    LeverageExceeded,
    LossExceedsLimit,
    LiquidationBeforeStop,
    InvalidStopDirection,
}

impl fmt::Display for RiskReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskReason::Passed => "PASSED",
            RiskReason::LeverageExceeded => "LEVERAGE_EXCEEDED",
            RiskReason::LossExceedsLimit => "LOSS_EXCEEDS_LIMIT",
            RiskReason::LiquidationBeforeStop => "LIQUIDATION_BEFORE_STOP",
            RiskReason::InvalidStopDirection => "INVALID_STOP_DIRECTION",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Rejected,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RiskResult {
    pub outcome: Outcome,
    pub reason: RiskReason,
    pub evaluated_at: i64,
}

/// Validate a sized position against the risk invariants from §4.4c. The
/// numeric loss-cap check carries a 1% slack to absorb floating-point
/// rounding in `sizing::size`, matching the testable property in §8.
pub fn evaluate(
    sizing: &SizingOutput,
    equity_usd: f64,
    max_risk_pct: f64,
    leverage_cap: f64,
    side: Side,
    entry_price: f64,
    stop_price: f64,
    now: i64,
) -> RiskResult {
    let result = |outcome: Outcome, reason: RiskReason| RiskResult {
        outcome,
        reason,
        evaluated_at: now,
    };

    if sizing.effective_leverage > leverage_cap + 1e-9 {
        return result(Outcome::Rejected, RiskReason::LeverageExceeded);
    }

    let loss_budget = equity_usd * max_risk_pct;
    if sizing.worst_case_loss_usd > loss_budget * 1.01 {
        return result(Outcome::Rejected, RiskReason::LossExceedsLimit);
    }

    let liquidation_ok = match side {
        Side::Long => sizing.estimated_liquidation_price < stop_price,
        Side::Short => sizing.estimated_liquidation_price > stop_price,
    };
    if !liquidation_ok {
        return result(Outcome::Rejected, RiskReason::LiquidationBeforeStop);
    }

    let stop_direction_ok = match side {
        Side::Long => stop_price < entry_price,
        Side::Short => stop_price > entry_price,
    };
    if !stop_direction_ok {
        return result(Outcome::Rejected, RiskReason::InvalidStopDirection);
    }

    result(Outcome::Passed, RiskReason::Passed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::{size, SizingInput};

    #[test]
    fn sane_long_position_passes_every_rule() {
        let input = SizingInput {
            side: Side::Long,
            equity_usd: 100_000.0,
            max_risk_pct: 0.01,
            leverage_cap: 5.0,
            entry_price: 50_000.0,
            stop_price: 49_000.0,
            maintenance_margin_rate: 0.005,
        };
        let sizing = size(input);
        let r = evaluate(&sizing, 100_000.0, 0.01, 5.0, Side::Long, 50_000.0, 49_000.0, 0);
        assert_eq!(r.outcome, Outcome::Passed);
    }

    #[test]
    fn inverted_stop_direction_is_rejected() {
        let input = SizingInput {
            side: Side::Long,
            equity_usd: 100_000.0,
            max_risk_pct: 0.01,
            leverage_cap: 5.0,
            entry_price: 50_000.0,
            stop_price: 51_000.0, // stop above entry for a long: wrong direction.
            maintenance_margin_rate: 0.005,
        };
        let sizing = size(input);
        let r = evaluate(&sizing, 100_000.0, 0.01, 5.0, Side::Long, 50_000.0, 51_000.0, 0);
        assert_eq!(r.outcome, Outcome::Rejected);
        assert!(matches!(
            r.reason,
            RiskReason::InvalidStopDirection | RiskReason::LiquidationBeforeStop
        ));
    }

    #[test]
    fn leverage_exceeded_is_reported_directly_even_post_sizing() {
        let sizing = SizingOutput {
            notional_usd: 1_000_000.0,
            qty: 20.0,
            effective_leverage: 10.0,
            estimated_liquidation_price: 45_000.0,
            worst_case_loss_usd: 100.0,
            stop_distance_pct: 0.02,
            liquidation_distance_pct: 0.1,
        };
        let r = evaluate(&sizing, 100_000.0, 0.5, 5.0, Side::Long, 50_000.0, 49_000.0, 0);
        assert_eq!(r.reason, RiskReason::LeverageExceeded);
    }
}
