use std::fmt;

use exd_schemas::Side;

/// Hard per-8h-period rate cap, independent of direction or budget — a rate
/// beyond this is treated as a data/market anomaly rather than a cost to
/// budget against.
pub const TOXIC_FUNDING_RATE_ABS: f64 = 0.001;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FundingDirection {
    Pay,
    Receive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FundingReason {
    Passed,
    BudgetExceeded,
    ToxicFundingRate,
}

impl fmt::Display for FundingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FundingReason::Passed => "PASSED",
            FundingReason::BudgetExceeded => "BUDGET_EXCEEDED",
            FundingReason::ToxicFundingRate => "TOXIC_FUNDING_RATE",
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
pub struct FundingInput {
    pub side: Side,
    pub notional_usd: f64,
    pub funding_rate_snapshot: f64,
    pub expected_hold_hours: f64,
    pub funding_budget_pct: f64,
    pub equity_usd: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FundingResult {
    pub outcome: Outcome,
    pub reason: FundingReason,
    pub funding_periods: u32,
    pub funding_cost_usd: f64,
    pub cost_pct_equity: f64,
    pub evaluated_at: i64,
}

fn direction_for(side: Side, rate: f64) -> FundingDirection {
    let long_pays = rate > 0.0;
    match side {
        Side::Long if long_pays => FundingDirection::Pay,
        Side::Long => FundingDirection::Receive,
        Side::Short if long_pays => FundingDirection::Receive,
        Side::Short => FundingDirection::Pay,
    }
}

/// Funding budget gate (§4.4d). Periods round up conservatively (a partial
/// 8h window still counts as a whole funding period against the budget).
pub fn evaluate(input: FundingInput, now: i64) -> FundingResult {
    let periods = if input.expected_hold_hours <= 0.0 {
        0
    } else {
        (input.expected_hold_hours / 8.0).ceil() as u32
    };

    let effective_rate = input.funding_rate_snapshot.abs();
    let funding_cost_usd = input.notional_usd * effective_rate * periods as f64;
    let cost_pct_equity = if input.equity_usd > 0.0 {
        funding_cost_usd / input.equity_usd
    } else {
        0.0
    };

    let result = |outcome: Outcome, reason: FundingReason| FundingResult {
        outcome,
        reason,
        funding_periods: periods,
        funding_cost_usd,
        cost_pct_equity,
        evaluated_at: now,
    };

    if effective_rate > TOXIC_FUNDING_RATE_ABS {
        return result(Outcome::Rejected, FundingReason::ToxicFundingRate);
    }

    let direction = direction_for(input.side, input.funding_rate_snapshot);
    if direction == FundingDirection::Pay && cost_pct_equity > input.funding_budget_pct {
        return result(Outcome::Rejected, FundingReason::BudgetExceeded);
    }

    result(Outcome::Passed, FundingReason::Passed)
}
