use std::fmt;

use exd_schemas::{MarginMode, PositionSide, Side, TradeMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderType {
    Market,
    Limit,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
        };
        write!(f, "{s}")
    }
}

/// The internal, typed order intent handed to the adapter mapping layer.
#[derive(Clone, Debug, PartialEq)]
pub struct FuturesOrderIntent {
    pub symbol: String,
    pub side: Side,
    pub position_side: PositionSide,
    pub margin_mode: MarginMode,
    pub reduce_only: bool,
    pub quantity: f64,
    pub price: Option<f64>,
    pub order_type: OrderType,
    pub time_in_force: String,
    pub client_order_id: String,
    pub mode: TradeMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum AdapterReason {
    Passed,
    LiveModeBlocked,
    NotReduceOnly,
    NotIsolated,
}

impl fmt::Display for AdapterReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AdapterReason::Passed => "PASSED",
            AdapterReason::LiveModeBlocked => "LIVE_MODE_BLOCKED",
            AdapterReason::NotReduceOnly => "NOT_REDUCE_ONLY",
            AdapterReason::NotIsolated => "NOT_ISOLATED",
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
pub struct AdapterGateResult {
    pub outcome: Outcome,
    pub reason: AdapterReason,
    pub evaluated_at: i64,
}

/// Gate applied before an intent may be mapped to the exchange wire format
/// (§4.4e).
pub fn evaluate(intent: &FuturesOrderIntent, now: i64) -> AdapterGateResult {
    let result = |outcome: Outcome, reason: AdapterReason| AdapterGateResult {
        outcome,
        reason,
        evaluated_at: now,
    };

    if intent.mode.is_live() {
        return result(Outcome::Rejected, AdapterReason::LiveModeBlocked);
    }
    if !intent.reduce_only {
        return result(Outcome::Rejected, AdapterReason::NotReduceOnly);
    }
    if intent.margin_mode != MarginMode::Isolated {
        return result(Outcome::Rejected, AdapterReason::NotIsolated);
    }
    result(Outcome::Passed, AdapterReason::Passed)
}

/// The wire payload shape handed to the exchange adapter. Only these fields
/// ever leak into the outbound request — no other `FuturesOrderIntent` field
/// is forwarded.
#[derive(Clone, Debug, PartialEq)]
pub struct ExchangeOrderPayload {
    pub symbol: String,
    pub side: String,
    pub position_side: String,
    pub quantity: String,
    pub price: Option<String>,
    pub order_type: String,
    pub time_in_force: String,
    pub reduce_only: String,
    pub new_client_order_id: String,
}

/// Map an intent to the exchange wire payload.
///
/// # Panics
/// Panics if `intent.mode` is `Live`. This is a redundant structural guard:
/// the gate above already rejects `Live` before this function is ever
/// reached in the orchestrated pipeline, so reaching here with `Live` is a
/// caller bug, not a data condition to route around.
pub fn map_order_intent(intent: &FuturesOrderIntent) -> ExchangeOrderPayload {
    if intent.mode.is_live() {
        panic!("SAFETY_VIOLATION: map_order_intent called with TradeMode::Live");
    }

    let price = match intent.order_type {
        OrderType::Limit => intent.price.map(|p| p.to_string()),
        OrderType::Market => None,
    };

    ExchangeOrderPayload {
        symbol: intent.symbol.clone(),
        side: intent.side.to_string(),
        position_side: intent.position_side.to_string(),
        quantity: intent.quantity.to_string(),
        price,
        order_type: intent.order_type.to_string(),
        time_in_force: intent.time_in_force.clone(),
        reduce_only: "true".to_string(),
        new_client_order_id: intent.client_order_id.clone(),
    }
}
