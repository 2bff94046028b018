use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use exd_schemas::TradeMode;

/// Bridge configuration. `mode` is clamped at construction (`Live` ->
/// `Canary`) — one of the three independent layers, alongside the futures
/// canary gate and the adapter-mapping panic, that keep `Live` structurally
/// unreachable (design note §9).
#[derive(Clone, Debug, PartialEq)]
pub struct BridgeConfig {
    pub mode: TradeMode,
    pub exchange: String,
    pub testnet: bool,
    pub allowed_symbols: BTreeSet<String>,
    pub max_orders_per_day: u32,
    pub max_notional_per_day: f64,
    pub max_notional_per_order: f64,
    pub reconciliation_interval_ms: i64,
    pub reduce_only: bool,
}

impl BridgeConfig {
    pub fn new(
        mode: TradeMode,
        exchange: impl Into<String>,
        testnet: bool,
        allowed_symbols: BTreeSet<String>,
        max_orders_per_day: u32,
        max_notional_per_day: f64,
        max_notional_per_order: f64,
        reconciliation_interval_ms: i64,
        reduce_only: bool,
    ) -> Self {
        Self {
            mode: mode.clamp_to_canary(),
            exchange: exchange.into(),
            testnet,
            allowed_symbols,
            max_orders_per_day,
            max_notional_per_day,
            max_notional_per_order,
            reconciliation_interval_ms,
            reduce_only,
        }
    }
}

/// Mutable daily counters. Resets to zero whenever the UTC calendar date
/// advances past `reset_date_utc` (checked by the bridge on every `execute`
/// call, not by a background timer).
#[derive(Clone, Debug, PartialEq)]
pub struct BridgeLimitsState {
    pub current_order_count: u32,
    pub current_notional_usd: f64,
    pub reset_date_utc: NaiveDate,
}

impl BridgeLimitsState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            current_order_count: 0,
            current_notional_usd: 0.0,
            reset_date_utc: today,
        }
    }

    /// Zero the counters if `today` has advanced past the stored reset date.
    pub fn maybe_reset(&mut self, today: NaiveDate) {
        if today != self.reset_date_utc {
            self.current_order_count = 0;
            self.current_notional_usd = 0.0;
            self.reset_date_utc = today;
        }
    }

    pub fn record_order(&mut self, notional_usd: f64) {
        self.current_order_count += 1;
        self.current_notional_usd += notional_usd;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum GateRefusal {
    BridgeDisabled,
    SymbolNotAllowed,
    DailyOrderCapExceeded,
    DailyNotionalCapExceeded,
    OrderNotionalCapExceeded,
}

impl fmt::Display for GateRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GateRefusal::BridgeDisabled => "BRIDGE_DISABLED",
            GateRefusal::SymbolNotAllowed => "SYMBOL_NOT_ALLOWED",
            GateRefusal::DailyOrderCapExceeded => "DAILY_ORDER_CAP_EXCEEDED",
            GateRefusal::DailyNotionalCapExceeded => "DAILY_NOTIONAL_CAP_EXCEEDED",
            GateRefusal::OrderNotionalCapExceeded => "ORDER_NOTIONAL_CAP_EXCEEDED",
        };
        write!(f, "{s}")
    }
}

/// Gate-to-live check (§4.5 step 3): verify the bridge is enabled, the
/// symbol is in scope, and the proposed order would not breach the daily
/// order/notional caps or the per-order notional cap.
pub fn gate_to_live(
    cfg: &BridgeConfig,
    state: &BridgeLimitsState,
    symbol: &str,
    order_notional_usd: f64,
    enabled: bool,
) -> Result<(), GateRefusal> {
    if !enabled {
        return Err(GateRefusal::BridgeDisabled);
    }
    if !cfg.allowed_symbols.contains(symbol) {
        return Err(GateRefusal::SymbolNotAllowed);
    }
    if order_notional_usd > cfg.max_notional_per_order {
        return Err(GateRefusal::OrderNotionalCapExceeded);
    }
    if state.current_order_count + 1 > cfg.max_orders_per_day {
        return Err(GateRefusal::DailyOrderCapExceeded);
    }
    if state.current_notional_usd + order_notional_usd > cfg.max_notional_per_day {
        return Err(GateRefusal::DailyNotionalCapExceeded);
    }
    Ok(())
}
