//! Order lifecycle manager (C6). Grounded directly on the teacher workspace's
//! OMS state machine: a keyed table of frozen-shape entries, `apply`-style
//! transitions that reject illegal paths, and a bounded, deterministic fill
//! ledger per entry.

use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt;

use exd_schemas::Side;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Created,
    GatePassed,
    Submitting,
    Submitted,
    PartiallyFilled,
    Filled,
    Rejected,
    Failed,
    Cancelled,
}

impl LifecycleState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecycleState::Filled
                | LifecycleState::Rejected
                | LifecycleState::Failed
                | LifecycleState::Cancelled
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleState::Created => "CREATED",
            LifecycleState::GatePassed => "GATE_PASSED",
            LifecycleState::Submitting => "SUBMITTING",
            LifecycleState::Submitted => "SUBMITTED",
            LifecycleState::PartiallyFilled => "PARTIALLY_FILLED",
            LifecycleState::Filled => "FILLED",
            LifecycleState::Rejected => "REJECTED",
            LifecycleState::Failed => "FAILED",
            LifecycleState::Cancelled => "CANCELLED",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LifecycleEvent {
    GatePass,
    BeginSubmit,
    Submitted { exchange_order_id: String },
    Fill { delta_qty: f64, price: f64 },
    Cancel,
    Fail { error: String },
    Reject { error: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Fill {
    pub qty: f64,
    pub price: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LifecycleEntry {
    pub bridge_id: String,
    pub state: LifecycleState,
    pub symbol: String,
    pub side: Side,
    pub requested_qty: f64,
    pub filled_qty: f64,
    pub avg_fill_price: f64,
    pub fills: Vec<Fill>,
    pub created_at: i64,
    pub updated_at: i64,
    pub exchange_order_id: Option<String>,
    pub error: Option<String>,
}

impl LifecycleEntry {
    pub fn new(bridge_id: impl Into<String>, symbol: impl Into<String>, side: Side, requested_qty: f64, now: i64) -> Self {
        Self {
            bridge_id: bridge_id.into(),
            state: LifecycleState::Created,
            symbol: symbol.into(),
            side,
            requested_qty,
            filled_qty: 0.0,
            avg_fill_price: 0.0,
            fills: Vec::new(),
            created_at: now,
            updated_at: now,
            exchange_order_id: None,
            error: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionError {
    pub from: LifecycleState,
    pub event: &'static str,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal lifecycle transition: {} from state {}", self.event, self.from)
    }
}

impl Error for TransitionError {}

fn event_name(event: &LifecycleEvent) -> &'static str {
    match event {
        LifecycleEvent::GatePass => "GatePass",
        LifecycleEvent::BeginSubmit => "BeginSubmit",
        LifecycleEvent::Submitted { .. } => "Submitted",
        LifecycleEvent::Fill { .. } => "Fill",
        LifecycleEvent::Cancel => "Cancel",
        LifecycleEvent::Fail { .. } => "Fail",
        LifecycleEvent::Reject { .. } => "Reject",
    }
}

impl LifecycleEntry {
    /// Apply `event`, enforcing the legal-path constraint from §4.6:
    /// CREATED -> GATE_PASSED -> SUBMITTING -> { SUBMITTED -> {PARTIALLY_FILLED
    /// <-> SUBMITTED, FILLED, CANCELLED} | FAILED | REJECTED }.
    pub fn apply(&mut self, event: LifecycleEvent, now: i64) -> Result<(), TransitionError> {
        use LifecycleEvent as E;
        use LifecycleState as S;

        let illegal = || TransitionError {
            from: self.state,
            event: event_name(&event),
        };

        match (self.state, &event) {
            (S::Created, E::GatePass) => self.state = S::GatePassed,
            (S::GatePassed, E::BeginSubmit) => self.state = S::Submitting,
            (S::Submitting, E::Submitted { exchange_order_id }) => {
                self.exchange_order_id = Some(exchange_order_id.clone());
                self.state = S::Submitted;
            }
            (S::Submitting, E::Fail { error }) => {
                self.error = Some(error.clone());
                self.state = S::Failed;
            }
            (S::Submitting, E::Reject { error }) => {
                self.error = Some(error.clone());
                self.state = S::Rejected;
            }
            (S::Submitted, E::Fill { delta_qty, price }) | (S::PartiallyFilled, E::Fill { delta_qty, price }) => {
                self.apply_fill(*delta_qty, *price);
                self.state = if self.filled_qty >= self.requested_qty {
                    S::Filled
                } else {
                    S::PartiallyFilled
                };
            }
            (S::Submitted, E::Cancel) | (S::PartiallyFilled, E::Cancel) => {
                self.state = S::Cancelled;
            }
            _ => return Err(illegal()),
        }

        self.updated_at = now;
        Ok(())
    }

    fn apply_fill(&mut self, delta_qty: f64, price: f64) {
        let prior_notional = self.avg_fill_price * self.filled_qty;
        let new_notional = prior_notional + delta_qty * price;
        self.filled_qty += delta_qty;
        self.avg_fill_price = if self.filled_qty > 0.0 {
            new_notional / self.filled_qty
        } else {
            0.0
        };
        self.fills.push(Fill { qty: delta_qty, price });
    }
}

/// Keyed lifecycle table plus the internal bridge-id -> exchange-order-id
/// map. Single writer: the bridge owns this table exclusively within a
/// process (§5 concurrency model).
#[derive(Default)]
pub struct LifecycleTable {
    entries: BTreeMap<String, LifecycleEntry>,
    exchange_id_map: HashMap<String, String>,
}

impl LifecycleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_from_intent(&mut self, bridge_id: impl Into<String>, symbol: impl Into<String>, side: Side, qty: f64, now: i64) -> &mut LifecycleEntry {
        let bridge_id = bridge_id.into();
        let entry = LifecycleEntry::new(bridge_id.clone(), symbol, side, qty, now);
        self.entries.insert(bridge_id.clone(), entry);
        self.entries.get_mut(&bridge_id).expect("just inserted")
    }

    pub fn get(&self, bridge_id: &str) -> Option<&LifecycleEntry> {
        self.entries.get(bridge_id)
    }

    pub fn transition(&mut self, bridge_id: &str, event: LifecycleEvent, now: i64) -> Result<(), TransitionError> {
        let entry = self.entries.get_mut(bridge_id).unwrap_or_else(|| {
            panic!("transition called for unknown bridge_id {bridge_id}")
        });
        if let LifecycleEvent::Submitted { exchange_order_id } = &event {
            self.exchange_id_map.insert(bridge_id.to_string(), exchange_order_id.clone());
        }
        entry.apply(event, now)
    }

    /// Look up the exchange order id for a bridge id. Must be consulted —
    /// never guessed — before any order-targeted follow-up operation,
    /// mirroring the teacher's `BrokerOrderMap` contract.
    pub fn exchange_order_id(&self, bridge_id: &str) -> Option<&str> {
        self.exchange_id_map.get(bridge_id).map(|s| s.as_str())
    }

    pub fn state_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for entry in self.entries.values() {
            *counts.entry(state_label(entry.state)).or_insert(0) += 1;
        }
        counts
    }
}

fn state_label(s: LifecycleState) -> &'static str {
    match s {
        LifecycleState::Created => "CREATED",
        LifecycleState::GatePassed => "GATE_PASSED",
        LifecycleState::Submitting => "SUBMITTING",
        LifecycleState::Submitted => "SUBMITTED",
        LifecycleState::PartiallyFilled => "PARTIALLY_FILLED",
        LifecycleState::Filled => "FILLED",
        LifecycleState::Rejected => "REJECTED",
        LifecycleState::Failed => "FAILED",
        LifecycleState::Cancelled => "CANCELLED",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive_to_submitted(table: &mut LifecycleTable, id: &str) {
        table.create_from_intent(id, "BTCUSDT", Side::Long, 1.0, 0);
        table.transition(id, LifecycleEvent::GatePass, 1).unwrap();
        table.transition(id, LifecycleEvent::BeginSubmit, 2).unwrap();
        table
            .transition(id, LifecycleEvent::Submitted { exchange_order_id: "ex-1".to_string() }, 3)
            .unwrap();
    }

    #[test]
    fn happy_path_partial_then_full_fill() {
        let mut table = LifecycleTable::new();
        drive_to_submitted(&mut table, "b1");
        table.transition("b1", LifecycleEvent::Fill { delta_qty: 0.4, price: 100.0 }, 4).unwrap();
        assert_eq!(table.get("b1").unwrap().state, LifecycleState::PartiallyFilled);
        table.transition("b1", LifecycleEvent::Fill { delta_qty: 0.6, price: 102.0 }, 5).unwrap();
        let entry = table.get("b1").unwrap();
        assert_eq!(entry.state, LifecycleState::Filled);
        assert!((entry.avg_fill_price - (0.4 * 100.0 + 0.6 * 102.0)).abs() < 1e-9);
        assert_eq!(table.exchange_order_id("b1"), Some("ex-1"));
    }

    #[test]
    fn illegal_transition_is_rejected() {
        let mut table = LifecycleTable::new();
        table.create_from_intent("b2", "BTCUSDT", Side::Long, 1.0, 0);
        let err = table.transition("b2", LifecycleEvent::BeginSubmit, 1).unwrap_err();
        assert_eq!(err.from, LifecycleState::Created);
    }

    #[test]
    fn cancel_from_partially_filled_is_legal() {
        let mut table = LifecycleTable::new();
        drive_to_submitted(&mut table, "b3");
        table.transition("b3", LifecycleEvent::Fill { delta_qty: 0.1, price: 100.0 }, 4).unwrap();
        table.transition("b3", LifecycleEvent::Cancel, 5).unwrap();
        assert_eq!(table.get("b3").unwrap().state, LifecycleState::Cancelled);
    }

    #[test]
    fn submit_failure_is_terminal() {
        let mut table = LifecycleTable::new();
        table.create_from_intent("b4", "BTCUSDT", Side::Long, 1.0, 0);
        table.transition("b4", LifecycleEvent::GatePass, 1).unwrap();
        table.transition("b4", LifecycleEvent::BeginSubmit, 2).unwrap();
        table.transition("b4", LifecycleEvent::Fail { error: "timeout".to_string() }, 3).unwrap();
        let entry = table.get("b4").unwrap();
        assert!(entry.state.is_terminal());
        assert_eq!(entry.error.as_deref(), Some("timeout"));
    }

    #[test]
    fn fill_after_terminal_state_is_rejected() {
        let mut table = LifecycleTable::new();
        drive_to_submitted(&mut table, "b5");
        table.transition("b5", LifecycleEvent::Fill { delta_qty: 1.0, price: 100.0 }, 4).unwrap();
        assert_eq!(table.get("b5").unwrap().state, LifecycleState::Filled);
        let err = table
            .transition("b5", LifecycleEvent::Fill { delta_qty: 0.1, price: 100.0 }, 5)
            .unwrap_err();
        assert_eq!(err.from, LifecycleState::Filled);
    }
}
