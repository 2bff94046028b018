//! Pre-decision signal gate (C2): a pure regime/strength/cooldown/spread
//! filter applied before a strategy decision is even formed, with running
//! pass/block statistics for operators.

mod engine;
mod types;

pub use engine::{evaluate, evaluate_and_record};
pub use types::{BlockReason, Features, GateOutcome, Regime, SignalGateConfig, SignalGateStats};
