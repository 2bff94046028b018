//! Per-decision execution gate (C3): pure policy evaluation over a strategy
//! decision, a frozen policy snapshot, and the current gate state.

mod engine;
mod types;

pub use engine::evaluate;
pub use types::{
    Decision, DecisionSide, ExecutionOutcome, ExecutionResult, GateState, PolicyMode,
    PolicySnapshot, ReasonCode,
};
