//! Live execution bridge: gate-to-live, order lifecycle, and slippage
//! tracking (C5, C6, C7). `Bridge::execute` is the single entry point
//! strategy runtimes call with each paper fill they want mirrored live.

mod adapter;
mod bridge;
mod config;
mod lifecycle;
mod slippage;

pub use adapter::{AdapterError, ExchangeAdapter, PaperExchangeAdapter, SubmitRequest, SubmitResponse};
pub use bridge::{Bridge, BridgeExecutionResult, BridgeOutcome, PaperExecutionRequest};
pub use config::{gate_to_live, BridgeConfig, BridgeLimitsState, GateRefusal};
pub use lifecycle::{Fill, LifecycleEntry, LifecycleEvent, LifecycleState, LifecycleTable, TransitionError};
pub use slippage::{slippage_bps, AlertSeverity, SlippageAlert, SlippageAnalyzer, SlippageRecord, SymbolStats};
