//! Futures safety chain (C4): canary gate -> sizing -> risk gate -> funding
//! gate -> adapter mapping. Each stage is a pure function returning a frozen,
//! tagged result; the bridge (`exd-bridge`) is responsible for calling them
//! in order and stopping at the first rejection.

pub mod adapter;
pub mod canary;
pub mod context;
pub mod funding;
pub mod risk;
pub mod sizing;

pub use context::FuturesIntentContext;
