//! Position-only reconciliation between paper and exchange state (C8).
//! Timer-driven, not gate-driven: a caller decides what to do with an
//! unhealthy report (alert, page, log) rather than this crate blocking
//! anything by itself.

mod engine;
mod types;

pub use engine::reconcile;
pub use types::{DriftClass, PositionDrift, ReconcileReport, DEFAULT_TOLERANCE_PCT, ORPHAN_DRIFT_PCT};
