//! Deterministic event factory and append-only audit spool (C9).

mod audit;
mod events;

pub use audit::{AuditRecord, AuditSpool, SpoolWrite};
pub use events::{emit, EventType, OpsEvent};

use exd_schemas::sort_keys;
use serde_json::Value;

pub(crate) fn canonical_json_string(v: &Value) -> String {
    serde_json::to_string(&sort_keys(v)).expect("Value serialization never fails")
}
