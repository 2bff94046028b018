//! OPS event factory (C9). Pure: the same inputs always produce the same
//! `event_id`, bit for bit. Grounded on the teacher's canonical-JSON hashing
//! discipline (`mqk-audit::sort_keys`) but the id here is derived from a
//! fixed-order field tuple rather than the whole serialized struct, so a
//! raw `f64` is never handed to the hasher directly — only its already
//!-serialized, already-deterministic JSON text.

use exd_schemas::TradeMode;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::canonical_json_string;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventType {
    FuturesCanaryEvaluated,
    FuturesRiskEvaluated,
    FuturesFundingEvaluated,
    FuturesOrderIntentMapped,
    ExecutionEvaluated,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::FuturesCanaryEvaluated => "FUTURES_CANARY_EVALUATED",
            EventType::FuturesRiskEvaluated => "FUTURES_RISK_EVALUATED",
            EventType::FuturesFundingEvaluated => "FUTURES_FUNDING_EVALUATED",
            EventType::FuturesOrderIntentMapped => "FUTURES_ORDER_INTENT_MAPPED",
            EventType::ExecutionEvaluated => "EXECUTION_EVALUATED",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OpsEvent {
    pub event_id: String,
    pub event_type: EventType,
    pub mode: TradeMode,
    pub policy_snapshot_hash: Option<String>,
    pub intent_id: Option<String>,
    pub payload: Value,
    pub timestamp: i64,
}

fn event_id_hex(fields: &[&str], hex_len: usize) -> String {
    let joined = fields.join("\u{1f}");
    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..hex_len.min(digest.len())].to_string()
}

/// Build an OPS event. `mode` is redacted to `{SHADOW, CANARY}` before it
/// ever reaches the id computation or the emitted struct (§4.9, §9: `Live`
/// must never be observable outside the process).
pub fn emit(
    event_type: EventType,
    mode: TradeMode,
    policy_snapshot_hash: Option<&str>,
    intent_id: Option<&str>,
    payload: Value,
    timestamp: i64,
) -> OpsEvent {
    let mode = mode.redact();
    let payload_json = canonical_json_string(&payload);
    let ts_str = timestamp.to_string();

    let event_id = event_id_hex(
        &[
            event_type.as_str(),
            mode.as_str(),
            policy_snapshot_hash.unwrap_or(""),
            intent_id.unwrap_or(""),
            payload_json.as_str(),
            ts_str.as_str(),
        ],
        16,
    );

    OpsEvent {
        event_id,
        event_type,
        mode,
        policy_snapshot_hash: policy_snapshot_hash.map(str::to_string),
        intent_id: intent_id.map(str::to_string),
        payload,
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_input_yields_identical_event_id() {
        let payload = json!({"b": 2, "a": 1});
        let a = emit(EventType::ExecutionEvaluated, TradeMode::Canary, Some("h1"), Some("i1"), payload.clone(), 1000);
        let b = emit(EventType::ExecutionEvaluated, TradeMode::Canary, Some("h1"), Some("i1"), payload, 1000);
        assert_eq!(a.event_id, b.event_id);
    }

    #[test]
    fn live_mode_is_redacted_to_canary_before_hashing() {
        let payload = json!({"x": 1});
        let live = emit(EventType::FuturesCanaryEvaluated, TradeMode::Live, None, None, payload.clone(), 1);
        let canary = emit(EventType::FuturesCanaryEvaluated, TradeMode::Canary, None, None, payload, 1);
        assert_eq!(live.mode, TradeMode::Canary);
        assert_eq!(live.event_id, canary.event_id);
    }

    #[test]
    fn differing_payload_changes_the_event_id() {
        let a = emit(EventType::ExecutionEvaluated, TradeMode::Shadow, None, None, json!({"a": 1}), 1);
        let b = emit(EventType::ExecutionEvaluated, TradeMode::Shadow, None, None, json!({"a": 2}), 1);
        assert_ne!(a.event_id, b.event_id);
    }

    #[test]
    fn event_id_is_sixteen_hex_chars() {
        let e = emit(EventType::ExecutionEvaluated, TradeMode::Shadow, None, None, json!({}), 1);
        assert_eq!(e.event_id.len(), 16);
        assert!(e.event_id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
