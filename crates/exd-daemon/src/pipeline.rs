//! Wires the kill switch and the live execution bridge into a single call
//! the async task layer can drive. The pure gate stages (C1-C4) live in
//! their own crates and are exercised directly by strategy code; this
//! pipeline only needs the stages that have daemon-owned mutable state.

use std::sync::Arc;

use exd_bridge::{Bridge, BridgeOutcome, PaperExchangeAdapter, PaperExecutionRequest};
use exd_killswitch::KillSwitchConfig;
use exd_observability::AuditRecord;
use tokio::sync::RwLock;

#[derive(Clone, Debug, PartialEq)]
pub struct PipelineOutcome {
    pub bridge_id: String,
    pub outcome: BridgeOutcome,
    /// Audit content the bridge produced for this call, not yet persisted —
    /// the caller owns the `AuditSpool` and writes these.
    pub audit: Vec<AuditRecord>,
}

pub async fn run_pipeline(
    bridge: &Arc<RwLock<Bridge>>,
    adapter: &Arc<RwLock<PaperExchangeAdapter>>,
    killswitch: &Arc<KillSwitchConfig>,
    req: PaperExecutionRequest,
) -> PipelineOutcome {
    let now_ms = chrono::Utc::now().timestamp_millis();
    let today = chrono::Utc::now().date_naive();

    let mut bridge = bridge.write().await;
    let mut adapter = adapter.write().await;
    let result = bridge.execute(&mut *adapter, req.clone(), killswitch.as_ref(), today, now_ms);

    PipelineOutcome {
        bridge_id: req.bridge_id,
        outcome: result.outcome,
        audit: result.audit,
    }
}
