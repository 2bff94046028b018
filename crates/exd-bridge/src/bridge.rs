use chrono::NaiveDate;
use exd_killswitch::{self, KillSwitchConfig, KillSwitchOutcome};
use exd_observability::AuditRecord;
use exd_schemas::{Side, TradeMode};
use serde_json::json;
use tracing::{info, warn};

use crate::adapter::{ExchangeAdapter, SubmitRequest};
use crate::config::{gate_to_live, BridgeConfig, BridgeLimitsState, GateRefusal};
use crate::lifecycle::{LifecycleEvent, LifecycleState, LifecycleTable};
use crate::slippage::{SlippageAlert, SlippageAnalyzer, SlippageRecord};

const ACTOR: &str = "exd-bridge";

/// A paper fill the strategy runtime wants the bridge to potentially mirror
/// live. `price` is the expected price used for the slippage comparison in
/// step 8; it is independent of whatever price the exchange actually fills
/// at.
#[derive(Clone, Debug, PartialEq)]
pub struct PaperExecutionRequest {
    pub bridge_id: String,
    pub symbol: String,
    pub side: Side,
    pub qty: f64,
    pub price: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BridgeOutcome {
    Gated,
    Shadow,
    Submitted,
    Filled,
    Rejected,
    Failed,
    Killed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BridgeExecutionResult {
    pub outcome: BridgeOutcome,
    pub bridge_id: String,
    pub lifecycle_state: Option<LifecycleState>,
    pub slippage: Option<SlippageRecord>,
    pub refusal: Option<GateRefusal>,
    pub error: Option<String>,
    /// Audit content produced by this call, ready for the caller to persist
    /// via `AuditSpool::write_record` (§4.5 steps 3 and 5 mandate this for
    /// GATED and SHADOW at minimum; every other terminal outcome is audited
    /// too).
    pub audit: Vec<AuditRecord>,
}

/// The gate-to-live orchestrator (§4.5). Owns the limits state, the
/// lifecycle table, and the slippage analyzer; the exchange adapter is
/// passed in per call so the bridge stays adapter-agnostic (the teacher's
/// `BrokerAdapter`-by-generic-parameter pattern). Audit records are built
/// here (pure construction, no I/O) and handed back to the caller, which
/// owns the `AuditSpool` and actually persists them — the bridge itself
/// never touches the filesystem.
pub struct Bridge {
    pub config: BridgeConfig,
    pub limits: BridgeLimitsState,
    pub lifecycle: LifecycleTable,
    pub slippage: SlippageAnalyzer,
}

impl Bridge {
    pub fn new(config: BridgeConfig, today: NaiveDate) -> Self {
        Self {
            config,
            limits: BridgeLimitsState::new(today),
            lifecycle: LifecycleTable::new(),
            slippage: SlippageAnalyzer::new(1_000, 20.0),
        }
    }

    pub fn execute<A: ExchangeAdapter>(
        &mut self,
        adapter: &mut A,
        req: PaperExecutionRequest,
        killswitch: &KillSwitchConfig,
        today: NaiveDate,
        now_ms: i64,
    ) -> BridgeExecutionResult {
        self.limits.maybe_reset(today);
        let ts_ns = now_ms.saturating_mul(1_000_000);

        let result = |outcome: BridgeOutcome, state: Option<LifecycleState>| BridgeExecutionResult {
            outcome,
            bridge_id: req.bridge_id.clone(),
            lifecycle_state: state,
            slippage: None,
            refusal: None,
            error: None,
            audit: Vec::new(),
        };

        if let KillSwitchOutcome::Fail { reason, .. } = exd_killswitch::evaluate(killswitch, &req.symbol) {
            warn!(symbol = %req.symbol, reason = %reason, "bridge execute blocked by kill switch");
            let mut r = result(BridgeOutcome::Killed, None);
            r.audit.push(AuditRecord::new(
                ACTOR,
                "KILL_SWITCH_BLOCKED",
                "symbol",
                req.symbol.clone(),
                Some(reason),
                json!({"bridge_id": req.bridge_id}),
                ts_ns,
            ));
            return r;
        }

        let order_notional = req.qty * req.price;
        if let Err(refusal) = gate_to_live(&self.config, &self.limits, &req.symbol, order_notional, true) {
            warn!(symbol = %req.symbol, refusal = %refusal, "bridge gate-to-live refused order");
            let mut r = result(BridgeOutcome::Gated, None);
            r.refusal = Some(refusal);
            r.audit.push(AuditRecord::new(
                ACTOR,
                "GATE_REFUSED",
                "bridge_id",
                req.bridge_id.clone(),
                Some(refusal.to_string()),
                json!({"symbol": req.symbol, "order_notional_usd": order_notional}),
                ts_ns,
            ));
            return r;
        }

        self.lifecycle.create_from_intent(req.bridge_id.clone(), req.symbol.clone(), req.side, req.qty, now_ms);
        self.lifecycle
            .transition(&req.bridge_id, LifecycleEvent::GatePass, now_ms)
            .expect("freshly created entry always accepts GatePass");

        if self.config.mode == TradeMode::Shadow {
            info!(symbol = %req.symbol, bridge_id = %req.bridge_id, "shadow mode: recording without submission");
            let mut r = result(BridgeOutcome::Shadow, Some(LifecycleState::GatePassed));
            r.audit.push(AuditRecord::new(
                ACTOR,
                "SHADOW_RECORDED",
                "bridge_id",
                req.bridge_id.clone(),
                None,
                json!({"symbol": req.symbol, "qty": req.qty, "price": req.price}),
                ts_ns,
            ));
            return r;
        }

        self.lifecycle
            .transition(&req.bridge_id, LifecycleEvent::BeginSubmit, now_ms)
            .expect("GatePassed always accepts BeginSubmit");

        let submit = adapter.submit_order(&SubmitRequest {
            client_order_id: req.bridge_id.clone(),
            symbol: req.symbol.clone(),
            side: req.side,
            quantity: req.qty,
            price: req.price,
        });

        let submit = match submit {
            Ok(resp) => resp,
            Err(e) => {
                self.lifecycle
                    .transition(&req.bridge_id, LifecycleEvent::Fail { error: e.message.clone() }, now_ms)
                    .expect("Submitting always accepts Fail");
                warn!(symbol = %req.symbol, error = %e, "bridge submit failed");
                let mut r = result(BridgeOutcome::Failed, Some(LifecycleState::Failed));
                r.error = Some(e.message.clone());
                r.audit.push(AuditRecord::new(
                    ACTOR,
                    "ORDER_SUBMIT_FAILED",
                    "bridge_id",
                    req.bridge_id.clone(),
                    Some(e.message),
                    json!({"symbol": req.symbol}),
                    ts_ns,
                ));
                return r;
            }
        };

        self.lifecycle
            .transition(&req.bridge_id, LifecycleEvent::Submitted { exchange_order_id: submit.exchange_order_id.clone() }, now_ms)
            .expect("Submitting always accepts Submitted");

        // Capacity is reserved at submission (§4.5 step 7: "orders_today +=
        // 1" follows submit unconditionally), not at fill — a resting or
        // partially-unfilled order still consumes the daily order/notional
        // budget that `gate_to_live` already checked it against above.
        self.limits.record_order(order_notional);

        let mut slippage_record = None;
        if submit.filled_qty > 0.0 {
            self.lifecycle
                .transition(
                    &req.bridge_id,
                    LifecycleEvent::Fill { delta_qty: submit.filled_qty, price: submit.avg_fill_price },
                    now_ms,
                )
                .expect("Submitted always accepts Fill");

            if req.price > 0.0 {
                let (record, alert) = self.slippage.record(
                    req.bridge_id.clone(),
                    req.symbol.clone(),
                    req.side,
                    req.price,
                    submit.avg_fill_price,
                    submit.filled_qty,
                    now_ms,
                );
                log_alert(alert.as_ref());
                slippage_record = Some(record);
            }
        }

        let final_state = self.lifecycle.get(&req.bridge_id).expect("entry exists").state;
        let outcome = if final_state == LifecycleState::Filled {
            BridgeOutcome::Filled
        } else {
            BridgeOutcome::Submitted
        };

        let mut r = result(outcome, Some(final_state));
        r.slippage = slippage_record;
        r.audit.push(AuditRecord::new(
            ACTOR,
            if outcome == BridgeOutcome::Filled { "ORDER_FILLED" } else { "ORDER_SUBMITTED" },
            "bridge_id",
            req.bridge_id.clone(),
            None,
            json!({
                "symbol": req.symbol,
                "exchange_order_id": submit.exchange_order_id,
                "filled_qty": submit.filled_qty,
                "avg_fill_price": submit.avg_fill_price,
            }),
            ts_ns,
        ));
        r
    }
}

fn log_alert(alert: Option<&SlippageAlert>) {
    if let Some(alert) = alert {
        warn!(symbol = %alert.symbol, bps = alert.slippage_bps, severity = ?alert.severity, "slippage alert");
    }
}
