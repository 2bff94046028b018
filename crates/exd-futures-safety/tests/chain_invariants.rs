//! End-to-end invariants across the full canary -> sizing -> risk -> funding
//! -> adapter chain, exercised the way the bridge would drive them.

use exd_futures_safety::adapter::{self, FuturesOrderIntent, OrderType};
use exd_futures_safety::canary;
use exd_futures_safety::context::FuturesIntentContext;
use exd_futures_safety::funding::{self, FundingInput};
use exd_futures_safety::risk;
use exd_futures_safety::sizing::{self, SizingInput};
use exd_killswitch::KillSwitchConfig;
use exd_schemas::{MarginMode, PositionSide, Side, TradeMode};

fn build_intent(mode: TradeMode) -> FuturesIntentContext {
    FuturesIntentContext::new(
        "BTCUSDT",
        Side::Long,
        2.0,
        MarginMode::Isolated,
        PositionSide::OneWay,
        true,
        10_000.0,
        50_000.0,
        30_000.0,
        0.0001,
        "policyhash1",
        mode,
        1_000,
    )
}

#[test]
fn live_mode_never_reaches_a_mapped_order() {
    let killswitch = KillSwitchConfig::clear();
    let intent = build_intent(TradeMode::Live);

    let canary_result = canary::evaluate(&intent, &killswitch, 0);
    assert_eq!(canary_result.outcome, canary::Outcome::Rejected);
    assert_eq!(canary_result.reason, canary::CanaryReason::LiveModeBlocked);
    assert_ne!(canary_result.mode, TradeMode::Live);

    let order_intent = FuturesOrderIntent {
        symbol: intent.symbol.clone(),
        side: intent.side,
        position_side: PositionSide::OneWay,
        margin_mode: MarginMode::Isolated,
        reduce_only: true,
        quantity: 0.01,
        price: Some(50_000.0),
        order_type: OrderType::Limit,
        time_in_force: "GTC".to_string(),
        client_order_id: "c1".to_string(),
        mode: intent.mode,
    };
    let adapter_gate = adapter::evaluate(&order_intent, 0);
    assert_eq!(adapter_gate.outcome, adapter::Outcome::Rejected);
    assert_eq!(adapter_gate.reason, adapter::AdapterReason::LiveModeBlocked);

    let mapped = std::panic::catch_unwind(|| adapter::map_order_intent(&order_intent));
    assert!(mapped.is_err(), "mapping a LIVE intent must panic structurally");
}

#[test]
fn reduce_only_false_is_rejected_at_both_canary_and_adapter_gates() {
    let killswitch = KillSwitchConfig::clear();
    let mut intent = build_intent(TradeMode::Canary);
    intent.reduce_only = false;

    let canary_result = canary::evaluate(&intent, &killswitch, 0);
    assert_eq!(canary_result.reason, canary::CanaryReason::NotReduceOnly);

    let order_intent = FuturesOrderIntent {
        symbol: intent.symbol.clone(),
        side: intent.side,
        position_side: PositionSide::OneWay,
        margin_mode: MarginMode::Isolated,
        reduce_only: false,
        quantity: 0.01,
        price: Some(50_000.0),
        order_type: OrderType::Limit,
        time_in_force: "GTC".to_string(),
        client_order_id: "c1".to_string(),
        mode: TradeMode::Canary,
    };
    let adapter_gate = adapter::evaluate(&order_intent, 0);
    assert_eq!(adapter_gate.reason, adapter::AdapterReason::NotReduceOnly);
}

#[test]
fn global_kill_switch_blocks_an_otherwise_pristine_intent() {
    let killswitch = KillSwitchConfig {
        global: true,
        symbols: Default::default(),
        reason: "ops freeze".to_string(),
    };
    let intent = build_intent(TradeMode::Canary);
    let canary_result = canary::evaluate(&intent, &killswitch, 0);
    assert_eq!(canary_result.reason, canary::CanaryReason::GlobalKillActive);
}

#[test]
fn full_chain_passes_for_a_conservative_position() {
    let killswitch = KillSwitchConfig::clear();
    let intent = build_intent(TradeMode::Canary);

    let canary_result = canary::evaluate(&intent, &killswitch, 0);
    assert_eq!(canary_result.outcome, canary::Outcome::Passed);

    let sizing_out = sizing::size(SizingInput {
        side: Side::Long,
        equity_usd: 100_000.0,
        max_risk_pct: 0.01,
        leverage_cap: 3.0,
        entry_price: 50_000.0,
        stop_price: 49_000.0,
        maintenance_margin_rate: 0.005,
    });

    let risk_result = risk::evaluate(
        &sizing_out,
        100_000.0,
        0.01,
        3.0,
        Side::Long,
        50_000.0,
        49_000.0,
        0,
    );
    assert_eq!(risk_result.outcome, risk::Outcome::Passed);

    let funding_result = funding::evaluate(
        FundingInput {
            side: Side::Long,
            notional_usd: sizing_out.notional_usd,
            funding_rate_snapshot: -0.0001, // long receives here.
            expected_hold_hours: 8.0,
            funding_budget_pct: 0.0001,
            equity_usd: 100_000.0,
        },
        0,
    );
    assert_eq!(funding_result.outcome, funding::Outcome::Passed);

    let order_intent = FuturesOrderIntent {
        symbol: intent.symbol.clone(),
        side: intent.side,
        position_side: PositionSide::OneWay,
        margin_mode: MarginMode::Isolated,
        reduce_only: true,
        quantity: sizing_out.qty,
        price: Some(50_000.0),
        order_type: OrderType::Limit,
        time_in_force: "GTC".to_string(),
        client_order_id: intent.intent_id.clone(),
        mode: TradeMode::Canary,
    };
    let adapter_gate = adapter::evaluate(&order_intent, 0);
    assert_eq!(adapter_gate.outcome, adapter::Outcome::Passed);

    let payload = adapter::map_order_intent(&order_intent);
    assert_eq!(payload.reduce_only, "true");
}
