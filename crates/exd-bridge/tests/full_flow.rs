use std::collections::BTreeSet;

use chrono::NaiveDate;
use exd_bridge::{Bridge, BridgeConfig, BridgeOutcome, PaperExchangeAdapter, PaperExecutionRequest};
use exd_killswitch::KillSwitchConfig;
use exd_schemas::{Side, TradeMode};

fn allowlist() -> BTreeSet<String> {
    let mut s = BTreeSet::new();
    s.insert("BTCUSDT".to_string());
    s
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
}

fn req(bridge_id: &str) -> PaperExecutionRequest {
    PaperExecutionRequest {
        bridge_id: bridge_id.to_string(),
        symbol: "BTCUSDT".to_string(),
        side: Side::Long,
        qty: 1.0,
        price: 50_000.0,
    }
}

#[test]
fn daily_notional_cap_stops_the_bridge_mid_day() {
    let cfg = BridgeConfig::new(
        TradeMode::Canary,
        "binance-futures",
        true,
        allowlist(),
        10,
        75_000.0,
        60_000.0,
        5_000,
        true,
    );
    let mut bridge = Bridge::new(cfg, day());
    let mut adapter = PaperExchangeAdapter::new();
    let killswitch = KillSwitchConfig::clear();

    let first = bridge.execute(&mut adapter, req("b1"), &killswitch, day(), 1_000);
    assert_eq!(first.outcome, BridgeOutcome::Filled);

    let second = bridge.execute(&mut adapter, req("b2"), &killswitch, day(), 2_000);
    assert_eq!(second.outcome, BridgeOutcome::Gated);

    assert_eq!(bridge.limits.current_order_count, 1);
}

#[test]
fn live_mode_request_is_clamped_and_still_submits_as_canary() {
    let cfg = BridgeConfig::new(
        TradeMode::Live,
        "binance-futures",
        true,
        allowlist(),
        10,
        1_000_000.0,
        1_000_000.0,
        5_000,
        true,
    );
    assert_eq!(cfg.mode, TradeMode::Canary);

    let mut bridge = Bridge::new(cfg, day());
    let mut adapter = PaperExchangeAdapter::new();
    let killswitch = KillSwitchConfig::clear();

    let result = bridge.execute(&mut adapter, req("b1"), &killswitch, day(), 1_000);
    assert_eq!(result.outcome, BridgeOutcome::Filled);
}

#[test]
fn kill_switch_preempts_the_gate_and_lifecycle_entirely() {
    let cfg = BridgeConfig::new(
        TradeMode::Canary,
        "binance-futures",
        true,
        allowlist(),
        10,
        1_000_000.0,
        1_000_000.0,
        5_000,
        true,
    );
    let mut bridge = Bridge::new(cfg, day());
    let mut adapter = PaperExchangeAdapter::new();
    let killswitch = KillSwitchConfig {
        global: false,
        symbols: allowlist(),
        reason: "desk halt".to_string(),
    };

    let result = bridge.execute(&mut adapter, req("b1"), &killswitch, day(), 1_000);
    assert_eq!(result.outcome, BridgeOutcome::Killed);
    assert!(bridge.lifecycle.get("b1").is_none());
    assert_eq!(adapter.fetch_position("BTCUSDT"), 0.0);
}

#[test]
fn daily_counters_reset_across_a_calendar_boundary() {
    let cfg = BridgeConfig::new(
        TradeMode::Canary,
        "binance-futures",
        true,
        allowlist(),
        1,
        1_000_000.0,
        1_000_000.0,
        5_000,
        true,
    );
    let mut bridge = Bridge::new(cfg, day());
    let mut adapter = PaperExchangeAdapter::new();
    let killswitch = KillSwitchConfig::clear();

    let first = bridge.execute(&mut adapter, req("b1"), &killswitch, day(), 1_000);
    assert_eq!(first.outcome, BridgeOutcome::Filled);

    let next_day = day().succ_opt().unwrap();
    let second = bridge.execute(&mut adapter, req("b2"), &killswitch, next_day, 2_000);
    assert_eq!(second.outcome, BridgeOutcome::Filled);
}
