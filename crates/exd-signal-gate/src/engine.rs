use crate::types::{BlockReason, Features, GateOutcome, Regime, SignalGateConfig, SignalGateStats};

/// Pure evaluation of a single candidate signal against the pre-decision
/// noise filter. Rule order is fixed and each rule short-circuits (§4.2):
/// regime (trend, volatility, spread bucket) -> signal strength -> cooldown
/// -> normalized spread penalty.
pub fn evaluate(
    cfg: &SignalGateConfig,
    signal_score: f64,
    features: Features,
    regime: Regime,
    last_trade_time: Option<i64>,
    now: i64,
) -> GateOutcome {
    if regime.trend < cfg.trend_min {
        return GateOutcome::Block(BlockReason::RegimeTrend);
    }
    if regime.volatility_bucket < cfg.volatility_min {
        return GateOutcome::Block(BlockReason::RegimeVolatility);
    }
    if regime.spread_bucket > cfg.spread_max_bucket {
        return GateOutcome::Block(BlockReason::RegimeSpread);
    }

    if signal_score < cfg.min_signal_score {
        return GateOutcome::Block(BlockReason::SignalStrength);
    }

    if let Some(last) = last_trade_time {
        if now - last < cfg.cooldown_ms {
            return GateOutcome::Block(BlockReason::Cooldown);
        }
    }

    let normalized_spread = if features.mid_price == 0.0 {
        0.0
    } else {
        features.spread / features.mid_price
    };
    if normalized_spread > cfg.max_spread_normalized {
        return GateOutcome::Block(BlockReason::SpreadPenalty);
    }

    GateOutcome::Allow
}

/// Evaluate and record the outcome in `stats` in one call, matching the
/// teacher's integrity engine shape of bundling evaluation with the running
/// counters the runtime loop reports on.
pub fn evaluate_and_record(
    cfg: &SignalGateConfig,
    stats: &mut SignalGateStats,
    signal_score: f64,
    features: Features,
    regime: Regime,
    last_trade_time: Option<i64>,
    now: i64,
) -> GateOutcome {
    let outcome = evaluate(cfg, signal_score, features, regime, last_trade_time, now);
    stats.record(&outcome);
    outcome
}
