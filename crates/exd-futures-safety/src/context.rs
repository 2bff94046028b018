use exd_schemas::{content_hash_hex, MarginMode, PositionSide, Side, TradeMode};
use serde_json::json;

/// Frozen futures trade intent. Deep-frozen after construction; the
/// constructor derives `intent_id` so callers never hand-roll one.
#[derive(Clone, Debug, PartialEq)]
pub struct FuturesIntentContext {
    pub symbol: String,
    pub side: Side,
    pub leverage: f64,
    pub margin_mode: MarginMode,
    pub position_side: PositionSide,
    pub reduce_only: bool,
    pub notional_usd: f64,
    pub entry_price: f64,
    pub estimated_liquidation_price: f64,
    pub funding_rate_snapshot: f64,
    pub policy_snapshot_hash: String,
    pub mode: TradeMode,
    pub created_at: i64,
    pub intent_id: String,
}

#[allow(clippy::too_many_arguments)]
impl FuturesIntentContext {
    pub fn new(
        symbol: impl Into<String>,
        side: Side,
        leverage: f64,
        margin_mode: MarginMode,
        position_side: PositionSide,
        reduce_only: bool,
        notional_usd: f64,
        entry_price: f64,
        estimated_liquidation_price: f64,
        funding_rate_snapshot: f64,
        policy_snapshot_hash: impl Into<String>,
        mode: TradeMode,
        created_at: i64,
    ) -> Self {
        let symbol = symbol.into();
        let policy_snapshot_hash = policy_snapshot_hash.into();
        let intent_id = derive_intent_id(&symbol, side, leverage, entry_price, created_at);
        Self {
            symbol,
            side,
            leverage,
            margin_mode,
            position_side,
            reduce_only,
            notional_usd,
            entry_price,
            estimated_liquidation_price,
            funding_rate_snapshot,
            policy_snapshot_hash,
            mode,
            created_at,
            intent_id,
        }
    }
}

/// `intent_id` is a pure function of `(symbol, side, leverage, entry_price,
/// created_at)` — any other change and the derived id changes too, per the
/// idempotent-intent-id testable property.
fn derive_intent_id(symbol: &str, side: Side, leverage: f64, entry_price: f64, created_at: i64) -> String {
    let payload = json!({
        "symbol": symbol,
        "side": side.to_string(),
        "leverage": leverage.to_bits(),
        "entry_price": entry_price.to_bits(),
        "created_at": created_at,
    });
    content_hash_hex(&payload, 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(entry: f64, created_at: i64) -> FuturesIntentContext {
        FuturesIntentContext::new(
            "BTCUSDT",
            Side::Long,
            2.0,
            MarginMode::Isolated,
            PositionSide::OneWay,
            true,
            1000.0,
            entry,
            entry * 0.9,
            0.0001,
            "hash1",
            TradeMode::Canary,
            created_at,
        )
    }

    #[test]
    fn intent_id_is_deterministic() {
        assert_eq!(make(50_000.0, 1).intent_id, make(50_000.0, 1).intent_id);
    }

    #[test]
    fn intent_id_changes_with_entry_price() {
        assert_ne!(make(50_000.0, 1).intent_id, make(50_001.0, 1).intent_id);
    }

    #[test]
    fn intent_id_changes_with_created_at() {
        assert_ne!(make(50_000.0, 1).intent_id, make(50_000.0, 2).intent_id);
    }
}
