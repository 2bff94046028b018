use std::collections::{BTreeMap, VecDeque};

use exd_schemas::Side;

#[derive(Clone, Debug, PartialEq)]
pub struct SlippageRecord {
    pub bridge_id: String,
    pub symbol: String,
    pub side: Side,
    pub expected_price: f64,
    pub actual_price: f64,
    pub slippage_bps: f64,
    pub quantity: f64,
    pub notional: f64,
    pub timestamp: i64,
}

/// Signed basis points of deviation between expected and actual fill price.
/// Positive always means "worse than expected", for either side (§4.5 step
/// 8): a long paying more, or a short receiving less.
pub fn slippage_bps(side: Side, expected_price: f64, actual_price: f64) -> f64 {
    if expected_price == 0.0 {
        return 0.0;
    }
    let raw = ((actual_price - expected_price) / expected_price * 10_000.0).round();
    let sign = match side {
        Side::Long => 1.0,
        Side::Short => -1.0,
    };
    raw * sign
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertSeverity {
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SlippageAlert {
    pub severity: AlertSeverity,
    pub slippage_bps: f64,
    pub symbol: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SymbolStats {
    pub count: u64,
    pub mean_bps: f64,
    pub min_bps: f64,
    pub max_bps: f64,
    pub notional_weighted_cost_bps: f64,
    pub total_notional: f64,
    pub first_ts: i64,
    pub last_ts: i64,
}

impl SymbolStats {
    fn from_first(record: &SlippageRecord) -> Self {
        Self {
            count: 1,
            mean_bps: record.slippage_bps,
            min_bps: record.slippage_bps,
            max_bps: record.slippage_bps,
            notional_weighted_cost_bps: record.slippage_bps,
            total_notional: record.notional,
            first_ts: record.timestamp,
            last_ts: record.timestamp,
        }
    }

    fn fold(&mut self, record: &SlippageRecord) {
        let n = self.count as f64;
        self.mean_bps = (self.mean_bps * n + record.slippage_bps) / (n + 1.0);
        self.min_bps = self.min_bps.min(record.slippage_bps);
        self.max_bps = self.max_bps.max(record.slippage_bps);

        let new_total = self.total_notional + record.notional;
        self.notional_weighted_cost_bps = if new_total > 0.0 {
            (self.notional_weighted_cost_bps * self.total_notional + record.slippage_bps * record.notional) / new_total
        } else {
            self.notional_weighted_cost_bps
        };
        self.total_notional = new_total;

        self.count += 1;
        self.first_ts = self.first_ts.min(record.timestamp);
        self.last_ts = self.last_ts.max(record.timestamp);
    }
}

/// Bounded ring of recent fills plus incrementally-updated per-symbol stats.
pub struct SlippageAnalyzer {
    ring: VecDeque<SlippageRecord>,
    ring_capacity: usize,
    stats: BTreeMap<String, SymbolStats>,
    alert_threshold_bps: f64,
}

impl SlippageAnalyzer {
    pub fn new(ring_capacity: usize, alert_threshold_bps: f64) -> Self {
        Self {
            ring: VecDeque::with_capacity(ring_capacity),
            ring_capacity,
            stats: BTreeMap::new(),
            alert_threshold_bps,
        }
    }

    pub fn record(
        &mut self,
        bridge_id: impl Into<String>,
        symbol: impl Into<String>,
        side: Side,
        expected_price: f64,
        actual_price: f64,
        quantity: f64,
        timestamp: i64,
    ) -> (SlippageRecord, Option<SlippageAlert>) {
        let symbol = symbol.into();
        let bps = slippage_bps(side, expected_price, actual_price);
        let record = SlippageRecord {
            bridge_id: bridge_id.into(),
            symbol: symbol.clone(),
            side,
            expected_price,
            actual_price,
            slippage_bps: bps,
            quantity,
            notional: quantity * actual_price,
            timestamp,
        };

        if self.ring.len() == self.ring_capacity && self.ring_capacity > 0 {
            self.ring.pop_front();
        }
        if self.ring_capacity > 0 {
            self.ring.push_back(record.clone());
        }

        self.stats
            .entry(symbol.clone())
            .and_modify(|s| s.fold(&record))
            .or_insert_with(|| SymbolStats::from_first(&record));

        let alert = if bps.abs() > 100.0 {
            Some(SlippageAlert { severity: AlertSeverity::Error, slippage_bps: bps, symbol })
        } else if bps.abs() > self.alert_threshold_bps {
            Some(SlippageAlert { severity: AlertSeverity::Warning, slippage_bps: bps, symbol })
        } else {
            None
        };

        (record, alert)
    }

    pub fn stats_for(&self, symbol: &str) -> Option<&SymbolStats> {
        self.stats.get(symbol)
    }

    pub fn recent(&self) -> impl Iterator<Item = &SlippageRecord> {
        self.ring.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_paying_more_is_positive_slippage() {
        let bps = slippage_bps(Side::Long, 100.0, 100.5);
        assert_eq!(bps, 50.0);
    }

    #[test]
    fn sell_receiving_less_is_positive_slippage() {
        let bps = slippage_bps(Side::Short, 100.0, 99.5);
        assert_eq!(bps, 50.0);
    }

    #[test]
    fn alert_fires_above_threshold_and_escalates_past_100bps() {
        let mut an = SlippageAnalyzer::new(10, 20.0);
        let (_, warn) = an.record("b1", "BTCUSDT", Side::Long, 100.0, 100.3, 1.0, 0);
        assert_eq!(warn.unwrap().severity, AlertSeverity::Warning);

        let (_, err) = an.record("b2", "BTCUSDT", Side::Long, 100.0, 102.0, 1.0, 1);
        assert_eq!(err.unwrap().severity, AlertSeverity::Error);
    }

    #[test]
    fn notional_weighted_cost_reflects_larger_fill_more() {
        let mut an = SlippageAnalyzer::new(10, 1_000.0);
        an.record("b1", "BTCUSDT", Side::Long, 100.0, 100.1, 1.0, 0);
        an.record("b2", "BTCUSDT", Side::Long, 100.0, 101.0, 100.0, 1);
        let stats = an.stats_for("BTCUSDT").unwrap();
        assert!(stats.notional_weighted_cost_bps > stats.mean_bps);
    }

    #[test]
    fn ring_buffer_is_bounded() {
        let mut an = SlippageAnalyzer::new(2, 1_000.0);
        an.record("b1", "BTCUSDT", Side::Long, 100.0, 100.0, 1.0, 0);
        an.record("b2", "BTCUSDT", Side::Long, 100.0, 100.0, 1.0, 1);
        an.record("b3", "BTCUSDT", Side::Long, 100.0, 100.0, 1.0, 2);
        assert_eq!(an.recent().count(), 2);
    }
}
