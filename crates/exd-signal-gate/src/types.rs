use std::collections::BTreeMap;
use std::fmt;

/// Market regime snapshot at evaluation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Regime {
    /// -1 downtrend, 0 sideways, 1 uptrend.
    pub trend: i8,
    /// Coarse volatility bucket, higher = more volatile.
    pub volatility_bucket: i32,
    /// Coarse spread bucket, higher = wider.
    pub spread_bucket: i32,
}

/// Raw price/spread features used by the spread-penalty rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Features {
    pub spread: f64,
    pub mid_price: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SignalGateConfig {
    pub trend_min: i8,
    pub volatility_min: i32,
    pub spread_max_bucket: i32,
    pub min_signal_score: f64,
    pub cooldown_ms: i64,
    pub max_spread_normalized: f64,
}

impl SignalGateConfig {
    pub fn sane_defaults() -> Self {
        Self {
            trend_min: -1,
            volatility_min: 0,
            spread_max_bucket: i32::MAX,
            min_signal_score: 0.0,
            cooldown_ms: 0,
            max_spread_normalized: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum BlockReason {
    RegimeTrend,
    RegimeVolatility,
    RegimeSpread,
    SignalStrength,
    Cooldown,
    SpreadPenalty,
}

impl BlockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::RegimeTrend => "regime_trend",
            BlockReason::RegimeVolatility => "regime_volatility",
            BlockReason::RegimeSpread => "regime_spread",
            BlockReason::SignalStrength => "signal_strength",
            BlockReason::Cooldown => "cooldown",
            BlockReason::SpreadPenalty => "spread_penalty",
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GateOutcome {
    Allow,
    Block(BlockReason),
}

impl GateOutcome {
    pub fn is_allow(&self) -> bool {
        matches!(self, GateOutcome::Allow)
    }
}

/// Running statistics updated on every `evaluate` call. Single-writer: the
/// strategy runtime loop owns the gate and calls `evaluate` serially.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SignalGateStats {
    pub passed: u64,
    pub blocked: u64,
    pub block_reasons: BTreeMap<&'static str, u64>,
}

impl SignalGateStats {
    pub fn record(&mut self, outcome: &GateOutcome) {
        match outcome {
            GateOutcome::Allow => self.passed += 1,
            GateOutcome::Block(reason) => {
                self.blocked += 1;
                *self.block_reasons.entry(reason.as_str()).or_insert(0) += 1;
            }
        }
    }
}
