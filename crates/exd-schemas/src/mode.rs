use std::fmt;

/// Progressively greater real-world effect. `Live` is structurally disabled
/// everywhere in this workspace: every gate rejects it, bridge construction
/// coerces it away, and the adapter mapping layer panics if it is ever asked
/// to map a `Live` intent (three independent layers, per design note §9).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeMode {
    Shadow,
    Canary,
    Live,
}

impl TradeMode {
    /// Coerce `Live` down to `Canary`. Used at bridge/config construction
    /// time so that a misconfigured `LIVE` environment variable can never
    /// reach the orchestrator as `Live`.
    pub fn clamp_to_canary(self) -> TradeMode {
        match self {
            TradeMode::Live => TradeMode::Canary,
            other => other,
        }
    }

    /// Redact `Live` down to `Shadow` for anything that is *emitted*
    /// (OPS events, futures-safety-chain results) rather than *configured*.
    /// Kept distinct from `clamp_to_canary` because the two call sites mean
    /// different things: config construction wants "treat as canary", result
    /// emission wants "never claim live happened".
    pub fn redact(self) -> TradeMode {
        match self {
            TradeMode::Live => TradeMode::Shadow,
            other => other,
        }
    }

    pub fn is_live(self) -> bool {
        matches!(self, TradeMode::Live)
    }
}

impl fmt::Display for TradeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TradeMode::Shadow => "SHADOW",
            TradeMode::Canary => "CANARY",
            TradeMode::Live => "LIVE",
        };
        write!(f, "{s}")
    }
}
