//! Process-wide and per-symbol kill switch (C1).
//!
//! Loaded once from the environment at process start. Consulted first by
//! both the futures safety chain and the execution bridge; it has absolute
//! precedence over every other rule in those chains — a global halt blocks
//! every symbol, and a symbol halt blocks only that uppercased symbol,
//! regardless of how sound the rest of an intent otherwise is.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use anyhow::Result;
use exd_config::{env_bool, env_or, env_symbol_set};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KillSwitchConfig {
    pub global: bool,
    pub symbols: BTreeSet<String>,
    pub reason: String,
}

impl KillSwitchConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            global: env_bool("EXD_KILLSWITCH_GLOBAL", false)?,
            symbols: env_symbol_set("EXD_KILLSWITCH_SYMBOLS"),
            reason: env_or("EXD_KILLSWITCH_REASON", "operator halt"),
        })
    }

    pub fn clear() -> Self {
        Self {
            global: false,
            symbols: BTreeSet::new(),
            reason: String::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum KillSwitchReason {
    GlobalKillActive,
    SymbolKillActive,
}

impl fmt::Display for KillSwitchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            KillSwitchReason::GlobalKillActive => "GLOBAL_KILL_ACTIVE",
            KillSwitchReason::SymbolKillActive => "SYMBOL_KILL_ACTIVE",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KillSwitchOutcome {
    Pass,
    Fail {
        reason: KillSwitchReason,
        symbol: Option<String>,
        detail: String,
    },
}

impl KillSwitchOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, KillSwitchOutcome::Pass)
    }
}

/// `evaluate(cfg, symbol)` is the single function both the futures safety
/// chain and the bridge call before doing anything else.
pub fn evaluate(cfg: &KillSwitchConfig, symbol: &str) -> KillSwitchOutcome {
    if cfg.global {
        return KillSwitchOutcome::Fail {
            reason: KillSwitchReason::GlobalKillActive,
            symbol: None,
            detail: cfg.reason.clone(),
        };
    }
    let upper = symbol.to_uppercase();
    if cfg.symbols.contains(&upper) {
        return KillSwitchOutcome::Fail {
            reason: KillSwitchReason::SymbolKillActive,
            symbol: Some(upper),
            detail: cfg.reason.clone(),
        };
    }
    KillSwitchOutcome::Pass
}

/// A recorded kill-switch activation, carried into the audit/event layer.
/// Mirrors the evidence-map builder style used for risk events elsewhere in
/// this workspace's lineage: free-form key/value evidence rather than a
/// fixed struct, since the operationally useful context varies by trigger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KillSwitchEvent {
    pub reason: KillSwitchReason,
    pub symbol: Option<String>,
    pub detail: String,
    pub evidence: BTreeMap<String, String>,
}

impl KillSwitchEvent {
    pub fn new(reason: KillSwitchReason, symbol: Option<String>, detail: impl Into<String>) -> Self {
        Self {
            reason,
            symbol,
            detail: detail.into(),
            evidence: BTreeMap::new(),
        }
    }

    pub fn with_evidence(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.evidence.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_when_nothing_halted() {
        let cfg = KillSwitchConfig::clear();
        assert_eq!(evaluate(&cfg, "BTCUSDT"), KillSwitchOutcome::Pass);
    }

    #[test]
    fn global_halt_blocks_every_symbol() {
        let cfg = KillSwitchConfig {
            global: true,
            symbols: BTreeSet::new(),
            reason: "ops freeze".to_string(),
        };
        let outcome = evaluate(&cfg, "ethusdt");
        assert_eq!(
            outcome,
            KillSwitchOutcome::Fail {
                reason: KillSwitchReason::GlobalKillActive,
                symbol: None,
                detail: "ops freeze".to_string(),
            }
        );
    }

    #[test]
    fn symbol_halt_is_case_insensitive_and_scoped() {
        let mut symbols = BTreeSet::new();
        symbols.insert("BTCUSDT".to_string());
        let cfg = KillSwitchConfig {
            global: false,
            symbols,
            reason: "desk review".to_string(),
        };
        assert!(!evaluate(&cfg, "btcusdt").is_pass());
        assert!(evaluate(&cfg, "ETHUSDT").is_pass());
    }

    #[test]
    fn global_takes_precedence_over_symbol_allowlist() {
        let cfg = KillSwitchConfig {
            global: true,
            symbols: BTreeSet::new(),
            reason: "halt".to_string(),
        };
        let outcome = evaluate(&cfg, "AAA");
        match outcome {
            KillSwitchOutcome::Fail { reason, .. } => {
                assert_eq!(reason, KillSwitchReason::GlobalKillActive)
            }
            _ => panic!("expected fail"),
        }
    }
}
