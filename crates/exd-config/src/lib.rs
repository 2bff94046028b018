//! Environment-variable configuration loading, shared by the kill switch,
//! the bridge, the observability spool, and the SLO evaluator.
//!
//! The core's configuration surface (§6) is environment variables, not a
//! config file, so this crate follows the teacher's env-loading idiom
//! (`anyhow::Context`-wrapped `std::env::var`, typed parse helpers, explicit
//! defaults) rather than the teacher's separate layered-YAML loader, which
//! this spec has no use for.

use anyhow::{Context, Result};
use std::collections::BTreeSet;

/// Read an environment variable, falling back to `default` if it is unset.
/// An empty string is treated as "unset" so that `VAR=` in an env file does
/// not silently override a default.
pub fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => v,
        _ => default.to_string(),
    }
}

/// Read a required environment variable, failing with context naming the key.
pub fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("missing required environment variable {key}"))
}

pub fn env_bool(key: &str, default: bool) -> Result<bool> {
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => v
            .parse::<bool>()
            .with_context(|| format!("{key} must be \"true\" or \"false\", got {v:?}")),
        _ => Ok(default),
    }
}

pub fn env_i64(key: &str, default: i64) -> Result<i64> {
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => v
            .parse::<i64>()
            .with_context(|| format!("{key} must be an integer, got {v:?}")),
        _ => Ok(default),
    }
}

pub fn env_f64(key: &str, default: f64) -> Result<f64> {
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => v
            .parse::<f64>()
            .with_context(|| format!("{key} must be a number, got {v:?}")),
        _ => Ok(default),
    }
}

/// Comma-separated list, uppercased and deduplicated via a `BTreeSet` so
/// iteration order is deterministic regardless of how the operator wrote it.
pub fn env_symbol_set(key: &str) -> BTreeSet<String> {
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => v
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => BTreeSet::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize tests that touch them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn env_or_falls_back_on_empty_string() {
        let _g = ENV_LOCK.lock().unwrap();
        std::env::set_var("EXD_TEST_EMPTY", "");
        assert_eq!(env_or("EXD_TEST_EMPTY", "fallback"), "fallback");
        std::env::remove_var("EXD_TEST_EMPTY");
    }

    #[test]
    fn env_symbol_set_uppercases_and_dedupes() {
        let _g = ENV_LOCK.lock().unwrap();
        std::env::set_var("EXD_TEST_SYMBOLS", "btcusdt, ethusdt,btcusdt");
        let set = env_symbol_set("EXD_TEST_SYMBOLS");
        assert_eq!(
            set.into_iter().collect::<Vec<_>>(),
            vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()]
        );
        std::env::remove_var("EXD_TEST_SYMBOLS");
    }

    #[test]
    fn env_bool_rejects_garbage() {
        let _g = ENV_LOCK.lock().unwrap();
        std::env::set_var("EXD_TEST_BOOL", "maybe");
        assert!(env_bool("EXD_TEST_BOOL", false).is_err());
        std::env::remove_var("EXD_TEST_BOOL");
    }
}
