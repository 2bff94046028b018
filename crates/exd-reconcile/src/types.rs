use std::fmt;

/// Default tolerance applied when a caller does not specify one (§4.8).
pub const DEFAULT_TOLERANCE_PCT: f64 = 0.01;

/// Synthetic drift assigned to an orphaned side: there is nothing on the
/// other side to compare against, so the whole position counts as drift.
pub const ORPHAN_DRIFT_PCT: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DriftClass {
    Match,
    Mismatch,
    OrphanedExchange,
    OrphanedPaper,
}

impl fmt::Display for DriftClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DriftClass::Match => "MATCH",
            DriftClass::Mismatch => "MISMATCH",
            DriftClass::OrphanedExchange => "ORPHANED_EXCHANGE",
            DriftClass::OrphanedPaper => "ORPHANED_PAPER",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PositionDrift {
    pub symbol: String,
    pub paper_qty: f64,
    pub exchange_qty: f64,
    pub class: DriftClass,
    pub drift_pct: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReconcileReport {
    pub is_healthy: bool,
    pub match_count: u32,
    pub mismatch_count: u32,
    pub orphaned_exchange_count: u32,
    pub orphaned_paper_count: u32,
    pub worst_mismatch_pct: f64,
    pub timestamp: i64,
    pub drifts: Vec<PositionDrift>,
}
