//! Position-only reconciliation (C8). Unlike the teacher's order-and-position
//! reconciler, this walks a single symbol -> signed-quantity map from each
//! side and classifies drift; there is no broker order book to diff against
//! and no gate on the result (§4.8, §9 — reconciliation here is a
//! timer-driven health signal, not something live arming waits on).

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::types::{DriftClass, PositionDrift, ReconcileReport, ORPHAN_DRIFT_PCT};

fn classify(symbol: &str, paper_qty: f64, exchange_qty: f64, tolerance_pct: f64) -> PositionDrift {
    let (class, drift_pct) = if paper_qty == 0.0 && exchange_qty == 0.0 {
        (DriftClass::Match, 0.0)
    } else if paper_qty == 0.0 {
        (DriftClass::OrphanedExchange, ORPHAN_DRIFT_PCT)
    } else if exchange_qty == 0.0 {
        (DriftClass::OrphanedPaper, ORPHAN_DRIFT_PCT)
    } else {
        let drift_fraction = (exchange_qty - paper_qty).abs() / paper_qty.abs();
        let pct = drift_fraction * 100.0;
        if drift_fraction > tolerance_pct {
            (DriftClass::Mismatch, pct)
        } else {
            (DriftClass::Match, pct)
        }
    };

    PositionDrift {
        symbol: symbol.to_string(),
        paper_qty,
        exchange_qty,
        class,
        drift_pct,
    }
}

/// Reconcile paper against exchange positions for the union of symbols seen
/// on either side, using `tolerance_pct` as a fraction (0.01 == 1%).
pub fn reconcile(
    paper_positions: &BTreeMap<String, f64>,
    exchange_positions: &BTreeMap<String, f64>,
    tolerance_pct: f64,
    now: i64,
) -> ReconcileReport {
    let mut symbols: BTreeSet<&String> = BTreeSet::new();
    symbols.extend(paper_positions.keys());
    symbols.extend(exchange_positions.keys());

    let mut drifts = Vec::with_capacity(symbols.len());
    let mut match_count = 0;
    let mut mismatch_count = 0;
    let mut orphaned_exchange_count = 0;
    let mut orphaned_paper_count = 0;
    let mut worst_mismatch_pct = 0.0_f64;

    for symbol in symbols {
        let paper_qty = *paper_positions.get(symbol).unwrap_or(&0.0);
        let exchange_qty = *exchange_positions.get(symbol).unwrap_or(&0.0);
        let drift = classify(symbol, paper_qty, exchange_qty, tolerance_pct);

        match drift.class {
            DriftClass::Match => match_count += 1,
            DriftClass::Mismatch => {
                mismatch_count += 1;
                worst_mismatch_pct = worst_mismatch_pct.max(drift.drift_pct);
            }
            DriftClass::OrphanedExchange => {
                orphaned_exchange_count += 1;
                worst_mismatch_pct = worst_mismatch_pct.max(drift.drift_pct);
            }
            DriftClass::OrphanedPaper => {
                orphaned_paper_count += 1;
                worst_mismatch_pct = worst_mismatch_pct.max(drift.drift_pct);
            }
        }

        drifts.push(drift);
    }

    ReconcileReport {
        is_healthy: mismatch_count == 0 && orphaned_exchange_count == 0 && orphaned_paper_count == 0,
        match_count,
        mismatch_count,
        orphaned_exchange_count,
        orphaned_paper_count,
        worst_mismatch_pct,
        timestamp: now,
        drifts,
    }
}
