use crate::types::{Comparator, ErrorBudget, SloDefinition, SloEvaluation, SloStatus};

fn status_for(comparator: Comparator, current: f64, target: f64, warning: f64) -> SloStatus {
    match comparator {
        Comparator::Gte => {
            if current >= target {
                SloStatus::Ok
            } else if current >= warning {
                SloStatus::Warning
            } else {
                SloStatus::Breached
            }
        }
        Comparator::Lte => {
            if current <= target {
                SloStatus::Ok
            } else if current <= warning {
                SloStatus::Warning
            } else {
                SloStatus::Breached
            }
        }
    }
}

fn error_budget(target: f64, current: f64) -> ErrorBudget {
    let total_budget = 1.0 - target;
    let consumed = (target - current).max(0.0);
    let remaining = (total_budget - consumed).max(0.0);
    let consumed_pct = if total_budget > 0.0 {
        (consumed / total_budget * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };
    ErrorBudget {
        total_budget,
        consumed,
        remaining,
        consumed_pct,
    }
}

/// Pure evaluator: a metric provider yields `current`; `evaluate` turns that
/// into a status plus, for availability-ratio SLOs, an error-budget snapshot
/// (§4.10).
pub fn evaluate(def: &SloDefinition, current: Option<f64>, now: i64) -> SloEvaluation {
    let status = match current {
        None => SloStatus::Unknown,
        Some(v) => status_for(def.comparator, v, def.target, def.warning),
    };

    let budget = match current {
        Some(v) if def.is_availability_ratio => Some(error_budget(def.target, v)),
        _ => None,
    };

    SloEvaluation {
        slo_id: def.slo_id.clone(),
        status,
        current,
        target: def.target,
        warning: def.warning,
        error_budget: budget,
        timestamp: now,
    }
}
