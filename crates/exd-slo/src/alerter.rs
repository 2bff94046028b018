use std::collections::BTreeMap;

use crate::types::{AlertEvent, AlertKind, SloEvaluation, SloStatus};

/// Debounces SLO evaluations into alert events, emitting only on state
/// transitions: a BREACHED snapshot that follows another BREACHED snapshot
/// is silent (§4.10). Budget-low is tracked independently of status since a
/// slowly draining budget can cross its threshold while status stays OK.
#[derive(Default)]
pub struct SloAlerter {
    last_status: BTreeMap<String, SloStatus>,
    budget_low_armed: BTreeMap<String, bool>,
}

impl SloAlerter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, eval: &SloEvaluation, budget_low_threshold_pct: f64) -> Vec<AlertEvent> {
        let mut events = Vec::new();
        let prev = self.last_status.get(&eval.slo_id).copied();

        if prev != Some(eval.status) {
            let kind = match eval.status {
                SloStatus::Breached => Some(AlertKind::Breached),
                SloStatus::Warning => Some(AlertKind::Warning),
                SloStatus::Ok if prev.is_some() && prev != Some(SloStatus::Ok) => Some(AlertKind::Recovered),
                _ => None,
            };
            if let Some(kind) = kind {
                events.push(AlertEvent {
                    slo_id: eval.slo_id.clone(),
                    kind,
                    timestamp: eval.timestamp,
                });
            }
            self.last_status.insert(eval.slo_id.clone(), eval.status);
        }

        if let Some(budget) = &eval.error_budget {
            let armed = *self.budget_low_armed.get(&eval.slo_id).unwrap_or(&false);
            if budget.consumed_pct >= budget_low_threshold_pct && !armed {
                events.push(AlertEvent {
                    slo_id: eval.slo_id.clone(),
                    kind: AlertKind::BudgetLow,
                    timestamp: eval.timestamp,
                });
                self.budget_low_armed.insert(eval.slo_id.clone(), true);
            } else if budget.consumed_pct < budget_low_threshold_pct && armed {
                self.budget_low_armed.insert(eval.slo_id.clone(), false);
            }
        }

        events
    }
}
