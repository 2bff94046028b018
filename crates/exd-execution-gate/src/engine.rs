use crate::types::{
    Decision, ExecutionOutcome, ExecutionResult, GateState, PolicySnapshot, ReasonCode,
};

/// Pure per-decision policy evaluation (§4.3). Ordered, short-circuiting
/// checks: validity -> confidence -> policy/blacklist -> active-decision ->
/// cooldown -> pass. Never mutates `state`; the caller applies the effect of
/// a `WOULD_EXECUTE` outcome via `GateState::record_execution`.
pub fn evaluate(
    decision: &Decision,
    policy: &PolicySnapshot,
    state: &GateState,
    now: i64,
) -> ExecutionResult {
    let result = |outcome: ExecutionOutcome, reason_code: ReasonCode| ExecutionResult {
        decision_id: decision.decision_id.clone(),
        symbol: decision.symbol.clone(),
        outcome,
        reason_code,
        evaluated_at: now,
        policy_snapshot: policy.clone(),
        policy_version: decision.policy_version.clone(),
    };

    if decision.valid_until_ts <= now {
        return result(ExecutionOutcome::Rejected, ReasonCode::ExpiredDecision);
    }

    if decision.confidence < policy.min_confidence {
        return result(ExecutionOutcome::Rejected, ReasonCode::LowConfidence);
    }

    if !policy.allowed_policy_versions.contains(&decision.policy_version) {
        return result(ExecutionOutcome::Rejected, ReasonCode::PolicyRejected);
    }
    if policy.ops_blacklist_symbols.contains(&decision.symbol) {
        return result(ExecutionOutcome::Rejected, ReasonCode::OpsBlacklisted);
    }

    if state.active_decision_symbols.contains(&decision.symbol) {
        return result(ExecutionOutcome::Skipped, ReasonCode::NoActiveDecisionAllowed);
    }

    if let Some(&last_ts) = state.last_decision_ts_by_symbol.get(&decision.symbol) {
        if now - last_ts < policy.cooldown_ms {
            return result(ExecutionOutcome::Skipped, ReasonCode::CooldownActive);
        }
    }

    result(ExecutionOutcome::WouldExecute, ReasonCode::Passed)
}
