use exd_schemas::Side;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizingInput {
    pub side: Side,
    pub equity_usd: f64,
    pub max_risk_pct: f64,
    pub leverage_cap: f64,
    pub entry_price: f64,
    pub stop_price: f64,
    pub maintenance_margin_rate: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizingOutput {
    pub notional_usd: f64,
    pub qty: f64,
    pub effective_leverage: f64,
    pub estimated_liquidation_price: f64,
    pub worst_case_loss_usd: f64,
    pub stop_distance_pct: f64,
    pub liquidation_distance_pct: f64,
}

/// Size a position from a risk budget, capped by the leverage limit (§4.4b).
///
/// Two independent caps are applied and the tighter one wins:
/// - the risk budget (`equity_usd * max_risk_pct`) divided by the stop
///   distance bounds `worst_case_loss_usd`;
/// - `leverage_cap * equity_usd` bounds gross notional directly.
///
/// The estimated liquidation price uses the standard isolated-margin
/// approximation; whether it actually clears the stop (the ordering
/// invariant in §4.4b/c) is validated by the risk gate, not computed here.
pub fn size(input: SizingInput) -> SizingOutput {
    let stop_distance = (input.entry_price - input.stop_price).abs();
    let risk_budget_usd = input.equity_usd * input.max_risk_pct;

    let notional_from_risk = if stop_distance > 0.0 {
        (risk_budget_usd / stop_distance) * input.entry_price
    } else {
        0.0
    };
    let notional_from_leverage_cap = input.equity_usd * input.leverage_cap;

    let notional_usd = notional_from_risk.min(notional_from_leverage_cap).max(0.0);
    let qty = if input.entry_price > 0.0 {
        notional_usd / input.entry_price
    } else {
        0.0
    };
    let effective_leverage = if input.equity_usd > 0.0 {
        notional_usd / input.equity_usd
    } else {
        0.0
    };
    let worst_case_loss_usd = qty * stop_distance;

    let inv_leverage = if effective_leverage > 0.0 {
        1.0 / effective_leverage
    } else {
        0.0
    };
    let estimated_liquidation_price = match input.side {
        Side::Long => input.entry_price * (1.0 - inv_leverage + input.maintenance_margin_rate),
        Side::Short => input.entry_price * (1.0 + inv_leverage - input.maintenance_margin_rate),
    };

    let stop_distance_pct = if input.entry_price > 0.0 {
        stop_distance / input.entry_price
    } else {
        0.0
    };
    let liquidation_distance_pct = if input.entry_price > 0.0 {
        (estimated_liquidation_price - input.entry_price).abs() / input.entry_price
    } else {
        0.0
    };

    SizingOutput {
        notional_usd,
        qty,
        effective_leverage,
        estimated_liquidation_price,
        worst_case_loss_usd,
        stop_distance_pct,
        liquidation_distance_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_cap_property_holds_within_numeric_slack() {
        let input = SizingInput {
            side: Side::Long,
            equity_usd: 100_000.0,
            max_risk_pct: 0.01,
            leverage_cap: 5.0,
            entry_price: 50_000.0,
            stop_price: 49_000.0,
            maintenance_margin_rate: 0.005,
        };
        let out = size(input);
        let budget = input.equity_usd * input.max_risk_pct;
        assert!(out.worst_case_loss_usd <= budget * 1.01);
    }

    #[test]
    fn effective_leverage_never_exceeds_cap() {
        let input = SizingInput {
            side: Side::Long,
            equity_usd: 10_000.0,
            max_risk_pct: 0.5, // deliberately large, to force the leverage cap to bind.
            leverage_cap: 3.0,
            entry_price: 100.0,
            stop_price: 99.0,
            maintenance_margin_rate: 0.005,
        };
        let out = size(input);
        assert!(out.effective_leverage <= input.leverage_cap + 1e-9);
    }

    #[test]
    fn zero_stop_distance_yields_zero_size() {
        let input = SizingInput {
            side: Side::Long,
            equity_usd: 10_000.0,
            max_risk_pct: 0.01,
            leverage_cap: 3.0,
            entry_price: 100.0,
            stop_price: 100.0,
            maintenance_margin_rate: 0.005,
        };
        let out = size(input);
        assert_eq!(out.notional_usd, 0.0);
    }

    #[test]
    fn short_liquidation_price_sits_above_entry() {
        let input = SizingInput {
            side: Side::Short,
            equity_usd: 100_000.0,
            max_risk_pct: 0.01,
            leverage_cap: 5.0,
            entry_price: 50_000.0,
            stop_price: 51_000.0,
            maintenance_margin_rate: 0.005,
        };
        let out = size(input);
        assert!(out.estimated_liquidation_price > input.entry_price);
    }
}
