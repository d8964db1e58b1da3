//! Risk-bounded contract sizing.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use autopilot_core::config::RiskConfig;

/// Bounded contract count for one trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeResult {
    pub max_contracts: u32,
    pub per_contract_cost: Decimal,
    pub budget_usd: Decimal,
}

/// Convert a per-trade budget and per-contract cost into a contract count.
///
/// Floor division against the budget, clamped to `risk.max_contracts`. A
/// non-positive cost sizes to zero (degenerate input, not an error). When
/// `risk.max_premium_per_contract` is set, a contract costing more than that
/// ceiling sizes to zero regardless of available budget.
pub fn size_by_budget(
    budget_usd: Decimal,
    per_contract_cost: Decimal,
    risk: &RiskConfig,
) -> SizeResult {
    if per_contract_cost <= Decimal::ZERO {
        return SizeResult {
            max_contracts: 0,
            per_contract_cost,
            budget_usd,
        };
    }

    let max_by_budget = (budget_usd / per_contract_cost)
        .floor()
        .to_u32()
        .unwrap_or(0);
    let mut max_contracts = max_by_budget.min(risk.max_contracts);

    if let Some(cap) = risk.max_premium_per_contract {
        if per_contract_cost > cap * Decimal::ONE_HUNDRED {
            max_contracts = 0;
        }
    }

    SizeResult {
        max_contracts,
        per_contract_cost,
        budget_usd,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn risk(max_contracts: u32, max_premium_per_contract: Option<Decimal>) -> RiskConfig {
        RiskConfig {
            max_equity_pct_per_trade: 0.10,
            max_contracts,
            max_premium_per_contract,
        }
    }

    #[test]
    fn floors_budget_division() {
        let r = size_by_budget(dec!(1000), dec!(250), &risk(20, None));
        assert_eq!(r.max_contracts, 4);
    }

    #[test]
    fn zero_cost_sizes_to_zero() {
        let r = size_by_budget(dec!(1000), dec!(0), &risk(20, None));
        assert_eq!(r.max_contracts, 0);
    }

    #[test]
    fn negative_cost_sizes_to_zero() {
        let r = size_by_budget(dec!(1000), dec!(-5), &risk(20, None));
        assert_eq!(r.max_contracts, 0);
    }

    #[test]
    fn clamps_to_max_contracts() {
        let r = size_by_budget(dec!(10000), dec!(100), &risk(20, None));
        assert_eq!(r.max_contracts, 20);
    }

    #[test]
    fn absolute_premium_ceiling_overrides_budget() {
        // Ceiling 1.00 = $100/contract; a $150 contract is out even with
        // ample budget.
        let r = size_by_budget(dec!(10000), dec!(150), &risk(20, Some(dec!(1.00))));
        assert_eq!(r.max_contracts, 0);
    }

    #[test]
    fn premium_ceiling_passes_contracts_at_or_under() {
        let r = size_by_budget(dec!(10000), dec!(100), &risk(20, Some(dec!(1.00))));
        assert_eq!(r.max_contracts, 20);
    }
}
