//! Trade proposal generation and allocation.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use autopilot_core::config::RiskConfig;
use autopilot_core::types::{Direction, OptionRight};

use crate::budget::{BudgetMode, BudgetPlan};
use crate::hedges::{inverse_proxy_for, is_hedge_ticker, is_levered_inverse_equity};
use crate::legs::OptionLeg;
use crate::sizing::size_by_budget;

/// What a proposal opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalKind {
    OpenOption,
    OpenShares,
}

/// A ranked idea offered to the allocator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalCandidate {
    pub ticker: String,
    pub direction: Direction,
    pub sleeve: Option<String>,
}

/// A proposed trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeProposal {
    pub kind: ProposalKind,
    pub ticker: String,
    /// Direction actually traded (an inverse-proxy buy trades bullish).
    pub direction: Direction,
    /// Net exposure expressed (a bullish SH buy is bearish exposure).
    pub exposure: Direction,
    pub leg: Option<OptionLeg>,
    pub contracts: u32,
    pub limit: Option<Decimal>,
    pub est_cost_usd: Decimal,
    pub sleeve: Option<String>,
    pub notes: Option<String>,
}

/// Finalized allocation pass. Read-only once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationResult {
    pub proposals: Vec<TradeProposal>,
    pub remaining_equity: Decimal,
    pub remaining_options: Decimal,
    pub remaining_total: Decimal,
    pub n_bullish: usize,
    pub n_bearish: usize,
}

/// Which instrument flex mode reaches for first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlexPreference {
    Options,
    Shares,
}

/// Allocation-pass parameters, constructed once.
#[derive(Debug, Clone)]
pub struct ProposalParams {
    pub budget_mode: BudgetMode,
    pub flex_prefer: FlexPreference,
    pub with_options: bool,
    /// Strict-mode per-trade premium cap.
    pub max_premium_usd: Decimal,
    /// Strict-mode per-position shares budget.
    pub shares_budget_usd: Decimal,
    pub max_new_trades: usize,
    pub min_new_trades: usize,
    pub risk: RiskConfig,
}

impl ProposalParams {
    pub fn new(budget_mode: BudgetMode) -> Self {
        Self {
            budget_mode,
            flex_prefer: FlexPreference::Options,
            with_options: true,
            max_premium_usd: Decimal::ONE_HUNDRED,
            shares_budget_usd: Decimal::ONE_HUNDRED,
            max_new_trades: 3,
            min_new_trades: 2,
            risk: RiskConfig::default(),
        }
    }
}

/// Build trade proposals from ranked candidates within budget constraints.
///
/// Walks candidates in input order (flex allocation is order-sensitive):
/// held underlyings are skipped, hedge tickers become bearish-exposure share
/// buys, options attach where the leg's right matches the view, bullish
/// ideas fall back to shares, and a final pass tops up whichever of
/// bullish/bearish exposure is missing.
pub fn build_proposals(
    candidates: &[ProposalCandidate],
    legs: &BTreeMap<String, OptionLeg>,
    last_prices: &BTreeMap<String, Decimal>,
    plan: &BudgetPlan,
    held_underlyings: &BTreeSet<String>,
    params: &ProposalParams,
) -> AllocationResult {
    let strict = params.budget_mode == BudgetMode::Strict;
    // A flex plan budgets the same pool on both lines; count it once.
    let pool = if strict {
        plan.total()
    } else {
        plan.budget_options
    };
    let mut alloc = Allocator {
        params,
        legs,
        last_prices,
        proposals: Vec::new(),
        opened: BTreeSet::new(),
        remaining_total: pool.max(Decimal::ZERO),
        remaining_equity: if strict {
            plan.budget_equity.max(Decimal::ZERO)
        } else {
            Decimal::ZERO
        },
        remaining_options: if strict {
            plan.budget_options.max(Decimal::ZERO)
        } else {
            Decimal::ZERO
        },
        n_bullish: 0,
        n_bearish: 0,
    };

    for c in candidates {
        if alloc.full() {
            break;
        }
        let ticker = c.ticker.trim().to_uppercase();
        if ticker.is_empty() || held_underlyings.contains(&ticker) {
            continue;
        }

        // Hedge instruments trade bullish but express bearish exposure; at
        // most one, and levered inverse never stacks.
        if is_hedge_ticker(&ticker) {
            if alloc.has_hedge_exposure() {
                continue;
            }
            if is_levered_inverse_equity(&ticker) && alloc.has_levered_inverse() {
                continue;
            }
            if alloc.add_shares(&ticker, Direction::Bullish, Direction::Bearish, c.sleeve.clone(), None) {
                continue;
            }
        }

        if params.budget_mode == BudgetMode::Flex
            && params.flex_prefer == FlexPreference::Shares
            && c.direction == Direction::Bullish
            && alloc.add_shares(&ticker, c.direction, c.direction, c.sleeve.clone(), None)
        {
            continue;
        }

        // Options first when enabled and the attached leg matches the view.
        if params.with_options {
            if let Some(leg) = legs.get(&ticker) {
                let matches_view = (c.direction == Direction::Bullish
                    && leg.right == OptionRight::Call)
                    || (c.direction == Direction::Bearish && leg.right == OptionRight::Put);
                if matches_view && alloc.add_option(&ticker, c.direction, c.sleeve.clone()) {
                    continue;
                }
            }
        }

        // Bullish fallback to shares.
        if c.direction == Direction::Bullish
            && alloc.add_shares(&ticker, c.direction, c.direction, c.sleeve.clone(), None)
        {
            continue;
        }

        // Bearish via inverse proxy when options are off.
        if !params.with_options && c.direction == Direction::Bearish {
            if let Some(inv) = inverse_proxy_for(&ticker) {
                if !held_underlyings.contains(inv) {
                    alloc.add_shares(
                        inv,
                        Direction::Bullish,
                        Direction::Bearish,
                        c.sleeve.clone(),
                        Some(format!("inverse_proxy_for={ticker}")),
                    );
                }
            }
        }
    }

    // Ensure two-sided exposure.
    if (alloc.n_bullish == 0 || alloc.n_bearish == 0) && !alloc.full() {
        let need = if alloc.n_bearish == 0 {
            Direction::Bearish
        } else {
            Direction::Bullish
        };
        for c in candidates {
            if alloc.full() {
                break;
            }
            let ticker = c.ticker.trim().to_uppercase();
            if ticker.is_empty() || held_underlyings.contains(&ticker) || c.direction != need {
                continue;
            }

            match need {
                Direction::Bearish => {
                    if params.with_options
                        && legs.get(&ticker).is_some_and(|l| l.right == OptionRight::Put)
                        && alloc.add_option(&ticker, c.direction, c.sleeve.clone())
                    {
                        break;
                    }
                    if let Some(inv) = inverse_proxy_for(&ticker) {
                        if !held_underlyings.contains(inv)
                            && alloc.add_shares(
                                inv,
                                Direction::Bullish,
                                Direction::Bearish,
                                c.sleeve.clone(),
                                Some(format!("inverse_proxy_for={ticker}")),
                            )
                        {
                            break;
                        }
                    }
                }
                Direction::Bullish => {
                    if params.with_options
                        && legs.get(&ticker).is_some_and(|l| l.right == OptionRight::Call)
                        && alloc.add_option(&ticker, c.direction, c.sleeve.clone())
                    {
                        break;
                    }
                    if alloc.add_shares(&ticker, c.direction, c.direction, c.sleeve.clone(), None) {
                        break;
                    }
                }
            }
        }
    }

    AllocationResult {
        proposals: alloc.proposals,
        remaining_equity: alloc.remaining_equity,
        remaining_options: alloc.remaining_options,
        remaining_total: alloc.remaining_total,
        n_bullish: alloc.n_bullish,
        n_bearish: alloc.n_bearish,
    }
}

struct Allocator<'a> {
    params: &'a ProposalParams,
    legs: &'a BTreeMap<String, OptionLeg>,
    last_prices: &'a BTreeMap<String, Decimal>,
    proposals: Vec<TradeProposal>,
    opened: BTreeSet<String>,
    remaining_total: Decimal,
    remaining_equity: Decimal,
    remaining_options: Decimal,
    n_bullish: usize,
    n_bearish: usize,
}

impl Allocator<'_> {
    fn full(&self) -> bool {
        self.proposals.len() >= self.params.max_new_trades
    }

    fn has_hedge_exposure(&self) -> bool {
        self.proposals.iter().any(|p| p.exposure == Direction::Bearish)
    }

    fn has_levered_inverse(&self) -> bool {
        self.proposals
            .iter()
            .any(|p| p.kind == ProposalKind::OpenShares && is_levered_inverse_equity(&p.ticker))
    }

    /// Per-trade budget for the next option trade under the current mode.
    fn option_trade_budget(&self) -> Decimal {
        match self.params.budget_mode {
            BudgetMode::Flex => {
                // Hold back room for the remaining minimum trades.
                if self.proposals.len() < self.params.min_new_trades {
                    let needed = (self.params.min_new_trades - self.proposals.len()).max(1);
                    self.remaining_total / Decimal::from(needed)
                } else {
                    self.remaining_total
                }
            }
            BudgetMode::Strict => self.params.max_premium_usd.min(self.remaining_options),
        }
    }

    fn add_option(&mut self, ticker: &str, direction: Direction, sleeve: Option<String>) -> bool {
        let Some(leg) = self.legs.get(ticker) else {
            return false;
        };
        let premium = leg.premium_usd;
        if premium <= Decimal::ZERO || self.full() {
            return false;
        }

        let budget = self.option_trade_budget();
        let size = size_by_budget(budget, premium, &self.params.risk);
        if size.max_contracts == 0 {
            return false;
        }
        let contracts = match self.params.budget_mode {
            // Flex spreads the pool thin; one contract per trade keeps the
            // minimum-trade target reachable.
            BudgetMode::Flex => 1,
            BudgetMode::Strict => size.max_contracts,
        };
        let cost = premium * Decimal::from(contracts);

        match self.params.budget_mode {
            BudgetMode::Flex => {
                if cost > self.remaining_total {
                    return false;
                }
                self.remaining_total -= cost;
            }
            BudgetMode::Strict => {
                if cost > self.remaining_options {
                    return false;
                }
                self.remaining_options -= cost;
            }
        }

        self.proposals.push(TradeProposal {
            kind: ProposalKind::OpenOption,
            ticker: ticker.to_string(),
            direction,
            exposure: direction,
            leg: Some(leg.clone()),
            contracts,
            limit: Some(leg.price),
            est_cost_usd: cost,
            sleeve,
            notes: None,
        });
        self.count(direction);
        true
    }

    fn add_shares(
        &mut self,
        ticker: &str,
        direction: Direction,
        exposure: Direction,
        sleeve: Option<String>,
        notes: Option<String>,
    ) -> bool {
        let Some(&last_px) = self.last_prices.get(ticker) else {
            return false;
        };
        if last_px <= Decimal::ZERO || self.full() || self.opened.contains(ticker) {
            return false;
        }

        let (qty, cost) = match self.params.budget_mode {
            BudgetMode::Flex => {
                if self.remaining_total <= Decimal::ZERO {
                    return false;
                }
                let needed = if self.proposals.len() < self.params.min_new_trades {
                    (self.params.min_new_trades - self.proposals.len()).max(1)
                } else {
                    1
                };
                let per_trade_cap = self.remaining_total / Decimal::from(needed);
                let qty = (per_trade_cap / last_px).floor();
                if qty <= Decimal::ZERO {
                    return false;
                }
                let cost = qty * last_px;
                if cost > self.remaining_total {
                    return false;
                }
                self.remaining_total -= cost;
                (qty, cost)
            }
            BudgetMode::Strict => {
                if self.remaining_equity <= Decimal::ZERO {
                    return false;
                }
                let alloc = self.params.shares_budget_usd.min(self.remaining_equity);
                let qty = (alloc / last_px).floor();
                if qty <= Decimal::ZERO {
                    return false;
                }
                let cost = qty * last_px;
                if cost > self.remaining_equity {
                    return false;
                }
                self.remaining_equity -= cost;
                (qty, cost)
            }
        };

        self.proposals.push(TradeProposal {
            kind: ProposalKind::OpenShares,
            ticker: ticker.to_string(),
            direction,
            exposure,
            leg: None,
            contracts: qty.to_u32().unwrap_or(0),
            limit: Some(last_px),
            est_cost_usd: cost,
            sleeve,
            notes,
        });
        self.opened.insert(ticker.to_string());
        self.count(exposure);
        true
    }

    fn count(&mut self, exposure: Direction) {
        match exposure {
            Direction::Bullish => self.n_bullish += 1,
            Direction::Bearish => self.n_bearish += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::{build_budget_plans, AllocationKind};
    use rust_decimal_macros::dec;

    fn leg(right: OptionRight, premium: Decimal) -> OptionLeg {
        OptionLeg {
            symbol: "LEG".to_string(),
            right,
            price: premium / dec!(100),
            premium_usd: premium,
            delta: Some(0.30),
        }
    }

    fn candidate(ticker: &str, direction: Direction) -> ProposalCandidate {
        ProposalCandidate {
            ticker: ticker.to_string(),
            direction,
            sleeve: Some("macro".to_string()),
        }
    }

    fn strict_plan(cash: Decimal) -> BudgetPlan {
        build_budget_plans(cash, BudgetMode::Strict, AllocationKind::Split5050, 2)
            .pop()
            .unwrap()
    }

    fn flex_plan(cash: Decimal) -> BudgetPlan {
        build_budget_plans(cash, BudgetMode::Flex, AllocationKind::Auto, 2)
            .pop()
            .unwrap()
    }

    #[test]
    fn held_underlyings_are_skipped() {
        let legs = BTreeMap::from([("NVDA".to_string(), leg(OptionRight::Call, dec!(90)))]);
        let held = BTreeSet::from(["NVDA".to_string()]);
        let result = build_proposals(
            &[candidate("NVDA", Direction::Bullish)],
            &legs,
            &BTreeMap::new(),
            &strict_plan(dec!(1000)),
            &held,
            &ProposalParams::new(BudgetMode::Strict),
        );
        assert!(result.proposals.is_empty());
    }

    #[test]
    fn strict_mode_sizes_contracts_under_the_premium_cap() {
        // $40 premium under a $100 per-trade cap sizes to 2 contracts.
        let legs = BTreeMap::from([("NVDA".to_string(), leg(OptionRight::Call, dec!(40)))]);
        let result = build_proposals(
            &[candidate("NVDA", Direction::Bullish)],
            &legs,
            &BTreeMap::new(),
            &strict_plan(dec!(1000)),
            &BTreeSet::new(),
            &ProposalParams::new(BudgetMode::Strict),
        );
        assert_eq!(result.proposals.len(), 1);
        let p = &result.proposals[0];
        assert_eq!(p.kind, ProposalKind::OpenOption);
        assert_eq!(p.contracts, 2);
        assert_eq!(p.est_cost_usd, dec!(80));
        // 50/50 split of $1000: $500 options - $80 spent.
        assert_eq!(result.remaining_options, dec!(420));
    }

    #[test]
    fn wrong_right_leg_is_not_attached() {
        // Bearish view with an attached call: no option trade, no shares
        // fallback for bearish, so nothing proposed.
        let legs = BTreeMap::from([("QQQ".to_string(), leg(OptionRight::Call, dec!(40)))]);
        let result = build_proposals(
            &[candidate("QQQ", Direction::Bearish)],
            &legs,
            &BTreeMap::new(),
            &strict_plan(dec!(1000)),
            &BTreeSet::new(),
            &ProposalParams::new(BudgetMode::Strict),
        );
        assert!(result.proposals.is_empty());
    }

    #[test]
    fn flex_mode_reserves_room_for_minimum_trades() {
        // Pool $300, min 2 trades: the first trade's cap is $150, so a $200
        // premium is rejected while a $100 one fits.
        let legs = BTreeMap::from([
            ("RICH".to_string(), leg(OptionRight::Call, dec!(200))),
            ("FIT".to_string(), leg(OptionRight::Call, dec!(100))),
        ]);
        let result = build_proposals(
            &[
                candidate("RICH", Direction::Bullish),
                candidate("FIT", Direction::Bullish),
            ],
            &legs,
            &BTreeMap::new(),
            &flex_plan(dec!(300)),
            &BTreeSet::new(),
            &ProposalParams::new(BudgetMode::Flex),
        );
        assert_eq!(result.proposals.len(), 1);
        assert_eq!(result.proposals[0].ticker, "FIT");
        assert_eq!(result.remaining_total, dec!(200));
    }

    #[test]
    fn flex_pool_is_consumed_in_input_order() {
        let legs = BTreeMap::from([
            ("A".to_string(), leg(OptionRight::Call, dec!(100))),
            ("B".to_string(), leg(OptionRight::Call, dec!(100))),
            ("C".to_string(), leg(OptionRight::Call, dec!(100))),
        ]);
        let mut params = ProposalParams::new(BudgetMode::Flex);
        params.max_new_trades = 3;
        let result = build_proposals(
            &[
                candidate("A", Direction::Bullish),
                candidate("B", Direction::Bullish),
                candidate("C", Direction::Bullish),
            ],
            &legs,
            &BTreeMap::new(),
            &flex_plan(dec!(250)),
            &BTreeSet::new(),
            &params,
        );
        // $250 pool: A ($100), B ($100), then C cannot fit.
        let tickers: Vec<_> = result.proposals.iter().map(|p| p.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["A", "B"]);
        assert_eq!(result.remaining_total, dec!(50));
    }

    #[test]
    fn hedge_ticker_becomes_bearish_share_exposure() {
        let prices = BTreeMap::from([("VIXY".to_string(), dec!(15))]);
        let result = build_proposals(
            &[candidate("VIXY", Direction::Bullish)],
            &BTreeMap::new(),
            &prices,
            &strict_plan(dec!(1000)),
            &BTreeSet::new(),
            &ProposalParams::new(BudgetMode::Strict),
        );
        assert_eq!(result.proposals.len(), 1);
        let p = &result.proposals[0];
        assert_eq!(p.kind, ProposalKind::OpenShares);
        assert_eq!(p.direction, Direction::Bullish);
        assert_eq!(p.exposure, Direction::Bearish);
        assert_eq!(result.n_bearish, 1);
        // $100 shares budget at $15: 6 shares.
        assert_eq!(p.contracts, 6);
        assert_eq!(p.est_cost_usd, dec!(90));
    }

    #[test]
    fn second_hedge_is_not_stacked() {
        let prices = BTreeMap::from([
            ("VIXY".to_string(), dec!(15)),
            ("SH".to_string(), dec!(30)),
        ]);
        let result = build_proposals(
            &[
                candidate("VIXY", Direction::Bullish),
                candidate("SH", Direction::Bullish),
            ],
            &BTreeMap::new(),
            &prices,
            &strict_plan(dec!(1000)),
            &BTreeSet::new(),
            &ProposalParams::new(BudgetMode::Strict),
        );
        assert_eq!(result.proposals.len(), 1);
        assert_eq!(result.proposals[0].ticker, "VIXY");
    }

    #[test]
    fn bearish_falls_back_to_inverse_proxy_without_options() {
        let prices = BTreeMap::from([("SH".to_string(), dec!(30))]);
        let mut params = ProposalParams::new(BudgetMode::Strict);
        params.with_options = false;
        let result = build_proposals(
            &[candidate("SPY", Direction::Bearish)],
            &BTreeMap::new(),
            &prices,
            &strict_plan(dec!(1000)),
            &BTreeSet::new(),
            &params,
        );
        assert_eq!(result.proposals.len(), 1);
        let p = &result.proposals[0];
        assert_eq!(p.ticker, "SH");
        assert_eq!(p.exposure, Direction::Bearish);
        assert_eq!(p.notes.as_deref(), Some("inverse_proxy_for=SPY"));
    }

    #[test]
    fn final_pass_tops_up_missing_bearish_exposure() {
        // SPY is bearish with no put leg, so the main loop skips it; the
        // two-sided pass falls back to its inverse proxy.
        let legs = BTreeMap::from([("NVDA".to_string(), leg(OptionRight::Call, dec!(90)))]);
        let prices = BTreeMap::from([("SH".to_string(), dec!(30))]);
        let result = build_proposals(
            &[
                candidate("NVDA", Direction::Bullish),
                candidate("SPY", Direction::Bearish),
            ],
            &legs,
            &prices,
            &strict_plan(dec!(1000)),
            &BTreeSet::new(),
            &ProposalParams::new(BudgetMode::Strict),
        );
        assert_eq!(result.n_bullish, 1);
        assert_eq!(result.n_bearish, 1);
        let tickers: Vec<_> = result.proposals.iter().map(|p| p.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["NVDA", "SH"]);
    }

    #[test]
    fn consumed_never_exceeds_caps() {
        let legs = BTreeMap::from([
            ("A".to_string(), leg(OptionRight::Call, dec!(95))),
            ("B".to_string(), leg(OptionRight::Call, dec!(95))),
            ("C".to_string(), leg(OptionRight::Call, dec!(95))),
        ]);
        let mut params = ProposalParams::new(BudgetMode::Strict);
        params.max_new_trades = 5;
        let plan = strict_plan(dec!(400)); // $200 options
        let result = build_proposals(
            &[
                candidate("A", Direction::Bullish),
                candidate("B", Direction::Bullish),
                candidate("C", Direction::Bullish),
            ],
            &legs,
            &BTreeMap::new(),
            &plan,
            &BTreeSet::new(),
            &params,
        );
        let spent: Decimal = result
            .proposals
            .iter()
            .map(|p| p.est_cost_usd)
            .sum();
        assert!(spent <= plan.budget_options);
        assert!(result.remaining_options >= Decimal::ZERO);
    }
}
