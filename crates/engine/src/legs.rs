//! Option leg attachment — per-ticker chain fetch, filter, and select.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use autopilot_core::traits::ChainSource;
use autopilot_core::types::{Direction, OptionRight};

use crate::budget::BudgetMode;
use crate::chain::{affordable_options_for_ticker, ChainFilterParams, PriceBasis};
use crate::selector::pick_best_affordable;

/// A directional trade idea awaiting an option leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionalIdea {
    pub ticker: String,
    pub direction: Direction,
}

/// The option contract attached to one idea.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionLeg {
    pub symbol: String,
    pub right: OptionRight,
    pub price: Decimal,
    pub premium_usd: Decimal,
    pub delta: Option<f64>,
}

/// Leg-attachment parameters, validated once at construction.
#[derive(Debug, Clone)]
pub struct LegAttachParams {
    /// Per-contract premium cap (strict mode).
    pub max_premium_usd: Decimal,
    pub min_days: i64,
    pub max_days: i64,
    pub target_abs_delta: f64,
    pub max_spread_pct: Decimal,
    pub budget_mode: BudgetMode,
    /// Pooled budget (flex mode).
    pub budget_total: Decimal,
    /// Ideas to scan; a floor of 10 is always scanned regardless.
    pub max_candidates: usize,
    pub price_basis: PriceBasis,
    pub min_price: Decimal,
    pub feed: String,
    /// One slow chain fetch must not stall the whole batch.
    pub per_ticker_timeout: Duration,
    pub today: NaiveDate,
}

impl LegAttachParams {
    pub fn new(budget_mode: BudgetMode, budget_total: Decimal, today: NaiveDate) -> Self {
        Self {
            max_premium_usd: Decimal::ONE_HUNDRED,
            min_days: 30,
            max_days: 90,
            target_abs_delta: 0.30,
            max_spread_pct: Decimal::new(30, 2),
            budget_mode,
            budget_total,
            max_candidates: 30,
            price_basis: PriceBasis::Ask,
            min_price: Decimal::new(5, 2),
            feed: "indicative".to_string(),
            per_ticker_timeout: Duration::from_secs(10),
            today,
        }
    }

    /// The premium cap the filter runs with. Flex mode defers the real cap
    /// to allocation and pre-filters against the whole pool.
    fn premium_cap(&self) -> Decimal {
        match self.budget_mode {
            BudgetMode::Flex => self.budget_total,
            BudgetMode::Strict => self.max_premium_usd,
        }
    }
}

/// Minimum number of ideas scanned even when the caller asks for fewer.
const MIN_SCAN: usize = 10;

/// Attach the best affordable option leg to each idea, keyed by ticker.
///
/// Per-ticker failures and timeouts are logged and skipped; one bad ticker
/// never aborts the batch. Ideas are processed sequentially in input order,
/// so re-running with unchanged inputs yields identical selections.
pub async fn attach_option_legs(
    ideas: &[DirectionalIdea],
    source: &dyn ChainSource,
    params: &LegAttachParams,
) -> BTreeMap<String, OptionLeg> {
    let mut legs = BTreeMap::new();
    let scan = params.max_candidates.max(MIN_SCAN);

    for idea in ideas.iter().take(scan) {
        let ticker = idea.ticker.trim().to_uppercase();
        if ticker.is_empty() {
            continue;
        }

        let fetched = tokio::time::timeout(
            params.per_ticker_timeout,
            source.option_chain(&ticker, &params.feed),
        )
        .await;

        let candidates = match fetched {
            Ok(Ok(c)) => c,
            Ok(Err(e)) => {
                debug!(ticker = %ticker, error = %e, "Chain fetch failed; skipping ticker");
                continue;
            }
            Err(_) => {
                debug!(
                    ticker = %ticker,
                    timeout_ms = params.per_ticker_timeout.as_millis() as u64,
                    "Chain fetch timed out; skipping ticker"
                );
                continue;
            }
        };

        let filter = ChainFilterParams {
            want: idea.direction.wanted_right(),
            min_dte_days: params.min_days,
            max_dte_days: params.max_days,
            max_premium_usd: params.premium_cap(),
            price_basis: params.price_basis,
            min_price: params.min_price,
            max_spread_pct: params.max_spread_pct,
            require_delta: true,
            today: params.today,
        };

        let affordable = affordable_options_for_ticker(&candidates, &ticker, &filter);
        let best = pick_best_affordable(&affordable, params.target_abs_delta, params.max_spread_pct);

        if let Some(best) = best {
            legs.insert(
                ticker,
                OptionLeg {
                    symbol: best.symbol,
                    right: best.right,
                    price: best.price,
                    premium_usd: best.premium_usd,
                    delta: best.delta,
                },
            );
        }
    }

    legs
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use autopilot_core::types::OptionCandidate;
    use rust_decimal_macros::dec;

    struct StaticChains {
        chains: BTreeMap<String, Vec<OptionCandidate>>,
    }

    #[async_trait]
    impl ChainSource for StaticChains {
        async fn option_chain(&self, underlying: &str, _feed: &str) -> Result<Vec<OptionCandidate>> {
            match self.chains.get(underlying) {
                Some(rows) => Ok(rows.clone()),
                None => anyhow::bail!("no chain for {underlying}"),
            }
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    fn candidate(underlying: &str, right: OptionRight, dte: i64, ask: Decimal, delta: f64) -> OptionCandidate {
        OptionCandidate {
            symbol: format!("{underlying}-{dte}{right}"),
            underlying: underlying.to_string(),
            right,
            expiry: today() + chrono::Duration::days(dte),
            strike: dec!(100),
            bid: Some(ask - dec!(0.05)),
            ask: Some(ask),
            last: None,
            delta: Some(delta),
            open_interest: Some(100),
            volume: Some(10),
        }
    }

    fn ideas(pairs: &[(&str, Direction)]) -> Vec<DirectionalIdea> {
        pairs
            .iter()
            .map(|(t, d)| DirectionalIdea {
                ticker: t.to_string(),
                direction: *d,
            })
            .collect()
    }

    #[tokio::test]
    async fn attaches_matching_legs_and_skips_failures() {
        let source = StaticChains {
            chains: BTreeMap::from([(
                "SPY".to_string(),
                vec![candidate("SPY", OptionRight::Call, 45, dec!(0.90), 0.31)],
            )]),
        };
        let params = LegAttachParams::new(BudgetMode::Strict, dec!(0), today());

        // MISSING has no chain; the failure must not affect SPY.
        let out = attach_option_legs(
            &ideas(&[("MISSING", Direction::Bullish), ("SPY", Direction::Bullish)]),
            &source,
            &params,
        )
        .await;

        assert_eq!(out.len(), 1);
        let leg = &out["SPY"];
        assert_eq!(leg.right, OptionRight::Call);
        assert_eq!(leg.premium_usd, dec!(90.00));
    }

    #[tokio::test]
    async fn bearish_ideas_want_puts() {
        let source = StaticChains {
            chains: BTreeMap::from([(
                "QQQ".to_string(),
                vec![
                    candidate("QQQ", OptionRight::Call, 45, dec!(0.90), 0.31),
                    candidate("QQQ", OptionRight::Put, 45, dec!(0.80), -0.29),
                ],
            )]),
        };
        let params = LegAttachParams::new(BudgetMode::Strict, dec!(0), today());

        let out = attach_option_legs(&ideas(&[("QQQ", Direction::Bearish)]), &source, &params).await;
        assert_eq!(out["QQQ"].right, OptionRight::Put);
    }

    #[tokio::test]
    async fn flex_mode_prefilters_against_the_pool() {
        // $250 contract passes a $1000 pool even though the strict cap is $100.
        let source = StaticChains {
            chains: BTreeMap::from([(
                "SPY".to_string(),
                vec![candidate("SPY", OptionRight::Call, 45, dec!(2.50), 0.31)],
            )]),
        };
        let strict = LegAttachParams::new(BudgetMode::Strict, dec!(0), today());
        let flex = LegAttachParams::new(BudgetMode::Flex, dec!(1000), today());

        let ideas = ideas(&[("SPY", Direction::Bullish)]);
        assert!(attach_option_legs(&ideas, &source, &strict).await.is_empty());
        assert_eq!(
            attach_option_legs(&ideas, &source, &flex).await["SPY"].premium_usd,
            dec!(250.00)
        );
    }

    #[tokio::test]
    async fn scan_floor_covers_at_least_ten_ideas() {
        let source = StaticChains {
            chains: BTreeMap::from([(
                "TEN".to_string(),
                vec![candidate("TEN", OptionRight::Call, 45, dec!(0.90), 0.31)],
            )]),
        };
        let mut params = LegAttachParams::new(BudgetMode::Strict, dec!(0), today());
        params.max_candidates = 1;

        // "TEN" sits at index 9; the floor of 10 still reaches it.
        let mut list = vec![("A1", Direction::Bullish); 9];
        list.push(("TEN", Direction::Bullish));
        let out = attach_option_legs(&ideas(&list), &source, &params).await;
        assert!(out.contains_key("TEN"));
    }

    #[tokio::test]
    async fn rerun_is_idempotent() {
        let source = StaticChains {
            chains: BTreeMap::from([(
                "SPY".to_string(),
                vec![
                    candidate("SPY", OptionRight::Call, 45, dec!(0.90), 0.31),
                    candidate("SPY", OptionRight::Call, 60, dec!(0.85), 0.33),
                ],
            )]),
        };
        let params = LegAttachParams::new(BudgetMode::Strict, dec!(0), today());
        let ideas = ideas(&[("SPY", Direction::Bullish)]);

        let first = attach_option_legs(&ideas, &source, &params).await;
        let second = attach_option_legs(&ideas, &source, &params).await;
        assert_eq!(first["SPY"].symbol, second["SPY"].symbol);
        assert_eq!(first["SPY"].premium_usd, second["SPY"].premium_usd);
    }
}
