//! Portfolio aggregation — merges sleeve-level candidates into one
//! portfolio view under exposure and budget constraints.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use autopilot_core::types::Direction;

use crate::hedges::is_levered_inverse_equity;

/// A sleeve-level trade candidate offered to the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateTrade {
    pub sleeve: String,
    pub ticker: String,
    pub direction: Direction,
    pub score: f64,
    pub est_cost_usd: Option<Decimal>,
    /// Risk-factor buckets this trade expresses (see [`infer_risk_factors`]).
    pub risk_factors: Vec<String>,
    /// Probes are small exploratory trades exempt from de-dup and factor caps.
    pub probe: bool,
}

/// Why a candidate was dropped during aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    LeveredInverseEquityCap,
    PsqSqqqExclusive,
    DuplicateRiskSignature,
    FactorCap,
    TotalBudget,
    SleeveBudget,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::LeveredInverseEquityCap => "levered_inverse_equity_cap",
            Self::PsqSqqqExclusive => "psq_sqqq_exclusive",
            Self::DuplicateRiskSignature => "duplicate_risk_signature",
            Self::FactorCap => "factor_cap",
            Self::TotalBudget => "total_budget",
            Self::SleeveBudget => "sleeve_budget",
        };
        write!(f, "{s}")
    }
}

/// Aggregation outcome: what made it in, and what fell out with why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationResult {
    pub selected: Vec<CandidateTrade>,
    pub dropped: Vec<(CandidateTrade, DropReason)>,
}

/// Merges per-sleeve candidates into one portfolio:
/// - de-dups redundant exposures via risk-factor signatures and factor caps
/// - blocks mutually exclusive tickers (levered inverse equity, PSQ+SQQQ)
/// - enforces sleeve risk-budget shares plus the total budget
pub struct PortfolioAggregator {
    factor_cap: usize,
}

impl Default for PortfolioAggregator {
    fn default() -> Self {
        Self { factor_cap: 1 }
    }
}

impl PortfolioAggregator {
    pub fn new(factor_cap: usize) -> Self {
        Self { factor_cap }
    }

    /// Greedy pass over candidates ranked by score descending. Each sleeve's
    /// `risk_budget_pct` share of `total_budget_usd` caps its spend before
    /// per-trade sizing ever runs.
    pub fn aggregate(
        &self,
        candidates: Vec<CandidateTrade>,
        total_budget_usd: Decimal,
        sleeve_budgets_pct: &BTreeMap<String, f64>,
    ) -> AggregationResult {
        // Fall back to equal sleeve weights when no shares were supplied.
        let sleeves: BTreeSet<String> = candidates.iter().map(|c| c.sleeve.clone()).collect();
        let owned_shares;
        let shares = if sleeve_budgets_pct.is_empty() && !sleeves.is_empty() {
            let equal = 1.0 / sleeves.len() as f64;
            owned_shares = sleeves.iter().map(|s| (s.clone(), equal)).collect();
            &owned_shares
        } else {
            sleeve_budgets_pct
        };

        let mut total_rem = total_budget_usd.max(Decimal::ZERO);
        let mut sleeve_rem: BTreeMap<String, Decimal> = sleeves
            .iter()
            .map(|s| {
                let pct = shares.get(s).copied().unwrap_or(0.0);
                let pct = Decimal::try_from(pct).unwrap_or(Decimal::ZERO);
                (s.clone(), (pct * total_budget_usd).max(Decimal::ZERO))
            })
            .collect();

        let mut ranked = candidates;
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        let mut selected: Vec<CandidateTrade> = Vec::new();
        let mut dropped: Vec<(CandidateTrade, DropReason)> = Vec::new();

        let mut used_levered_inverse = false;
        let mut used_psq = false;
        let mut used_sqqq = false;
        let mut used_factor_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut used_signatures: BTreeSet<Vec<String>> = BTreeSet::new();

        for c in ranked {
            let ticker = c.ticker.trim().to_uppercase();

            // Mutually exclusive inverse-leverage rules.
            if is_levered_inverse_equity(&ticker) {
                if used_levered_inverse {
                    dropped.push((c, DropReason::LeveredInverseEquityCap));
                    continue;
                }
                used_levered_inverse = true;
            }
            if ticker == "PSQ" {
                if used_sqqq {
                    dropped.push((c, DropReason::PsqSqqqExclusive));
                    continue;
                }
                used_psq = true;
            }
            if ticker == "SQQQ" {
                if used_psq {
                    dropped.push((c, DropReason::PsqSqqqExclusive));
                    continue;
                }
                used_sqqq = true;
            }

            // Same risk-factor signature: keep the best only (probes exempt).
            let signature = c.risk_factors.clone();
            if !signature.is_empty() && !c.probe && used_signatures.contains(&signature) {
                dropped.push((c, DropReason::DuplicateRiskSignature));
                continue;
            }

            // Per-factor caps (probes exempt).
            if !c.risk_factors.is_empty() && !c.probe {
                let violated = c
                    .risk_factors
                    .iter()
                    .any(|f| used_factor_counts.get(f).copied().unwrap_or(0) >= self.factor_cap);
                if violated {
                    dropped.push((c, DropReason::FactorCap));
                    continue;
                }
            }

            // Budget gates.
            let cost = c.est_cost_usd.unwrap_or(Decimal::ZERO);
            if cost > Decimal::ZERO {
                if cost > total_rem {
                    dropped.push((c, DropReason::TotalBudget));
                    continue;
                }
                let srem = sleeve_rem.get(&c.sleeve).copied().unwrap_or(Decimal::ZERO);
                if cost > srem {
                    dropped.push((c, DropReason::SleeveBudget));
                    continue;
                }
            }

            // Accept.
            if !signature.is_empty() && !c.probe {
                used_signatures.insert(signature);
                for f in &c.risk_factors {
                    *used_factor_counts.entry(f.clone()).or_insert(0) += 1;
                }
            }
            if cost > Decimal::ZERO {
                total_rem = (total_rem - cost).max(Decimal::ZERO);
                if let Some(srem) = sleeve_rem.get_mut(&c.sleeve) {
                    *srem = (*srem - cost).max(Decimal::ZERO);
                }
            }
            selected.push(c);
        }

        AggregationResult { selected, dropped }
    }
}

/// Heuristic risk-factor bucket inference for a sleeve/ticker/direction
/// combination. Intentionally coarse; refine per sleeve as needed.
pub fn infer_risk_factors(sleeve: &str, ticker: &str, direction: Direction) -> Vec<String> {
    let t = ticker.trim().to_uppercase();
    let s = sleeve.trim().to_lowercase();
    let bullish = direction == Direction::Bullish;

    let mut factors: BTreeSet<&'static str> = BTreeSet::new();

    // Vol sleeve: mostly "vol_up" expressions.
    if matches!(s.as_str(), "vol" | "volatility") {
        factors.insert("vol_up");
    }

    // Equity beta bucket.
    if matches!(t.as_str(), "SPY" | "QQQ" | "QQQM" | "IWM" | "DIA") {
        factors.insert(if bullish { "equity_beta_up" } else { "equity_beta_down" });
    }

    // Inverse equity ETFs bucket.
    if matches!(
        t.as_str(),
        "SH" | "PSQ" | "RWM" | "DOG" | "SDS" | "QID" | "TWM" | "SPXU" | "SQQQ" | "TZA" | "SDOW"
            | "SOXS" | "SRTY"
    ) {
        factors.insert("inverse_equity");
        factors.insert("equity_beta_down");
    }

    // Inverse real estate / REIT beta.
    if matches!(t.as_str(), "REK" | "SRS") {
        factors.insert("reit_beta_down");
        factors.insert("inverse_real_estate");
    }

    // Rates bucket.
    if matches!(t.as_str(), "TLT" | "IEF" | "TIP" | "TBT" | "TBF") {
        let long_duration_bull = matches!(t.as_str(), "TLT" | "IEF") && bullish;
        factors.insert(if long_duration_bull { "rates_down" } else { "rates_up" });
    }

    // Credit bucket.
    if matches!(t.as_str(), "HYG" | "LQD" | "JNK" | "SHY") {
        factors.insert("credit");
        if !bullish {
            factors.insert("credit_stress");
        }
    }

    // AI bubble sleeve (tech duration / semis).
    if matches!(s.as_str(), "ai-bubble" | "ai_bubble" | "tech_duration") {
        factors.insert("tech_duration");
        if !bullish {
            factors.insert("equity_beta_down");
        }
    }

    factors.into_iter().map(str::to_string).collect()
}
