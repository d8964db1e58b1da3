//! Option-chain filtering — hard constraints down to affordable contracts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use autopilot_core::types::{OptionCandidate, OptionRight};

/// Which quote to treat as the contract's price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceBasis {
    Ask,
    Mid,
    Last,
}

impl std::fmt::Display for PriceBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ask => write!(f, "ask"),
            Self::Mid => write!(f, "mid"),
            Self::Last => write!(f, "last"),
        }
    }
}

impl std::str::FromStr for PriceBasis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ask" => Ok(Self::Ask),
            "mid" => Ok(Self::Mid),
            "last" => Ok(Self::Last),
            other => Err(format!("unknown price basis: {other}")),
        }
    }
}

/// Hard-constraint parameters for one filtering pass. Constructed once by
/// the caller; every field is load-bearing.
#[derive(Debug, Clone)]
pub struct ChainFilterParams {
    pub want: OptionRight,
    pub min_dte_days: i64,
    pub max_dte_days: i64,
    pub max_premium_usd: Decimal,
    pub price_basis: PriceBasis,
    pub min_price: Decimal,
    pub max_spread_pct: Decimal,
    pub require_delta: bool,
    pub today: NaiveDate,
}

/// The specific constraint a candidate failed. Shared by the filter and the
/// selection diagnostics so the two can never drift apart.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("wrong right (want {want})")]
    WrongRight { want: OptionRight },

    #[error("dte {dte} outside [{min}, {max}]")]
    DteOutOfWindow { dte: i64, min: i64, max: i64 },

    #[error("no usable quote for {basis} basis")]
    NoQuote { basis: PriceBasis },

    #[error("price {price} below floor {min_price}")]
    PriceBelowFloor { price: Decimal, min_price: Decimal },

    #[error("spread {spread_pct} over cap {max_spread_pct}")]
    SpreadTooWide {
        spread_pct: Decimal,
        max_spread_pct: Decimal,
    },

    #[error("delta required but missing")]
    MissingDelta,

    #[error("premium ${premium_usd} over cap ${max_premium_usd}")]
    PremiumOverCap {
        premium_usd: Decimal,
        max_premium_usd: Decimal,
    },
}

/// A chain row that passed every hard constraint, annotated with the derived
/// fields decisions are made on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordableOption {
    pub symbol: String,
    pub ticker: String,
    pub right: OptionRight,
    pub expiry: NaiveDate,
    pub dte_days: i64,
    pub strike: Decimal,
    pub price: Decimal,
    pub price_basis: PriceBasis,
    pub premium_usd: Decimal,
    pub spread_pct: Decimal,
    pub delta: Option<f64>,
    pub open_interest: Option<u64>,
    pub volume: Option<u64>,
}

/// Run one candidate through the full constraint pipeline.
///
/// Constraints are checked in a fixed order; the first failure wins. All
/// are hard, with no partial credit.
pub fn evaluate_candidate(
    c: &OptionCandidate,
    params: &ChainFilterParams,
) -> Result<AffordableOption, Rejection> {
    // 1. Contract type must express the directional view.
    if c.right != params.want {
        return Err(Rejection::WrongRight { want: params.want });
    }

    // 2. Days to expiry, inclusive window.
    let dte = (c.expiry - params.today).num_days();
    if dte < params.min_dte_days || dte > params.max_dte_days {
        return Err(Rejection::DteOutOfWindow {
            dte,
            min: params.min_dte_days,
            max: params.max_dte_days,
        });
    }

    // 3. Price floor on the chosen basis; filters zero-quote rows.
    let bid = c.bid.unwrap_or(Decimal::ZERO);
    let ask = c.ask.unwrap_or(Decimal::ZERO);
    let mid = (bid + ask) / Decimal::TWO;
    let price = match params.price_basis {
        PriceBasis::Ask => ask,
        PriceBasis::Mid => mid,
        PriceBasis::Last => c.last.unwrap_or(Decimal::ZERO),
    };
    if price <= Decimal::ZERO {
        return Err(Rejection::NoQuote {
            basis: params.price_basis,
        });
    }
    if price < params.min_price {
        return Err(Rejection::PriceBelowFloor {
            price,
            min_price: params.min_price,
        });
    }

    // 4. Bid/ask spread, normalized by mid (or ask when mid is unusable).
    let denom = if mid > Decimal::ZERO { mid } else { ask };
    if denom <= Decimal::ZERO {
        return Err(Rejection::NoQuote {
            basis: params.price_basis,
        });
    }
    let spread_pct = (ask - bid) / denom;
    if spread_pct > params.max_spread_pct {
        return Err(Rejection::SpreadTooWide {
            spread_pct,
            max_spread_pct: params.max_spread_pct,
        });
    }

    // 5. Delta availability.
    if params.require_delta && c.delta.is_none() {
        return Err(Rejection::MissingDelta);
    }

    // 6. Premium cap. Strict mode pre-resolves a fixed per-contract cap;
    //    flex mode passes the pooled budget as a generous pre-filter.
    let premium_usd = price * Decimal::ONE_HUNDRED;
    if premium_usd > params.max_premium_usd {
        return Err(Rejection::PremiumOverCap {
            premium_usd,
            max_premium_usd: params.max_premium_usd,
        });
    }

    Ok(AffordableOption {
        symbol: c.symbol.clone(),
        ticker: c.underlying.clone(),
        right: c.right,
        expiry: c.expiry,
        dte_days: dte,
        strike: c.strike,
        price,
        price_basis: params.price_basis,
        premium_usd,
        spread_pct,
        delta: c.delta,
        open_interest: c.open_interest,
        volume: c.volume,
    })
}

/// All contracts for `ticker` that satisfy every hard constraint.
///
/// Zero passing candidates yields an empty vec, a valid terminal state.
pub fn affordable_options_for_ticker(
    candidates: &[OptionCandidate],
    ticker: &str,
    params: &ChainFilterParams,
) -> Vec<AffordableOption> {
    let ticker = ticker.trim().to_uppercase();
    candidates
        .iter()
        .filter(|c| c.underlying.eq_ignore_ascii_case(&ticker))
        .filter_map(|c| evaluate_candidate(c, params).ok())
        .collect()
}
