//! Shared domain types consumed across the workspace.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Option right (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionRight {
    Call,
    Put,
}

impl std::fmt::Display for OptionRight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

/// Directional view behind a trade idea.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    /// The option right that expresses this view.
    pub fn wanted_right(self) -> OptionRight {
        match self {
            Self::Bullish => OptionRight::Call,
            Self::Bearish => OptionRight::Put,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Bearish => write!(f, "bearish"),
        }
    }
}

/// A position record as the broker returns it. Numeric fields stay as the
/// provider's strings; normalization happens downstream and must never fail
/// on a single bad field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPositionRecord {
    pub symbol: String,
    pub qty: Option<String>,
    pub avg_entry_price: Option<String>,
    pub current_price: Option<String>,
    pub unrealized_pl: Option<String>,
    pub unrealized_plpc: Option<String>,
}

/// A normalized position snapshot. Re-fetched fresh on every analysis pass;
/// fields the provider sent malformed are `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub qty: Option<Decimal>,
    pub avg_entry_price: Option<Decimal>,
    pub current_price: Option<Decimal>,
    pub unrealized_pl: Option<Decimal>,
    pub unrealized_plpc: Option<Decimal>,
}

/// One raw option-chain row for an underlying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionCandidate {
    pub symbol: String,
    pub underlying: String,
    pub right: OptionRight,
    pub expiry: NaiveDate,
    pub strike: Decimal,
    pub bid: Option<Decimal>,
    pub ask: Option<Decimal>,
    pub last: Option<Decimal>,
    pub delta: Option<f64>,
    pub open_interest: Option<u64>,
    pub volume: Option<u64>,
}
