//! Wire types for Alpaca REST payloads.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

/// One position as the trading API returns it. Alpaca sends numerics as
/// strings; they are kept as strings here and parsed permissively downstream.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaPosition {
    pub symbol: String,
    pub qty: Option<String>,
    pub avg_entry_price: Option<String>,
    pub current_price: Option<String>,
    pub unrealized_pl: Option<String>,
    pub unrealized_plpc: Option<String>,
}

/// Option snapshots page for one underlying.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionSnapshotsResponse {
    #[serde(default)]
    pub snapshots: HashMap<String, OptionSnapshot>,
    pub next_page_token: Option<String>,
}

/// One contract's snapshot: quote, last trade, greeks, daily bar.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionSnapshot {
    #[serde(rename = "latestQuote")]
    pub latest_quote: Option<OptionQuote>,
    #[serde(rename = "latestTrade")]
    pub latest_trade: Option<OptionTrade>,
    pub greeks: Option<OptionGreeks>,
    #[serde(rename = "dailyBar")]
    pub daily_bar: Option<OptionBar>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionQuote {
    #[serde(rename = "bp")]
    pub bid_price: Option<Decimal>,
    #[serde(rename = "ap")]
    pub ask_price: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionTrade {
    #[serde(rename = "p")]
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionGreeks {
    pub delta: Option<f64>,
    pub gamma: Option<f64>,
    pub theta: Option<f64>,
    pub vega: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionBar {
    #[serde(rename = "v")]
    pub volume: Option<u64>,
}
