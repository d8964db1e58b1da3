use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub alpaca: AlpacaSettings,
    pub strategy: StrategyConfig,
    pub risk: RiskConfig,
}

/// Alpaca API credentials and routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlpacaSettings {
    pub api_key: String,
    pub api_secret: String,
    /// Use the paper-trading endpoint.
    pub paper: bool,
    /// Options data feed ("indicative" or "opra").
    pub options_feed: String,
}

/// Contract-selection defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub dte_min: i64,
    pub dte_max: i64,
    pub target_abs_delta: f64,
    pub max_spread_pct: Decimal,
    /// Quotes below this are treated as illiquid/zero rows.
    pub min_price: Decimal,
}

/// Portfolio-wide risk caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    pub max_equity_pct_per_trade: f64,
    pub max_contracts: u32,
    /// Absolute per-contract premium ceiling, in per-share terms
    /// (e.g. 5.00 means $500/contract). None disables the ceiling.
    pub max_premium_per_contract: Option<Decimal>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            alpaca: AlpacaSettings {
                api_key: String::new(),
                api_secret: String::new(),
                paper: true,
                options_feed: "indicative".to_string(),
            },
            strategy: StrategyConfig::default(),
            risk: RiskConfig::default(),
        }
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            dte_min: 14,
            dte_max: 90,
            target_abs_delta: 0.35,
            max_spread_pct: Decimal::new(30, 2),
            min_price: Decimal::new(5, 2),
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_equity_pct_per_trade: 0.10,
            max_contracts: 20,
            max_premium_per_contract: None,
        }
    }
}
