//! Alpaca REST client connection management.

use anyhow::{anyhow, Result};
use reqwest::Client;
use tracing::debug;

use autopilot_core::config::AlpacaSettings;

/// Live trading API.
pub const TRADING_API_URL: &str = "https://api.alpaca.markets";
/// Paper trading API.
pub const PAPER_API_URL: &str = "https://paper-api.alpaca.markets";
/// Market data API (shared between live and paper).
pub const DATA_API_URL: &str = "https://data.alpaca.markets";

/// Alpaca client configuration.
#[derive(Debug, Clone)]
pub struct AlpacaConfig {
    pub api_key: String,
    pub api_secret: String,
    pub trading_base_url: String,
    pub data_base_url: String,
}

impl AlpacaConfig {
    /// Build from application settings, choosing the trading URL by the
    /// paper flag.
    pub fn from_settings(settings: &AlpacaSettings) -> Self {
        let trading_base_url = if settings.paper {
            PAPER_API_URL.to_string()
        } else {
            TRADING_API_URL.to_string()
        };
        Self {
            api_key: settings.api_key.clone(),
            api_secret: settings.api_secret.clone(),
            trading_base_url,
            data_base_url: DATA_API_URL.to_string(),
        }
    }
}

/// Thin wrapper around `reqwest::Client` with Alpaca auth headers.
pub struct AlpacaClient {
    http: Client,
    config: AlpacaConfig,
}

impl AlpacaClient {
    pub fn new(config: AlpacaConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &AlpacaConfig {
        &self.config
    }

    /// Authenticated GET against the trading API.
    pub(crate) async fn get_trading<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get(&format!("{}{}", self.config.trading_base_url, path)).await
    }

    /// Authenticated GET against the data API.
    pub(crate) async fn get_data<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get(&format!("{}{}", self.config.data_base_url, path)).await
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .header("APCA-API-KEY-ID", &self.config.api_key)
            .header("APCA-API-SECRET-KEY", &self.config.api_secret)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Alpaca API error {}: {}", status, text));
        }

        let body = response.json::<T>().await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(paper: bool) -> AlpacaSettings {
        AlpacaSettings {
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            paper,
            options_feed: "indicative".to_string(),
        }
    }

    #[test]
    fn paper_flag_selects_trading_url() {
        let paper = AlpacaConfig::from_settings(&settings(true));
        assert_eq!(paper.trading_base_url, PAPER_API_URL);

        let live = AlpacaConfig::from_settings(&settings(false));
        assert_eq!(live.trading_base_url, TRADING_API_URL);
    }
}
