//! Account queries — positions.

use anyhow::{Context, Result};
use async_trait::async_trait;

use autopilot_core::traits::PositionSource;
use autopilot_core::types::RawPositionRecord;

use crate::client::AlpacaClient;
use crate::types::AlpacaPosition;

impl From<AlpacaPosition> for RawPositionRecord {
    fn from(p: AlpacaPosition) -> Self {
        Self {
            symbol: p.symbol,
            qty: p.qty,
            avg_entry_price: p.avg_entry_price,
            current_price: p.current_price,
            unrealized_pl: p.unrealized_pl,
            unrealized_plpc: p.unrealized_plpc,
        }
    }
}

#[async_trait]
impl PositionSource for AlpacaClient {
    async fn positions(&self) -> Result<Vec<RawPositionRecord>> {
        let raw: Vec<AlpacaPosition> = self
            .get_trading("/v2/positions")
            .await
            .context("Failed to fetch Alpaca positions")?;

        Ok(raw.into_iter().map(Into::into).collect())
    }
}
