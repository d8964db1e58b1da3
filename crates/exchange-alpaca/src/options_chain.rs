//! Option-chain snapshots for a single underlying.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use autopilot_core::occ::parse_occ_option_symbol;
use autopilot_core::traits::ChainSource;
use autopilot_core::types::OptionCandidate;

use crate::client::AlpacaClient;
use crate::types::{OptionSnapshot, OptionSnapshotsResponse};

/// Snapshots per page; Alpaca caps this server-side.
const PAGE_LIMIT: u32 = 1000;

/// Convert one snapshot row into a chain candidate. Rows whose symbol does
/// not parse as OCC-style for this underlying are dropped.
pub fn to_candidate(symbol: &str, underlying: &str, snap: &OptionSnapshot) -> Option<OptionCandidate> {
    let (expiry, right, strike) = match parse_occ_option_symbol(symbol, underlying) {
        Ok(parts) => parts,
        Err(e) => {
            debug!(symbol = %symbol, error = %e, "Skipping unparseable chain row");
            return None;
        }
    };

    let quote = snap.latest_quote.as_ref();
    Some(OptionCandidate {
        symbol: symbol.to_string(),
        underlying: underlying.to_string(),
        right,
        expiry,
        strike,
        bid: quote.and_then(|q| q.bid_price),
        ask: quote.and_then(|q| q.ask_price),
        last: snap.latest_trade.as_ref().and_then(|t| t.price),
        delta: snap.greeks.as_ref().and_then(|g| g.delta),
        open_interest: None,
        volume: snap.daily_bar.as_ref().and_then(|b| b.volume),
    })
}

#[async_trait]
impl ChainSource for AlpacaClient {
    async fn option_chain(&self, underlying: &str, feed: &str) -> Result<Vec<OptionCandidate>> {
        let underlying = underlying.trim().to_uppercase();
        let mut candidates = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut path = format!(
                "/v1beta1/options/snapshots/{underlying}?feed={feed}&limit={PAGE_LIMIT}"
            );
            if let Some(token) = &page_token {
                path.push_str(&format!("&page_token={token}"));
            }

            let page: OptionSnapshotsResponse = self
                .get_data(&path)
                .await
                .with_context(|| format!("Failed to fetch option chain for {underlying}"))?;

            for (symbol, snap) in &page.snapshots {
                if let Some(c) = to_candidate(symbol, &underlying, snap) {
                    candidates.push(c);
                }
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        // Map iteration order is not stable; keep the chain deterministic.
        candidates.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OptionGreeks, OptionQuote, OptionTrade};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn snapshot() -> OptionSnapshot {
        OptionSnapshot {
            latest_quote: Some(OptionQuote {
                bid_price: Some(dec!(0.90)),
                ask_price: Some(dec!(0.95)),
            }),
            latest_trade: Some(OptionTrade {
                price: Some(dec!(0.92)),
            }),
            greeks: Some(OptionGreeks {
                delta: Some(0.31),
                gamma: None,
                theta: None,
                vega: None,
            }),
            daily_bar: None,
        }
    }

    #[test]
    fn converts_snapshot_to_candidate() {
        let c = to_candidate("GOOG251219C00355000", "GOOG", &snapshot()).unwrap();
        assert_eq!(c.underlying, "GOOG");
        assert_eq!(c.expiry, NaiveDate::from_ymd_opt(2025, 12, 19).unwrap());
        assert_eq!(c.strike, dec!(355.000));
        assert_eq!(c.ask, Some(dec!(0.95)));
        assert_eq!(c.delta, Some(0.31));
    }

    #[test]
    fn unparseable_symbols_are_dropped() {
        assert!(to_candidate("GOOG-bad", "GOOG", &snapshot()).is_none());
        assert!(to_candidate("MSFT251219C00355000", "GOOG", &snapshot()).is_none());
    }
}
