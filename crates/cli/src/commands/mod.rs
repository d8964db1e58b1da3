pub mod pick;
pub mod propose;
pub mod sleeves;
pub mod stops;

use anyhow::{anyhow, Result};
use autopilot_core::types::Direction;
use autopilot_engine::legs::DirectionalIdea;

/// Parse `"NVDA:bullish,QQQ:bearish"` into directional ideas.
pub fn parse_ideas(raw: &str) -> Result<Vec<DirectionalIdea>> {
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|pair| {
            let (ticker, direction) = pair
                .split_once(':')
                .ok_or_else(|| anyhow!("expected TICKER:DIRECTION, got {pair:?}"))?;
            let direction = match direction.trim().to_lowercase().as_str() {
                "bullish" | "bull" => Direction::Bullish,
                "bearish" | "bear" => Direction::Bearish,
                other => return Err(anyhow!("unknown direction {other:?} for {ticker}")),
            };
            Ok(DirectionalIdea {
                ticker: ticker.trim().to_uppercase(),
                direction,
            })
        })
        .collect()
}
