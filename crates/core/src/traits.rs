use crate::types::{OptionCandidate, RawPositionRecord};
use anyhow::Result;
use async_trait::async_trait;

/// Source of current broker positions.
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn positions(&self) -> Result<Vec<RawPositionRecord>>;
}

/// Source of option-chain rows for one underlying.
#[async_trait]
pub trait ChainSource: Send + Sync {
    async fn option_chain(&self, underlying: &str, feed: &str) -> Result<Vec<OptionCandidate>>;
}
