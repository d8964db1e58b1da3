//! Alpaca REST client — positions and option-chain snapshots.
//!
//! Implements the `PositionSource` and `ChainSource` capability traits so
//! the engine never depends on Alpaca directly.

pub mod account;
pub mod client;
pub mod options_chain;
pub mod types;

pub use client::{AlpacaClient, AlpacaConfig};
