pub mod config;
pub mod config_loader;
pub mod dates;
pub mod occ;
pub mod traits;
pub mod types;

pub use config::{AlpacaSettings, AppConfig, RiskConfig, StrategyConfig};
pub use config_loader::ConfigLoader;
pub use dates::parse_timestamp;
pub use occ::{extract_underlying, parse_occ_option_symbol};
pub use traits::{ChainSource, PositionSource};
pub use types::{Direction, OptionCandidate, OptionRight, Position, RawPositionRecord};
