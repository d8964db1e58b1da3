//! Stop-loss candidate listing.

use anyhow::Result;
use clap::Args;
use rust_decimal::Decimal;

use autopilot_alpaca::{AlpacaClient, AlpacaConfig};
use autopilot_core::ConfigLoader;
use autopilot_engine::positions::{fetch_positions, stop_candidates};

/// Arguments for the stops command.
#[derive(Args, Debug)]
pub struct StopsArgs {
    /// Loss threshold as a fraction (0.30 flags positions at -30% or worse)
    #[arg(long, default_value = "0.30")]
    pub stop_loss_pct: Decimal,
}

pub async fn run(args: StopsArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let client = AlpacaClient::new(AlpacaConfig::from_settings(&config.alpaca));

    let positions = fetch_positions(&client).await?;
    let stops = stop_candidates(&positions, args.stop_loss_pct);

    if stops.is_empty() {
        println!("No positions at or below -{}", args.stop_loss_pct);
        return Ok(());
    }

    println!("Stop-loss candidates ({}):", stops.len());
    for p in &stops {
        let plpc = p
            .unrealized_plpc
            .map(|v| format!("{:.2}%", v * Decimal::ONE_HUNDRED))
            .unwrap_or_else(|| "n/a".to_string());
        let pl = p
            .unrealized_pl
            .map(|v| format!("${v:.2}"))
            .unwrap_or_else(|| "n/a".to_string());
        println!("  {} {} ({})", p.symbol, plpc, pl);
    }

    Ok(())
}
