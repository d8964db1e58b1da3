//! Single-ticker contract pick with optional rejection diagnostics.

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use rust_decimal::Decimal;

use autopilot_alpaca::{AlpacaClient, AlpacaConfig};
use autopilot_core::traits::ChainSource;
use autopilot_core::types::Direction;
use autopilot_core::ConfigLoader;
use autopilot_engine::chain::{affordable_options_for_ticker, ChainFilterParams, PriceBasis};
use autopilot_engine::selector::{diagnose_selection, pick_best_affordable};
use autopilot_engine::targets::{format_required_move, required_underlying_move_for_profit_pct};

/// Arguments for the pick command.
#[derive(Args, Debug)]
pub struct PickArgs {
    /// Underlying ticker
    #[arg(long)]
    pub ticker: String,

    /// Directional view: bullish or bearish
    #[arg(long, default_value = "bullish")]
    pub direction: String,

    /// Max premium per contract in USD
    #[arg(long, default_value = "100")]
    pub max_premium: Decimal,

    /// Minimum days to expiry
    #[arg(long, default_value = "30")]
    pub min_days: i64,

    /// Maximum days to expiry
    #[arg(long, default_value = "90")]
    pub max_days: i64,

    /// Target absolute delta
    #[arg(long, default_value = "0.30")]
    pub target_abs_delta: f64,

    /// Maximum bid/ask spread fraction
    #[arg(long, default_value = "0.30")]
    pub max_spread_pct: Decimal,

    /// Price basis: ask, mid, or last
    #[arg(long, default_value = "ask")]
    pub price_basis: PriceBasis,

    /// Explain why candidates were rejected
    #[arg(long)]
    pub explain: bool,
}

pub async fn run(args: PickArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let client = AlpacaClient::new(AlpacaConfig::from_settings(&config.alpaca));

    let direction = match args.direction.trim().to_lowercase().as_str() {
        "bearish" | "bear" => Direction::Bearish,
        _ => Direction::Bullish,
    };

    let params = ChainFilterParams {
        want: direction.wanted_right(),
        min_dte_days: args.min_days,
        max_dte_days: args.max_days,
        max_premium_usd: args.max_premium,
        price_basis: args.price_basis,
        min_price: config.strategy.min_price,
        max_spread_pct: args.max_spread_pct,
        require_delta: true,
        today: Utc::now().date_naive(),
    };

    let ticker = args.ticker.trim().to_uppercase();
    let candidates = client
        .option_chain(&ticker, &config.alpaca.options_feed)
        .await?;

    if args.explain {
        let diag = diagnose_selection(&candidates, &ticker, &params, args.target_abs_delta);
        println!(
            "{}: {} accepted, {} rejected",
            diag.ticker,
            diag.accepted.len(),
            diag.rejected.len()
        );
        for line in diag.rejection_lines() {
            println!("  {line}");
        }
        print_best(diag.best.as_ref());
        return Ok(());
    }

    let affordable = affordable_options_for_ticker(&candidates, &ticker, &params);
    let best = pick_best_affordable(&affordable, args.target_abs_delta, args.max_spread_pct);
    print_best(best.as_ref());

    Ok(())
}

fn print_best(best: Option<&autopilot_engine::chain::AffordableOption>) {
    match best {
        Some(o) => {
            println!(
                "{} {} {} dte={} strike={} price=${:.2} premium=${:.2} delta={}",
                o.symbol,
                o.right,
                o.expiry,
                o.dte_days,
                o.strike,
                o.price,
                o.premium_usd,
                o.delta.map(|d| format!("{d:.2}")).unwrap_or_else(|| "n/a".to_string()),
            );
            let m = o.delta.and_then(|d| {
                required_underlying_move_for_profit_pct(
                    o.price,
                    d,
                    Decimal::new(5, 2),
                    None,
                    o.right,
                )
            });
            println!("move for +5%: {}", format_required_move(m.as_ref()));
        }
        None => println!("No contract satisfied the constraints."),
    }
}
