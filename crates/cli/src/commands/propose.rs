//! Full proposal pipeline: positions -> exclusions -> legs -> allocation.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use rust_decimal::Decimal;

use autopilot_alpaca::{AlpacaClient, AlpacaConfig};
use autopilot_core::ConfigLoader;
use autopilot_engine::budget::{
    build_budget_plans, format_budget_status, AllocationKind, BudgetMode,
};
use autopilot_engine::legs::{attach_option_legs, LegAttachParams};
use autopilot_engine::positions::{fetch_positions, get_held_underlyings};
use autopilot_engine::proposals::{build_proposals, ProposalCandidate, ProposalParams};

use super::parse_ideas;

/// Arguments for the propose command.
#[derive(Args, Debug)]
pub struct ProposeArgs {
    /// Directional ideas, e.g. "NVDA:bullish,QQQ:bearish"
    #[arg(long)]
    pub ideas: String,

    /// Cash available for this allocation pass
    #[arg(long)]
    pub cash: Decimal,

    /// Budget mode: strict or flex
    #[arg(long, default_value = "strict")]
    pub budget_mode: BudgetMode,

    /// Strict-mode equity/options split: auto, equity100, 50_50, 70_30, both
    #[arg(long, default_value = "auto")]
    pub allocation: AllocationKind,

    /// Max premium per contract in USD (strict mode)
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

    /// Maximum candidates to scan for legs
    #[arg(long, default_value = "30")]
    pub max_candidates: usize,

    /// Maximum new trades to propose
    #[arg(long, default_value = "3")]
    pub max_new_trades: usize,

    /// Minimum new trades to target
    #[arg(long, default_value = "2")]
    pub min_new_trades: usize,
}

pub async fn run(args: ProposeArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let client = AlpacaClient::new(AlpacaConfig::from_settings(&config.alpaca));

    let positions = fetch_positions(&client).await?;
    let held = get_held_underlyings(&positions);

    let ideas = parse_ideas(&args.ideas)?;

    let mut leg_params =
        LegAttachParams::new(args.budget_mode, args.cash, Utc::now().date_naive());
    leg_params.max_premium_usd = args.max_premium;
    leg_params.min_days = args.min_days;
    leg_params.max_days = args.max_days;
    leg_params.target_abs_delta = args.target_abs_delta;
    leg_params.max_spread_pct = args.max_spread_pct;
    leg_params.max_candidates = args.max_candidates;
    leg_params.feed = config.alpaca.options_feed.clone();

    let legs = attach_option_legs(&ideas, &client, &leg_params).await;
    tracing::info!(legs = legs.len(), ideas = ideas.len(), "Attached option legs");

    let plans = build_budget_plans(args.cash, args.budget_mode, args.allocation, args.min_new_trades);
    println!(
        "{}",
        format_budget_status(&plans, args.budget_mode, args.cash, args.min_new_trades, args.max_new_trades)
    );

    let candidates: Vec<ProposalCandidate> = ideas
        .iter()
        .map(|i| ProposalCandidate {
            ticker: i.ticker.clone(),
            direction: i.direction,
            sleeve: None,
        })
        .collect();

    let mut params = ProposalParams::new(args.budget_mode);
    params.max_premium_usd = args.max_premium;
    params.max_new_trades = args.max_new_trades;
    params.min_new_trades = args.min_new_trades;
    params.risk = config.risk.clone();

    for plan in &plans {
        let result = build_proposals(&candidates, &legs, &BTreeMap::new(), plan, &held, &params);

        println!("\nPlan {}: {} proposal(s)", plan.name, result.proposals.len());
        for p in &result.proposals {
            let leg = p
                .leg
                .as_ref()
                .map(|l| format!(" {}", l.symbol))
                .unwrap_or_default();
            println!(
                "  {:?} {} x{}{} est ${:.2} ({} exposure)",
                p.kind, p.ticker, p.contracts, leg, p.est_cost_usd, p.exposure
            );
        }
        println!(
            "  remaining: equity ${:.2} options ${:.2} total ${:.2} | {} bullish / {} bearish",
            result.remaining_equity,
            result.remaining_options,
            result.remaining_total,
            result.n_bullish,
            result.n_bearish
        );
    }

    Ok(())
}
