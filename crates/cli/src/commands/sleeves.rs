//! Sleeve registry listing and resolution checks.

use anyhow::Result;
use clap::Args;

use autopilot_engine::sleeves::SleeveRegistry;

/// Arguments for the sleeves command.
#[derive(Args, Debug)]
pub struct SleevesArgs {
    /// Comma-separated sleeve names/aliases to resolve (default: list all)
    #[arg(long)]
    pub sleeves: Option<String>,

    /// Basket name passed to each sleeve's universe builder
    #[arg(long, default_value = "starter")]
    pub basket: String,
}

pub fn run(args: SleevesArgs) -> Result<()> {
    let registry = SleeveRegistry::builtin();

    let resolved = match &args.sleeves {
        Some(spec) => {
            let names: Vec<String> = spec
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            registry.resolve(&names)?
        }
        None => registry.sleeves().iter().collect(),
    };

    for sleeve in resolved {
        let universe = sleeve.universe(&args.basket);
        println!(
            "{} (aliases: {}) risk_budget {:.0}%",
            sleeve.name,
            sleeve.aliases.join(", "),
            sleeve.risk_budget_pct * 100.0
        );
        println!("  universe [{}]: {}", universe.len(), universe.join(" "));
    }

    Ok(())
}
