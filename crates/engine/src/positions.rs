//! Position analysis — normalization, stop-loss detection, held-underlying sets.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use autopilot_core::occ::extract_underlying;
use autopilot_core::traits::PositionSource;
use autopilot_core::types::{Position, RawPositionRecord};
use rust_decimal::Decimal;

/// Fetch all positions from the broker and normalize numeric fields.
///
/// A failure of the bulk fetch itself is an error; a malformed numeric on a
/// single record degrades to `None` and never aborts the pass.
pub async fn fetch_positions(source: &dyn PositionSource) -> Result<Vec<Position>> {
    let raw = source
        .positions()
        .await
        .context("Failed to fetch broker positions")?;

    Ok(raw.into_iter().map(normalize).collect())
}

fn normalize(r: RawPositionRecord) -> Position {
    Position {
        symbol: r.symbol,
        qty: to_decimal(r.qty.as_deref()),
        avg_entry_price: to_decimal(r.avg_entry_price.as_deref()),
        current_price: to_decimal(r.current_price.as_deref()),
        unrealized_pl: to_decimal(r.unrealized_pl.as_deref()),
        unrealized_plpc: to_decimal(r.unrealized_plpc.as_deref()),
    }
}

fn to_decimal(s: Option<&str>) -> Option<Decimal> {
    s.and_then(|v| v.trim().parse().ok())
}

/// Positions whose unrealized P&L percent has fallen to or below the stop
/// threshold. The boundary is inclusive: exactly at threshold counts.
pub fn stop_candidates(positions: &[Position], stop_loss_pct: Decimal) -> Vec<Position> {
    let threshold = -stop_loss_pct.abs();
    positions
        .iter()
        .filter(|p| p.unrealized_plpc.is_some_and(|plpc| plpc <= threshold))
        .cloned()
        .collect()
}

/// Whether a symbol is an option: prefix-stripping found an actual suffix
/// that looks like option metadata.
pub fn is_option_position(symbol: &str) -> bool {
    let s = symbol.trim().to_uppercase();
    match extract_underlying(&s) {
        Some(und) => und != s && s.chars().any(|c| c.is_ascii_digit()),
        None => false,
    }
}

/// All underlying tickers currently held: raw symbols plus derived
/// underlyings, for duplicate-exposure checks.
pub fn get_held_underlyings(positions: &[Position]) -> BTreeSet<String> {
    let mut held = BTreeSet::new();
    for p in positions {
        let sym = p.symbol.trim().to_uppercase();
        if sym.is_empty() {
            continue;
        }
        if let Some(und) = extract_underlying(&sym) {
            held.insert(und);
        }
        held.insert(sym);
    }
    held
}

/// Underlying tickers for option positions only.
pub fn get_option_underlyings(positions: &[Position]) -> BTreeSet<String> {
    let mut unds = BTreeSet::new();
    for p in positions {
        let sym = p.symbol.trim().to_uppercase();
        if is_option_position(&sym) {
            if let Some(und) = extract_underlying(&sym) {
                unds.insert(und);
            }
        }
    }
    unds
}
