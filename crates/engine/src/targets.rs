//! Delta-based approximation of the underlying move needed for a target
//! option P&L. First-order only (no gamma/theta/vega, no IV changes);
//! a quick intuition aid, not a pricing model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use autopilot_core::types::OptionRight;

/// Which way the underlying must move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// Required underlying move for a target option profit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RequiredMove {
    pub direction: MoveDirection,
    /// Magnitude in underlying dollars per share.
    pub move_usd: Decimal,
    /// Magnitude as a fraction of the underlying price, when known.
    pub move_pct: Option<Decimal>,
}

/// Compute the underlying move required for a target option profit percent.
///
/// Approximation: `dOption = delta * dUnderlying`, so
/// `dUnderlying = (profit_pct * entry_price) / |delta|`. Entry price is
/// per-share (1.23 means $123/contract). Returns `None` on degenerate
/// inputs (non-positive price/profit, vanishing delta).
pub fn required_underlying_move_for_profit_pct(
    opt_entry_price: Decimal,
    delta: f64,
    profit_pct: Decimal,
    underlying_px: Option<Decimal>,
    right: OptionRight,
) -> Option<RequiredMove> {
    if opt_entry_price <= Decimal::ZERO || profit_pct <= Decimal::ZERO {
        return None;
    }
    let abs_delta = Decimal::try_from(delta.abs()).ok()?;
    if abs_delta < Decimal::new(1, 9) {
        return None;
    }

    let move_usd = (profit_pct * opt_entry_price) / abs_delta;

    let move_pct = underlying_px
        .filter(|px| *px > Decimal::ZERO)
        .map(|px| move_usd / px);

    let direction = match right {
        OptionRight::Call => MoveDirection::Up,
        OptionRight::Put => MoveDirection::Down,
    };

    Some(RequiredMove {
        direction,
        move_usd,
        move_pct,
    })
}

/// One-line rendering, e.g. `+$0.25 (+1.25%)`.
pub fn format_required_move(m: Option<&RequiredMove>) -> String {
    let Some(m) = m else {
        return "n/a".to_string();
    };
    let sign = match m.direction {
        MoveDirection::Up => "+",
        MoveDirection::Down => "-",
    };
    match m.move_pct {
        Some(pct) => format!(
            "{sign}${:.2} ({sign}{:.2}%)",
            m.move_usd,
            pct * Decimal::ONE_HUNDRED
        ),
        None => format!("{sign}${:.2}", m.move_usd),
    }
}
