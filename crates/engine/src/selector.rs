//! Contract selection — best match to a target delta, with liquidity
//! tie-breakers and a diagnostic variant that explains rejections.

use std::cmp::Ordering;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use autopilot_core::types::OptionCandidate;

use crate::chain::{evaluate_candidate, AffordableOption, ChainFilterParams};

/// Pick the single best contract: closest |delta| to the target, ties broken
/// by narrower spread, then higher open interest, then higher volume, then
/// DTE nearest the set's median.
///
/// Returns `None` on empty input: "no leg found" is a legitimate terminal
/// outcome, not a failure.
pub fn pick_best_affordable(
    options: &[AffordableOption],
    target_abs_delta: f64,
    max_spread_pct: Decimal,
) -> Option<AffordableOption> {
    if options.is_empty() {
        return None;
    }

    let median_dte = median(options.iter().map(|o| o.dte_days));

    let mut ranked: Vec<&AffordableOption> = options.iter().collect();
    ranked.sort_by(|a, b| compare(a, b, target_abs_delta, max_spread_pct, median_dte));
    ranked.first().map(|o| (*o).clone())
}

fn median(dtes: impl Iterator<Item = i64>) -> i64 {
    let mut v: Vec<i64> = dtes.collect();
    v.sort_unstable();
    v[v.len() / 2]
}

fn delta_distance(o: &AffordableOption, target_abs_delta: f64) -> f64 {
    match o.delta {
        Some(d) => (d.abs() - target_abs_delta).abs(),
        None => f64::INFINITY,
    }
}

fn compare(
    a: &AffordableOption,
    b: &AffordableOption,
    target_abs_delta: f64,
    max_spread_pct: Decimal,
    median_dte: i64,
) -> Ordering {
    // Anything over the spread cap sorts behind everything under it.
    (a.spread_pct > max_spread_pct)
        .cmp(&(b.spread_pct > max_spread_pct))
        .then_with(|| {
            delta_distance(a, target_abs_delta)
                .partial_cmp(&delta_distance(b, target_abs_delta))
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.spread_pct.cmp(&b.spread_pct))
        .then_with(|| b.open_interest.unwrap_or(0).cmp(&a.open_interest.unwrap_or(0)))
        .then_with(|| b.volume.unwrap_or(0).cmp(&a.volume.unwrap_or(0)))
        .then_with(|| {
            (a.dte_days - median_dte)
                .abs()
                .cmp(&(b.dte_days - median_dte).abs())
        })
}

/// One candidate that failed the filter, with the constraint it failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedCandidate {
    pub symbol: String,
    pub expiry: NaiveDate,
    pub strike: Decimal,
    pub reason: String,
}

/// Full filter/score trail for one ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionDiagnostics {
    pub ticker: String,
    pub accepted: Vec<AffordableOption>,
    pub rejected: Vec<RejectedCandidate>,
    pub best: Option<AffordableOption>,
}

impl SelectionDiagnostics {
    /// Human-readable "why nothing matched" lines, one per rejection.
    pub fn rejection_lines(&self) -> Vec<String> {
        self.rejected
            .iter()
            .map(|r| format!("{}: {}", r.symbol, r.reason))
            .collect()
    }
}

/// Run the identical filter/score pipeline as
/// [`crate::chain::affordable_options_for_ticker`] +
/// [`pick_best_affordable`], recording which constraint each rejected
/// candidate failed. Reuses [`evaluate_candidate`], so the trail can never
/// drift from actual filter behavior.
pub fn diagnose_selection(
    candidates: &[OptionCandidate],
    ticker: &str,
    params: &ChainFilterParams,
    target_abs_delta: f64,
) -> SelectionDiagnostics {
    let ticker = ticker.trim().to_uppercase();
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for c in candidates.iter().filter(|c| c.underlying.eq_ignore_ascii_case(&ticker)) {
        match evaluate_candidate(c, params) {
            Ok(opt) => accepted.push(opt),
            Err(reason) => rejected.push(RejectedCandidate {
                symbol: c.symbol.clone(),
                expiry: c.expiry,
                strike: c.strike,
                reason: reason.to_string(),
            }),
        }
    }

    let best = pick_best_affordable(&accepted, target_abs_delta, params.max_spread_pct);

    SelectionDiagnostics {
        ticker,
        accepted,
        rejected,
        best,
    }
}
