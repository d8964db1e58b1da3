//! Budget planning — strict per-trade caps vs one pooled flex budget.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Strict enforces independent per-trade caps; flex shares one pool across
/// candidates, consumed in input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetMode {
    Strict,
    Flex,
}

impl std::str::FromStr for BudgetMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "flex" => Ok(Self::Flex),
            other => Err(format!("unknown budget mode: {other}")),
        }
    }
}

impl std::fmt::Display for BudgetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Flex => write!(f, "flex"),
        }
    }
}

/// How strict-mode cash splits between shares and option premium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationKind {
    /// Drawdown-aware default: 70/30 when cash allows, else all equities.
    Auto,
    Equity100,
    Split5050,
    Split7030,
    /// Produce all three strict variants for comparison.
    Both,
}

impl std::str::FromStr for AllocationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "equity100" => Ok(Self::Equity100),
            "50_50" => Ok(Self::Split5050),
            "70_30" => Ok(Self::Split7030),
            "both" => Ok(Self::Both),
            other => Err(format!("unknown allocation: {other}")),
        }
    }
}

/// A budget allocation plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetPlan {
    pub name: String,
    pub budget_equity: Decimal,
    pub budget_options: Decimal,
    pub note: String,
}

impl BudgetPlan {
    pub fn total(&self) -> Decimal {
        self.budget_equity + self.budget_options
    }
}

/// Cash floor below which auto allocation stops budgeting options entirely.
const AUTO_OPTIONS_MIN_CASH: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// Build budget plan(s) for one allocation pass.
///
/// Flex mode returns a single pooled plan; strict mode splits cash per
/// `allocation`, with `Both` producing all three strict variants.
pub fn build_budget_plans(
    cash: Decimal,
    mode: BudgetMode,
    allocation: AllocationKind,
    min_new_trades: usize,
) -> Vec<BudgetPlan> {
    let budget_total = cash.max(Decimal::ZERO);

    if mode == BudgetMode::Flex {
        return vec![BudgetPlan {
            name: "flex".to_string(),
            budget_equity: budget_total,
            budget_options: budget_total,
            note: format!("Budget mode: FLEX (allocate across >= {min_new_trades} trade(s))"),
        }];
    }

    match allocation {
        AllocationKind::Both => vec![
            strict_plan(AllocationKind::Equity100, budget_total),
            strict_plan(AllocationKind::Split5050, budget_total),
            strict_plan(AllocationKind::Split7030, budget_total),
        ],
        kind => vec![strict_plan(kind, budget_total)],
    }
}

fn strict_plan(kind: AllocationKind, budget_total: Decimal) -> BudgetPlan {
    let half = Decimal::new(50, 2);
    let seventy = Decimal::new(70, 2);
    let thirty = Decimal::new(30, 2);

    match kind {
        AllocationKind::Equity100 => BudgetPlan {
            name: "equity100".to_string(),
            budget_equity: budget_total,
            budget_options: Decimal::ZERO,
            note: "Allocation: 100% equities".to_string(),
        },
        AllocationKind::Split5050 => BudgetPlan {
            name: "50_50".to_string(),
            budget_equity: half * budget_total,
            budget_options: half * budget_total,
            note: "Allocation: 50% equities / 50% options".to_string(),
        },
        AllocationKind::Split7030 => BudgetPlan {
            name: "70_30".to_string(),
            budget_equity: seventy * budget_total,
            budget_options: thirty * budget_total,
            note: "Allocation: 70% equities / 30% options".to_string(),
        },
        AllocationKind::Auto | AllocationKind::Both => {
            if budget_total >= AUTO_OPTIONS_MIN_CASH {
                BudgetPlan {
                    name: "auto".to_string(),
                    budget_equity: seventy * budget_total,
                    budget_options: thirty * budget_total,
                    note: "Allocation: 70/30 (auto, cash >= $500)".to_string(),
                }
            } else {
                BudgetPlan {
                    name: "auto".to_string(),
                    budget_equity: budget_total,
                    budget_options: Decimal::ZERO,
                    note: "Allocation: 100% equities (auto, cash < $500)".to_string(),
                }
            }
        }
    }
}

/// Human-readable summary of plans vs available cash. Presentational only;
/// the plans themselves are untouched.
pub fn format_budget_status(
    plans: &[BudgetPlan],
    mode: BudgetMode,
    cash: Decimal,
    min_trades: usize,
    max_trades: usize,
) -> String {
    let mut lines = vec![format!("Trade budget (cash): ${cash:.2}")];

    if mode == BudgetMode::Flex {
        if let Some(p) = plans.first() {
            lines.push(p.note.clone());
        }
    } else if let [p] = plans {
        lines.push(format!(
            "{} (shares~${:.2} options~${:.2})",
            p.note, p.budget_equity, p.budget_options
        ));
    } else {
        for p in plans {
            lines.push(format!(
                "- {}: {} (shares~${:.2} options~${:.2})",
                p.name, p.note, p.budget_equity, p.budget_options
            ));
        }
    }

    lines.push(format!("Target new trades: {min_trades}..{max_trades}"));
    lines.join("\n")
}
