//! Cost estimates
//!
//! The hourly figure is the only number kept per environment. Everything
//! displayed (gate banner, `envctl costs`, the generated markdown table) is
//! formatted from it here so the transcript and the docs never disagree.

use super::Environment;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Hours used to turn an hourly rate into a monthly estimate
pub const HOURS_PER_MONTH: f64 = 730.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Estimated USD per hour while the environment is running
    pub hourly_usd: f64,

    /// Monthly budget the environment is expected to stay under
    #[serde(default)]
    pub monthly_budget_usd: Option<f64>,
}

impl CostEstimate {
    pub fn hourly(hourly_usd: f64) -> Self {
        Self {
            hourly_usd,
            monthly_budget_usd: None,
        }
    }

    pub fn with_budget(mut self, monthly_budget_usd: f64) -> Self {
        self.monthly_budget_usd = Some(monthly_budget_usd);
        self
    }

    pub fn monthly_usd(&self) -> f64 {
        self.hourly_usd * HOURS_PER_MONTH
    }

    /// Whether running all month would exceed the budget
    pub fn exceeds_budget(&self) -> bool {
        self.monthly_budget_usd
            .is_some_and(|budget| self.monthly_usd() > budget)
    }

    pub fn hourly_display(&self) -> String {
        format!("{}/hour", format_usd(self.hourly_usd))
    }

    pub fn monthly_display(&self) -> String {
        format!("{}/month", format_usd(self.monthly_usd()))
    }

    pub fn budget_display(&self) -> String {
        match self.monthly_budget_usd {
            Some(budget) => format!("{}/month", format_usd(budget)),
            None => "-".to_string(),
        }
    }

    /// Sum several estimates; budgets add up only if every one has a budget
    pub fn combined<'a>(estimates: impl IntoIterator<Item = &'a CostEstimate>) -> Self {
        let mut hourly = 0.0;
        let mut budget = Some(0.0);
        for estimate in estimates {
            hourly += estimate.hourly_usd;
            budget = match (budget, estimate.monthly_budget_usd) {
                (Some(total), Some(b)) => Some(total + b),
                _ => None,
            };
        }
        Self {
            hourly_usd: hourly,
            monthly_budget_usd: budget,
        }
    }
}

/// `$1,234.50`
pub fn format_usd(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Markdown cost table for the operations docs
pub fn markdown_cost_table(environments: &[Environment]) -> String {
    let mut out = String::new();
    out.push_str("| Environment | Resource group | Hourly | Monthly (est.) | Budget |\n");
    out.push_str("|---|---|---|---|---|\n");
    for env in environments {
        let _ = writeln!(
            out,
            "| {} | `{}` | {} | {} | {} |",
            env.name,
            env.resource_group,
            env.cost.hourly_display(),
            env.cost.monthly_display(),
            env.cost.budget_display(),
        );
    }
    out
}
