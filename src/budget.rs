//! Month-scoped spend rollups per ledger and category.
//!
//! Categories are matched after trimming and case-folding, so a "Meals "
//! transaction counts against a "meals" budget.

use crate::error::Result;
use crate::schema::{BudgetCategory, LedgerType, Transaction};
use crate::utils::{ensure_finite, month_bounds, normalize_category, round_to_cents};
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BudgetKey {
    pub ledger_type: LedgerType,
    /// Normalized category label.
    pub category: String,
}

impl BudgetKey {
    pub fn new(ledger_type: LedgerType, category: &str) -> Self {
        Self {
            ledger_type,
            category: normalize_category(category),
        }
    }
}

/// A budget definition joined with the month's actual spend.
///
/// Only [`aggregate_spend`] builds these, so `spent` always reflects the
/// transactions it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetUtilization {
    category: String,
    ledger_type: LedgerType,
    limit: f64,
    spent: f64,
    savings_goal: Option<f64>,
}

impl BudgetUtilization {
    fn from_definition(definition: &BudgetCategory, spent: f64) -> Self {
        Self {
            category: definition.category.clone(),
            ledger_type: definition.ledger_type,
            limit: definition.limit,
            spent,
            savings_goal: definition.savings_goal,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn ledger_type(&self) -> LedgerType {
        self.ledger_type
    }

    pub fn limit(&self) -> f64 {
        self.limit
    }

    pub fn spent(&self) -> f64 {
        self.spent
    }

    pub fn savings_goal(&self) -> Option<f64> {
        self.savings_goal
    }

    pub fn is_over(&self) -> bool {
        self.limit > 0.0 && self.spent > self.limit
    }

    pub fn overage(&self) -> f64 {
        if self.is_over() {
            round_to_cents(self.spent - self.limit)
        } else {
            0.0
        }
    }

    pub fn remaining(&self) -> f64 {
        round_to_cents((self.limit - self.spent).max(0.0))
    }

    /// Spent as a fraction of the limit; `None` for an unlimited (zero) budget.
    pub fn utilization(&self) -> Option<f64> {
        if self.limit > 0.0 {
            Some(self.spent / self.limit)
        } else {
            None
        }
    }
}

/// Sums outflows for the month per `(ledger, category)`, including categories
/// that have no budget definition.
pub fn spend_by_category(
    transactions: &[Transaction],
    month: u32,
    year: i32,
) -> Result<BTreeMap<BudgetKey, f64>> {
    let (start, end) = month_bounds(month, year)?;

    let mut groups: BTreeMap<BudgetKey, f64> = BTreeMap::new();

    for transaction in transactions {
        let amount = ensure_finite("amount", transaction.amount)?;
        if amount >= 0.0 || transaction.date < start || transaction.date > end {
            continue;
        }

        *groups
            .entry(BudgetKey::new(transaction.ledger_type, &transaction.category))
            .or_default() += amount.abs();
    }

    for value in groups.values_mut() {
        *value = round_to_cents(*value);
    }

    Ok(groups)
}

/// Joins each budget definition with the month's spend for its category.
/// Definitions with no matching transactions report zero spend.
pub fn aggregate_spend(
    transactions: &[Transaction],
    budget_defs: &[BudgetCategory],
    month: u32,
    year: i32,
) -> Result<BTreeMap<BudgetKey, BudgetUtilization>> {
    let spend = spend_by_category(transactions, month, year)?;
    let mut result = BTreeMap::new();

    for definition in budget_defs {
        definition.validate()?;

        let key = BudgetKey::new(definition.ledger_type, &definition.category);
        let spent = spend.get(&key).copied().unwrap_or(0.0);

        if result
            .insert(key, BudgetUtilization::from_definition(definition, spent))
            .is_some()
        {
            warn!(
                "Duplicate budget definition for '{}' on the {} ledger, keeping the later one",
                definition.category, definition.ledger_type
            );
        }
    }

    debug!(
        "Aggregated {} budgets for {:04}-{:02} from {} transactions",
        result.len(),
        year,
        month,
        transactions.len()
    );

    Ok(result)
}

pub fn for_ledger(
    budgets: &BTreeMap<BudgetKey, BudgetUtilization>,
    ledger_type: LedgerType,
) -> Vec<&BudgetUtilization> {
    budgets
        .iter()
        .filter(|(key, _)| key.ledger_type == ledger_type)
        .map(|(_, budget)| budget)
        .collect()
}

pub fn ledger_total_spend(
    transactions: &[Transaction],
    ledger_type: LedgerType,
    month: u32,
    year: i32,
) -> Result<f64> {
    let spend = spend_by_category(transactions, month, year)?;
    let total = spend
        .iter()
        .filter(|(key, _)| key.ledger_type == ledger_type)
        .map(|(_, value)| value)
        .sum::<f64>();
    Ok(round_to_cents(total))
}
