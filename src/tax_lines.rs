use crate::chart_of_accounts::ChartOfAccounts;
use crate::error::Result;
use crate::resolver::CategoryResolver;
use crate::schema::{AccountType, TaxForm, Transaction};
use crate::utils::round_to_cents;
use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxLineTotal {
    pub form: TaxForm,
    pub line: String,
    pub account_names: Vec<String>,
    /// HST-exclusive total. Income is positive, expenses are negative.
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmappedTotal {
    pub form: TaxForm,
    pub account_code: String,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaxLineSummary {
    /// Ordered by form, then line.
    pub lines: Vec<TaxLineTotal>,
    /// Activity on accounts that have no line on the form it reports to.
    pub unmapped: Vec<UnmappedTotal>,
}

impl TaxLineSummary {
    pub fn line(&self, form: TaxForm, line: &str) -> Option<&TaxLineTotal> {
        self.lines.iter().find(|l| l.form == form && l.line == line)
    }

    pub fn net_income(&self, form: TaxForm) -> f64 {
        let total = self
            .lines
            .iter()
            .filter(|l| l.form == form)
            .map(|l| l.total)
            .sum::<f64>();
        round_to_cents(total)
    }
}

/// Rolls a year of transactions up to T2125/T776 line totals.
///
/// Transactions without an explicit tax form use their ledger's form; personal
/// transactions report nowhere and are skipped.
pub fn summarize_tax_lines(
    chart: &ChartOfAccounts,
    transactions: &[Transaction],
    year: i32,
) -> Result<TaxLineSummary> {
    let resolver = CategoryResolver::new(chart);
    let mut lines: BTreeMap<(TaxForm, String), TaxLineTotal> = BTreeMap::new();
    let mut unmapped: BTreeMap<(TaxForm, String), f64> = BTreeMap::new();

    for transaction in transactions.iter().filter(|t| t.date.year() == year) {
        transaction.validate_amounts()?;

        let Some(form) = transaction.effective_tax_form() else {
            continue;
        };

        let amount = transaction.amount;
        let account_type = if amount < 0.0 {
            AccountType::Expense
        } else {
            AccountType::Revenue
        };
        let code = resolver.resolve_account_code(&transaction.category, account_type);
        let net = amount.signum() * (amount.abs() - transaction.hst_or_zero());

        match chart.tax_line(&code, form) {
            Some(line) => {
                let entry = lines
                    .entry((form, line.to_string()))
                    .or_insert_with(|| TaxLineTotal {
                        form,
                        line: line.to_string(),
                        account_names: Vec::new(),
                        total: 0.0,
                    });
                let name = chart.name_of(&code);
                if !entry.account_names.contains(&name) {
                    entry.account_names.push(name);
                }
                entry.total += net;
            }
            None => *unmapped.entry((form, code)).or_default() += net,
        }
    }

    Ok(TaxLineSummary {
        lines: lines
            .into_values()
            .map(|mut line| {
                line.total = round_to_cents(line.total);
                line
            })
            .collect(),
        unmapped: unmapped
            .into_iter()
            .map(|((form, account_code), total)| UnmappedTotal {
                form,
                account_code,
                total: round_to_cents(total),
            })
            .collect(),
    })
}
