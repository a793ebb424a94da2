use crate::balancer::{self, JournalBalancer};
use crate::chart_of_accounts::{ChartOfAccounts, BUSINESS_BANK, CASH, CREDIT_CARD, HST_COLLECTED, HST_PAID_ITC};
use crate::error::{LedgerError, Result};
use crate::resolver::CategoryResolver;
use crate::schema::{AccountType, PaymentMethod, Transaction};
use crate::utils::round_to_cents;
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalEntryStatus {
    Draft,
    Posted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntryHeader {
    pub date: NaiveDate,
    pub description: String,
    /// Id of the transaction or invoice this entry was generated from.
    pub reference_id: Option<String>,
    pub status: JournalEntryStatus,
}

/// One side of a posting. Only one of `debit` and `credit` is non-zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerLine {
    pub account_code: String,
    pub account_name: String,
    pub debit: f64,
    pub credit: f64,
}

impl LedgerLine {
    pub fn debit(account_code: &str, account_name: &str, amount: f64) -> Self {
        Self {
            account_code: account_code.to_string(),
            account_name: account_name.to_string(),
            debit: amount,
            credit: 0.0,
        }
    }

    pub fn credit(account_code: &str, account_name: &str, amount: f64) -> Self {
        Self {
            account_code: account_code.to_string(),
            account_name: account_name.to_string(),
            debit: 0.0,
            credit: amount,
        }
    }

    pub fn is_debit(&self) -> bool {
        self.debit > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub header: JournalEntryHeader,
    pub lines: Vec<LedgerLine>,
}

impl JournalEntry {
    pub fn total_debits(&self) -> f64 {
        balancer::totals(&self.lines).0
    }

    pub fn total_credits(&self) -> f64 {
        balancer::totals(&self.lines).1
    }

    pub fn is_balanced(&self, tolerance: f64) -> bool {
        JournalBalancer::new(tolerance).check(&self.lines).balanced
    }

    pub fn line_for(&self, account_code: &str) -> Option<&LedgerLine> {
        self.lines.iter().find(|l| l.account_code == account_code)
    }
}

pub fn payment_account_code(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::CreditCard => CREDIT_CARD,
        PaymentMethod::Bank => BUSINESS_BANK,
        PaymentMethod::Cash => CASH,
    }
}

pub struct JournalGenerator<'a> {
    chart: &'a ChartOfAccounts,
    resolver: CategoryResolver<'a>,
    balancer: JournalBalancer,
}

impl<'a> JournalGenerator<'a> {
    pub fn new(chart: &'a ChartOfAccounts, tolerance: f64) -> Self {
        Self {
            chart,
            resolver: CategoryResolver::new(chart),
            balancer: JournalBalancer::new(tolerance),
        }
    }

    /// Builds the balanced posting for one transaction.
    ///
    /// Outflows debit the resolved expense account (net of HST) and the HST
    /// input-tax-credit account, and credit the payment account with the gross.
    /// Inflows debit the business bank with the gross and credit the resolved
    /// revenue account (net) and HST collected.
    pub fn generate(
        &self,
        transaction: &Transaction,
        payment_method: PaymentMethod,
    ) -> Result<JournalEntry> {
        transaction.validate_amounts()?;
        if transaction.amount == 0.0 {
            return Err(LedgerError::numeric("amount", transaction.amount));
        }

        let gross = round_to_cents(transaction.amount.abs());
        let hst = round_to_cents(transaction.hst_or_zero());
        let net = round_to_cents(gross - hst);

        let mut lines = Vec::with_capacity(3);

        if transaction.is_outflow() {
            let expense_code = self
                .resolver
                .resolve_account_code(&transaction.category, AccountType::Expense);
            lines.push(self.debit_line(&expense_code, net));

            if hst > 0.0 {
                lines.push(self.debit_line(HST_PAID_ITC, hst));
            }

            lines.push(self.credit_line(payment_account_code(payment_method), gross));
        } else {
            let revenue_code = self
                .resolver
                .resolve_account_code(&transaction.category, AccountType::Revenue);
            lines.push(self.debit_line(BUSINESS_BANK, gross));
            lines.push(self.credit_line(&revenue_code, net));

            if hst > 0.0 {
                lines.push(self.credit_line(HST_COLLECTED, hst));
            }
        }

        let entry = JournalEntry {
            header: JournalEntryHeader {
                date: transaction.date,
                description: describe(transaction),
                reference_id: Some(transaction.id.clone()),
                status: if transaction.is_pending() {
                    JournalEntryStatus::Draft
                } else {
                    JournalEntryStatus::Posted
                },
            },
            lines,
        };

        self.balancer.verify(&entry)?;

        debug!(
            "Generated {} lines for transaction {} ({:.2})",
            entry.lines.len(),
            transaction.id,
            transaction.amount
        );

        Ok(entry)
    }

    fn debit_line(&self, code: &str, amount: f64) -> LedgerLine {
        LedgerLine::debit(code, &self.chart.name_of(code), amount)
    }

    fn credit_line(&self, code: &str, amount: f64) -> LedgerLine {
        LedgerLine::credit(code, &self.chart.name_of(code), amount)
    }
}

fn describe(transaction: &Transaction) -> String {
    if transaction.vendor.trim().is_empty() {
        transaction.category.clone()
    } else {
        format!("{} - {}", transaction.vendor, transaction.category)
    }
}

pub fn generate_journal_entry(
    chart: &ChartOfAccounts,
    transaction: &Transaction,
    payment_method: PaymentMethod,
    tolerance: f64,
) -> Result<JournalEntry> {
    JournalGenerator::new(chart, tolerance).generate(transaction, payment_method)
}
