use crate::error::{LedgerError, Result};
use crate::utils::{ensure_finite, ensure_non_negative};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum AccountType {
    #[schemars(description = "Resources held: bank accounts, cash, recoverable HST (debit balance)")]
    Asset,

    #[schemars(description = "Obligations owed: credit cards, HST collected, mortgages (credit balance)")]
    Liability,

    #[schemars(description = "Owner's residual interest (credit balance)")]
    Equity,

    #[schemars(description = "Commission, consulting and rental income (credit balance)")]
    Revenue,

    #[schemars(description = "Deductible and personal spending (debit balance)")]
    Expense,
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Asset => "Asset",
            Self::Liability => "Liability",
            Self::Equity => "Equity",
            Self::Revenue => "Revenue",
            Self::Expense => "Expense",
        };
        write!(f, "{}", label)
    }
}

/// The financial context a transaction belongs to. Not a general-ledger account.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum LedgerType {
    #[schemars(description = "Active business income and expenses, reported on T2125")]
    Active,

    #[schemars(description = "Passive rental income and expenses, reported on T776")]
    Passive,

    #[schemars(description = "Personal spending, not reported")]
    Personal,
}

impl LedgerType {
    /// The tax form a ledger reports on when a transaction does not name one.
    pub fn default_tax_form(&self) -> Option<TaxForm> {
        match self {
            Self::Active => Some(TaxForm::T2125),
            Self::Passive => Some(TaxForm::T776),
            Self::Personal => None,
        }
    }
}

impl fmt::Display for LedgerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Active => "active",
            Self::Passive => "passive",
            Self::Personal => "personal",
        };
        write!(f, "{}", label)
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum TaxForm {
    T2125,
    T776,
}

impl fmt::Display for TaxForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::T2125 => write!(f, "T2125"),
            Self::T776 => write!(f, "T776"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Posted,
    Pending,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    Bank,
    Cash,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Transaction {
    pub id: String,

    pub date: NaiveDate,

    pub vendor: String,

    #[schemars(description = "Signed amount: negative is an outflow, positive is an inflow")]
    pub amount: f64,

    pub ledger_type: LedgerType,

    #[schemars(description = "Free-text category, resolved against the chart of accounts")]
    pub category: String,

    #[serde(default)]
    pub tax_form: Option<TaxForm>,

    #[serde(default)]
    pub status: Option<TransactionStatus>,

    #[serde(default)]
    #[schemars(description = "True when the amount was apportioned across ledgers from one source document")]
    pub is_split: bool,

    #[serde(default)]
    pub hst_included: Option<bool>,

    #[serde(default)]
    #[schemars(description = "Embedded sales tax, derived from the gross amount. Never negative.")]
    pub hst_amount: Option<f64>,

    #[serde(default)]
    pub property_id: Option<String>,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        vendor: impl Into<String>,
        amount: f64,
        ledger_type: LedgerType,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            vendor: vendor.into(),
            amount,
            ledger_type,
            category: category.into(),
            tax_form: None,
            status: None,
            is_split: false,
            hst_included: None,
            hst_amount: None,
            property_id: None,
        }
    }

    pub fn is_outflow(&self) -> bool {
        self.amount < 0.0
    }

    pub fn is_pending(&self) -> bool {
        self.status == Some(TransactionStatus::Pending)
    }

    pub fn hst_or_zero(&self) -> f64 {
        self.hst_amount.unwrap_or(0.0)
    }

    /// The tax form this transaction reports on, falling back to its ledger's form.
    pub fn effective_tax_form(&self) -> Option<TaxForm> {
        self.tax_form.or_else(|| self.ledger_type.default_tax_form())
    }

    /// Checks the numeric invariants of the transaction and, when it names a
    /// property, that the property exists in `properties`.
    pub fn validate(&self, properties: &[Property]) -> Result<()> {
        self.validate_amounts()?;

        if let Some(property_id) = &self.property_id {
            if !properties.iter().any(|p| &p.id == property_id) {
                return Err(LedgerError::UnknownProperty(property_id.clone()));
            }
        }

        Ok(())
    }

    pub(crate) fn validate_amounts(&self) -> Result<()> {
        ensure_finite("amount", self.amount)?;

        if let Some(hst) = self.hst_amount {
            ensure_non_negative("hst_amount", hst)?;
            if hst > self.amount.abs() {
                return Err(LedgerError::numeric("hst_amount", hst));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Property {
    pub id: String,
    pub address: String,
    pub purchase_price: f64,
    pub current_value: f64,

    #[schemars(description = "CCA depreciation class (class 1 buildings depreciate at 4% per year)")]
    pub cca_class: u32,

    #[schemars(description = "Undepreciated capital cost at the start of the tax year")]
    pub opening_ucc: f64,

    #[schemars(description = "Capital additions made during the current tax year")]
    pub additions: f64,

    pub tenant_name: String,
    pub lease_end: NaiveDate,

    #[serde(default)]
    pub mortgage_balance: Option<f64>,
}

impl Property {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("opening_ucc", self.opening_ucc)?;
        ensure_non_negative("additions", self.additions)?;
        ensure_finite("purchase_price", self.purchase_price)?;
        ensure_finite("current_value", self.current_value)?;
        if let Some(balance) = self.mortgage_balance {
            ensure_finite("mortgage_balance", balance)?;
        }
        Ok(())
    }
}

/// A planned monthly limit. Actual spend is never stored here; see
/// [`crate::budget::BudgetUtilization`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct BudgetCategory {
    pub category: String,
    pub ledger_type: LedgerType,
    pub limit: f64,

    #[serde(default)]
    pub savings_goal: Option<f64>,
}

impl BudgetCategory {
    pub fn new(category: impl Into<String>, ledger_type: LedgerType, limit: f64) -> Self {
        Self {
            category: category.into(),
            ledger_type,
            limit,
            savings_goal: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("limit", self.limit)?;
        if let Some(goal) = self.savings_goal {
            ensure_non_negative("savings_goal", goal)?;
        }
        Ok(())
    }
}
