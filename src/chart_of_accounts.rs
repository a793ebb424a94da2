use crate::error::{LedgerError, Result};
use crate::schema::{AccountType, TaxForm};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const BUSINESS_BANK: &str = "1000";
pub const CASH: &str = "1010";
pub const HST_PAID_ITC: &str = "1200";
pub const CREDIT_CARD: &str = "2000";
pub const HST_COLLECTED: &str = "2100";
pub const COMMISSION_INCOME: &str = "4000";
pub const MISC_PERSONAL_EXPENSE: &str = "6000";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Account {
    pub code: String,
    pub name: String,
    pub account_type: AccountType,

    #[serde(default)]
    #[schemars(description = "T2125 (business income) line this account reports on")]
    pub tax_line_t2125: Option<String>,

    #[serde(default)]
    #[schemars(description = "T776 (rental income) line this account reports on")]
    pub tax_line_t776: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

impl Account {
    pub fn new(code: &str, name: &str, account_type: AccountType) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            account_type,
            tax_line_t2125: None,
            tax_line_t776: None,
            description: None,
        }
    }

    fn t2125(mut self, line: &str) -> Self {
        self.tax_line_t2125 = Some(line.to_string());
        self
    }

    fn t776(mut self, line: &str) -> Self {
        self.tax_line_t776 = Some(line.to_string());
        self
    }

    fn described(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn tax_line(&self, form: TaxForm) -> Option<&str> {
        match form {
            TaxForm::T2125 => self.tax_line_t2125.as_deref(),
            TaxForm::T776 => self.tax_line_t776.as_deref(),
        }
    }
}

/// Immutable lookup of accounts keyed by code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartOfAccounts {
    accounts: BTreeMap<String, Account>,
}

impl ChartOfAccounts {
    pub fn new(accounts: Vec<Account>) -> Result<Self> {
        let mut map = BTreeMap::new();

        for account in accounts {
            if account.code.trim().is_empty() {
                return Err(LedgerError::InvalidChart(format!(
                    "account '{}' has an empty code",
                    account.name
                )));
            }
            if map.contains_key(&account.code) {
                return Err(LedgerError::InvalidChart(format!(
                    "duplicate account code {}",
                    account.code
                )));
            }
            map.insert(account.code.clone(), account);
        }

        Ok(Self { accounts: map })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let accounts: Vec<Account> = serde_json::from_str(json)?;
        Self::new(accounts)
    }

    pub fn get(&self, code: &str) -> Option<&Account> {
        self.accounts.get(code)
    }

    /// Display name for `code`, or the code itself when it is not in the chart.
    pub fn name_of(&self, code: &str) -> String {
        self.get(code)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| code.to_string())
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn accounts_of_type(&self, account_type: AccountType) -> impl Iterator<Item = &Account> {
        self.accounts
            .values()
            .filter(move |a| a.account_type == account_type)
    }

    /// Case-insensitive name lookup restricted to one account type.
    pub fn find_by_name(&self, account_type: AccountType, name: &str) -> Option<&Account> {
        let wanted = name.trim().to_lowercase();
        self.accounts_of_type(account_type)
            .find(|a| a.name.to_lowercase() == wanted)
    }

    pub fn tax_line(&self, code: &str, form: TaxForm) -> Option<&str> {
        self.get(code).and_then(|a| a.tax_line(form))
    }

    pub fn total_accounts(&self) -> usize {
        self.accounts.len()
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        let accounts: Vec<&Account> = self.accounts.values().collect();
        serde_json::to_string_pretty(&accounts)
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str("Code,Account Name,Account Type,T2125 Line,T776 Line\n");

        for account in self.accounts.values() {
            output.push_str(&format!(
                "{},{},{},{},{}\n",
                account.code,
                account.name,
                account.account_type,
                account.tax_line_t2125.as_deref().unwrap_or(""),
                account.tax_line_t776.as_deref().unwrap_or("")
            ));
        }

        output
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str("# Chart of Accounts\n\n");

        let sections = [
            ("Assets", AccountType::Asset),
            ("Liabilities", AccountType::Liability),
            ("Equity", AccountType::Equity),
            ("Revenue", AccountType::Revenue),
            ("Expenses", AccountType::Expense),
        ];

        for (heading, account_type) in sections {
            output.push_str(&format!("## {}\n\n", heading));
            for account in self.accounts_of_type(account_type) {
                let mut lines = Vec::new();
                if let Some(line) = &account.tax_line_t2125 {
                    lines.push(format!("T2125 {}", line));
                }
                if let Some(line) = &account.tax_line_t776 {
                    lines.push(format!("T776 {}", line));
                }
                if lines.is_empty() {
                    output.push_str(&format!("- `{}` {}\n", account.code, account.name));
                } else {
                    output.push_str(&format!(
                        "- `{}` {} ({})\n",
                        account.code,
                        account.name,
                        lines.join(", ")
                    ));
                }
            }
            output.push('\n');
        }

        output
    }
}

impl Default for ChartOfAccounts {
    fn default() -> Self {
        let accounts = default_accounts()
            .into_iter()
            .map(|a| (a.code.clone(), a))
            .collect();
        Self { accounts }
    }
}

/// Sole-proprietor chart covering business, rental and personal ledgers.
pub fn default_accounts() -> Vec<Account> {
    use AccountType::*;

    vec![
        Account::new(BUSINESS_BANK, "Business Bank Account", Asset),
        Account::new(CASH, "Cash", Asset),
        Account::new(HST_PAID_ITC, "HST Paid (Input Tax Credit)", Asset)
            .described("Recoverable HST paid on business purchases"),
        Account::new("1500", "Rental Property", Asset),
        Account::new(CREDIT_CARD, "Credit Card", Liability),
        Account::new(HST_COLLECTED, "HST Collected", Liability)
            .described("HST charged on sales, owed at the next remittance"),
        Account::new("2200", "Mortgage Payable", Liability),
        Account::new("3000", "Owner's Equity", Equity),
        Account::new("3100", "Owner's Draws", Equity),
        Account::new(COMMISSION_INCOME, "Commission Income", Revenue).t2125("8000"),
        Account::new("4100", "Consulting Income", Revenue).t2125("8000"),
        Account::new("4200", "Rental Income", Revenue).t776("8141"),
        Account::new("4300", "Interest Income", Revenue),
        Account::new("5000", "Advertising", Expense).t2125("8521").t776("8521"),
        Account::new("5100", "Meals and Entertainment", Expense).t2125("8523"),
        Account::new("5200", "Office Expenses", Expense).t2125("8810").t776("8810"),
        Account::new("5300", "Supplies", Expense).t2125("8811"),
        Account::new("5400", "Motor Vehicle Expenses", Expense).t2125("9281").t776("9281"),
        Account::new("5500", "Telephone and Utilities", Expense).t2125("9220").t776("9220"),
        Account::new("5600", "Rent", Expense).t2125("8910"),
        Account::new("5700", "Property Taxes", Expense).t2125("8760").t776("9180"),
        Account::new("5710", "Mortgage Interest", Expense).t2125("8710").t776("8710"),
        Account::new("5720", "Repairs and Maintenance", Expense).t2125("8960").t776("8960"),
        Account::new("5730", "Insurance", Expense).t2125("8690").t776("8690"),
        Account::new("5800", "Professional Fees", Expense).t2125("8860").t776("8860"),
        Account::new("5900", "Capital Cost Allowance", Expense).t2125("9936").t776("9936"),
        Account::new(MISC_PERSONAL_EXPENSE, "Personal Expense", Expense)
            .described("Catch-all for spending that matched no business account"),
    ]
}
