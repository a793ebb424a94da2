//! Category → account code resolution.
//!
//! Resolution is total: every category string maps to some account. The tiers are
//! tried in order and the first hit wins:
//!
//! 1. exact (case-insensitive) name match among accounts of the requested type
//! 2. keyword rules, expense lookups only
//! 3. a fixed fallback account per type

use crate::chart_of_accounts::{
    ChartOfAccounts, BUSINESS_BANK, COMMISSION_INCOME, CREDIT_CARD, MISC_PERSONAL_EXPENSE,
};
use crate::schema::AccountType;
use log::debug;
use serde::{Deserialize, Serialize};

const OWNERS_EQUITY: &str = "3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    ExactName,
    Keyword,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub account_code: String,
    pub tier: MatchTier,
}

impl Resolution {
    /// True when nothing in the category text identified an account and the
    /// type's fallback was used.
    pub fn is_unmatched(&self) -> bool {
        self.tier == MatchTier::Fallback
    }
}

pub struct KeywordRule {
    pub keywords: &'static [&'static str],
    pub account_code: &'static str,
}

impl KeywordRule {
    fn matches(&self, category_lower: &str) -> bool {
        self.keywords.iter().any(|k| category_lower.contains(k))
    }
}

/// Evaluated top to bottom, no scoring.
pub const EXPENSE_KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        keywords: &["meal", "food"],
        account_code: "5100",
    },
    KeywordRule {
        keywords: &["adver", "marketing"],
        account_code: "5000",
    },
    KeywordRule {
        keywords: &["office", "stationery"],
        account_code: "5200",
    },
    KeywordRule {
        keywords: &["supply"],
        account_code: "5300",
    },
    KeywordRule {
        keywords: &["fuel", "gas", "auto", "car"],
        account_code: "5400",
    },
    KeywordRule {
        keywords: &["phone", "internet", "utility"],
        account_code: "5500",
    },
    KeywordRule {
        keywords: &["rent"],
        account_code: "5600",
    },
];

pub fn fallback_code(account_type: AccountType) -> &'static str {
    match account_type {
        AccountType::Liability => CREDIT_CARD,
        AccountType::Asset => BUSINESS_BANK,
        AccountType::Revenue => COMMISSION_INCOME,
        AccountType::Equity => OWNERS_EQUITY,
        AccountType::Expense => MISC_PERSONAL_EXPENSE,
    }
}

pub struct CategoryResolver<'a> {
    chart: &'a ChartOfAccounts,
    rules: &'a [KeywordRule],
}

impl<'a> CategoryResolver<'a> {
    pub fn new(chart: &'a ChartOfAccounts) -> Self {
        Self {
            chart,
            rules: EXPENSE_KEYWORD_RULES,
        }
    }

    pub fn with_rules(chart: &'a ChartOfAccounts, rules: &'a [KeywordRule]) -> Self {
        Self { chart, rules }
    }

    pub fn resolve(&self, category: &str, account_type: AccountType) -> Resolution {
        if let Some(account) = self.chart.find_by_name(account_type, category) {
            return Resolution {
                account_code: account.code.clone(),
                tier: MatchTier::ExactName,
            };
        }

        if account_type == AccountType::Expense {
            let lower = category.to_lowercase();
            if let Some(rule) = self.rules.iter().find(|r| r.matches(&lower)) {
                return Resolution {
                    account_code: rule.account_code.to_string(),
                    tier: MatchTier::Keyword,
                };
            }
        }

        let code = fallback_code(account_type);
        debug!(
            "Category '{}' matched no {} account, using fallback {}",
            category, account_type, code
        );

        Resolution {
            account_code: code.to_string(),
            tier: MatchTier::Fallback,
        }
    }

    pub fn resolve_account_code(&self, category: &str, account_type: AccountType) -> String {
        self.resolve(category, account_type).account_code
    }
}

pub fn resolve_account_code(
    chart: &ChartOfAccounts,
    category: &str,
    account_type: AccountType,
) -> String {
    CategoryResolver::new(chart).resolve_account_code(category, account_type)
}
