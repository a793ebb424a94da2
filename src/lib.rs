//! # Ledger Engine
//!
//! Bookkeeping computations for a sole proprietor who keeps three ledgers:
//! active business (T2125), passive rental (T776) and personal.
//!
//! ## Core Concepts
//!
//! - **Category resolution**: free-text categories map to chart-of-accounts codes
//!   through exact names, keyword rules and a per-type fallback. Never fails.
//! - **Journal entries**: each transaction becomes a balanced double-entry posting
//!   with HST split out into input-tax-credit or collected accounts.
//! - **Tax figures**: HST embedded in tax-inclusive totals and CCA ceilings under
//!   the half-year rule.
//! - **Budgets and alerts**: month-scoped spend per ledger and category, and the
//!   notifications derived from it.
//!
//! Everything here is a pure function of its inputs. Callers fetch records, pass
//! them in and recompute on every refresh.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ledger_engine::*;
//! use chrono::NaiveDate;
//!
//! let engine = BookkeepingEngine::new(EngineConfig::default())?;
//!
//! let mut fuel = Transaction::new(
//!     "tx-1",
//!     NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
//!     "Shell",
//!     -113.0,
//!     LedgerType::Active,
//!     "Fuel/Auto",
//! );
//! fuel.hst_included = Some(true);
//!
//! let entry = engine.capture(&fuel, PaymentMethod::CreditCard, &[])?;
//! assert_eq!(entry.lines.len(), 3);
//! ```

pub mod balancer;
pub mod budget;
pub mod chart_of_accounts;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod journal;
pub mod notifications;
pub mod resolver;
pub mod schema;
pub mod tax;
pub mod tax_lines;
pub mod utils;

pub use balancer::{verify_journal_balance, BalanceCheck, JournalBalancer};
pub use budget::{aggregate_spend, spend_by_category, BudgetKey, BudgetUtilization};
pub use chart_of_accounts::{Account, ChartOfAccounts};
pub use config::EngineConfig;
pub use error::{LedgerError, Result};
pub use ingestion::{apportion_split, drafts_from_candidates, DraftCandidate, DraftTransaction};
pub use journal::{
    generate_journal_entry, JournalEntry, JournalEntryHeader, JournalEntryStatus, JournalGenerator,
    LedgerLine,
};
pub use notifications::{derive_notifications, Notification, NotificationDeriver, NotificationType};
pub use resolver::{resolve_account_code, CategoryResolver, MatchTier, Resolution};
pub use schema::*;
pub use tax::{decompose_tax, derive_hst, max_capital_cost_allowance, CcaSchedule};
pub use tax_lines::{summarize_tax_lines, TaxLineSummary, TaxLineTotal};

use chrono::NaiveDate;
use log::{debug, info};
use std::collections::BTreeMap;

/// Holds the configuration and chart of accounts and runs the pipeline stages
/// against caller-supplied records.
pub struct BookkeepingEngine {
    config: EngineConfig,
    chart: ChartOfAccounts,
}

impl BookkeepingEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_chart(config, ChartOfAccounts::default())
    }

    pub fn with_chart(config: EngineConfig, chart: ChartOfAccounts) -> Result<Self> {
        config.validate()?;

        info!(
            "Bookkeeping engine ready with {} accounts at HST rate {}",
            chart.total_accounts(),
            config.hst_rate
        );

        Ok(Self { config, chart })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn chart(&self) -> &ChartOfAccounts {
        &self.chart
    }

    pub fn resolver(&self) -> CategoryResolver<'_> {
        CategoryResolver::new(&self.chart)
    }

    /// Validates the transaction, derives its HST when the amount is tax
    /// inclusive and no HST amount was recorded, and generates its journal entry.
    pub fn capture(
        &self,
        transaction: &Transaction,
        payment_method: PaymentMethod,
        properties: &[Property],
    ) -> Result<JournalEntry> {
        transaction.validate(properties)?;

        let prepared = if transaction.hst_amount.is_none() {
            derive_hst(transaction, self.config.hst_rate)?
        } else {
            transaction.clone()
        };

        debug!(
            "Capturing transaction {} on the {} ledger",
            prepared.id, prepared.ledger_type
        );

        JournalGenerator::new(&self.chart, self.config.balance_tolerance)
            .generate(&prepared, payment_method)
    }

    pub fn monthly_budgets(
        &self,
        transactions: &[Transaction],
        budget_defs: &[BudgetCategory],
        month: u32,
        year: i32,
    ) -> Result<BTreeMap<BudgetKey, BudgetUtilization>> {
        aggregate_spend(transactions, budget_defs, month, year)
    }

    /// Aggregates `today`'s month and derives every alert type, lease expiries
    /// included.
    pub fn notifications(
        &self,
        transactions: &[Transaction],
        budget_defs: &[BudgetCategory],
        properties: &[Property],
        today: NaiveDate,
    ) -> Result<Vec<Notification>> {
        use chrono::Datelike;

        let budgets = self.monthly_budgets(transactions, budget_defs, today.month(), today.year())?;
        let deriver = NotificationDeriver::new(
            self.config.remittance_months.clone(),
            self.config.lease_expiry_horizon_days,
        );

        Ok(deriver.derive(transactions, &budgets, properties, today))
    }

    pub fn property_cca(&self, property: &Property, requested_claim: Option<f64>) -> Result<CcaSchedule> {
        CcaSchedule::for_property(property, &self.config.cca_class_rates, requested_claim)
    }

    pub fn tax_line_summary(&self, transactions: &[Transaction], year: i32) -> Result<TaxLineSummary> {
        summarize_tax_lines(&self.chart, transactions, year)
    }

    pub fn draft_from_candidates(
        &self,
        candidates: &[DraftCandidate],
        ledger_type: LedgerType,
        batch_id: &str,
    ) -> Result<Vec<DraftTransaction>> {
        drafts_from_candidates(&self.chart, candidates, ledger_type, batch_id)
    }
}
