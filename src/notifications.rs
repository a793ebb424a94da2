use crate::budget::{BudgetKey, BudgetUtilization};
use crate::schema::{Property, Transaction};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    PendingTx,
    BudgetOver,
    LeaseExpiry,
    HstRemittance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub message: String,
    pub date: NaiveDate,
    pub related_id: Option<String>,
    /// Whole-unit overage for `budget_over` alerts.
    pub amount: Option<f64>,
}

/// Projects transactions, budgets and properties into alerts. Every rule runs
/// independently; nothing is de-duplicated.
pub struct NotificationDeriver {
    remittance_months: Vec<u32>,
    lease_horizon_days: i64,
}

impl Default for NotificationDeriver {
    fn default() -> Self {
        Self {
            remittance_months: vec![3, 6, 9, 12],
            lease_horizon_days: 60,
        }
    }
}

impl NotificationDeriver {
    pub fn new(remittance_months: Vec<u32>, lease_horizon_days: i64) -> Self {
        Self {
            remittance_months,
            lease_horizon_days,
        }
    }

    /// Returns alerts sorted newest first; equal dates are ordered by id.
    pub fn derive(
        &self,
        transactions: &[Transaction],
        budgets: &BTreeMap<BudgetKey, BudgetUtilization>,
        properties: &[Property],
        today: NaiveDate,
    ) -> Vec<Notification> {
        let mut notifications: Vec<Notification> = transactions
            .iter()
            .filter(|t| t.is_pending())
            .map(pending_notification)
            .collect();

        notifications.extend(
            budgets
                .values()
                .filter(|b| b.is_over())
                .map(|b| budget_notification(b, today)),
        );

        // A horizon past the end of the calendar covers every lease.
        let horizon_end = Duration::try_days(self.lease_horizon_days)
            .and_then(|days| today.checked_add_signed(days));

        notifications.extend(
            properties
                .iter()
                .filter(|p| horizon_end.map_or(true, |end| p.lease_end <= end))
                .map(|p| lease_notification(p, today)),
        );

        if self.remittance_months.contains(&today.month()) {
            notifications.push(Notification {
                id: format!("hst-{:04}-{:02}", today.year(), today.month()),
                notification_type: NotificationType::HstRemittance,
                message: "Quarterly HST remittance is due this month".to_string(),
                date: today,
                related_id: None,
                amount: None,
            });
        }

        notifications.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        notifications
    }
}

fn pending_notification(transaction: &Transaction) -> Notification {
    Notification {
        id: format!("pending-{}", transaction.id),
        notification_type: NotificationType::PendingTx,
        message: format!(
            "Pending transaction from {} for ${:.2} needs review",
            transaction.vendor,
            transaction.amount.abs()
        ),
        date: transaction.date,
        related_id: Some(transaction.id.clone()),
        amount: None,
    }
}

fn budget_notification(budget: &BudgetUtilization, today: NaiveDate) -> Notification {
    let overage = budget.overage().round();
    let key = BudgetKey::new(budget.ledger_type(), budget.category());

    Notification {
        id: format!("budget-{}-{}", key.ledger_type, key.category),
        notification_type: NotificationType::BudgetOver,
        message: format!(
            "{} budget on the {} ledger is over by ${:.0}",
            budget.category(),
            budget.ledger_type(),
            overage
        ),
        date: today,
        related_id: Some(format!("{}:{}", key.ledger_type, key.category)),
        amount: Some(overage),
    }
}

fn lease_notification(property: &Property, today: NaiveDate) -> Notification {
    let verb = if property.lease_end < today {
        "expired"
    } else {
        "expires"
    };

    Notification {
        id: format!("lease-{}", property.id),
        notification_type: NotificationType::LeaseExpiry,
        message: format!(
            "Lease for {} ({}) {} on {}",
            property.address, property.tenant_name, verb, property.lease_end
        ),
        date: property.lease_end,
        related_id: Some(property.id.clone()),
        amount: None,
    }
}

/// Pending, budget and remittance alerts without lease tracking.
pub fn derive_notifications(
    transactions: &[Transaction],
    budgets: &BTreeMap<BudgetKey, BudgetUtilization>,
    today: NaiveDate,
) -> Vec<Notification> {
    NotificationDeriver::default().derive(transactions, budgets, &[], today)
}
