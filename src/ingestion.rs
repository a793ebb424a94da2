use crate::chart_of_accounts::ChartOfAccounts;
use crate::error::{LedgerError, Result};
use crate::resolver::{CategoryResolver, Resolution};
use crate::schema::{AccountType, LedgerType, Transaction, TransactionStatus};
use crate::utils::{ensure_finite, round_to_cents};
use chrono::NaiveDate;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A transaction candidate as returned by the document-parsing service.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DraftCandidate {
    pub date: NaiveDate,
    pub vendor: String,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    #[schemars(description = "Category suggested by the parser, resolved like any user-entered category")]
    pub category_guess: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftTransaction {
    pub transaction: Transaction,
    /// Account the category guess resolves to, for review before posting.
    pub resolution: Resolution,
}

/// Turns parsed candidates into pending transactions on `ledger_type`.
///
/// Ids are `<batch_id>-<n>`, numbered from 1 in candidate order.
pub fn drafts_from_candidates(
    chart: &ChartOfAccounts,
    candidates: &[DraftCandidate],
    ledger_type: LedgerType,
    batch_id: &str,
) -> Result<Vec<DraftTransaction>> {
    let resolver = CategoryResolver::new(chart);
    let mut drafts = Vec::with_capacity(candidates.len());

    for (idx, candidate) in candidates.iter().enumerate() {
        let amount = ensure_finite("amount", candidate.amount)?;
        let account_type = if amount < 0.0 {
            AccountType::Expense
        } else {
            AccountType::Revenue
        };

        let mut transaction = Transaction::new(
            format!("{}-{}", batch_id, idx + 1),
            candidate.date,
            candidate.vendor.clone(),
            amount,
            ledger_type,
            candidate.category_guess.clone(),
        );
        transaction.status = Some(TransactionStatus::Pending);

        let resolution = resolver.resolve(&candidate.category_guess, account_type);
        drafts.push(DraftTransaction {
            transaction,
            resolution,
        });
    }

    debug!(
        "Drafted {} transactions from batch {} ({} unmatched)",
        drafts.len(),
        batch_id,
        drafts.iter().filter(|d| d.resolution.is_unmatched()).count()
    );

    Ok(drafts)
}

/// Divides one source document across ledgers.
///
/// Each share is a `(ledger, fraction)` pair; fractions must be positive and
/// sum to 1. Amounts and HST are rounded to cents with the rounding remainder
/// carried by the last share so the parts add back to the original. A share
/// that rounds to zero cents is rejected.
pub fn apportion_split(
    transaction: &Transaction,
    shares: &[(LedgerType, f64)],
) -> Result<Vec<Transaction>> {
    transaction.validate_amounts()?;

    if shares.is_empty() {
        return Err(LedgerError::InvalidSplit("no shares given".to_string()));
    }

    for (ledger, fraction) in shares {
        if !fraction.is_finite() || *fraction <= 0.0 {
            return Err(LedgerError::InvalidSplit(format!(
                "share for the {} ledger must be positive, got {}",
                ledger, fraction
            )));
        }
    }

    let total: f64 = shares.iter().map(|(_, f)| f).sum();
    if (total - 1.0).abs() > 1e-6 {
        return Err(LedgerError::InvalidSplit(format!(
            "shares sum to {}, expected 1",
            total
        )));
    }

    let amounts = allocate(transaction.amount, shares);
    if let Some(idx) = amounts.iter().position(|amount| *amount == 0.0) {
        return Err(LedgerError::InvalidSplit(format!(
            "share for the {} ledger rounds to zero",
            shares[idx].0
        )));
    }
    let hst_amounts = transaction.hst_amount.map(|hst| allocate(hst, shares));

    let parts = shares
        .iter()
        .enumerate()
        .map(|(idx, (ledger, _))| {
            let mut part = transaction.clone();
            part.id = format!("{}-{}", transaction.id, idx + 1);
            part.ledger_type = *ledger;
            part.amount = amounts[idx];
            part.hst_amount = hst_amounts.as_ref().map(|h| h[idx]);
            part.is_split = true;
            part.tax_form = None;
            if *ledger != LedgerType::Passive {
                part.property_id = None;
            }
            part
        })
        .collect();

    Ok(parts)
}

fn allocate(amount: f64, shares: &[(LedgerType, f64)]) -> Vec<f64> {
    let mut allocated = 0.0;
    let last = shares.len() - 1;

    shares
        .iter()
        .enumerate()
        .map(|(idx, (_, fraction))| {
            let value = if idx == last {
                round_to_cents(amount - allocated)
            } else {
                round_to_cents(amount * fraction)
            };
            allocated += value;
            value
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart_of_accounts::MISC_PERSONAL_EXPENSE;
    use crate::resolver::MatchTier;

    fn candidate(amount: f64, category_guess: &str) -> DraftCandidate {
        DraftCandidate {
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            vendor: "Staples".to_string(),
            amount,
            description: "Receipt".to_string(),
            category_guess: category_guess.to_string(),
        }
    }

    #[test]
    fn test_drafts_are_pending_and_resolved() {
        let chart = ChartOfAccounts::default();
        let candidates = vec![
            candidate(-45.2, "Office supplies"),
            candidate(-12.0, "Mystery"),
            candidate(800.0, "Consulting Income"),
        ];

        let drafts = drafts_from_candidates(&chart, &candidates, LedgerType::Active, "doc-7").unwrap();

        assert_eq!(drafts.len(), 3);
        assert!(drafts.iter().all(|d| d.transaction.is_pending()));
        assert_eq!(drafts[0].transaction.id, "doc-7-1");
        assert_eq!(drafts[0].resolution.account_code, "5200");
        assert_eq!(drafts[0].resolution.tier, MatchTier::Keyword);
        assert_eq!(drafts[1].resolution.account_code, MISC_PERSONAL_EXPENSE);
        assert!(drafts[1].resolution.is_unmatched());
        assert_eq!(drafts[2].resolution.account_code, "4100");
    }

    #[test]
    fn test_candidate_json_shape() {
        let json = r#"[{"date":"2024-05-02","vendor":"Esso","amount":-60.0,"category_guess":"Fuel"}]"#;
        let candidates: Vec<DraftCandidate> = serde_json::from_str(json).unwrap();
        assert_eq!(candidates[0].description, "");
        assert_eq!(candidates[0].category_guess, "Fuel");
    }

    #[test]
    fn test_split_preserves_totals() {
        let mut source = Transaction::new(
            "tx-9",
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            "Rogers",
            -100.0,
            LedgerType::Active,
            "Internet",
        );
        source.hst_amount = Some(11.5);
        source.property_id = Some("prop-1".to_string());

        let parts = apportion_split(
            &source,
            &[
                (LedgerType::Active, 1.0 / 3.0),
                (LedgerType::Passive, 1.0 / 3.0),
                (LedgerType::Personal, 1.0 / 3.0),
            ],
        )
        .unwrap();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].amount, -33.33);
        assert_eq!(parts[1].amount, -33.33);
        assert_eq!(parts[2].amount, -33.34);

        let amount_total: f64 = parts.iter().map(|p| p.amount).sum();
        let hst_total: f64 = parts.iter().filter_map(|p| p.hst_amount).sum();
        assert!((amount_total + 100.0).abs() < 1e-9);
        assert!((hst_total - 11.5).abs() < 1e-9);

        assert!(parts.iter().all(|p| p.is_split));
        assert_eq!(parts[0].id, "tx-9-1");
        assert_eq!(parts[1].property_id.as_deref(), Some("prop-1"));
        assert_eq!(parts[0].property_id, None);
    }

    #[test]
    fn test_invalid_splits() {
        let source = Transaction::new(
            "tx-9",
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            "Rogers",
            -100.0,
            LedgerType::Active,
            "Internet",
        );

        assert!(matches!(apportion_split(&source, &[]), Err(LedgerError::InvalidSplit(_))));
        assert!(apportion_split(&source, &[(LedgerType::Active, 0.5)]).is_err());
        assert!(apportion_split(
            &source,
            &[(LedgerType::Active, 1.5), (LedgerType::Personal, -0.5)]
        )
        .is_err());
    }

    #[test]
    fn test_split_rejects_shares_rounding_to_zero() {
        let source = Transaction::new(
            "tx-10",
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            "Bank",
            -0.01,
            LedgerType::Active,
            "Bank charges",
        );

        assert!(matches!(
            apportion_split(&source, &[(LedgerType::Active, 0.5), (LedgerType::Personal, 0.5)]),
            Err(LedgerError::InvalidSplit(_))
        ));
        assert_eq!(apportion_split(&source, &[(LedgerType::Active, 1.0)]).unwrap().len(), 1);
    }
}
