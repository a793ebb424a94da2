use crate::error::{LedgerError, Result};
use crate::journal::{JournalEntry, LedgerLine};
use log::error;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceCheck {
    pub debits: f64,
    pub credits: f64,
    pub difference: f64,
    pub balanced: bool,
}

/// Verifies the double-entry invariant: total debits equal total credits.
/// Never adjusts lines to force a balance.
pub struct JournalBalancer {
    tolerance: f64,
}

impl JournalBalancer {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn check(&self, lines: &[LedgerLine]) -> BalanceCheck {
        let (debits, credits) = totals(lines);
        let difference = (debits - credits).abs();

        BalanceCheck {
            debits,
            credits,
            difference,
            balanced: difference <= self.tolerance,
        }
    }

    pub fn verify(&self, entry: &JournalEntry) -> Result<()> {
        let check = self.check(&entry.lines);

        if !check.balanced {
            let reference = entry
                .header
                .reference_id
                .clone()
                .unwrap_or_else(|| entry.header.description.clone());

            error!(
                "Journal entry {} is unbalanced: debits {:.2}, credits {:.2}",
                reference, check.debits, check.credits
            );

            return Err(LedgerError::UnbalancedJournalEntry {
                reference,
                debits: check.debits,
                credits: check.credits,
                difference: check.difference,
            });
        }

        Ok(())
    }

    /// Verifies every entry, stopping at the first unbalanced one.
    pub fn verify_all(&self, entries: &[JournalEntry]) -> Result<()> {
        for entry in entries {
            self.verify(entry)?;
        }
        Ok(())
    }
}

pub fn totals(lines: &[LedgerLine]) -> (f64, f64) {
    lines
        .iter()
        .fold((0.0, 0.0), |(d, c), line| (d + line.debit, c + line.credit))
}

pub fn verify_journal_balance(entry: &JournalEntry, tolerance: f64) -> Result<()> {
    JournalBalancer::new(tolerance).verify(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::{JournalEntryHeader, JournalEntryStatus};
    use chrono::NaiveDate;

    fn entry(lines: Vec<LedgerLine>) -> JournalEntry {
        JournalEntry {
            header: JournalEntryHeader {
                date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
                description: "Test".to_string(),
                reference_id: Some("tx-1".to_string()),
                status: JournalEntryStatus::Draft,
            },
            lines,
        }
    }

    #[test]
    fn test_balanced_entry_passes() {
        let lines = vec![
            LedgerLine::debit("5400", "Motor Vehicle Expenses", 100.0),
            LedgerLine::debit("1200", "HST Paid (Input Tax Credit)", 13.0),
            LedgerLine::credit("2000", "Credit Card", 113.0),
        ];

        let check = JournalBalancer::new(0.01).check(&lines);
        assert!(check.balanced);
        assert_eq!(check.debits, 113.0);

        assert!(verify_journal_balance(&entry(lines), 0.01).is_ok());
    }

    #[test]
    fn test_difference_within_tolerance() {
        let lines = vec![
            LedgerLine::debit("5400", "Motor Vehicle Expenses", 100.005),
            LedgerLine::credit("2000", "Credit Card", 100.0),
        ];
        assert!(JournalBalancer::new(0.01).check(&lines).balanced);
    }

    #[test]
    fn test_unbalanced_entry_is_reported() {
        let lines = vec![
            LedgerLine::debit("5400", "Motor Vehicle Expenses", 100.0),
            LedgerLine::credit("2000", "Credit Card", 113.0),
        ];

        match verify_journal_balance(&entry(lines), 0.01) {
            Err(LedgerError::UnbalancedJournalEntry {
                reference,
                debits,
                credits,
                ..
            }) => {
                assert_eq!(reference, "tx-1");
                assert_eq!(debits, 100.0);
                assert_eq!(credits, 113.0);
            }
            other => panic!("expected unbalanced entry error, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_all_stops_at_first_failure() {
        let good = entry(vec![
            LedgerLine::debit("1000", "Business Bank Account", 50.0),
            LedgerLine::credit("4000", "Commission Income", 50.0),
        ]);
        let bad = entry(vec![LedgerLine::debit("1000", "Business Bank Account", 50.0)]);

        let balancer = JournalBalancer::new(0.01);
        assert!(balancer.verify_all(&[good.clone()]).is_ok());
        assert!(balancer.verify_all(&[good, bad]).is_err());
    }
}
