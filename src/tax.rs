use crate::error::{LedgerError, Result};
use crate::schema::{Property, Transaction};
use crate::utils::{ensure_finite, ensure_non_negative, round_to_cents};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sales tax embedded in a tax-inclusive `gross_amount`.
///
/// Returns zero when the amount does not include tax. The result is not rounded.
pub fn decompose_tax(gross_amount: f64, is_tax_included: bool, rate: f64) -> Result<f64> {
    ensure_finite("gross_amount", gross_amount)?;
    ensure_non_negative("rate", rate)?;

    if !is_tax_included {
        return Ok(0.0);
    }

    Ok(gross_amount - gross_amount / (1.0 + rate))
}

/// Returns a copy of `transaction` with `hst_amount` derived from its gross
/// amount and `hst_included` flag, rounded to cents.
pub fn derive_hst(transaction: &Transaction, rate: f64) -> Result<Transaction> {
    let gross = ensure_finite("amount", transaction.amount)?.abs();
    let included = transaction.hst_included.unwrap_or(false);
    let hst = round_to_cents(decompose_tax(gross, included, rate)?);

    let mut derived = transaction.clone();
    derived.hst_amount = if included { Some(hst) } else { None };
    Ok(derived)
}

/// Ceiling on the capital cost allowance for the year under the half-year rule:
/// only half of current-year additions attract the full class rate.
pub fn max_capital_cost_allowance(opening_ucc: f64, additions: f64, class_rate: f64) -> Result<f64> {
    ensure_non_negative("opening_ucc", opening_ucc)?;
    ensure_non_negative("additions", additions)?;
    ensure_non_negative("class_rate", class_rate)?;

    Ok((opening_ucc + additions * 0.5) * class_rate)
}

pub fn default_cca_class_rates() -> BTreeMap<u32, f64> {
    BTreeMap::from([
        (1, 0.04),
        (3, 0.05),
        (6, 0.10),
        (8, 0.20),
        (10, 0.30),
        (12, 1.00),
        (50, 0.55),
    ])
}

pub fn cca_class_rate(cca_class: u32, rates: &BTreeMap<u32, f64>) -> Result<f64> {
    rates
        .get(&cca_class)
        .copied()
        .ok_or(LedgerError::UnknownCcaClass(cca_class))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CcaSchedule {
    pub property_id: String,
    pub cca_class: u32,
    pub class_rate: f64,
    pub opening_ucc: f64,
    pub additions: f64,
    pub ceiling: f64,
    pub claim: f64,
    pub closing_ucc: f64,
}

impl CcaSchedule {
    /// Builds the year's schedule for `property`. `requested_claim` defaults to
    /// the ceiling; a claim above the ceiling is rejected.
    pub fn for_property(
        property: &Property,
        rates: &BTreeMap<u32, f64>,
        requested_claim: Option<f64>,
    ) -> Result<Self> {
        property.validate()?;

        let class_rate = cca_class_rate(property.cca_class, rates)?;
        let ceiling = round_to_cents(max_capital_cost_allowance(
            property.opening_ucc,
            property.additions,
            class_rate,
        )?);

        let claim = match requested_claim {
            Some(requested) => {
                ensure_non_negative("requested_claim", requested)?;
                if requested > ceiling {
                    return Err(LedgerError::ClaimExceedsCeiling { requested, ceiling });
                }
                requested
            }
            None => ceiling,
        };

        Ok(Self {
            property_id: property.id.clone(),
            cca_class: property.cca_class,
            class_rate,
            opening_ucc: property.opening_ucc,
            additions: property.additions,
            ceiling,
            claim,
            closing_ucc: round_to_cents(property.opening_ucc + property.additions - claim),
        })
    }
}
