use crate::error::{LedgerError, Result};
use crate::tax::default_cca_class_rates;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Longest lease alert horizon accepted, roughly a century.
pub const MAX_LEASE_EXPIRY_HORIZON_DAYS: i64 = 36_500;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct EngineConfig {
    #[schemars(description = "Sales tax rate used to split tax-inclusive totals (0.13 for Ontario HST)")]
    pub hst_rate: f64,

    #[schemars(description = "Largest allowed difference between total debits and total credits")]
    pub balance_tolerance: f64,

    #[schemars(description = "Calendar months (1-12) in which the quarterly HST remittance reminder fires")]
    pub remittance_months: Vec<u32>,

    #[schemars(description = "Days ahead of a lease end date at which a lease expiry alert starts")]
    pub lease_expiry_horizon_days: i64,

    #[schemars(description = "Depreciation rate per CCA class, e.g. class 1 = 0.04")]
    pub cca_class_rates: BTreeMap<u32, f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hst_rate: 0.13,
            balance_tolerance: 0.01,
            remittance_months: vec![3, 6, 9, 12],
            lease_expiry_horizon_days: 60,
            cca_class_rates: default_cca_class_rates(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.hst_rate.is_finite() || self.hst_rate < 0.0 {
            return Err(LedgerError::InvalidConfig(format!(
                "hst_rate must be a non-negative number, got {}",
                self.hst_rate
            )));
        }

        if !self.balance_tolerance.is_finite() || self.balance_tolerance <= 0.0 {
            return Err(LedgerError::InvalidConfig(format!(
                "balance_tolerance must be positive, got {}",
                self.balance_tolerance
            )));
        }

        if let Some(month) = self.remittance_months.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(LedgerError::InvalidConfig(format!(
                "remittance month {} is outside 1-12",
                month
            )));
        }

        if !(0..=MAX_LEASE_EXPIRY_HORIZON_DAYS).contains(&self.lease_expiry_horizon_days) {
            return Err(LedgerError::InvalidConfig(format!(
                "lease_expiry_horizon_days must be between 0 and {}, got {}",
                MAX_LEASE_EXPIRY_HORIZON_DAYS, self.lease_expiry_horizon_days
            )));
        }

        for (class, rate) in &self.cca_class_rates {
            if !rate.is_finite() || !(0.0..=1.0).contains(rate) {
                return Err(LedgerError::InvalidConfig(format!(
                    "CCA class {} rate {} is outside 0-1",
                    class, rate
                )));
            }
        }

        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(EngineConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
