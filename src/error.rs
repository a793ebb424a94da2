use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Unbalanced journal entry for {reference}: debits ({debits}) != credits ({credits}), difference {difference}")]
    UnbalancedJournalEntry {
        reference: String,
        debits: f64,
        credits: f64,
        difference: f64,
    },

    #[error("Invalid numeric input for {field}: {value}")]
    InvalidNumericInput { field: String, value: f64 },

    #[error("Transaction references unknown property: {0}")]
    UnknownProperty(String),

    #[error("Unknown CCA class {0}: no depreciation rate configured")]
    UnknownCcaClass(u32),

    #[error("Requested CCA claim {requested} exceeds the allowable ceiling {ceiling}")]
    ClaimExceedsCeiling { requested: f64, ceiling: f64 },

    #[error("Invalid month {0}: must be between 1 and 12")]
    InvalidMonth(u32),

    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    #[error("Invalid chart of accounts: {0}")]
    InvalidChart(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

impl LedgerError {
    pub(crate) fn numeric(field: &str, value: f64) -> Self {
        Self::InvalidNumericInput {
            field: field.to_string(),
            value,
        }
    }
}
