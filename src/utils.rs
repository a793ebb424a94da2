use crate::error::{LedgerError, Result};
use chrono::{Days, NaiveDate};

pub fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    validate_month(month)?;

    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .ok_or(LedgerError::InvalidMonth(month))
}

/// Returns the first and last calendar day of `month` (1-based) in `year`.
pub fn month_bounds(month: u32, year: i32) -> Result<(NaiveDate, NaiveDate)> {
    let end = last_day_of_month(year, month)?;
    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or(LedgerError::InvalidMonth(month))?;
    Ok((start, end))
}

pub fn validate_month(month: u32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(LedgerError::InvalidMonth(month));
    }
    Ok(())
}

/// Rounds a monetary amount to whole cents.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn ensure_finite(field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(LedgerError::numeric(field, value));
    }
    Ok(value)
}

pub fn ensure_non_negative(field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(LedgerError::numeric(field, value));
    }
    Ok(value)
}

/// Lower-cases and trims a category label so that "Meals " and "meals" group together.
pub fn normalize_category(category: &str) -> String {
    category.trim().to_lowercase()
}
