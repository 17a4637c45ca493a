//! Input checks run before any remote call

use chrono::NaiveDate;

use crate::error::{Error, Result};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Trimmed value, or a validation error when blank
pub fn require_text(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(field, "is required"));
    }
    Ok(value.to_string())
}

/// Loose shape check; the auth service does the real one.
pub fn email(value: &str) -> Result<String> {
    let value = require_text("email", value)?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') => {
            Ok(value)
        }
        _ => Err(Error::validation("email", "is not a valid address")),
    }
}

pub fn password(value: &str) -> Result<()> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(
            "password",
            format!("must have at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    Ok(())
}

/// Stars, 1 to 5
pub fn rating(value: u8) -> Result<u8> {
    if !(1..=5).contains(&value) {
        return Err(Error::validation("rating", "must be between 1 and 5"));
    }
    Ok(value)
}

pub fn price(value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::validation("price", "must be greater than zero"));
    }
    Ok(value)
}

pub fn quantity(value: u32) -> Result<u32> {
    if value < 1 {
        return Err(Error::validation("quantity", "must be at least 1"));
    }
    Ok(value)
}

/// Both dates set and the start not after the end
pub fn fair_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(NaiveDate, NaiveDate)> {
    let start = start.ok_or_else(|| Error::validation("start_date", "is required"))?;
    let end = end.ok_or_else(|| Error::validation("end_date", "is required"))?;
    if start > end {
        return Err(Error::validation("end_date", "must not be before the start date"));
    }
    Ok((start, end))
}
