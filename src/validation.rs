use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::error::WorkflowError;

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_SHORT_NAME_LEN: usize = 100;
pub const MAX_NUMBER_LEN: usize = 50;
pub const MAX_TEXT_LEN: usize = 20_000;
pub const MAX_DOCUMENT_REF_LEN: usize = 512;

const _: [(); 65_536 - MAX_TEXT_LEN] = [(); 65_536 - MAX_TEXT_LEN];

/// Trims `value` and rejects it when blank or longer than `max_len` characters.
pub fn required_text(value: &str, field: &str, max_len: usize) -> Result<String, WorkflowError> {
    assert!(max_len > 0, "Text bound must be positive");
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WorkflowError::validation(format!(
            "{field} must not be empty"
        )));
    }
    if trimmed.chars().count() > max_len {
        return Err(WorkflowError::validation(format!(
            "{field} exceeds {max_len} character limit"
        )));
    }
    Ok(trimmed.to_string())
}

/// Like [`required_text`] but blank input is allowed and stored as empty.
pub fn optional_text(value: Option<&str>, field: &str, max_len: usize) -> Result<String, WorkflowError> {
    match value.map(str::trim) {
        None | Some("") => Ok(String::new()),
        Some(text) => required_text(text, field, max_len),
    }
}

/// Normalizes an opaque document URI. Blank references count as missing.
pub fn document_reference(value: Option<&str>) -> Result<Option<String>, WorkflowError> {
    let Some(trimmed) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if trimmed.len() > MAX_DOCUMENT_REF_LEN {
        return Err(WorkflowError::validation(format!(
            "document reference exceeds {MAX_DOCUMENT_REF_LEN} byte limit"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

/// Checks a money amount is positive, has at most two decimal places and
/// fits under `max`.
pub fn money(amount: Decimal, field: &str, max: Decimal) -> Result<Decimal, WorkflowError> {
    if amount <= Decimal::ZERO {
        return Err(WorkflowError::validation(format!(
            "{field} must be greater than zero"
        )));
    }
    if amount.normalize().scale() > 2 {
        return Err(WorkflowError::validation(format!(
            "{field} must have at most two decimal places"
        )));
    }
    if amount > max {
        return Err(WorkflowError::validation(format!(
            "{field} exceeds maximum of {max}"
        )));
    }
    Ok(amount.round_dp(2))
}

/// Checks a percentage lies within `[0, 100]` with at most two decimal places.
pub fn percentage(value: Decimal, field: &str) -> Result<Decimal, WorkflowError> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(WorkflowError::validation(format!(
            "{field} must be between 0 and 100"
        )));
    }
    if value.normalize().scale() > 2 {
        return Err(WorkflowError::validation(format!(
            "{field} must have at most two decimal places"
        )));
    }
    Ok(value.round_dp(2))
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;

    #[test]
    fn required_text_trims_and_bounds() {
        assert_eq!(required_text("  Ivanov  ", "name", 10).unwrap(), "Ivanov");
        assert!(required_text("   ", "name", 10).is_err());
        assert!(required_text(&"x".repeat(11), "name", 10).is_err());
    }

    #[test]
    fn optional_text_accepts_missing() {
        assert_eq!(optional_text(None, "description", 10).unwrap(), "");
        assert_eq!(optional_text(Some("  "), "description", 10).unwrap(), "");
        assert_eq!(optional_text(Some(" a "), "description", 10).unwrap(), "a");
    }

    #[test]
    fn blank_document_reference_is_missing() {
        assert_eq!(document_reference(Some("   ")).unwrap(), None);
        assert_eq!(document_reference(None).unwrap(), None);
        assert_eq!(
            document_reference(Some(" s3://docs/order-17.pdf ")).unwrap(),
            Some("s3://docs/order-17.pdf".to_string())
        );
        let too_long = "a".repeat(MAX_DOCUMENT_REF_LEN + 1);
        assert!(document_reference(Some(&too_long)).is_err());
    }

    #[test]
    fn money_rules() {
        let max = Decimal::from(1_000);
        assert!(money(Decimal::from(-5), "amount", max).is_err());
        assert!(money(Decimal::ZERO, "amount", max).is_err());
        assert!(money(Decimal::from_f64(10.005).unwrap(), "amount", max).is_err());
        assert!(money(Decimal::from(1_001), "amount", max).is_err());
        assert_eq!(
            money(Decimal::new(150_50, 2), "amount", max).unwrap(),
            Decimal::new(150_50, 2)
        );
        // Trailing zeros do not count as extra precision.
        assert!(money(Decimal::new(10_000, 3), "amount", max).is_ok());
    }

    #[test]
    fn percentage_bounds() {
        assert!(percentage(Decimal::from(101), "rate").is_err());
        assert!(percentage(Decimal::from(-1), "rate").is_err());
        assert_eq!(percentage(Decimal::ONE_HUNDRED, "rate").unwrap(), Decimal::ONE_HUNDRED);
        assert!(percentage(Decimal::new(1, 3), "rate").is_err());
        assert_eq!(percentage(Decimal::new(1, 2), "rate").unwrap(), Decimal::new(1, 2));
    }

    #[test]
    fn month_start_normalizes_day() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 17).unwrap();
        assert_eq!(month_start(date), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    }
}
