//! Pure validation rules shared by the store and the HTTP layer.

use std::fmt::Display;
use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};

use crate::errors::CoreError;

/// Years the store can hold: dates are kept as four-digit-year text.
const STORABLE_YEARS: RangeInclusive<i32> = 0..=9999;

/// Reject a required text field that is empty or whitespace only.
pub fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Reject a caller-supplied date or timestamp outside years 0000 through 9999.
pub fn validate_storable<D: Datelike + Display>(field: &str, value: &D) -> Result<(), CoreError> {
    if !STORABLE_YEARS.contains(&value.year()) {
        return Err(CoreError::Validation(format!(
            "{field} {value} is outside the supported years 0000-9999"
        )));
    }
    Ok(())
}

/// A program year label is a four-digit calendar year such as `2025`.
pub fn validate_year_label(label: &str) -> Result<(), CoreError> {
    let label = label.trim();
    if label.len() != 4 || !label.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::Validation(format!(
            "year must be a four-digit calendar year, got '{label}'"
        )));
    }
    Ok(())
}

/// A finding's due date may not fall before the day the finding was created.
pub fn validate_due_date(due: NaiveDate, created_on: NaiveDate) -> Result<(), CoreError> {
    validate_storable("due_date", &due)?;
    if due < created_on {
        return Err(CoreError::Validation(format!(
            "due_date {due} is before the finding creation date {created_on}"
        )));
    }
    Ok(())
}

/// Start and end dates of an engagement, when both are set, must be ordered.
pub fn validate_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), CoreError> {
    if let Some(start) = start {
        validate_storable("start_date", &start)?;
    }
    if let Some(end) = end {
        validate_storable("end_date", &end)?;
    }
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(CoreError::Validation(format!(
            "end_date {end} is before start_date {start}"
        ))),
        _ => Ok(()),
    }
}
