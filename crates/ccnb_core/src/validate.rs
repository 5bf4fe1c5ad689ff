//! Field validation and normalization for contact records.
//!
//! # Responsibility
//! - Normalize phone numbers into one canonical `+380XXXXXXXXX` shape.
//! - Validate e-mail addresses and birthdays before they reach a record.
//!
//! # Invariants
//! - `normalize_phone` is a fixed point on its own output.
//! - Birthdays are never in the future and never February 29.
//! - Validators are pure; only `validate_birthday` reads the local clock.

use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Display and input format for dates (`DD.MM.YYYY`).
pub const DATE_FORMAT: &str = "%d.%m.%Y";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,7}$").expect("valid email regex")
});
static DATE_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").expect("valid date regex"));

/// Validation failure for user-supplied field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Phone digits do not match any accepted shape.
    InvalidPhone(String),
    /// E-mail does not match `local@domain.tld`.
    InvalidEmail(String),
    /// Date is not a real `DD.MM.YYYY` calendar date.
    InvalidDate(String),
    /// February 29 birthdays are rejected by policy.
    LeapDayBirthday,
    /// Birthday lies after the current date.
    FutureBirthday(NaiveDate),
    /// Record key (contact name or note title) is blank.
    EmptyKey(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPhone(digits) => write!(
                f,
                "`{digits}` is not a valid phone number; use '0XXXXXXXXX' or '+380XXXXXXXXX'"
            ),
            Self::InvalidEmail(value) => write!(f, "`{value}` is not a valid email address"),
            Self::InvalidDate(value) => {
                write!(f, "invalid date `{value}`; use DD.MM.YYYY")
            }
            Self::LeapDayBirthday => write!(
                f,
                "birthday cannot be 29 February; use 28.02.YYYY or 01.03.YYYY"
            ),
            Self::FutureBirthday(date) => {
                write!(f, "birthday {} is in the future", format_date(*date))
            }
            Self::EmptyKey(field) => write!(f, "{field} cannot be empty"),
        }
    }
}

impl Error for ValidationError {}

/// Normalizes a phone number to `+380XXXXXXXXX`.
///
/// All non-digit characters are stripped first. Exactly two digit shapes are
/// accepted: 10 digits starting with `0`, or 12 digits starting with `38`.
pub fn normalize_phone(raw: &str) -> Result<String, ValidationError> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        10 if digits.starts_with('0') => Ok(format!("+38{digits}")),
        12 if digits.starts_with("38") => Ok(format!("+{digits}")),
        _ => Err(ValidationError::InvalidPhone(digits)),
    }
}

/// Validates an e-mail address and returns it unchanged.
pub fn validate_email(raw: &str) -> Result<String, ValidationError> {
    if EMAIL_RE.is_match(raw) {
        Ok(raw.to_string())
    } else {
        Err(ValidationError::InvalidEmail(raw.to_string()))
    }
}

/// Validates a `DD.MM.YYYY` birthday against the local current date.
pub fn validate_birthday(raw: &str) -> Result<NaiveDate, ValidationError> {
    validate_birthday_at(raw, Local::now().date_naive())
}

/// Validates a `DD.MM.YYYY` birthday against an explicit `today`.
///
/// Check order: format, leap day, future date.
pub fn validate_birthday_at(raw: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    let date = parse_date(raw)?;
    if date.month() == 2 && date.day() == 29 {
        return Err(ValidationError::LeapDayBirthday);
    }
    if date > today {
        return Err(ValidationError::FutureBirthday(date));
    }
    Ok(date)
}

/// Parses a strict `DD.MM.YYYY` date without birthday policies.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    if !DATE_SHAPE_RE.is_match(raw) {
        return Err(ValidationError::InvalidDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

/// Renders a date as `DD.MM.YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn require_key(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyKey(field));
    }
    Ok(())
}
