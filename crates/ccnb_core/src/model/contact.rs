//! Contact record model.
//!
//! # Responsibility
//! - Hold one contact: name, phones, birthday, e-mails and address.
//! - Provide field-level edit operations with explicit failure results.
//!
//! # Invariants
//! - `phones` holds normalized numbers without duplicates.
//! - `emails` holds validated addresses without duplicates.
//! - A failed edit leaves the record unchanged.

use crate::validate::{
    format_date, normalize_phone, require_key, validate_birthday, validate_email,
    ValidationError,
};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Record-level edit failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Input value failed validation.
    Validation(ValidationError),
    /// Value is already present on this record.
    DuplicateValue { field: &'static str, value: String },
    /// Value to remove or replace is not present on this record.
    MissingValue { field: &'static str, value: String },
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateValue { field, value } => {
                write!(f, "{field} `{value}` already exists in this record")
            }
            Self::MissingValue { field, value } => {
                write!(f, "{field} `{value}` does not exist in this record")
            }
        }
    }
}

impl Error for RecordError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RecordError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// One address-book entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    name: String,
    phones: Vec<String>,
    birthday: Option<NaiveDate>,
    emails: Vec<String>,
    address: Option<String>,
}

impl ContactRecord {
    /// Creates an empty record. The name is stored verbatim.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        require_key(&name, "contact name")?;
        Ok(Self {
            name,
            phones: Vec::new(),
            birthday: None,
            emails: Vec::new(),
            address: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized phones in insertion order.
    pub fn phones(&self) -> &[String] {
        &self.phones
    }

    pub fn birthday(&self) -> Option<NaiveDate> {
        self.birthday
    }

    /// Birthday rendered as `DD.MM.YYYY`.
    pub fn birthday_display(&self) -> Option<String> {
        self.birthday.map(format_date)
    }

    pub fn emails(&self) -> &[String] {
        &self.emails
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Normalizes and appends a phone number.
    pub fn add_phone(&mut self, raw: &str) -> Result<(), RecordError> {
        let phone = normalize_phone(raw)?;
        if self.phones.contains(&phone) {
            return Err(RecordError::DuplicateValue {
                field: "phone",
                value: phone,
            });
        }
        self.phones.push(phone);
        Ok(())
    }

    pub fn remove_phone(&mut self, raw: &str) -> Result<(), RecordError> {
        let phone = normalize_phone(raw)?;
        let Some(index) = self.phones.iter().position(|item| *item == phone) else {
            return Err(RecordError::MissingValue {
                field: "phone",
                value: phone,
            });
        };
        self.phones.remove(index);
        Ok(())
    }

    /// Replaces `old` with `new`; the old number stays if `new` is rejected.
    pub fn edit_phone(&mut self, old: &str, new: &str) -> Result<(), RecordError> {
        let old = normalize_phone(old)?;
        if !self.phones.contains(&old) {
            return Err(RecordError::MissingValue {
                field: "phone",
                value: old,
            });
        }
        self.add_phone(new)?;
        self.remove_phone(&old)
    }

    /// Returns the stored phone equal to the normalized input, if any.
    pub fn find_phone(&self, raw: &str) -> Option<&str> {
        let phone = normalize_phone(raw).ok()?;
        self.phones
            .iter()
            .find(|item| **item == phone)
            .map(String::as_str)
    }

    /// Sets the birthday from `DD.MM.YYYY` input.
    pub fn set_birthday(&mut self, raw: &str) -> Result<(), RecordError> {
        self.birthday = Some(validate_birthday(raw)?);
        Ok(())
    }

    /// Sets an already validated birthday date.
    pub fn set_birthday_date(&mut self, date: NaiveDate) {
        self.birthday = Some(date);
    }

    pub fn clear_birthday(&mut self) {
        self.birthday = None;
    }

    pub fn add_email(&mut self, raw: &str) -> Result<(), RecordError> {
        let email = validate_email(raw)?;
        if self.emails.contains(&email) {
            return Err(RecordError::DuplicateValue {
                field: "email",
                value: email,
            });
        }
        self.emails.push(email);
        Ok(())
    }

    pub fn remove_email(&mut self, raw: &str) -> Result<(), RecordError> {
        let email = validate_email(raw)?;
        let Some(index) = self.emails.iter().position(|item| *item == email) else {
            return Err(RecordError::MissingValue {
                field: "email",
                value: email,
            });
        };
        self.emails.remove(index);
        Ok(())
    }

    /// Replaces `old` with `new`; the old address stays if `new` is rejected.
    pub fn edit_email(&mut self, old: &str, new: &str) -> Result<(), RecordError> {
        let old = validate_email(old)?;
        if !self.emails.contains(&old) {
            return Err(RecordError::MissingValue {
                field: "email",
                value: old,
            });
        }
        self.add_email(new)?;
        self.remove_email(&old)
    }

    /// Sets the free-text address. No validation is applied.
    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = Some(address.into());
    }

    pub fn clear_address(&mut self) {
        self.address = None;
    }
}
