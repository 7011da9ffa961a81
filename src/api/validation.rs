//! Input validation for request payloads.
//!
//! Forms are checked here before anything is sent, so a payload that fails
//! validation never reaches the service. Use [`ValidationErrorBuilder`] to
//! collect every field error of a form in one pass.

use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

use crate::models::due_date;

/// Minimum password length accepted by the register and login forms
pub const MIN_PASSWORD_LENGTH: usize = 8;

lazy_static! {
    /// Loose email shape check, the same strictness as a browser email input
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?)*$"
    ).unwrap();
}

/// Field errors for one form, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", summary(.errors))]
pub struct ValidationErrors {
    pub errors: BTreeMap<String, Vec<String>>,
}

fn summary(errors: &BTreeMap<String, Vec<String>>) -> String {
    if errors.len() == 1 {
        errors
            .values()
            .next()
            .and_then(|v| v.first())
            .cloned()
            .unwrap_or_else(|| "Validation failed".to_string())
    } else {
        format!("Validation failed for {} fields", errors.len())
    }
}

impl ValidationErrors {
    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.errors.get(name).map(Vec::as_slice)
    }

    /// One line per message, prefixed with the field name
    pub fn lines(&self) -> Vec<String> {
        self.errors
            .iter()
            .flat_map(|(field, messages)| messages.iter().map(move |m| format!("{}: {}", field, m)))
            .collect()
    }
}

/// Builder for collecting multiple validation errors
#[derive(Debug, Default)]
pub struct ValidationErrorBuilder {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validation error for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    /// Record the error of a field check, if any
    pub fn check(&mut self, field: &str, result: Result<(), String>) -> &mut Self {
        if let Err(message) = result {
            self.add(field, message);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Return Ok(()) if no errors were collected
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                errors: self.errors,
            })
        }
    }
}

/// Validate a field the form marks as required
pub fn validate_required(label: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", label));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }

    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Email address is not valid".to_string());
    }

    Ok(())
}

/// Parse a due date as typed by the user, e.g. `2025-06-01T17:00`
pub fn parse_due_date(value: &str) -> Result<NaiveDateTime, String> {
    if value.trim().is_empty() {
        return Err("End date is required".to_string());
    }

    due_date::parse(value)
        .ok_or_else(|| format!("End date '{}' is not a valid date-time (use YYYY-MM-DDTHH:MM)", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert!(validate_required("Title", "Groceries").is_ok());
        assert_eq!(
            validate_required("Title", "   ").unwrap_err(),
            "Title is required"
        );
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password1").is_ok());
        assert!(validate_password("12345678").is_ok());

        assert!(validate_password("").is_err());
        assert!(validate_password("short").is_err());
        assert!(validate_password("1234567").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.org").is_ok());
        assert!(validate_email("user@localhost").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("@b.com").is_err());
        assert!(validate_email("a@-b.com").is_err());
    }

    #[test]
    fn test_parse_due_date() {
        assert!(parse_due_date("2025-06-01T17:00").is_ok());
        assert!(parse_due_date("2025-06-01 17:00:30").is_ok());
        assert_eq!(parse_due_date("").unwrap_err(), "End date is required");
        assert!(parse_due_date("tomorrow").is_err());
    }

    #[test]
    fn test_validation_error_builder() {
        let mut builder = ValidationErrorBuilder::new();
        builder.add("title", "Title is required");
        builder.check("password", validate_password("abc"));
        builder.check("email", validate_email("a@b.com"));
        builder.add("title", "Title is too short");

        assert!(!builder.is_empty());

        let err = builder.finish().unwrap_err();
        assert_eq!(err.field("title").unwrap().len(), 2);
        assert_eq!(err.field("password").unwrap().len(), 1);
        assert!(err.field("email").is_none());
        assert_eq!(err.to_string(), "Validation failed for 2 fields");
        assert_eq!(err.lines().len(), 3);
    }

    #[test]
    fn test_single_field_summary() {
        let mut builder = ValidationErrorBuilder::new();
        builder.add("title", "Title is required");
        let err = builder.finish().unwrap_err();
        assert_eq!(err.to_string(), "Title is required");
    }

    #[test]
    fn test_empty_builder_finishes_ok() {
        assert!(ValidationErrorBuilder::new().finish().is_ok());
    }
}
