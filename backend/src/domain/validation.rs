//! Validation rules shared by the record-keeping services.

use chrono::NaiveDate;

/// Longest accepted doctor or staff name
pub const MAX_NAME_LENGTH: usize = 128;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("Name is too long ({0} characters, max 128)")]
    NameTooLong(usize),
    #[error("Patient name cannot be empty")]
    EmptyPatientName,
    #[error("Description cannot be empty")]
    EmptyDescription,
    #[error("Amount must be a finite, non-negative number, got {0}")]
    InvalidAmount(f64),
    #[error("Month must be in YYYY-MM format, got '{0}'")]
    InvalidMonth(String),
    #[error("Doctor not found: {0}")]
    UnknownDoctor(String),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

/// Trim a name and check it is non-empty and not too long
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let length = trimmed.chars().count();
    if length > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong(length));
    }
    Ok(trimmed.to_string())
}

/// Recorded money amounts must be finite and not negative
pub fn validate_amount(amount: f64) -> Result<f64, ValidationError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ValidationError::InvalidAmount(amount));
    }
    Ok(amount)
}

/// Check a "YYYY-MM" month string
pub fn validate_month(month: &str) -> Result<String, ValidationError> {
    let trimmed = month.trim();
    let parsed = NaiveDate::parse_from_str(&format!("{}-01", trimmed), "%Y-%m-%d");
    if trimmed.len() != 7 || parsed.is_err() {
        return Err(ValidationError::InvalidMonth(month.to_string()));
    }
    Ok(trimmed.to_string())
}
