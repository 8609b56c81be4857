use bigdecimal::BigDecimal;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

/// Turns control characters into spaces and collapses whitespace runs.
pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_positive_amount(field: &'static str, value: &str) -> ValidationResult {
    validate_required(field, value)?;

    let value = value.trim();
    // sent verbatim, so exponent notation never reaches the gateway
    if value.contains(['e', 'E']) {
        return Err(ValidationError::new(field, "must be a plain decimal number"));
    }

    let amount = BigDecimal::from_str(value)
        .map_err(|_| ValidationError::new(field, "must be a decimal number"))?;

    if amount <= BigDecimal::from(0) {
        return Err(ValidationError::new(field, "must be greater than zero"));
    }

    Ok(())
}

/// Delimiters that would shift every following slot of the message.
pub fn validate_no_delimiters(field: &'static str, value: &str) -> ValidationResult {
    if value.contains('|') || value.contains('~') {
        return Err(ValidationError::new(
            field,
            "must not contain '|' or '~'",
        ));
    }

    Ok(())
}
