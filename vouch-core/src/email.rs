//! Email normalization and boundary validation.
//!
//! Normalization is the only transform the challenge logic ever sees: all
//! stored and compared addresses go through [`normalize_email`] first, so a
//! visitor who typed `" User@Example.com "` when submitting and
//! `"user@example.com"` when requesting access ends up with equal keys.
//! Syntax validation exists for the HTTP boundary only and is deliberately
//! kept out of the challenge and token paths.

use crate::error::ValidationError;
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("Invalid email regex pattern")
});

/// Canonicalize an email address for equality comparisons. Total: never fails,
/// performs no syntax checks.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Validate email syntax against a practical subset of RFC 5322.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingField(
            "Email is required".to_string(),
        ));
    }

    if email.len() > 254 {
        return Err(ValidationError::InvalidEmail(
            "Email is too long".to_string(),
        ));
    }

    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(format!(
            "Invalid email format: {email}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" User@Example.com "), "user@example.com");
        assert_eq!(normalize_email("ALREADY@LOWER.IO"), "already@lower.io");
        assert_eq!(normalize_email("plain@example.com"), "plain@example.com");
    }

    #[test]
    fn test_normalize_email_is_total() {
        // Not valid addresses, but normalization never rejects
        assert_eq!(normalize_email(""), "");
        assert_eq!(normalize_email("  not-an-email  "), "not-an-email");
    }

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("test.email+tag@domain.co.uk").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(validate_email("").is_err());
        assert!(validate_email("invalid-email").is_err());
        assert!(validate_email("@domain.com").is_err());
        assert!(validate_email("user@domain").is_err());

        let long_email = format!("{}@example.com", "a".repeat(250));
        assert!(validate_email(&long_email).is_err());
    }
}
