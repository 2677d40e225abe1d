use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Access error: {0}")]
    Access(#[from] AccessError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Outcomes surfaced to callers of the access flow. Variants map 1:1 onto the
/// generic messages the HTTP layer is allowed to show.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The submitted code did not match a live challenge. Covers "no such
    /// challenge", "expired", and "wrong code" uniformly so callers cannot
    /// probe which one happened.
    #[error("Code is invalid or has expired")]
    InvalidCode,

    /// No usable session accompanied a privileged request.
    #[error("Email verification required")]
    VerificationRequired,

    /// A structurally valid session no longer matches the record it was
    /// minted for. The caller must discard the session cookie.
    #[error("Session is no longer valid")]
    SessionRevoked,

    /// Caller exceeded a request quota or hit a challenge lockout.
    #[error("Too many requests")]
    RateLimited { retry_after_seconds: Option<u64> },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Record not found")]
    NotFound,
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Invalid access code: {0}")]
    InvalidCode(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Signature mismatch")]
    SignatureMismatch,

    #[error("Token expired")]
    Expired,

    #[error("Invalid claims: {0}")]
    InvalidClaims(String),
}

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("No secret configured for {0} in a production environment")]
    MissingSecret(&'static str),
}

impl Error {
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_access_error(&self) -> bool {
        matches!(self, Error::Access(_))
    }

    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let access_error = Error::Access(AccessError::InvalidCode);
        assert_eq!(
            access_error.to_string(),
            "Access error: Code is invalid or has expired"
        );

        let storage_error = Error::Storage(StorageError::NotFound);
        assert_eq!(storage_error.to_string(), "Storage error: Record not found");
    }

    #[test]
    fn test_error_from_conversions() {
        let error: Error = AccessError::VerificationRequired.into();
        assert!(matches!(
            error,
            Error::Access(AccessError::VerificationRequired)
        ));

        let error: Error = ValidationError::MissingField("email".to_string()).into();
        assert!(error.is_validation_error());
    }

    #[test]
    fn test_classification_helpers() {
        assert!(Error::Access(AccessError::InvalidCode).is_access_error());
        assert!(!Error::Access(AccessError::InvalidCode).is_storage_error());
        assert!(Error::Storage(StorageError::Backend("down".into())).is_storage_error());
    }
}
