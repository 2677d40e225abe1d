//! Runtime configuration for the access subsystem.
//!
//! Two secrets back the flow: one signs session tokens, one peppers access
//! code digests. Each may be configured on its own (`VOUCH_SESSION_SECRET`,
//! `VOUCH_OTP_PEPPER`) or fall back to the shared `VOUCH_APP_SECRET`. In a
//! production environment a missing secret is a hard startup error; in
//! development a fixed insecure fallback keeps the flow usable.

use chrono::Duration;

use crate::error::{CryptoError, Error};

const DEV_FALLBACK_SECRET: &[u8] = b"vouch-insecure-development-secret";

/// How long an issued code stays verifiable.
pub const CHALLENGE_TTL: Duration = Duration::minutes(10);
/// How long a minted session stays usable.
pub const SESSION_TTL: Duration = Duration::minutes(30);
/// Failed attempts on one challenge before it locks.
pub const MAX_CODE_ATTEMPTS: u32 = 5;
/// How long a locked challenge rejects attempts.
pub const LOCKOUT_PERIOD: Duration = Duration::minutes(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Read `VOUCH_ENV`; anything other than `production`/`prod` is
    /// development.
    pub fn from_env() -> Self {
        match std::env::var("VOUCH_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Clone)]
pub struct AccessConfig {
    pub environment: Environment,
    /// Key for signing access session tokens.
    pub session_secret: Vec<u8>,
    /// Pepper mixed into access-code digests.
    pub otp_pepper: Vec<u8>,
    /// Public origin of the site, used to build the manage link in the code
    /// email.
    pub base_url: String,
    pub challenge_ttl: Duration,
    pub session_ttl: Duration,
    pub max_code_attempts: u32,
    pub lockout_period: Duration,
}

impl std::fmt::Debug for AccessConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessConfig")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("challenge_ttl", &self.challenge_ttl)
            .field("session_ttl", &self.session_ttl)
            .field("max_code_attempts", &self.max_code_attempts)
            .field("lockout_period", &self.lockout_period)
            .finish_non_exhaustive()
    }
}

impl AccessConfig {
    /// Build the config from `VOUCH_*` environment variables.
    pub fn from_env() -> Result<Self, Error> {
        let environment = Environment::from_env();
        let shared = std::env::var("VOUCH_APP_SECRET").ok();

        let session_secret = resolve_secret(
            std::env::var("VOUCH_SESSION_SECRET").ok(),
            shared.clone(),
            environment,
            "session token signing",
        )?;
        let otp_pepper = resolve_secret(
            std::env::var("VOUCH_OTP_PEPPER").ok(),
            shared,
            environment,
            "access code hashing",
        )?;

        let base_url = std::env::var("VOUCH_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self::with_secrets(
            environment,
            session_secret,
            otp_pepper,
            base_url,
        ))
    }

    /// Construct with explicit secrets; used by tests and embedders that
    /// manage configuration themselves.
    pub fn with_secrets(
        environment: Environment,
        session_secret: Vec<u8>,
        otp_pepper: Vec<u8>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            environment,
            session_secret,
            otp_pepper,
            base_url: base_url.into(),
            challenge_ttl: CHALLENGE_TTL,
            session_ttl: SESSION_TTL,
            max_code_attempts: MAX_CODE_ATTEMPTS,
            lockout_period: LOCKOUT_PERIOD,
        }
    }

    /// Link embedded in the access-code email.
    pub fn manage_url(&self, endorsement_id: &str) -> String {
        format!(
            "{}/endorsements/{endorsement_id}/manage",
            self.base_url.trim_end_matches('/')
        )
    }
}

/// Pick the dedicated secret, else the shared one, else fail in production.
fn resolve_secret(
    dedicated: Option<String>,
    shared: Option<String>,
    environment: Environment,
    purpose: &'static str,
) -> Result<Vec<u8>, Error> {
    match dedicated.or(shared) {
        Some(secret) if !secret.is_empty() => Ok(secret.into_bytes()),
        _ if environment.is_production() => {
            Err(Error::Crypto(CryptoError::MissingSecret(purpose)))
        }
        _ => {
            tracing::warn!(purpose, "no secret configured, using development fallback");
            Ok(DEV_FALLBACK_SECRET.to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_secret_prefers_dedicated() {
        let secret = resolve_secret(
            Some("dedicated".to_string()),
            Some("shared".to_string()),
            Environment::Production,
            "session token signing",
        )
        .unwrap();
        assert_eq!(secret, b"dedicated");
    }

    #[test]
    fn test_resolve_secret_falls_back_to_shared() {
        let secret = resolve_secret(
            None,
            Some("shared".to_string()),
            Environment::Production,
            "session token signing",
        )
        .unwrap();
        assert_eq!(secret, b"shared");
    }

    #[test]
    fn test_resolve_secret_hard_fails_in_production() {
        let result = resolve_secret(
            None,
            None,
            Environment::Production,
            "access code hashing",
        );
        assert!(matches!(
            result,
            Err(Error::Crypto(CryptoError::MissingSecret(_)))
        ));

        // Empty counts as unset
        let result = resolve_secret(
            Some(String::new()),
            None,
            Environment::Production,
            "access code hashing",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_secret_dev_fallback() {
        let secret =
            resolve_secret(None, None, Environment::Development, "session token signing").unwrap();
        assert_eq!(secret, DEV_FALLBACK_SECRET);
    }

    #[test]
    fn test_manage_url_handles_trailing_slash() {
        let config = AccessConfig::with_secrets(
            Environment::Development,
            b"s".to_vec(),
            b"p".to_vec(),
            "https://site.test/",
        );
        assert_eq!(
            config.manage_url("end_abc"),
            "https://site.test/endorsements/end_abc/manage"
        );
    }
}
