//! # Vouch
//!
//! Vouch lets a visitor who left an endorsement on a personal site edit or
//! delete it later without an account. The visitor proves control of the
//! email address stored with the endorsement through a one-time code, and
//! receives a short-lived signed session scoped to that one record.
//!
//! The flow is deliberately narrow: a session authorizes exactly one action
//! class (manage one endorsement) for a fixed window, and every privileged
//! call re-checks the session's email against the record's current address,
//! so changing the address on file revokes all outstanding sessions.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vouch::{Vouch, VouchMailerService};
//! use vouch_core::AccessConfig;
//! use vouch_mailer::MailerConfig;
//! use vouch_storage_memory::MemoryRepositoryProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repositories = Arc::new(MemoryRepositoryProvider::new());
//!     let config = AccessConfig::from_env()?;
//!     let mailer = VouchMailerService::new(MailerConfig::from_env()?)?;
//!
//!     let vouch = Vouch::new(repositories, config, Arc::new(mailer));
//!
//!     vouch
//!         .request_code(&"end_abc".into(), "visitor@example.com", "203.0.113.7")
//!         .await?;
//!     Ok(())
//! }
//! ```

mod mailer;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};

pub use mailer::VouchMailerService;

/// Re-export core types commonly used alongside [`Vouch`].
pub use vouch_core::{
    AccessConfig, AccessMailer, AccessTokenClaims, Environment, Error, InMemoryRateLimiter,
    RateLimiter,
    error::{AccessError, TokenError, ValidationError},
    storage::{Endorsement, EndorsementId, EndorsementStatus, EndorsementUpdate},
};

/// Re-export the bundled storage backend.
pub use vouch_storage_memory::MemoryRepositoryProvider;

use vouch_core::{
    AccessTokenCodec, ChallengeOutcome, ChallengeService, EndorsementRepository,
    RepositoryProvider,
    crypto::ACCESS_CODE_LENGTH,
    email::{normalize_email, validate_email},
    repositories::{ChallengeRepositoryAdapter, EndorsementRepositoryAdapter},
    services::ChallengeConfig,
};

/// Per-endpoint request quotas. Windows are wall-clock fixed windows keyed by
/// caller identity; the pair quotas additionally key on the record + email
/// being targeted.
mod quota {
    use std::time::Duration;

    pub const REQUEST_CODE_IP: (Duration, u32) = (Duration::from_secs(60 * 60), 10);
    pub const REQUEST_CODE_PAIR: (Duration, u32) = (Duration::from_secs(15 * 60), 3);
    pub const VERIFY_CODE_IP: (Duration, u32) = (Duration::from_secs(15 * 60), 30);
    pub const VERIFY_CODE_PAIR: (Duration, u32) = (Duration::from_secs(10 * 60), 12);
    pub const UPDATE_IP: (Duration, u32) = (Duration::from_secs(10 * 60), 30);
    pub const DELETE_IP: (Duration, u32) = (Duration::from_secs(10 * 60), 10);
}

/// A granted session: the bearer credential plus its expiry, for the HTTP
/// layer to turn into a cookie.
#[derive(Debug, Clone)]
pub struct AccessSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// The access-control coordinator for one site.
///
/// Owns the challenge lifecycle, the token codec, the mailer collaborator,
/// and the request quotas, on top of whatever [`RepositoryProvider`] the site
/// stores its content in.
pub struct Vouch<R: RepositoryProvider> {
    config: AccessConfig,
    endorsements: Arc<EndorsementRepositoryAdapter<R>>,
    challenges: ChallengeService<ChallengeRepositoryAdapter<R>>,
    token_codec: AccessTokenCodec,
    mailer: Arc<dyn AccessMailer>,
    rate_limiter: Arc<dyn RateLimiter>,
}

impl<R: RepositoryProvider> Vouch<R> {
    pub fn new(repositories: Arc<R>, config: AccessConfig, mailer: Arc<dyn AccessMailer>) -> Self {
        let challenge_config = ChallengeConfig {
            ttl: config.challenge_ttl,
            max_attempts: config.max_code_attempts,
            lockout_period: config.lockout_period,
        };

        Self {
            endorsements: Arc::new(EndorsementRepositoryAdapter::new(repositories.clone())),
            challenges: ChallengeService::new(
                Arc::new(ChallengeRepositoryAdapter::new(repositories)),
                challenge_config,
                config.otp_pepper.clone(),
            ),
            token_codec: AccessTokenCodec::new(config.session_secret.clone()),
            mailer,
            rate_limiter: Arc::new(InMemoryRateLimiter::new()),
            config,
        }
    }

    /// Replace the process-local rate limiter, e.g. with one backed by a
    /// shared counter store.
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    /// Request an access code for an endorsement.
    ///
    /// Succeeds identically whether or not the record exists or the email
    /// matches; the only externally visible failure is a malformed email.
    /// Throttling and infrastructure failures also collapse into the generic
    /// success so probing callers learn nothing.
    pub async fn request_code(
        &self,
        endorsement_id: &EndorsementId,
        email: &str,
        client_ip: &str,
    ) -> Result<(), Error> {
        let email = normalize_email(email);
        validate_email(&email)?;

        if !self.check_quota(
            &format!("request-code:ip:{client_ip}"),
            quota::REQUEST_CODE_IP,
        ) || !self.check_quota(
            &format!("request-code:pair:{endorsement_id}:{email}"),
            quota::REQUEST_CODE_PAIR,
        ) {
            tracing::debug!(%endorsement_id, "code request throttled");
            return Ok(());
        }

        let endorsement = match self.endorsements_find(endorsement_id).await {
            Ok(endorsement) => endorsement,
            Err(e) => {
                tracing::warn!(error = %e, "record lookup failed during code request");
                return Ok(());
            }
        };

        let Some(stored_email) = endorsement.and_then(|e| e.author_email) else {
            tracing::debug!(%endorsement_id, "code requested for record without matchable email");
            return Ok(());
        };

        if normalize_email(&stored_email) != email {
            tracing::debug!(%endorsement_id, "code requested with non-matching email");
            return Ok(());
        }

        let issued = match self.challenges.issue(endorsement_id, &email).await {
            Ok(issued) => issued,
            Err(e) => {
                tracing::warn!(error = %e, "challenge issuance failed");
                return Ok(());
            }
        };

        let manage_url = self.config.manage_url(endorsement_id.as_str());
        let expires_minutes = self.config.challenge_ttl.num_minutes();
        if let Err(e) = self
            .mailer
            .send_access_code(&email, &issued.code, &manage_url, expires_minutes)
            .await
        {
            tracing::warn!(error = %e, "access code email failed to send");
        }

        Ok(())
    }

    /// Verify a submitted code and mint a session on success.
    pub async fn verify_code(
        &self,
        endorsement_id: &EndorsementId,
        email: &str,
        code: &str,
        client_ip: &str,
    ) -> Result<AccessSession, Error> {
        let email = normalize_email(email);

        // Reject anything that is not exactly six digits before touching
        // storage. Same generic message as a wrong code.
        if code.len() != ACCESS_CODE_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(AccessError::InvalidCode.into());
        }

        self.enforce_quota(&format!("verify-code:ip:{client_ip}"), quota::VERIFY_CODE_IP)?;
        self.enforce_quota(
            &format!("verify-code:pair:{endorsement_id}:{email}"),
            quota::VERIFY_CODE_PAIR,
        )?;

        match self.challenges.verify(endorsement_id, &email, code).await? {
            ChallengeOutcome::Verified => {}
            ChallengeOutcome::InvalidOrExpired => return Err(AccessError::InvalidCode.into()),
            ChallengeOutcome::Locked {
                retry_after_seconds,
            } => {
                return Err(AccessError::RateLimited {
                    retry_after_seconds: Some(retry_after_seconds),
                }
                .into());
            }
        }

        let expires_at = Utc::now() + self.config.session_ttl;
        let token = self.token_codec.mint(&AccessTokenClaims {
            endorsement_id: endorsement_id.as_str().to_string(),
            email,
            expires_at_ms: expires_at.timestamp_millis(),
        })?;

        Ok(AccessSession { token, expires_at })
    }

    /// Check that a session token currently authorizes mutating a record.
    ///
    /// The token only proves the email was verified for this record at
    /// issuance; authority is re-established against the record's stored
    /// email on every call, which revokes sessions when the address changes.
    pub async fn authorize(
        &self,
        token: &str,
        endorsement_id: &EndorsementId,
    ) -> Result<AccessTokenClaims, Error> {
        let claims = match self.token_codec.verify(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "rejected access token");
                return Err(AccessError::VerificationRequired.into());
            }
        };

        if claims.endorsement_id != endorsement_id.as_str() {
            return Err(AccessError::VerificationRequired.into());
        }

        let Some(endorsement) = self.endorsements_find(endorsement_id).await? else {
            return Err(AccessError::SessionRevoked.into());
        };

        let Some(stored_email) = endorsement.author_email else {
            return Err(AccessError::SessionRevoked.into());
        };

        if normalize_email(&stored_email) != claims.email {
            return Err(AccessError::SessionRevoked.into());
        }

        Ok(claims)
    }

    /// Apply a submitter edit to their endorsement. The edit sends the record
    /// back to review.
    pub async fn update_endorsement(
        &self,
        token: &str,
        endorsement_id: &EndorsementId,
        update: &EndorsementUpdate,
        client_ip: &str,
    ) -> Result<Endorsement, Error> {
        self.enforce_quota(&format!("update:ip:{client_ip}"), quota::UPDATE_IP)?;
        self.authorize(token, endorsement_id).await?;
        validate_update(update)?;

        self.endorsements
            .update(endorsement_id, update, EndorsementStatus::Pending)
            .await
    }

    /// Delete the submitter's endorsement.
    pub async fn delete_endorsement(
        &self,
        token: &str,
        endorsement_id: &EndorsementId,
        client_ip: &str,
    ) -> Result<(), Error> {
        self.enforce_quota(&format!("delete:ip:{client_ip}"), quota::DELETE_IP)?;
        self.authorize(token, endorsement_id).await?;

        self.endorsements.delete(endorsement_id).await
    }

    async fn endorsements_find(
        &self,
        endorsement_id: &EndorsementId,
    ) -> Result<Option<Endorsement>, Error> {
        self.endorsements.find_by_id(endorsement_id).await
    }

    fn check_quota(&self, key: &str, (window, max): (StdDuration, u32)) -> bool {
        self.rate_limiter.check(key, window, max).allowed
    }

    fn enforce_quota(&self, key: &str, (window, max): (StdDuration, u32)) -> Result<(), Error> {
        let decision = self.rate_limiter.check(key, window, max);
        if decision.allowed {
            Ok(())
        } else {
            Err(AccessError::RateLimited {
                retry_after_seconds: decision.retry_after_seconds,
            }
            .into())
        }
    }
}

fn validate_update(update: &EndorsementUpdate) -> Result<(), Error> {
    if let Some(author_name) = &update.author_name
        && author_name.trim().is_empty()
    {
        return Err(ValidationError::InvalidField(
            "Name cannot be empty".to_string(),
        )
        .into());
    }

    if let Some(body) = &update.body {
        if body.trim().is_empty() {
            return Err(ValidationError::InvalidField(
                "Endorsement text cannot be empty".to_string(),
            )
            .into());
        }
        if body.len() > 2000 {
            return Err(ValidationError::InvalidField(
                "Endorsement text is too long".to_string(),
            )
            .into());
        }
    }

    Ok(())
}
