//! Challenge lifecycle: issuance, supersession, verification, lockout.
//!
//! One pair `(endorsement_id, email)` has at most one live challenge at a
//! time. Issuing a new challenge first marks every live challenge for the
//! pair as used, so a previously emailed code stops verifying the moment a
//! newer one is requested. Consumed and superseded rows stay in the store as
//! an audit trail.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    Error,
    config::{CHALLENGE_TTL, LOCKOUT_PERIOD, MAX_CODE_ATTEMPTS},
    crypto::{generate_access_code, hash_access_code, verify_access_code_hash},
    repositories::ChallengeRepository,
    storage::{AccessChallenge, EndorsementId, NewAccessChallenge},
};

#[derive(Debug, Clone)]
pub struct ChallengeConfig {
    pub ttl: Duration,
    pub max_attempts: u32,
    pub lockout_period: Duration,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            ttl: CHALLENGE_TTL,
            max_attempts: MAX_CODE_ATTEMPTS,
            lockout_period: LOCKOUT_PERIOD,
        }
    }
}

/// A freshly issued challenge together with the raw code.
///
/// The raw code exists only in this value, for handing to the mailer; it is
/// never persisted and never retrievable from storage.
#[derive(Debug)]
pub struct IssuedChallenge {
    pub challenge: AccessChallenge,
    pub code: String,
}

/// Outcome of a verification attempt.
///
/// `InvalidOrExpired` covers "no live challenge", "expired", and "wrong code"
/// uniformly: distinguishing them would let a caller probe which record/email
/// pairs have outstanding challenges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeOutcome {
    Verified,
    InvalidOrExpired,
    Locked { retry_after_seconds: u64 },
}

pub struct ChallengeService<C: ChallengeRepository> {
    repository: Arc<C>,
    config: ChallengeConfig,
    pepper: Vec<u8>,
}

impl<C: ChallengeRepository> ChallengeService<C> {
    pub fn new(repository: Arc<C>, config: ChallengeConfig, pepper: Vec<u8>) -> Self {
        Self {
            repository,
            config,
            pepper,
        }
    }

    /// Supersede any live challenges for the pair and persist a new one.
    ///
    /// Supersession happens before the new row is written, so a stale emailed
    /// code can never outlive a newer request.
    pub async fn issue(
        &self,
        endorsement_id: &EndorsementId,
        email: &str,
    ) -> Result<IssuedChallenge, Error> {
        let now = Utc::now();

        for stale in self
            .repository
            .find_live(endorsement_id, email, now)
            .await?
        {
            self.repository.mark_used(&stale.id, now).await?;
        }

        let code = generate_access_code();
        let otp_hash = hash_access_code(endorsement_id.as_str(), email, &code, &self.pepper);

        let challenge = self
            .repository
            .create(NewAccessChallenge {
                endorsement_id: endorsement_id.clone(),
                email: email.to_string(),
                otp_hash,
                expires_at: now + self.config.ttl,
            })
            .await?;

        tracing::debug!(
            endorsement_id = %endorsement_id,
            challenge_id = %challenge.id,
            "issued access challenge"
        );

        Ok(IssuedChallenge { challenge, code })
    }

    /// Evaluate a candidate code against the latest live challenge.
    pub async fn verify(
        &self,
        endorsement_id: &EndorsementId,
        email: &str,
        candidate_code: &str,
    ) -> Result<ChallengeOutcome, Error> {
        let now = Utc::now();

        let Some(challenge) = self
            .repository
            .find_latest_live(endorsement_id, email, now)
            .await?
        else {
            return Ok(ChallengeOutcome::InvalidOrExpired);
        };

        if let Some(locked_until) = challenge.locked_until
            && locked_until > now
        {
            let retry_after = (locked_until - now).num_seconds().max(1) as u64;
            return Ok(ChallengeOutcome::Locked {
                retry_after_seconds: retry_after,
            });
        }

        let matches = verify_access_code_hash(
            endorsement_id.as_str(),
            email,
            candidate_code,
            &self.pepper,
            &challenge.otp_hash,
        );

        if !matches {
            let attempt_count = challenge.attempt_count + 1;
            // The threshold re-arms the lockout on every failure past it, so
            // a challenge stays lockable across repeated bursts.
            let locked_until = if attempt_count >= self.config.max_attempts {
                Some(now + self.config.lockout_period)
            } else {
                challenge.locked_until
            };

            self.repository
                .record_failed_attempt(&challenge.id, attempt_count, locked_until)
                .await?;

            return Ok(ChallengeOutcome::InvalidOrExpired);
        }

        self.repository.mark_used(&challenge.id, now).await?;

        Ok(ChallengeOutcome::Verified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ChallengeId;
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::sync::Mutex;

    /// Mock repository keeping challenges as an in-memory append-only log.
    struct MockChallengeRepository {
        rows: Mutex<Vec<AccessChallenge>>,
    }

    impl MockChallengeRepository {
        fn new() -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
            }
        }

        fn row(&self, id: &ChallengeId) -> AccessChallenge {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|c| &c.id == id)
                .cloned()
                .expect("challenge row")
        }

        /// Backdate a row's expiry for expiration tests.
        fn expire(&self, id: &ChallengeId) {
            let mut rows = self.rows.lock().unwrap();
            let row = rows.iter_mut().find(|c| &c.id == id).unwrap();
            row.expires_at = Utc::now() - Duration::seconds(1);
        }

        /// Pretend the lockout window has already elapsed.
        fn elapse_lockout(&self, id: &ChallengeId) {
            let mut rows = self.rows.lock().unwrap();
            let row = rows.iter_mut().find(|c| &c.id == id).unwrap();
            row.locked_until = Some(Utc::now() - Duration::seconds(1));
        }
    }

    #[async_trait]
    impl ChallengeRepository for MockChallengeRepository {
        async fn create(&self, challenge: NewAccessChallenge) -> Result<AccessChallenge, Error> {
            let now = Utc::now();
            let row = AccessChallenge {
                id: ChallengeId::new_random(),
                endorsement_id: challenge.endorsement_id,
                email: challenge.email,
                otp_hash: challenge.otp_hash,
                expires_at: challenge.expires_at,
                used_at: None,
                attempt_count: 0,
                locked_until: None,
                created_at: now,
                last_sent_at: now,
            };
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
        }

        async fn find_live(
            &self,
            endorsement_id: &EndorsementId,
            email: &str,
            now: DateTime<Utc>,
        ) -> Result<Vec<AccessChallenge>, Error> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|c| {
                    &c.endorsement_id == endorsement_id && c.email == email && c.is_live(now)
                })
                .cloned()
                .collect())
        }

        async fn find_latest_live(
            &self,
            endorsement_id: &EndorsementId,
            email: &str,
            now: DateTime<Utc>,
        ) -> Result<Option<AccessChallenge>, Error> {
            Ok(self
                .find_live(endorsement_id, email, now)
                .await?
                .into_iter()
                .max_by_key(|c| c.created_at))
        }

        async fn mark_used(
            &self,
            id: &ChallengeId,
            used_at: DateTime<Utc>,
        ) -> Result<(), Error> {
            let mut rows = self.rows.lock().unwrap();
            if let Some(row) = rows.iter_mut().find(|c| &c.id == id)
                && row.used_at.is_none()
            {
                row.used_at = Some(used_at);
            }
            Ok(())
        }

        async fn record_failed_attempt(
            &self,
            id: &ChallengeId,
            attempt_count: u32,
            locked_until: Option<DateTime<Utc>>,
        ) -> Result<(), Error> {
            let mut rows = self.rows.lock().unwrap();
            if let Some(row) = rows.iter_mut().find(|c| &c.id == id) {
                row.attempt_count = attempt_count;
                row.locked_until = locked_until;
            }
            Ok(())
        }
    }

    fn service(repo: Arc<MockChallengeRepository>) -> ChallengeService<MockChallengeRepository> {
        ChallengeService::new(repo, ChallengeConfig::default(), b"test-pepper".to_vec())
    }

    fn wrong_code(code: &str) -> String {
        if code == "000000" {
            "000001".to_string()
        } else {
            "000000".to_string()
        }
    }

    #[tokio::test]
    async fn test_issue_and_verify() {
        let repo = Arc::new(MockChallengeRepository::new());
        let service = service(repo.clone());
        let id = EndorsementId::new("end_1");

        let issued = service.issue(&id, "user@example.com").await.unwrap();
        assert_eq!(issued.code.len(), 6);
        assert_ne!(issued.challenge.otp_hash, issued.code);

        let outcome = service
            .verify(&id, "user@example.com", &issued.code)
            .await
            .unwrap();
        assert_eq!(outcome, ChallengeOutcome::Verified);
        assert!(repo.row(&issued.challenge.id).is_used());
    }

    #[tokio::test]
    async fn test_consumed_challenge_never_verifies_again() {
        let repo = Arc::new(MockChallengeRepository::new());
        let service = service(repo);
        let id = EndorsementId::new("end_1");

        let issued = service.issue(&id, "user@example.com").await.unwrap();
        service
            .verify(&id, "user@example.com", &issued.code)
            .await
            .unwrap();

        // Replay with the correct code
        let outcome = service
            .verify(&id, "user@example.com", &issued.code)
            .await
            .unwrap();
        assert_eq!(outcome, ChallengeOutcome::InvalidOrExpired);
    }

    #[tokio::test]
    async fn test_issuing_supersedes_previous_challenge() {
        let repo = Arc::new(MockChallengeRepository::new());
        let service = service(repo.clone());
        let id = EndorsementId::new("end_1");

        let first = service.issue(&id, "user@example.com").await.unwrap();
        let second = service.issue(&id, "user@example.com").await.unwrap();

        // The first row was terminated by supersession, not deleted
        assert!(repo.row(&first.challenge.id).is_used());
        assert!(!repo.row(&second.challenge.id).is_used());

        // The first code no longer verifies
        let outcome = service
            .verify(&id, "user@example.com", &first.code)
            .await
            .unwrap();
        if first.code == second.code {
            // Degenerate draw: both codes are equal, nothing to assert
            assert_eq!(outcome, ChallengeOutcome::Verified);
        } else {
            assert_eq!(outcome, ChallengeOutcome::InvalidOrExpired);

            let outcome = service
                .verify(&id, "user@example.com", &second.code)
                .await
                .unwrap();
            assert_eq!(outcome, ChallengeOutcome::Verified);
        }
    }

    #[tokio::test]
    async fn test_expired_challenge_never_verifies() {
        let repo = Arc::new(MockChallengeRepository::new());
        let service = service(repo.clone());
        let id = EndorsementId::new("end_1");

        let issued = service.issue(&id, "user@example.com").await.unwrap();
        repo.expire(&issued.challenge.id);

        let outcome = service
            .verify(&id, "user@example.com", &issued.code)
            .await
            .unwrap();
        assert_eq!(outcome, ChallengeOutcome::InvalidOrExpired);
    }

    #[tokio::test]
    async fn test_lockout_after_max_attempts() {
        let repo = Arc::new(MockChallengeRepository::new());
        let service = service(repo.clone());
        let id = EndorsementId::new("end_1");

        let issued = service.issue(&id, "user@example.com").await.unwrap();
        let bad = wrong_code(&issued.code);

        // Attempts 1-4 fail without locking
        for _ in 0..4 {
            let outcome = service.verify(&id, "user@example.com", &bad).await.unwrap();
            assert_eq!(outcome, ChallengeOutcome::InvalidOrExpired);
        }
        assert!(repo.row(&issued.challenge.id).locked_until.is_none());

        // The 5th failure arms the lockout
        let outcome = service.verify(&id, "user@example.com", &bad).await.unwrap();
        assert_eq!(outcome, ChallengeOutcome::InvalidOrExpired);
        assert!(repo.row(&issued.challenge.id).locked_until.is_some());

        // A 6th attempt fails even with the correct code
        let outcome = service
            .verify(&id, "user@example.com", &issued.code)
            .await
            .unwrap();
        assert!(matches!(outcome, ChallengeOutcome::Locked { .. }));
    }

    #[tokio::test]
    async fn test_correct_code_succeeds_after_lockout_elapses() {
        let repo = Arc::new(MockChallengeRepository::new());
        let service = service(repo.clone());
        let id = EndorsementId::new("end_1");

        let issued = service.issue(&id, "user@example.com").await.unwrap();
        let bad = wrong_code(&issued.code);

        for _ in 0..5 {
            service.verify(&id, "user@example.com", &bad).await.unwrap();
        }
        repo.elapse_lockout(&issued.challenge.id);

        let outcome = service
            .verify(&id, "user@example.com", &issued.code)
            .await
            .unwrap();
        assert_eq!(outcome, ChallengeOutcome::Verified);
    }

    #[tokio::test]
    async fn test_lockout_rearms_after_elapsing() {
        let repo = Arc::new(MockChallengeRepository::new());
        let service = service(repo.clone());
        let id = EndorsementId::new("end_1");

        let issued = service.issue(&id, "user@example.com").await.unwrap();
        let bad = wrong_code(&issued.code);

        for _ in 0..5 {
            service.verify(&id, "user@example.com", &bad).await.unwrap();
        }
        repo.elapse_lockout(&issued.challenge.id);

        // Another failure past the threshold locks again
        let outcome = service.verify(&id, "user@example.com", &bad).await.unwrap();
        assert_eq!(outcome, ChallengeOutcome::InvalidOrExpired);
        let row = repo.row(&issued.challenge.id);
        assert!(row.locked_until.unwrap() > Utc::now());
    }

    #[tokio::test]
    async fn test_unknown_pair_is_generic_failure() {
        let repo = Arc::new(MockChallengeRepository::new());
        let service = service(repo);

        let outcome = service
            .verify(
                &EndorsementId::new("end_missing"),
                "nobody@example.com",
                "123456",
            )
            .await
            .unwrap();
        assert_eq!(outcome, ChallengeOutcome::InvalidOrExpired);
    }

    #[tokio::test]
    async fn test_pairs_are_isolated() {
        let repo = Arc::new(MockChallengeRepository::new());
        let service = service(repo);
        let id = EndorsementId::new("end_1");

        let issued = service.issue(&id, "user@example.com").await.unwrap();

        // Same record, different email: the code must not verify
        let outcome = service
            .verify(&id, "other@example.com", &issued.code)
            .await
            .unwrap();
        assert_eq!(outcome, ChallengeOutcome::InvalidOrExpired);
    }
}
