use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    Error,
    storage::{AccessChallenge, ChallengeId, EndorsementId, NewAccessChallenge},
};

/// Data access for access challenges.
///
/// The repository stores and retrieves rows; every lifecycle rule (when to
/// supersede, when to lock, when a row is terminal) lives in
/// [`crate::services::ChallengeService`]. Rows are never deleted here:
/// termination is expressed by setting `used_at`.
#[async_trait]
pub trait ChallengeRepository: Send + Sync + 'static {
    /// Persist a fresh challenge. The store assigns the id and timestamps.
    async fn create(&self, challenge: NewAccessChallenge) -> Result<AccessChallenge, Error>;

    /// All live (unused, unexpired) challenges for a pair.
    async fn find_live(
        &self,
        endorsement_id: &EndorsementId,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<AccessChallenge>, Error>;

    /// The most recently created live challenge for a pair, if any.
    async fn find_latest_live(
        &self,
        endorsement_id: &EndorsementId,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AccessChallenge>, Error>;

    /// Terminate a challenge. Idempotent on already-used rows.
    async fn mark_used(&self, id: &ChallengeId, used_at: DateTime<Utc>) -> Result<(), Error>;

    /// Persist the outcome of a failed attempt: the new attempt count and,
    /// when the threshold was crossed, the lockout deadline.
    async fn record_failed_attempt(
        &self,
        id: &ChallengeId,
        attempt_count: u32,
        locked_until: Option<DateTime<Utc>>,
    ) -> Result<(), Error>;
}
