//! Adapters that turn a [`RepositoryProvider`] into the individual repository
//! traits, so services can hold one `Arc` per repository without knowing the
//! provider's concrete type.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    Error,
    repositories::{
        ChallengeRepository, ChallengeRepositoryProvider, EndorsementRepository,
        EndorsementRepositoryProvider, RepositoryProvider,
    },
    storage::{
        AccessChallenge, ChallengeId, Endorsement, EndorsementId, EndorsementStatus,
        EndorsementUpdate, NewAccessChallenge,
    },
};

pub struct EndorsementRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> EndorsementRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> EndorsementRepository for EndorsementRepositoryAdapter<R> {
    async fn find_by_id(&self, id: &EndorsementId) -> Result<Option<Endorsement>, Error> {
        self.provider.endorsements().find_by_id(id).await
    }

    async fn update(
        &self,
        id: &EndorsementId,
        update: &EndorsementUpdate,
        status: EndorsementStatus,
    ) -> Result<Endorsement, Error> {
        self.provider.endorsements().update(id, update, status).await
    }

    async fn delete(&self, id: &EndorsementId) -> Result<(), Error> {
        self.provider.endorsements().delete(id).await
    }
}

pub struct ChallengeRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> ChallengeRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> ChallengeRepository for ChallengeRepositoryAdapter<R> {
    async fn create(&self, challenge: NewAccessChallenge) -> Result<AccessChallenge, Error> {
        self.provider.challenges().create(challenge).await
    }

    async fn find_live(
        &self,
        endorsement_id: &EndorsementId,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<AccessChallenge>, Error> {
        self.provider
            .challenges()
            .find_live(endorsement_id, email, now)
            .await
    }

    async fn find_latest_live(
        &self,
        endorsement_id: &EndorsementId,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AccessChallenge>, Error> {
        self.provider
            .challenges()
            .find_latest_live(endorsement_id, email, now)
            .await
    }

    async fn mark_used(&self, id: &ChallengeId, used_at: DateTime<Utc>) -> Result<(), Error> {
        self.provider.challenges().mark_used(id, used_at).await
    }

    async fn record_failed_attempt(
        &self,
        id: &ChallengeId,
        attempt_count: u32,
        locked_until: Option<DateTime<Utc>>,
    ) -> Result<(), Error> {
        self.provider
            .challenges()
            .record_failed_attempt(id, attempt_count, locked_until)
            .await
    }
}
