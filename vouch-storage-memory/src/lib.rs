//! In-process storage backend for vouch.
//!
//! Holds endorsements and challenges in concurrent maps. Challenges follow
//! the same append-only discipline a real document store is expected to keep:
//! rows are terminated by setting `used_at`, never removed, so attempt and
//! lockout history stays inspectable.

mod repositories;

pub use repositories::{MemoryChallengeRepository, MemoryEndorsementRepository};

use async_trait::async_trait;
use vouch_core::{
    Error,
    repositories::{
        ChallengeRepositoryProvider, EndorsementRepositoryProvider, RepositoryProvider,
    },
};

#[derive(Default)]
pub struct MemoryRepositoryProvider {
    endorsements: MemoryEndorsementRepository,
    challenges: MemoryChallengeRepository,
}

impl MemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EndorsementRepositoryProvider for MemoryRepositoryProvider {
    type EndorsementRepo = MemoryEndorsementRepository;

    fn endorsements(&self) -> &Self::EndorsementRepo {
        &self.endorsements
    }
}

impl ChallengeRepositoryProvider for MemoryRepositoryProvider {
    type ChallengeRepo = MemoryChallengeRepository;

    fn challenges(&self) -> &Self::ChallengeRepo {
        &self.challenges
    }
}

#[async_trait]
impl RepositoryProvider for MemoryRepositoryProvider {
    async fn health_check(&self) -> Result<(), Error> {
        Ok(())
    }
}
