//! Repository traits for the data access layer
//!
//! Storage backends implement the individual `*Repository` traits plus the
//! provider traits, and expose everything through [`RepositoryProvider`].
//! Services only ever see these traits; the document store behind them is an
//! external collaborator.

pub mod adapter;
pub mod challenge;
pub mod endorsement;

pub use adapter::{ChallengeRepositoryAdapter, EndorsementRepositoryAdapter};
pub use challenge::ChallengeRepository;
pub use endorsement::EndorsementRepository;

use async_trait::async_trait;

use crate::Error;

/// Provider trait for endorsement record access.
pub trait EndorsementRepositoryProvider: Send + Sync + 'static {
    type EndorsementRepo: EndorsementRepository;

    fn endorsements(&self) -> &Self::EndorsementRepo;
}

/// Provider trait for challenge storage access.
pub trait ChallengeRepositoryProvider: Send + Sync + 'static {
    type ChallengeRepo: ChallengeRepository;

    fn challenges(&self) -> &Self::ChallengeRepo;
}

/// Supertrait storage backends implement to provide all repositories.
#[async_trait]
pub trait RepositoryProvider:
    EndorsementRepositoryProvider + ChallengeRepositoryProvider
{
    /// Health check for the backing store.
    async fn health_check(&self) -> Result<(), Error>;
}
