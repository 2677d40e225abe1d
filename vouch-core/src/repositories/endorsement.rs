use async_trait::async_trait;

use crate::{
    Error,
    storage::{Endorsement, EndorsementId, EndorsementStatus, EndorsementUpdate},
};

/// Data access for endorsement records.
///
/// The record store is owned by the site's content layer; this subsystem only
/// needs lookup plus the two mutations a verified submitter may perform.
#[async_trait]
pub trait EndorsementRepository: Send + Sync + 'static {
    async fn find_by_id(&self, id: &EndorsementId) -> Result<Option<Endorsement>, Error>;

    /// Apply a submitter edit. The caller decides the resulting review
    /// status; a self-service edit always sends the record back to review.
    async fn update(
        &self,
        id: &EndorsementId,
        update: &EndorsementUpdate,
        status: EndorsementStatus,
    ) -> Result<Endorsement, Error>;

    async fn delete(&self, id: &EndorsementId) -> Result<(), Error>;
}
