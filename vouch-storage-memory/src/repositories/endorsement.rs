use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use vouch_core::{
    Error, EndorsementRepository,
    error::StorageError,
    storage::{Endorsement, EndorsementId, EndorsementStatus, EndorsementUpdate},
};

#[derive(Default)]
pub struct MemoryEndorsementRepository {
    records: DashMap<EndorsementId, Endorsement>,
}

impl MemoryEndorsementRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record, as the site's submission flow would. Not part of the
    /// access subsystem's repository trait.
    pub fn insert(&self, endorsement: Endorsement) {
        self.records.insert(endorsement.id.clone(), endorsement);
    }
}

#[async_trait]
impl EndorsementRepository for MemoryEndorsementRepository {
    async fn find_by_id(&self, id: &EndorsementId) -> Result<Option<Endorsement>, Error> {
        Ok(self.records.get(id).map(|r| r.clone()))
    }

    async fn update(
        &self,
        id: &EndorsementId,
        update: &EndorsementUpdate,
        status: EndorsementStatus,
    ) -> Result<Endorsement, Error> {
        let mut record = self
            .records
            .get_mut(id)
            .ok_or(Error::Storage(StorageError::NotFound))?;

        if let Some(author_name) = &update.author_name {
            record.author_name = author_name.clone();
        }
        if let Some(body) = &update.body {
            record.body = body.clone();
        }
        record.status = status;
        record.updated_at = Utc::now();

        Ok(record.clone())
    }

    async fn delete(&self, id: &EndorsementId) -> Result<(), Error> {
        self.records
            .remove(id)
            .map(|_| ())
            .ok_or(Error::Storage(StorageError::NotFound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endorsement(id: &str) -> Endorsement {
        let now = Utc::now();
        Endorsement {
            id: EndorsementId::new(id),
            author_name: "Ada".to_string(),
            author_email: Some("ada@example.com".to_string()),
            body: "Great to work with.".to_string(),
            status: EndorsementStatus::Published,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_find_update_delete() {
        let repo = MemoryEndorsementRepository::new();
        let id = EndorsementId::new("end_1");
        repo.insert(endorsement("end_1"));

        assert!(repo.find_by_id(&id).await.unwrap().is_some());

        let updated = repo
            .update(
                &id,
                &EndorsementUpdate {
                    body: Some("Revised.".to_string()),
                    ..Default::default()
                },
                EndorsementStatus::Pending,
            )
            .await
            .unwrap();
        assert_eq!(updated.body, "Revised.");
        assert_eq!(updated.status, EndorsementStatus::Pending);
        assert_eq!(updated.author_name, "Ada");

        repo.delete(&id).await.unwrap();
        assert!(repo.find_by_id(&id).await.unwrap().is_none());
        assert!(repo.delete(&id).await.is_err());
    }
}
