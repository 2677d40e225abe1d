use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use vouch_core::{
    ChallengeRepository, Error,
    storage::{AccessChallenge, ChallengeId, EndorsementId, NewAccessChallenge},
};

struct StoredChallenge {
    /// Monotonic insertion order; breaks `created_at` ties when picking the
    /// latest live row.
    seq: u64,
    row: AccessChallenge,
}

#[derive(Default)]
pub struct MemoryChallengeRepository {
    rows: DashMap<ChallengeId, StoredChallenge>,
    next_seq: AtomicU64,
}

impl MemoryChallengeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every row ever written for a pair, in insertion order. Test hook for
    /// asserting on the audit trail.
    pub fn history(&self, endorsement_id: &EndorsementId, email: &str) -> Vec<AccessChallenge> {
        let mut rows: Vec<(u64, AccessChallenge)> = self
            .rows
            .iter()
            .filter(|entry| {
                entry.row.endorsement_id == *endorsement_id && entry.row.email == email
            })
            .map(|entry| (entry.seq, entry.row.clone()))
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);
        rows.into_iter().map(|(_, row)| row).collect()
    }
}

#[async_trait]
impl ChallengeRepository for MemoryChallengeRepository {
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

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.rows.insert(
            row.id.clone(),
            StoredChallenge {
                seq,
                row: row.clone(),
            },
        );

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
            .iter()
            .filter(|entry| {
                entry.row.endorsement_id == *endorsement_id
                    && entry.row.email == email
                    && entry.row.is_live(now)
            })
            .map(|entry| entry.row.clone())
            .collect())
    }

    async fn find_latest_live(
        &self,
        endorsement_id: &EndorsementId,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AccessChallenge>, Error> {
        Ok(self
            .rows
            .iter()
            .filter(|entry| {
                entry.row.endorsement_id == *endorsement_id
                    && entry.row.email == email
                    && entry.row.is_live(now)
            })
            .max_by_key(|entry| entry.seq)
            .map(|entry| entry.row.clone()))
    }

    async fn mark_used(&self, id: &ChallengeId, used_at: DateTime<Utc>) -> Result<(), Error> {
        if let Some(mut entry) = self.rows.get_mut(id)
            && entry.row.used_at.is_none()
        {
            entry.row.used_at = Some(used_at);
        }
        Ok(())
    }

    async fn record_failed_attempt(
        &self,
        id: &ChallengeId,
        attempt_count: u32,
        locked_until: Option<DateTime<Utc>>,
    ) -> Result<(), Error> {
        if let Some(mut entry) = self.rows.get_mut(id) {
            entry.row.attempt_count = attempt_count;
            entry.row.locked_until = locked_until;
        }
        Ok(())
    }
}
