//! Record and challenge types shared between services and storage backends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::generate_prefixed_id;

/// Identifier of an endorsement record in the backing document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndorsementId(String);

impl EndorsementId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn new_random() -> Self {
        Self(generate_prefixed_id("end"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for EndorsementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EndorsementId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EndorsementId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifier of a single issued challenge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChallengeId(String);

impl ChallengeId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn new_random() -> Self {
        Self(generate_prefixed_id("chl"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChallengeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review state of an endorsement on the public site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndorsementStatus {
    /// Awaiting review; not shown publicly.
    Pending,
    /// Approved and visible.
    Published,
}

/// A visitor-submitted endorsement, as stored in the document store. The
/// store itself is an external collaborator; this subsystem only reads the
/// fields it needs to authorize self-service access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endorsement {
    pub id: EndorsementId,
    pub author_name: String,
    /// Address the submitter left with the endorsement. Absent when the
    /// submitter declined to leave one, in which case self-service access is
    /// impossible by construction.
    pub author_email: Option<String>,
    pub body: String,
    pub status: EndorsementStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a verified submitter may change on their own endorsement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndorsementUpdate {
    pub author_name: Option<String>,
    pub body: Option<String>,
}

/// One issued verification-attempt window.
///
/// Rows are append-only from the subsystem's point of view: a challenge is
/// terminated by setting `used_at` (on success or supersession), never by
/// deletion, so the attempt and lockout history survives as an audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessChallenge {
    pub id: ChallengeId,
    pub endorsement_id: EndorsementId,
    /// Normalized address the code was emailed to.
    pub email: String,
    /// Context-bound digest of the code; the raw code is never persisted.
    pub otp_hash: String,
    pub expires_at: DateTime<Utc>,
    /// Set exactly once: on successful verification or on supersession by a
    /// newer challenge for the same pair. Terminal.
    pub used_at: Option<DateTime<Utc>>,
    pub attempt_count: u32,
    /// While set and in the future, verification attempts are rejected
    /// regardless of code correctness.
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub last_sent_at: DateTime<Utc>,
}

impl AccessChallenge {
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Live means eligible for verification attempts: not consumed, not
    /// superseded, not past expiry. A locked challenge is still live.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.is_used() && !self.is_expired(now)
    }

    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }
}

/// Input for persisting a fresh challenge. The store assigns the id and the
/// bookkeeping timestamps.
#[derive(Debug, Clone)]
pub struct NewAccessChallenge {
    pub endorsement_id: EndorsementId,
    pub email: String,
    pub otp_hash: String,
    pub expires_at: DateTime<Utc>,
}
