//! Storage trait definitions for giftdraw
//!
//! These traits define the two storage seams of a draw:
//! - `ParticipantSource`: where the participant snapshot comes from
//! - `DrawLedger`: where the single current draw lives (replace wholesale)
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// ---------------------------------------------------------------------------
// ParticipantSource: participant snapshots
// ---------------------------------------------------------------------------

/// One participant as held by whatever store owns profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    /// Stable identity (profile id).
    pub id: String,
    /// Display name, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Declared partner; never drawn as this participant's recipient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner: Option<String>,
    /// Further identities this participant must not be assigned.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<String>,
}

impl ParticipantRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            partner: None,
            excluded: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_partner(mut self, partner: impl Into<String>) -> Self {
        self.partner = Some(partner.into());
        self
    }

    pub fn excluding(mut self, id: impl Into<String>) -> Self {
        self.excluded.push(id.into());
        self
    }
}

/// Supplies a consistent, already-fetched snapshot of participants.
#[async_trait]
pub trait ParticipantSource: Send + Sync {
    /// Return every participant, in a stable order.
    async fn snapshot(&self) -> StorageResult<Vec<ParticipantRecord>>;
}

// ---------------------------------------------------------------------------
// DrawLedger: the stored draw
// ---------------------------------------------------------------------------

/// SHA-256 digest of the participant snapshot a draw was computed from.
///
/// The inner field is private to guarantee the string is always valid
/// lowercase hex produced by `of_snapshot` or validated via `TryFrom<String>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SnapshotDigest(String);

impl SnapshotDigest {
    /// Digest the canonical JSON encoding of a snapshot.
    pub fn of_snapshot(participants: &[ParticipantRecord]) -> StorageResult<Self> {
        use sha2::Digest;
        let bytes = serde_json::to_vec(participants)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(SnapshotDigest(hex::encode(hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 hex chars).
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl TryFrom<String> for SnapshotDigest {
    type Error = StorageError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        if s.len() != 64 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(StorageError::InvalidDigest { digest: s });
        }
        Ok(SnapshotDigest(s.to_ascii_lowercase()))
    }
}

impl From<SnapshotDigest> for String {
    fn from(d: SnapshotDigest) -> Self {
        d.0
    }
}

impl std::fmt::Display for SnapshotDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a committed draw
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrawId(pub String);

impl DrawId {
    /// Generate a new random DrawId
    pub fn new() -> Self {
        DrawId(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for DrawId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DrawId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One giver → recipient pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairRecord {
    pub giver: String,
    pub recipient: String,
}

/// A committed draw. Stored and replaced as one artifact, never row by row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub draw_id: DrawId,
    pub snapshot_digest: SnapshotDigest,
    pub pairs: Vec<PairRecord>,
    /// Who asked for the draw (free-form, for the audit log).
    pub requested_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DrawRecord {
    /// Create a fresh record stamped with a new id and the current time.
    pub fn new(
        snapshot_digest: SnapshotDigest,
        pairs: Vec<PairRecord>,
        requested_by: Option<String>,
    ) -> Self {
        Self {
            draw_id: DrawId::new(),
            snapshot_digest,
            pairs,
            requested_by,
            created_at: Utc::now(),
        }
    }

    /// The recipient drawn for `giver`, if `giver` took part.
    pub fn recipient_of(&self, giver: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|p| p.giver == giver)
            .map(|p| p.recipient.as_str())
    }
}

/// Persistence for the current draw.
///
/// Guarantees:
/// - At most one draw is stored at any time.
/// - `replace` is clear-then-write as one atomic step: readers see either
///   the previous draw or the new one, never an empty or partial draw.
/// - `clear` removes the stored draw; it is a no-op when none exists.
#[async_trait]
pub trait DrawLedger: Send + Sync {
    /// Replace whatever draw is stored with `record`.
    async fn replace(&self, record: DrawRecord) -> StorageResult<DrawRecord>;

    /// The stored draw, if any.
    async fn current(&self) -> StorageResult<Option<DrawRecord>>;

    /// Delete the stored draw. Returns whether one existed.
    async fn clear(&self) -> StorageResult<bool>;

    /// The recipient assigned to a single giver. Never exposes other pairs.
    async fn recipient_for(&self, giver: &str) -> StorageResult<Option<String>> {
        Ok(self
            .current()
            .await?
            .and_then(|draw| draw.recipient_of(giver).map(str::to_string)))
    }
}
