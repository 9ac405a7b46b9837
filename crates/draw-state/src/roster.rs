//! JSON roster files as a [`ParticipantSource`].
//!
//! Accepts either a bare array of participant records or an object with a
//! `participants` array:
//!
//! ```json
//! { "participants": [
//!     { "id": "1", "name": "Ada", "partner": "2" },
//!     { "id": "2", "name": "Brook" },
//!     { "id": "3", "name": "Cyd", "excluded": ["1"] }
//! ] }
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::StorageError;
use crate::storage_traits::{ParticipantRecord, ParticipantSource, StorageResult};

#[derive(Deserialize)]
#[serde(untagged)]
enum RosterDocument {
    Wrapped { participants: Vec<ParticipantRecord> },
    Bare(Vec<ParticipantRecord>),
}

/// Parse roster JSON. `origin` is only used in error messages.
pub fn parse_roster(json: &str, origin: &str) -> StorageResult<Vec<ParticipantRecord>> {
    let doc: RosterDocument =
        serde_json::from_str(json).map_err(|e| StorageError::RosterMalformed {
            path: origin.to_string(),
            reason: e.to_string(),
        })?;
    Ok(match doc {
        RosterDocument::Wrapped { participants } => participants,
        RosterDocument::Bare(participants) => participants,
    })
}

/// Reads the roster file afresh on every snapshot.
#[derive(Debug, Clone)]
pub struct JsonRosterSource {
    path: PathBuf,
}

impl JsonRosterSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ParticipantSource for JsonRosterSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn snapshot(&self) -> StorageResult<Vec<ParticipantRecord>> {
        let origin = self.path.display().to_string();
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            StorageError::RosterUnreadable {
                path: origin.clone(),
                reason: e.to_string(),
            }
        })?;
        let participants = parse_roster(&content, &origin)?;
        debug!(count = participants.len(), "roster loaded");
        Ok(participants)
    }
}
