//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryParticipantSource` and `MemoryDrawLedger` that satisfy
//! the trait contracts without any external dependencies.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::storage_traits::*;

// ---------------------------------------------------------------------------
// MemoryParticipantSource
// ---------------------------------------------------------------------------

/// Participant source backed by a `Vec<ParticipantRecord>`.
#[derive(Debug, Default)]
pub struct MemoryParticipantSource {
    participants: Mutex<Vec<ParticipantRecord>>,
}

impl MemoryParticipantSource {
    pub fn new(participants: Vec<ParticipantRecord>) -> Self {
        Self {
            participants: Mutex::new(participants),
        }
    }

    /// Swap the roster, as if profiles were edited between draws.
    pub fn set(&self, participants: Vec<ParticipantRecord>) {
        *lock(&self.participants) = participants;
    }
}

#[async_trait]
impl ParticipantSource for MemoryParticipantSource {
    async fn snapshot(&self) -> StorageResult<Vec<ParticipantRecord>> {
        Ok(lock(&self.participants).clone())
    }
}

// ---------------------------------------------------------------------------
// MemoryDrawLedger
// ---------------------------------------------------------------------------

/// In-memory draw ledger holding at most one `DrawRecord`.
#[derive(Debug, Default)]
pub struct MemoryDrawLedger {
    current: Mutex<Option<DrawRecord>>,
}

impl MemoryDrawLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DrawLedger for MemoryDrawLedger {
    async fn replace(&self, record: DrawRecord) -> StorageResult<DrawRecord> {
        *lock(&self.current) = Some(record.clone());
        Ok(record)
    }

    async fn current(&self) -> StorageResult<Option<DrawRecord>> {
        Ok(lock(&self.current).clone())
    }

    async fn clear(&self) -> StorageResult<bool> {
        Ok(lock(&self.current).take().is_some())
    }
}

/// A participant source that always fails; exercises error propagation.
#[derive(Debug, Default)]
pub struct FailingParticipantSource;

#[async_trait]
impl ParticipantSource for FailingParticipantSource {
    async fn snapshot(&self) -> StorageResult<Vec<ParticipantRecord>> {
        Err(StorageError::Backend("participant store offline".to_string()))
    }
}

// Writers replace the guarded value in one assignment, so a poisoned lock
// still holds a whole value.
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
