use std::sync::Arc;

use async_trait::async_trait;

use crate::storage_traits::{DrawLedger, DrawRecord, StorageResult};
use crate::SurrealHandle;

/// SurrealDB-backed implementation of the DrawLedger trait.
#[derive(Clone)]
pub struct SurrealDrawLedger {
    handle: Arc<SurrealHandle>,
}

impl SurrealDrawLedger {
    pub fn new(handle: Arc<SurrealHandle>) -> Self {
        Self { handle }
    }

    /// Create an in-memory instance for testing.
    pub async fn in_memory() -> crate::Result<Self> {
        Ok(Self::new(Arc::new(SurrealHandle::setup_db().await?)))
    }
}

#[async_trait]
impl DrawLedger for SurrealDrawLedger {
    async fn replace(&self, record: DrawRecord) -> StorageResult<DrawRecord> {
        self.handle.draw_replace(&record).await
    }

    async fn current(&self) -> StorageResult<Option<DrawRecord>> {
        self.handle.draw_current().await
    }

    async fn clear(&self) -> StorageResult<bool> {
        self.handle.draw_clear().await
    }
}
