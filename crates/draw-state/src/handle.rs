//! SurrealDB Handle - Connection and Operations
//!
//! Manages connection and provides the draw operations:
//! - draw_replace (transactional clear-then-write)
//! - draw_current / draw_clear
//!
//! Supports in-memory, local file (SurrealKV) and cloud (WebSocket) connections.

use std::path::Path;

use crate::error::{StateError, StorageError};
use crate::migrations;
use crate::storage_traits::{DrawId, DrawRecord, PairRecord, SnapshotDigest, StorageResult};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::{Database, Root};
use surrealdb::sql::Datetime as SurrealDatetime;
use surrealdb::Surreal;
use tracing::{debug, info, instrument};

const DEFAULT_NAMESPACE: &str = "giftdraw";
const DEFAULT_DATABASE: &str = "main";

/// Directory used for local persistence when no database is configured.
pub const DEFAULT_LOCAL_DB_DIR: &str = ".giftdraw/db";

/// Configuration for SurrealDB Cloud connection
#[derive(Debug, Clone)]
pub struct CloudConfig {
    /// WebSocket endpoint URL (e.g., "wss://xxx.aws-use1.surrealdb.cloud")
    pub endpoint: String,
    /// Database username
    pub username: String,
    /// Database password
    pub password: String,
    /// Namespace (default: "giftdraw")
    pub namespace: String,
    /// Database name (default: "main")
    pub database: String,
    /// Whether this is a root user (true) or database user (false)
    pub is_root: bool,
}

impl CloudConfig {
    /// Create a new cloud configuration for a database user
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            is_root: false,
        }
    }

    /// Set custom namespace
    pub fn with_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = ns.into();
        self
    }

    /// Set custom database
    pub fn with_database(mut self, db: impl Into<String>) -> Self {
        self.database = db.into();
        self
    }

    /// Set whether this is a root user
    pub fn with_root(mut self, is_root: bool) -> Self {
        self.is_root = is_root;
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - SURREALDB_ENDPOINT (required)
    /// - SURREALDB_USERNAME (required)
    /// - SURREALDB_PASSWORD (required)
    /// - SURREALDB_NAMESPACE (optional, default: "giftdraw")
    /// - SURREALDB_DATABASE (optional, default: "main")
    /// - SURREALDB_ROOT (optional, default: "false") - set to "true" for root users
    pub fn from_env() -> std::result::Result<Self, String> {
        let endpoint =
            std::env::var("SURREALDB_ENDPOINT").map_err(|_| "SURREALDB_ENDPOINT not set")?;
        let username =
            std::env::var("SURREALDB_USERNAME").map_err(|_| "SURREALDB_USERNAME not set")?;
        let password =
            std::env::var("SURREALDB_PASSWORD").map_err(|_| "SURREALDB_PASSWORD not set")?;
        let mut config = Self::new(endpoint, username, password);
        if let Ok(ns) = std::env::var("SURREALDB_NAMESPACE") {
            config = config.with_namespace(ns);
        }
        if let Ok(db) = std::env::var("SURREALDB_DATABASE") {
            config = config.with_database(db);
        }
        let is_root = std::env::var("SURREALDB_ROOT")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        Ok(config.with_root(is_root))
    }
}

/// SurrealDB connection handle for giftdraw
#[derive(Clone)]
pub struct SurrealHandle {
    db: Surreal<Any>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DbDrawRecord {
    draw_id: DrawId,
    snapshot_digest: SnapshotDigest,
    pairs: Vec<PairRecord>,
    requested_by: Option<String>,
    created_at: SurrealDatetime,
}

impl DbDrawRecord {
    fn from_draw_record(record: &DrawRecord) -> Self {
        Self {
            draw_id: record.draw_id.clone(),
            snapshot_digest: record.snapshot_digest.clone(),
            pairs: record.pairs.clone(),
            requested_by: record.requested_by.clone(),
            created_at: SurrealDatetime::from(record.created_at),
        }
    }

    fn into_draw_record(self) -> DrawRecord {
        DrawRecord {
            draw_id: self.draw_id,
            snapshot_digest: self.snapshot_digest,
            pairs: self.pairs,
            requested_by: self.requested_by,
            created_at: DateTime::<Utc>::from(self.created_at),
        }
    }
}

impl SurrealHandle {
    /// Connect to SurrealDB in-memory and set up schema
    #[instrument(skip_all)]
    pub async fn setup_db() -> Result<Self> {
        info!("Connecting to SurrealDB (in-memory)");
        let handle = Self::connect_url("mem://").await?;
        info!("SurrealDB connected and schema initialized");
        Ok(handle)
    }

    /// Connect to a local SurrealKV database stored under `dir`.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub async fn setup_local(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| {
            StateError::Connection(format!(
                "Failed to create database directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        let url = format!("surrealkv://{}", dir.display());
        info!("Using local persistence: {}", url);
        Self::connect_url(&url).await
    }

    /// Connect to SurrealDB Cloud
    ///
    /// # Example
    /// ```ignore
    /// let config = CloudConfig::new(
    ///     "wss://xxx.aws-use1.surrealdb.cloud",
    ///     "your_username",
    ///     "your_password",
    /// );
    /// let handle = SurrealHandle::setup_cloud(config).await?;
    /// ```
    #[instrument(skip(config), fields(endpoint = %config.endpoint, namespace = %config.namespace, database = %config.database))]
    pub async fn setup_cloud(config: CloudConfig) -> Result<Self> {
        info!("Connecting to SurrealDB Cloud (root={})", config.is_root);

        let db = surrealdb::engine::any::connect(&config.endpoint)
            .await
            .map_err(|e| {
                StateError::Connection(format!("Failed to connect to {}: {}", config.endpoint, e))
            })?;

        if config.is_root {
            db.signin(Root {
                username: &config.username,
                password: &config.password,
            })
            .await
            .map_err(|e| StateError::Connection(format!("Root authentication failed: {}", e)))?;
        } else {
            db.signin(Database {
                namespace: &config.namespace,
                database: &config.database,
                username: &config.username,
                password: &config.password,
            })
            .await
            .map_err(|e| {
                StateError::Connection(format!("Database authentication failed: {}", e))
            })?;
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .map_err(|e| {
                StateError::Connection(format!("Failed to select namespace/database: {}", e))
            })?;

        migrations::init_schema(&db).await?;

        info!("SurrealDB Cloud connected and schema initialized");
        Ok(SurrealHandle { db })
    }

    /// Connect using environment variables
    ///
    /// If SURREALDB_ENDPOINT is set, connects to cloud.
    /// If SURREALDB_URL is set, connects to that URL.
    /// Otherwise, falls back to local persistence in `.giftdraw/db`.
    #[instrument(skip_all)]
    pub async fn setup_from_env() -> Result<Self> {
        if let Ok(config) = CloudConfig::from_env() {
            info!("Cloud config found, connecting to SurrealDB Cloud");
            return Self::setup_cloud(config).await;
        }

        if let Ok(url) = std::env::var("SURREALDB_URL") {
            info!("SURREALDB_URL found, connecting to {}", url);
            return Self::connect_url(&url).await;
        }

        info!("No database configured, using local persistence");
        Self::setup_local(DEFAULT_LOCAL_DB_DIR).await
    }

    async fn connect_url(url: &str) -> Result<Self> {
        let db = surrealdb::engine::any::connect(url)
            .await
            .map_err(|e| StateError::Connection(format!("Failed to connect to {}: {}", url, e)))?;

        db.use_ns(DEFAULT_NAMESPACE)
            .use_db(DEFAULT_DATABASE)
            .await
            .map_err(|e| StateError::Connection(e.to_string()))?;

        migrations::init_schema(&db).await?;
        Ok(SurrealHandle { db })
    }

    // ========== Draw Operations ==========

    /// Replace the stored draw in a single transaction.
    #[instrument(skip(self, record), fields(draw_id = %record.draw_id, pairs = record.pairs.len()))]
    pub async fn draw_replace(&self, record: &DrawRecord) -> StorageResult<DrawRecord> {
        let row = DbDrawRecord::from_draw_record(record);

        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE draws; \
                 CREATE draws CONTENT $draw; \
                 COMMIT TRANSACTION;",
            )
            .bind(("draw", row))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?
            .check()
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        debug!("Draw replaced");
        Ok(record.clone())
    }

    /// Get the stored draw, if any.
    #[instrument(skip(self))]
    pub async fn draw_current(&self) -> StorageResult<Option<DrawRecord>> {
        let mut result = self
            .db
            .query("SELECT * FROM draws ORDER BY created_at DESC LIMIT 1")
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<DbDrawRecord> = result
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(rows.into_iter().next().map(DbDrawRecord::into_draw_record))
    }

    /// Delete the stored draw. Returns whether one existed.
    #[instrument(skip(self))]
    pub async fn draw_clear(&self) -> StorageResult<bool> {
        let mut result = self
            .db
            .query("DELETE draws RETURN BEFORE")
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let removed: Vec<DbDrawRecord> = result
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        debug!(removed = removed.len(), "Draw cleared");
        Ok(!removed.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloud_config_defaults_to_database_user() {
        let config = CloudConfig::new("wss://db.example", "santa", "secret");
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
        assert_eq!(config.database, DEFAULT_DATABASE);
        assert!(!config.is_root);
    }

    #[test]
    fn cloud_config_builders_override_defaults() {
        let config = CloudConfig::new("wss://db.example", "santa", "secret")
            .with_namespace("office")
            .with_database("2026")
            .with_root(true);
        assert_eq!(config.namespace, "office");
        assert_eq!(config.database, "2026");
        assert!(config.is_root);
    }
}
