//! SurrealDB schema migrations and initialization
//!
//! Sets up the `draws` table. Safe to call on every connection.

use crate::error::StateError;
use crate::Result;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

/// Initialize all giftdraw tables in SurrealDB
///
/// This should be called once on first connection to set up the schema.
/// Safe to call multiple times (idempotent).
pub async fn init_schema(db: &Surreal<Any>) -> Result<()> {
    info!("Initializing giftdraw SurrealDB schema");
    init_draws_table(db).await?;
    info!("giftdraw schema initialization complete");
    Ok(())
}

/// Initialize `draws` table
///
/// Schema:
/// ```text
/// TABLE draws {
///   draw_id:          STRING (unique)
///   snapshot_digest:  STRING
///   pairs:            ARRAY<{ giver: STRING, recipient: STRING }>
///   requested_by:     STRING?
///   created_at:       DATETIME
/// }
/// ```
///
/// Constraints:
/// - at most one row exists; `replace` deletes and creates inside one
///   transaction (enforced via app logic)
/// - pairs are never updated in place
async fn init_draws_table(db: &Surreal<Any>) -> Result<()> {
    debug!("Initializing draws table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS draws SCHEMALESS;

        -- A draw id is issued once
        DEFINE INDEX IF NOT EXISTS idx_draw_id ON TABLE draws COLUMNS draw_id UNIQUE;
    "#;

    db.query(sql)
        .await
        .map_err(|e| StateError::SchemaSetup(format!("draws table: {e}")))?
        .check()
        .map_err(|e| StateError::SchemaSetup(format!("draws table: {e}")))?;

    Ok(())
}
