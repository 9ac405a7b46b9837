//! Draw-State: participant snapshots and draw persistence for giftdraw
//!
//! This crate provides the persistence layer around the matching engine.
//! It fetches participant snapshots and stores the single current draw.
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: snapshot consistency and atomic replacement of the stored draw.
//!
//! ## Key Components
//!
//! - `ParticipantSource` / `DrawLedger`: backend-agnostic storage traits
//! - `JsonRosterSource`: participants read from a JSON roster file
//! - `SurrealHandle` / `SurrealDrawLedger`: SurrealDB-backed draw storage

mod error;
pub mod fakes;
mod handle;
mod migrations;
pub mod roster;
pub mod storage_traits;
mod surreal_ledger;

pub use error::{StateError, StorageError};
pub use handle::{CloudConfig, SurrealHandle, DEFAULT_LOCAL_DB_DIR};
pub use roster::{parse_roster, JsonRosterSource};
pub use storage_traits::{
    DrawId, DrawLedger, DrawRecord, PairRecord, ParticipantRecord, ParticipantSource,
    SnapshotDigest, StorageResult,
};
pub use surreal_ledger::SurrealDrawLedger;

/// Result type for draw-state connection operations
pub type Result<T> = std::result::Result<T, StateError>;
