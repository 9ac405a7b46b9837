//! Structured lifecycle events for draws.
//!
//! Every draw operation runs inside a `giftdraw.draw` span and emits one
//! event per lifecycle step (`draw.requested`, `draw.snapshot_loaded`,
//! `draw.committed`, `draw.infeasible`, `draw.reset`). A broken
//! post-condition is reported as `draw.invariant_violation` at `error!`.
//!
//! Filter with `RUST_LOG`; see [`crate::telemetry::init_tracing`] for JSON
//! output.

use tracing::{error, info, warn};

/// Emit event: someone asked for a draw (preview or commit).
pub fn emit_draw_requested(operation: &str, requested_by: Option<&str>) {
    info!(
        event = "draw.requested",
        operation = %operation,
        requested_by = requested_by.unwrap_or("-"),
    );
}

/// Emit event: participant snapshot fetched.
pub fn emit_snapshot_loaded(participants: usize, snapshot_digest: &str) {
    info!(
        event = "draw.snapshot_loaded",
        participants = participants,
        snapshot_digest = %snapshot_digest,
    );
}

/// Emit event: a new draw replaced the stored one.
pub fn emit_draw_committed(draw_id: &str, pairs: usize, snapshot_digest: &str) {
    info!(
        event = "draw.committed",
        draw_id = %draw_id,
        pairs = pairs,
        snapshot_digest = %snapshot_digest,
    );
}

/// Emit event: no valid draw exists for the current snapshot.
pub fn emit_draw_infeasible(participants: usize, matched: usize, violators: usize) {
    warn!(
        event = "draw.infeasible",
        participants = participants,
        matched = matched,
        violators = violators,
    );
}

/// Emit event: stored draw cleared.
pub fn emit_draw_reset(existed: bool) {
    info!(event = "draw.reset", existed = existed);
}

/// Emit event: the engine returned an assignment that failed its post-check.
pub fn emit_invariant_violation(error: &dyn std::fmt::Display) {
    error!(event = "draw.invariant_violation", error = %error);
}
