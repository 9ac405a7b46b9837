//! Global atomic counters for draw activity.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. before a CLI command exits).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters; no allocations, no locking.
pub struct Metrics {
    previews: AtomicU64,
    commits: AtomicU64,
    infeasible_draws: AtomicU64,
    resets: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            previews: AtomicU64::new(0),
            commits: AtomicU64::new(0),
            infeasible_draws: AtomicU64::new(0),
            resets: AtomicU64::new(0),
        }
    }

    pub fn inc_previews(&self) {
        self.previews.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "previews", "counter incremented");
    }

    pub fn inc_commits(&self) {
        self.commits.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "commits", "counter incremented");
    }

    pub fn inc_infeasible(&self) {
        self.infeasible_draws.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "infeasible_draws", "counter incremented");
    }

    pub fn inc_resets(&self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "resets", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            previews = self.previews(),
            commits = self.commits(),
            infeasible_draws = self.infeasible_draws(),
            resets = self.resets(),
        );
    }

    pub fn previews(&self) -> u64 {
        self.previews.load(Ordering::Relaxed)
    }

    pub fn commits(&self) -> u64 {
        self.commits.load(Ordering::Relaxed)
    }

    pub fn infeasible_draws(&self) -> u64 {
        self.infeasible_draws.load(Ordering::Relaxed)
    }

    pub fn resets(&self) -> u64 {
        self.resets.load(Ordering::Relaxed)
    }
}
