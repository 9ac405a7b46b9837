//! Draw orchestration: snapshot → engine → atomic replace.
//!
//! [`DrawService`] is the only place where the pure matching engine meets
//! storage. It fetches one participant snapshot, runs [`crate::matching::solve`]
//! on it, and on success hands the whole assignment to the ledger as a single
//! [`DrawRecord`]. Nothing is written when the engine fails.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use draw_state::{
    DrawId, DrawLedger, DrawRecord, PairRecord, ParticipantRecord, ParticipantSource,
    SnapshotDigest, StorageError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{instrument, warn};

use crate::failure_log::{FailureEntry, FailureLog};
use crate::matching::{
    solve, solve_graph, Assignment, Diagnosis, EligibilityGraph, EngineError, InputError,
    InvariantViolation, Outcome, Participant, ParticipantId,
};
use crate::metrics::METRICS;
use crate::obs;

/// Errors produced by [`DrawService`].
#[derive(Debug, Error)]
pub enum DrawError {
    /// The participant snapshot is not a valid engine input.
    #[error("invalid participants: {0}")]
    Input(#[from] InputError),

    /// No draw satisfies every exclusion.
    #[error(
        "no valid draw: {} of {} givers can be matched",
        .0.matched_count,
        .0.participant_count
    )]
    Infeasible(Box<Diagnosis>),

    /// The engine broke a post-condition. Never persisted.
    #[error("draw rejected by post-check: {0}")]
    Invariant(#[from] InvariantViolation),

    /// The participant source returned nobody.
    #[error("participant snapshot is empty")]
    EmptySnapshot,

    /// Snapshot fetch or ledger access failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<EngineError> for DrawError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Input(e) => DrawError::Input(e),
            EngineError::Invariant(e) => DrawError::Invariant(e),
        }
    }
}

/// Convenience result alias.
pub type DrawResult<T> = std::result::Result<T, DrawError>;

/// Convert stored participant records into engine participants.
///
/// Each participant excludes their explicit `excluded` list and their
/// partner. Partner links are mirrored: naming B as partner on A's record
/// also makes B exclude A.
pub fn participants_from_snapshot(records: &[ParticipantRecord]) -> Vec<Participant> {
    let mut mirrored: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for record in records {
        if let Some(partner) = partner_of(record) {
            mirrored.entry(partner).or_default().push(record.id.as_str());
        }
    }

    records
        .iter()
        .map(|record| {
            let mut p = Participant::new(record.id.as_str())
                .with_exclusions(record.excluded.iter().map(String::as_str));
            if let Some(partner) = partner_of(record) {
                p = p.excluding(partner);
            }
            if let Some(back) = mirrored.get(record.id.as_str()) {
                p = p.with_exclusions(back.iter().copied());
            }
            p
        })
        .collect()
}

fn partner_of(record: &ParticipantRecord) -> Option<&str> {
    record
        .partner
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
}

/// A computed but unsaved draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawPlan {
    pub snapshot_digest: SnapshotDigest,
    pub assignment: Assignment,
    /// Display names for participants that have one.
    pub names: BTreeMap<ParticipantId, String>,
}

impl DrawPlan {
    /// Display name for `id`, falling back to the id itself.
    pub fn display_name<'a>(&'a self, id: &'a ParticipantId) -> &'a str {
        self.names.get(id).map(String::as_str).unwrap_or(id.as_str())
    }
}

/// Full eligibility picture of the current snapshot, feasible or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inspection {
    pub snapshot_digest: SnapshotDigest,
    pub per_giver_options: BTreeMap<ParticipantId, Vec<ParticipantId>>,
    pub outcome: Outcome,
}

/// Summary of the stored draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawStatus {
    pub exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw_id: Option<DrawId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_digest: Option<SnapshotDigest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<String>,
    pub pair_count: usize,
}

impl DrawStatus {
    fn of(record: Option<&DrawRecord>) -> Self {
        match record {
            Some(r) => Self {
                exists: true,
                draw_id: Some(r.draw_id.clone()),
                created_at: Some(r.created_at),
                snapshot_digest: Some(r.snapshot_digest.clone()),
                requested_by: r.requested_by.clone(),
                pair_count: r.pairs.len(),
            },
            None => Self {
                exists: false,
                draw_id: None,
                created_at: None,
                snapshot_digest: None,
                requested_by: None,
                pair_count: 0,
            },
        }
    }
}

struct Snapshot {
    digest: SnapshotDigest,
    participants: Vec<Participant>,
    names: BTreeMap<ParticipantId, String>,
}

/// Runs draws against a participant source and stores them in a ledger.
pub struct DrawService {
    source: Arc<dyn ParticipantSource>,
    ledger: Arc<dyn DrawLedger>,
    failure_log: Option<FailureLog>,
}

impl DrawService {
    pub fn new(source: Arc<dyn ParticipantSource>, ledger: Arc<dyn DrawLedger>) -> Self {
        Self {
            source,
            ledger,
            failure_log: None,
        }
    }

    /// Record every infeasible commit in `log`.
    pub fn with_failure_log(mut self, log: FailureLog) -> Self {
        self.failure_log = Some(log);
        self
    }

    async fn load_snapshot(&self) -> DrawResult<Snapshot> {
        let records = self.source.snapshot().await?;
        if records.is_empty() {
            return Err(DrawError::EmptySnapshot);
        }
        let digest = SnapshotDigest::of_snapshot(&records)?;
        obs::emit_snapshot_loaded(records.len(), digest.as_str());

        let names = records
            .iter()
            .filter_map(|r| {
                r.name
                    .as_ref()
                    .map(|n| (ParticipantId::from(r.id.as_str()), n.clone()))
            })
            .collect();
        Ok(Snapshot {
            digest,
            participants: participants_from_snapshot(&records),
            names,
        })
    }

    fn run_engine(participants: &[Participant]) -> DrawResult<Outcome> {
        solve(participants).map_err(Self::engine_failure)
    }

    fn engine_failure(err: EngineError) -> DrawError {
        if let EngineError::Invariant(v) = &err {
            obs::emit_invariant_violation(v);
        }
        DrawError::from(err)
    }

    /// Compute a draw for the current snapshot without storing it.
    #[instrument(name = "giftdraw.draw", skip(self), fields(operation = "preview"))]
    pub async fn preview(&self) -> DrawResult<DrawPlan> {
        obs::emit_draw_requested("preview", None);
        METRICS.inc_previews();

        let snapshot = self.load_snapshot().await?;
        match Self::run_engine(&snapshot.participants)? {
            Outcome::Matched(assignment) => Ok(DrawPlan {
                snapshot_digest: snapshot.digest,
                assignment,
                names: snapshot.names,
            }),
            Outcome::Infeasible(diagnosis) => {
                METRICS.inc_infeasible();
                obs::emit_draw_infeasible(
                    diagnosis.participant_count,
                    diagnosis.matched_count,
                    diagnosis.violator_set.len(),
                );
                Err(DrawError::Infeasible(Box::new(diagnosis)))
            }
        }
    }

    /// Eligible recipients per giver plus the engine outcome, for diagnostics.
    /// Infeasibility is part of the result here, not an error.
    #[instrument(name = "giftdraw.draw", skip(self), fields(operation = "inspect"))]
    pub async fn inspect(&self) -> DrawResult<Inspection> {
        obs::emit_draw_requested("inspect", None);

        let snapshot = self.load_snapshot().await?;
        let graph = EligibilityGraph::build(&snapshot.participants).map_err(DrawError::from)?;
        let outcome =
            solve_graph(&snapshot.participants, &graph).map_err(Self::engine_failure)?;
        Ok(Inspection {
            snapshot_digest: snapshot.digest,
            per_giver_options: graph.options_by_giver(),
            outcome,
        })
    }

    /// Compute a draw and replace the stored one with it.
    ///
    /// On infeasibility nothing is written; the diagnosis is appended to the
    /// failure log (when configured) and returned in the error.
    #[instrument(name = "giftdraw.draw", skip(self), fields(operation = "commit"))]
    pub async fn commit(&self, requested_by: Option<&str>) -> DrawResult<DrawRecord> {
        obs::emit_draw_requested("commit", requested_by);

        let snapshot = self.load_snapshot().await?;
        let assignment = match Self::run_engine(&snapshot.participants)? {
            Outcome::Matched(assignment) => assignment,
            Outcome::Infeasible(diagnosis) => {
                METRICS.inc_infeasible();
                obs::emit_draw_infeasible(
                    diagnosis.participant_count,
                    diagnosis.matched_count,
                    diagnosis.violator_set.len(),
                );
                self.record_failure(&snapshot.digest, requested_by, &diagnosis);
                return Err(DrawError::Infeasible(Box::new(diagnosis)));
            }
        };

        let pairs = assignment
            .into_pairs()
            .into_iter()
            .map(|p| PairRecord {
                giver: p.giver.as_str().to_string(),
                recipient: p.recipient.as_str().to_string(),
            })
            .collect();
        let record = DrawRecord::new(snapshot.digest, pairs, requested_by.map(str::to_string));
        let stored = self.ledger.replace(record).await?;

        METRICS.inc_commits();
        obs::emit_draw_committed(
            &stored.draw_id.to_string(),
            stored.pairs.len(),
            stored.snapshot_digest.as_str(),
        );
        Ok(stored)
    }

    fn record_failure(
        &self,
        digest: &SnapshotDigest,
        requested_by: Option<&str>,
        diagnosis: &Diagnosis,
    ) {
        let Some(log) = &self.failure_log else {
            return;
        };
        let entry = FailureEntry::new(digest.as_str(), requested_by, diagnosis.clone());
        if let Err(e) = log.append(&entry) {
            warn!(path = ?log.path(), error = %e, "failed to append to failure log");
        }
    }

    /// Delete the stored draw. Returns whether one existed.
    #[instrument(name = "giftdraw.draw", skip(self), fields(operation = "reset"))]
    pub async fn reset(&self) -> DrawResult<bool> {
        let existed = self.ledger.clear().await?;
        METRICS.inc_resets();
        obs::emit_draw_reset(existed);
        Ok(existed)
    }

    pub async fn status(&self) -> DrawResult<DrawStatus> {
        let current = self.ledger.current().await?;
        Ok(DrawStatus::of(current.as_ref()))
    }

    /// The one recipient drawn for `giver`, if a draw exists and includes them.
    pub async fn recipient_for(&self, giver: &str) -> DrawResult<Option<String>> {
        Ok(self.ledger.recipient_for(giver).await?)
    }
}
