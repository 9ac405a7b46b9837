//! DrawService against in-memory storage.
//!
//! Covered:
//! - Commit replaces the stored draw wholesale and ties it to the snapshot
//! - Infeasible commits write nothing and land in the failure log
//! - Preview never persists
//! - Reset, status and single-giver lookup
//! - Storage failures surface as `DrawError::Storage`

use std::sync::Arc;

use draw_state::fakes::{FailingParticipantSource, MemoryDrawLedger, MemoryParticipantSource};
use draw_state::{DrawLedger, ParticipantRecord, SnapshotDigest, SurrealDrawLedger};
use giftdraw_core::{DrawError, DrawService, FailureLog, InputError, Outcome};

fn couples() -> Vec<ParticipantRecord> {
    vec![
        ParticipantRecord::new("ana").with_name("Ana").with_partner("ben"),
        ParticipantRecord::new("ben").with_name("Ben"),
        ParticipantRecord::new("cy").with_partner("dee"),
        ParticipantRecord::new("dee"),
    ]
}

fn impossible() -> Vec<ParticipantRecord> {
    vec![
        ParticipantRecord::new("a").excluding("b").excluding("c"),
        ParticipantRecord::new("b"),
        ParticipantRecord::new("c"),
    ]
}

fn service(
    records: Vec<ParticipantRecord>,
) -> (DrawService, Arc<MemoryParticipantSource>, Arc<MemoryDrawLedger>) {
    let source = Arc::new(MemoryParticipantSource::new(records));
    let ledger = Arc::new(MemoryDrawLedger::new());
    let svc = DrawService::new(source.clone(), ledger.clone());
    (svc, source, ledger)
}

#[tokio::test]
async fn commit_stores_cross_paired_draw() {
    let (svc, _, ledger) = service(couples());
    let record = svc.commit(Some("organiser")).await.unwrap();

    assert_eq!(record.pairs.len(), 4);
    assert_eq!(record.requested_by.as_deref(), Some("organiser"));
    assert_eq!(
        record.snapshot_digest,
        SnapshotDigest::of_snapshot(&couples()).unwrap()
    );
    for (giver, partner) in [("ana", "ben"), ("ben", "ana"), ("cy", "dee"), ("dee", "cy")] {
        assert_ne!(record.recipient_of(giver), Some(partner));
    }
    assert_eq!(ledger.current().await.unwrap(), Some(record));
}

#[tokio::test]
async fn second_commit_replaces_first() {
    let (svc, source, ledger) = service(couples());
    let first = svc.commit(None).await.unwrap();

    source.set(vec![
        ParticipantRecord::new("x"),
        ParticipantRecord::new("y"),
    ]);
    let second = svc.commit(None).await.unwrap();

    assert_ne!(first.draw_id, second.draw_id);
    let stored = ledger.current().await.unwrap().unwrap();
    assert_eq!(stored.draw_id, second.draw_id);
    assert_eq!(stored.pairs.len(), 2);
    assert_eq!(stored.recipient_of("ana"), None);
}

#[tokio::test]
async fn infeasible_commit_keeps_previous_draw_and_logs() {
    let dir = tempfile::tempdir().unwrap();
    let log = FailureLog::new(dir.path().join("draw_failures.log"));
    let (svc, source, ledger) = service(couples());
    let svc = svc.with_failure_log(log.clone());

    let kept = svc.commit(None).await.unwrap();
    source.set(impossible());

    let err = svc.commit(Some("admin")).await.unwrap_err();
    let DrawError::Infeasible(diagnosis) = err else {
        panic!("expected an infeasible draw");
    };
    assert!(diagnosis.violator_set.contains("a"));

    assert_eq!(ledger.current().await.unwrap(), Some(kept));

    let entries = log.read_all().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].requested_by.as_deref(), Some("admin"));
    assert_eq!(
        entries[0].snapshot_digest,
        SnapshotDigest::of_snapshot(&impossible()).unwrap().as_str()
    );
    assert_eq!(*diagnosis, entries[0].diagnosis);
}

#[tokio::test]
async fn preview_does_not_persist() {
    let (svc, _, ledger) = service(couples());
    let plan = svc.preview().await.unwrap();
    assert_eq!(plan.assignment.len(), 4);
    assert_eq!(plan.display_name(&"ana".into()), "Ana");
    assert_eq!(plan.display_name(&"cy".into()), "cy");
    assert!(ledger.current().await.unwrap().is_none());
}

#[tokio::test]
async fn preview_of_infeasible_roster_is_an_error_without_log() {
    let dir = tempfile::tempdir().unwrap();
    let log = FailureLog::new(dir.path().join("draw_failures.log"));
    let (svc, _, _) = service(impossible());
    let svc = svc.with_failure_log(log.clone());

    assert!(matches!(
        svc.preview().await,
        Err(DrawError::Infeasible(_))
    ));
    assert!(log.read_all().unwrap().is_empty());
}

#[tokio::test]
async fn inspect_reports_options_even_when_infeasible() {
    let (svc, _, _) = service(impossible());
    let inspection = svc.inspect().await.unwrap();
    assert!(inspection.per_giver_options["a"].is_empty());
    assert_eq!(inspection.per_giver_options["b"].len(), 2);
    assert!(matches!(inspection.outcome, Outcome::Infeasible(_)));
}

#[tokio::test]
async fn reset_status_and_lookup() {
    let (svc, _, _) = service(couples());
    assert!(!svc.status().await.unwrap().exists);
    assert!(!svc.reset().await.unwrap());

    let record = svc.commit(Some("organiser")).await.unwrap();
    let status = svc.status().await.unwrap();
    assert!(status.exists);
    assert_eq!(status.draw_id, Some(record.draw_id.clone()));
    assert_eq!(status.pair_count, 4);
    assert_eq!(status.requested_by.as_deref(), Some("organiser"));

    let mine = svc.recipient_for("ana").await.unwrap();
    assert_eq!(mine.as_deref(), record.recipient_of("ana"));
    assert_eq!(svc.recipient_for("nobody").await.unwrap(), None);

    assert!(svc.reset().await.unwrap());
    assert!(!svc.status().await.unwrap().exists);
    assert_eq!(svc.recipient_for("ana").await.unwrap(), None);
}

#[tokio::test]
async fn empty_and_single_snapshots_are_rejected() {
    let (svc, source, ledger) = service(vec![]);
    assert!(matches!(svc.commit(None).await, Err(DrawError::EmptySnapshot)));

    source.set(vec![ParticipantRecord::new("solo")]);
    assert!(matches!(
        svc.commit(None).await,
        Err(DrawError::Input(InputError::TooFewParticipants { count: 1 }))
    ));

    source.set(vec![ParticipantRecord::new("a"), ParticipantRecord::new("a")]);
    assert!(matches!(
        svc.commit(None).await,
        Err(DrawError::Input(InputError::DuplicateId { .. }))
    ));
    assert!(ledger.current().await.unwrap().is_none());
}

#[tokio::test]
async fn source_failure_surfaces_as_storage_error() {
    let svc = DrawService::new(
        Arc::new(FailingParticipantSource),
        Arc::new(MemoryDrawLedger::new()),
    );
    let err = svc.commit(None).await.unwrap_err();
    assert!(matches!(err, DrawError::Storage(_)));
    assert!(err.to_string().contains("offline"));
}

#[tokio::test]
async fn commit_through_surreal_ledger() {
    let ledger = Arc::new(SurrealDrawLedger::in_memory().await.unwrap());
    let svc = DrawService::new(
        Arc::new(MemoryParticipantSource::new(couples())),
        ledger.clone(),
    );
    let record = svc.commit(None).await.unwrap();
    let stored = ledger.current().await.unwrap().unwrap();
    assert_eq!(stored.draw_id, record.draw_id);
    assert_eq!(stored.pairs, record.pairs);
    assert_eq!(
        svc.recipient_for("ben").await.unwrap().as_deref(),
        record.recipient_of("ben")
    );
}
