//! Integration tests for the gate-pass repository using in-memory SurrealDB.

use chrono::{Duration, Utc};
use outpass_core::error::OutpassError;
use outpass_core::models::gatepass::CreateGatePass;
use outpass_core::models::profile::{ApprovalStatus, Verdict};
use outpass_core::repository::GatePassRepository;
use outpass_db::SurrealGatePassRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations.
async fn setup() -> SurrealGatePassRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    outpass_db::run_migrations(&db).await.unwrap();

    SurrealGatePassRepository::new(db)
}

fn pass_input(student_id: Uuid, destination: &str) -> CreateGatePass {
    let exit = Utc::now() + Duration::hours(1);
    CreateGatePass {
        student_id,
        reason: "medical".into(),
        destination: destination.into(),
        exit_time: exit,
        return_time: exit + Duration::hours(4),
        contact_person: Some("Dr. Nair".into()),
    }
}

// -------------------------------------------------------------------------
// Create & fetch
// -------------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_pass() {
    let repo = setup().await;
    let student = Uuid::new_v4();

    let input = pass_input(student, "City Hospital");
    let exit_time = input.exit_time;
    let return_time = input.return_time;
    let pass = repo.create(input).await.unwrap();

    assert_eq!(pass.student_id, student);
    assert_eq!(pass.reason, "medical");
    assert_eq!(pass.destination, "City Hospital");
    assert_eq!(pass.exit_time, exit_time);
    assert_eq!(pass.return_time, return_time);
    assert_eq!(pass.contact_person.as_deref(), Some("Dr. Nair"));
    assert_eq!(pass.status, ApprovalStatus::Pending);
    assert!(pass.decision.is_none());

    let fetched = repo.get_by_id(pass.id).await.unwrap();
    assert_eq!(fetched.id, pass.id);
    assert_eq!(fetched.destination, "City Hospital");

    let err = repo.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(
        matches!(err, OutpassError::NotFound { .. }),
        "expected NotFound, got: {err:?}"
    );
}

#[tokio::test]
async fn contact_person_is_optional() {
    let repo = setup().await;

    let mut input = pass_input(Uuid::new_v4(), "Market");
    input.contact_person = None;
    let pass = repo.create(input).await.unwrap();
    assert!(pass.contact_person.is_none());

    let fetched = repo.get_by_id(pass.id).await.unwrap();
    assert!(fetched.contact_person.is_none());
}

// -------------------------------------------------------------------------
// Listings
// -------------------------------------------------------------------------

#[tokio::test]
async fn list_for_student_is_newest_first_and_scoped() {
    let repo = setup().await;
    let asha = Uuid::new_v4();
    let badri = Uuid::new_v4();

    repo.create(pass_input(asha, "first")).await.unwrap();
    repo.create(pass_input(asha, "second")).await.unwrap();
    repo.create(pass_input(badri, "other student")).await.unwrap();

    let passes = repo.list_for_student(asha).await.unwrap();
    assert_eq!(passes.len(), 2);
    assert_eq!(passes[0].destination, "second");
    assert_eq!(passes[1].destination, "first");

    let none = repo.list_for_student(Uuid::new_v4()).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn list_pending_is_oldest_first_and_skips_decided() {
    let repo = setup().await;
    let student = Uuid::new_v4();
    let warden = Uuid::new_v4();

    let first = repo.create(pass_input(student, "first")).await.unwrap();
    let second = repo.create(pass_input(student, "second")).await.unwrap();
    let third = repo.create(pass_input(student, "third")).await.unwrap();

    repo.decide(second.id, Verdict::Approved, warden).await.unwrap();

    let pending = repo.list_pending().await.unwrap();
    let ids: Vec<Uuid> = pending.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![first.id, third.id]);
}

// -------------------------------------------------------------------------
// Decisions
// -------------------------------------------------------------------------

#[tokio::test]
async fn decide_records_the_verdict_once() {
    let repo = setup().await;
    let warden = Uuid::new_v4();

    let pass = repo
        .create(pass_input(Uuid::new_v4(), "City Hospital"))
        .await
        .unwrap();

    let approved = repo.decide(pass.id, Verdict::Approved, warden).await.unwrap();
    assert_eq!(approved.status, ApprovalStatus::Approved);
    let decision = approved.decision.unwrap();
    assert_eq!(decision.decided_by, warden);

    // Already decided, so the conditional update matches nothing.
    let err = repo
        .decide(pass.id, Verdict::Rejected, warden)
        .await
        .unwrap_err();
    assert!(
        matches!(err, OutpassError::NotFound { .. }),
        "expected NotFound on repeat decision, got: {err:?}"
    );

    let unchanged = repo.get_by_id(pass.id).await.unwrap();
    assert_eq!(unchanged.status, ApprovalStatus::Approved);
    assert_eq!(unchanged.decision.unwrap().decided_by, warden);
}

#[tokio::test]
async fn deciding_an_unknown_pass_is_not_found() {
    let repo = setup().await;

    let err = repo
        .decide(Uuid::new_v4(), Verdict::Approved, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(
        matches!(err, OutpassError::NotFound { .. }),
        "expected NotFound, got: {err:?}"
    );
}

// -------------------------------------------------------------------------
// Counting
// -------------------------------------------------------------------------

#[tokio::test]
async fn counts_track_active_passes() {
    let repo = setup().await;
    let asha = Uuid::new_v4();
    let badri = Uuid::new_v4();
    let warden = Uuid::new_v4();

    let a1 = repo.create(pass_input(asha, "one")).await.unwrap();
    let a2 = repo.create(pass_input(asha, "two")).await.unwrap();
    repo.create(pass_input(badri, "three")).await.unwrap();

    // Pending and approved both count as active.
    repo.decide(a1.id, Verdict::Approved, warden).await.unwrap();
    assert_eq!(repo.count_active_for_student(asha).await.unwrap(), 2);
    assert_eq!(repo.count_active().await.unwrap(), 3);

    // A rejection retires the pass.
    repo.decide(a2.id, Verdict::Rejected, warden).await.unwrap();
    assert_eq!(repo.count_active_for_student(asha).await.unwrap(), 1);
    assert_eq!(repo.count_active().await.unwrap(), 2);

    assert_eq!(
        repo.count_by_status(ApprovalStatus::Pending).await.unwrap(),
        1
    );
    assert_eq!(
        repo.count_by_status(ApprovalStatus::Approved).await.unwrap(),
        1
    );
    assert_eq!(
        repo.count_by_status(ApprovalStatus::Rejected).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn counts_are_zero_on_an_empty_table() {
    let repo = setup().await;

    assert_eq!(repo.count_active().await.unwrap(), 0);
    assert_eq!(
        repo.count_active_for_student(Uuid::new_v4()).await.unwrap(),
        0
    );
    assert_eq!(
        repo.count_by_status(ApprovalStatus::Pending).await.unwrap(),
        0
    );
}
