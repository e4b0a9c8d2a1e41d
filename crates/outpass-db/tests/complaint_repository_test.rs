//! Integration tests for the complaint repository using in-memory SurrealDB.

use outpass_core::models::complaint::{ComplaintKind, CreateComplaint};
use outpass_core::models::profile::ApprovalStatus;
use outpass_core::repository::ComplaintRepository;
use outpass_db::SurrealComplaintRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations.
async fn setup() -> SurrealComplaintRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    outpass_db::run_migrations(&db).await.unwrap();

    SurrealComplaintRepository::new(db)
}

#[tokio::test]
async fn create_files_a_pending_complaint() {
    let repo = setup().await;
    let student = Uuid::new_v4();

    let complaint = repo
        .create(CreateComplaint {
            student_id: student,
            kind: ComplaintKind::Maintenance,
            description: "broken fan in B-12".into(),
            location: Some("Block B".into()),
        })
        .await
        .unwrap();

    assert_eq!(complaint.student_id, student);
    assert_eq!(complaint.kind, ComplaintKind::Maintenance);
    assert_eq!(complaint.description, "broken fan in B-12");
    assert_eq!(complaint.location.as_deref(), Some("Block B"));
    assert_eq!(complaint.status, ApprovalStatus::Pending);
}

#[tokio::test]
async fn location_is_optional() {
    let repo = setup().await;

    let complaint = repo
        .create(CreateComplaint {
            student_id: Uuid::new_v4(),
            kind: ComplaintKind::Food,
            description: "mess menu never changes".into(),
            location: None,
        })
        .await
        .unwrap();
    assert!(complaint.location.is_none());
}

#[tokio::test]
async fn listing_is_newest_first_and_scoped() {
    let repo = setup().await;
    let asha = Uuid::new_v4();
    let badri = Uuid::new_v4();

    repo.create(CreateComplaint {
        student_id: asha,
        kind: ComplaintKind::Cleanliness,
        description: "first".into(),
        location: None,
    })
    .await
    .unwrap();
    repo.create(CreateComplaint {
        student_id: asha,
        kind: ComplaintKind::Facilities,
        description: "second".into(),
        location: None,
    })
    .await
    .unwrap();
    repo.create(CreateComplaint {
        student_id: badri,
        kind: ComplaintKind::Other,
        description: "someone else's".into(),
        location: None,
    })
    .await
    .unwrap();

    let complaints = repo.list_for_student(asha).await.unwrap();
    assert_eq!(complaints.len(), 2);
    assert_eq!(complaints[0].description, "second");
    assert_eq!(complaints[1].description, "first");

    let none = repo.list_for_student(Uuid::new_v4()).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn every_kind_roundtrips() {
    let repo = setup().await;
    let student = Uuid::new_v4();

    let kinds = [
        ComplaintKind::Maintenance,
        ComplaintKind::Cleanliness,
        ComplaintKind::Food,
        ComplaintKind::Facilities,
        ComplaintKind::Other,
    ];
    for kind in &kinds {
        let complaint = repo
            .create(CreateComplaint {
                student_id: student,
                kind: kind.clone(),
                description: "detail".into(),
                location: None,
            })
            .await
            .unwrap();
        assert_eq!(&complaint.kind, kind);
    }

    let listed = repo.list_for_student(student).await.unwrap();
    assert_eq!(listed.len(), kinds.len());
}
