//! Integration tests for the profile repository using in-memory SurrealDB.

use outpass_core::error::OutpassError;
use outpass_core::models::profile::{
    ApprovalStatus, ChildLink, CreateProfile, Relationship, Role, RoleDetails, Shift, Verdict,
};
use outpass_core::repository::ProfileRepository;
use outpass_db::SurrealProfileRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations.
async fn setup() -> (SurrealProfileRepository<Db>, Surreal<Db>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    outpass_db::run_migrations(&db).await.unwrap();

    (SurrealProfileRepository::new(db.clone()), db)
}

fn student_input(username: &str, student_id: &str) -> CreateProfile {
    CreateProfile {
        id: Uuid::new_v4(),
        full_name: "Asha Rao".into(),
        email: format!("{username}@example.com"),
        phone: "9876500001".into(),
        username: username.into(),
        details: RoleDetails::Student {
            student_id: student_id.into(),
            room_number: "B-12".into(),
            course: "Physics".into(),
            year: "2".into(),
            parent_contact: "9876500099".into(),
        },
    }
}

fn parent_input(username: &str, child_student_id: &str) -> CreateProfile {
    CreateProfile {
        id: Uuid::new_v4(),
        full_name: "Ravi Rao".into(),
        email: format!("{username}@example.com"),
        phone: "9876500002".into(),
        username: username.into(),
        details: RoleDetails::Parent {
            child_student_id: child_student_id.into(),
            relationship: Relationship::Father,
        },
    }
}

fn warden_input(username: &str) -> CreateProfile {
    CreateProfile {
        id: Uuid::new_v4(),
        full_name: "Meera Iyer".into(),
        email: format!("{username}@example.com"),
        phone: "9876500003".into(),
        username: username.into(),
        details: RoleDetails::Warden {
            employee_id: "W-42".into(),
            department: "Hostel B".into(),
        },
    }
}

// -------------------------------------------------------------------------
// Create & fetch
// -------------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_student() {
    let (repo, _db) = setup().await;

    let input = student_input("asha", "S-1001");
    let id = input.id;
    let profile = repo.create(input).await.unwrap();

    assert_eq!(profile.id, id);
    assert_eq!(profile.role, Role::Student);
    // Students wait for review.
    assert_eq!(profile.status, ApprovalStatus::Pending);
    assert_eq!(profile.full_name, "Asha Rao");
    assert_eq!(profile.email, "asha@example.com");
    assert_eq!(profile.username, "asha");
    assert!(profile.linked_child.is_none());
    assert!(profile.decision.is_none());
    assert!(profile.last_login.is_none());

    match &profile.details {
        RoleDetails::Student {
            student_id,
            room_number,
            course,
            year,
            parent_contact,
        } => {
            assert_eq!(student_id, "S-1001");
            assert_eq!(room_number, "B-12");
            assert_eq!(course, "Physics");
            assert_eq!(year, "2");
            assert_eq!(parent_contact, "9876500099");
        }
        other => panic!("expected student details, got: {other:?}"),
    }

    let fetched = repo.get_by_id(id).await.unwrap();
    assert_eq!(fetched.id, id);
    assert_eq!(fetched.username, "asha");
    assert_eq!(fetched.created_at, profile.created_at);
}

#[tokio::test]
async fn initial_status_is_derived_from_role() {
    let (repo, _db) = setup().await;

    let warden = repo.create(warden_input("meera")).await.unwrap();
    assert_eq!(warden.status, ApprovalStatus::Approved);

    let admin = repo
        .create(CreateProfile {
            id: Uuid::new_v4(),
            full_name: "Admin One".into(),
            email: "admin@example.com".into(),
            phone: "9876500005".into(),
            username: "admin1".into(),
            details: RoleDetails::Admin {
                access_code: "HOSTEL-7".into(),
            },
        })
        .await
        .unwrap();
    assert_eq!(admin.status, ApprovalStatus::Approved);

    // Security staff are reviewed like students and parents.
    let security = repo
        .create(CreateProfile {
            id: Uuid::new_v4(),
            full_name: "Suresh Kumar".into(),
            email: "suresh@example.com".into(),
            phone: "9876500004".into(),
            username: "suresh".into(),
            details: RoleDetails::Security {
                employee_id: "G-17".into(),
                shift: Shift::Night,
            },
        })
        .await
        .unwrap();
    assert_eq!(security.status, ApprovalStatus::Pending);
    match &security.details {
        RoleDetails::Security { employee_id, shift } => {
            assert_eq!(employee_id, "G-17");
            assert_eq!(shift, &Shift::Night);
        }
        other => panic!("expected security details, got: {other:?}"),
    }
}

#[tokio::test]
async fn parent_registrations_wait_for_review() {
    let (repo, _db) = setup().await;

    let parent = repo.create(parent_input("ravi", "S-1001")).await.unwrap();
    assert_eq!(parent.status, ApprovalStatus::Pending);
    match &parent.details {
        RoleDetails::Parent {
            child_student_id,
            relationship,
        } => {
            assert_eq!(child_student_id, "S-1001");
            assert_eq!(relationship, &Relationship::Father);
        }
        other => panic!("expected parent details, got: {other:?}"),
    }
}

#[tokio::test]
async fn get_by_username_finds_the_profile() {
    let (repo, _db) = setup().await;

    let created = repo.create(student_input("asha", "S-1001")).await.unwrap();
    let fetched = repo.get_by_username("asha").await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.email, "asha@example.com");

    let err = repo.get_by_username("nobody").await.unwrap_err();
    assert!(
        matches!(err, OutpassError::NotFound { .. }),
        "expected NotFound, got: {err:?}"
    );
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let (repo, _db) = setup().await;

    let err = repo.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(
        matches!(err, OutpassError::NotFound { .. }),
        "expected NotFound, got: {err:?}"
    );
}

// -------------------------------------------------------------------------
// Uniqueness
// -------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let (repo, _db) = setup().await;

    repo.create(student_input("asha", "S-1001")).await.unwrap();

    let mut second = student_input("asha", "S-1002");
    second.email = "different@example.com".into();
    let err = repo.create(second).await.unwrap_err();
    assert!(
        matches!(err, OutpassError::Database(_)),
        "expected a database error from the unique index, got: {err:?}"
    );
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let (repo, _db) = setup().await;

    repo.create(student_input("asha", "S-1001")).await.unwrap();

    let mut second = student_input("asha2", "S-1002");
    second.email = "asha@example.com".into();
    let err = repo.create(second).await.unwrap_err();
    assert!(
        matches!(err, OutpassError::Database(_)),
        "expected a database error from the unique index, got: {err:?}"
    );
}

// -------------------------------------------------------------------------
// Student lookup
// -------------------------------------------------------------------------

#[tokio::test]
async fn find_student_matches_on_student_id() {
    let (repo, _db) = setup().await;

    let asha = repo.create(student_input("asha", "S-1001")).await.unwrap();
    repo.create(student_input("badri", "S-1002")).await.unwrap();
    // A parent carrying the same id in child_student_id must not match.
    repo.create(parent_input("ravi", "S-1001")).await.unwrap();

    let found = repo.find_student("S-1001").await.unwrap();
    assert_eq!(found.id, asha.id);
    assert_eq!(found.role, Role::Student);

    let err = repo.find_student("S-9999").await.unwrap_err();
    assert!(
        matches!(err, OutpassError::NotFound { .. }),
        "expected NotFound, got: {err:?}"
    );
}

// -------------------------------------------------------------------------
// Review queue & decisions
// -------------------------------------------------------------------------

#[tokio::test]
async fn list_pending_is_oldest_first_and_skips_decided() {
    let (repo, _db) = setup().await;
    let warden = repo.create(warden_input("meera")).await.unwrap();

    let first = repo.create(student_input("asha", "S-1001")).await.unwrap();
    let second = repo.create(student_input("badri", "S-1002")).await.unwrap();
    let third = repo.create(student_input("chitra", "S-1003")).await.unwrap();

    repo.decide(second.id, Verdict::Approved, warden.id)
        .await
        .unwrap();

    let pending = repo.list_pending().await.unwrap();
    let ids: Vec<Uuid> = pending.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![first.id, third.id]);
}

#[tokio::test]
async fn decide_records_the_verdict_once() {
    let (repo, _db) = setup().await;
    let warden = repo.create(warden_input("meera")).await.unwrap();
    let student = repo.create(student_input("asha", "S-1001")).await.unwrap();

    let decided = repo
        .decide(student.id, Verdict::Rejected, warden.id)
        .await
        .unwrap();
    assert_eq!(decided.status, ApprovalStatus::Rejected);
    let decision = decided.decision.unwrap();
    assert_eq!(decision.decided_by, warden.id);

    // The conditional update only touches pending profiles, so a second
    // verdict finds nothing.
    let err = repo
        .decide(student.id, Verdict::Approved, warden.id)
        .await
        .unwrap_err();
    assert!(
        matches!(err, OutpassError::NotFound { .. }),
        "expected NotFound on repeat decision, got: {err:?}"
    );

    let unchanged = repo.get_by_id(student.id).await.unwrap();
    assert_eq!(unchanged.status, ApprovalStatus::Rejected);
}

#[tokio::test]
async fn deciding_an_unknown_profile_is_not_found() {
    let (repo, _db) = setup().await;

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
// Parent-child link & login stamp
// -------------------------------------------------------------------------

#[tokio::test]
async fn link_child_stores_the_link() {
    let (repo, _db) = setup().await;

    let student = repo.create(student_input("asha", "S-1001")).await.unwrap();
    let parent = repo.create(parent_input("ravi", "S-1001")).await.unwrap();

    let updated = repo
        .link_child(
            parent.id,
            ChildLink {
                profile_id: student.id,
                name: student.full_name.clone(),
                student_id: "S-1001".into(),
            },
        )
        .await
        .unwrap();

    let link = updated.linked_child.unwrap();
    assert_eq!(link.profile_id, student.id);
    assert_eq!(link.name, "Asha Rao");
    assert_eq!(link.student_id, "S-1001");

    // The link survives a fresh read.
    let reread = repo.get_by_id(parent.id).await.unwrap();
    assert!(reread.linked_child.is_some());
}

#[tokio::test]
async fn touch_last_login_sets_the_timestamp() {
    let (repo, _db) = setup().await;

    let student = repo.create(student_input("asha", "S-1001")).await.unwrap();
    assert!(student.last_login.is_none());

    repo.touch_last_login(student.id).await.unwrap();

    let fetched = repo.get_by_id(student.id).await.unwrap();
    assert!(fetched.last_login.is_some());
}

// -------------------------------------------------------------------------
// Counting
// -------------------------------------------------------------------------

#[tokio::test]
async fn count_filters_by_role_and_status() {
    let (repo, _db) = setup().await;
    let warden = repo.create(warden_input("meera")).await.unwrap();

    let approved = repo.create(student_input("asha", "S-1001")).await.unwrap();
    repo.create(student_input("badri", "S-1002")).await.unwrap();
    repo.create(parent_input("ravi", "S-1001")).await.unwrap();
    repo.decide(approved.id, Verdict::Approved, warden.id)
        .await
        .unwrap();

    // Everything: warden + two students + parent.
    assert_eq!(repo.count(None, None).await.unwrap(), 4);
    assert_eq!(repo.count(Some(Role::Student), None).await.unwrap(), 2);
    assert_eq!(
        repo.count(Some(Role::Student), Some(ApprovalStatus::Approved))
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        repo.count(None, Some(ApprovalStatus::Pending)).await.unwrap(),
        2
    );
    assert_eq!(repo.count(Some(Role::Admin), None).await.unwrap(), 0);
}

// -------------------------------------------------------------------------
// Malformed rows
// -------------------------------------------------------------------------

#[tokio::test]
async fn student_row_without_student_fields_fails_to_decode() {
    let (repo, db) = setup().await;

    // Written past the repository on purpose; the schema keeps role-specific
    // columns optional, so only the row conversion can catch this.
    let id = Uuid::new_v4();
    db.query(
        "CREATE type::record('profile', $id) SET \
         role = 'student', status = 'pending', \
         full_name = 'Ghost Row', email = 'ghost@example.com', \
         phone = '0000000000', username = 'ghost'",
    )
    .bind(("id", id.to_string()))
    .await
    .unwrap()
    .check()
    .unwrap();

    let err = repo.get_by_id(id).await.unwrap_err();
    assert!(
        matches!(err, OutpassError::Database(_)),
        "expected a decode failure, got: {err:?}"
    );
    assert!(err.to_string().contains("malformed"));
}
