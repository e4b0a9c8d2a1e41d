//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    outpass_db::run_migrations(&db).await.unwrap();

    // Verify that key tables exist by querying INFO FOR DB.
    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    assert!(info_str.contains("profile"), "missing profile table");
    assert!(info_str.contains("credential"), "missing credential table");
    assert!(info_str.contains("gate_pass"), "missing gate_pass table");
    assert!(info_str.contains("complaint"), "missing complaint table");
    assert!(info_str.contains("audit_log"), "missing audit_log table");
    assert!(
        info_str.contains("system_counter"),
        "missing system_counter table"
    );
    assert!(
        info_str.contains("system_config"),
        "missing system_config table"
    );

    // Verify migration was recorded.
    assert!(info_str.contains("_migration"), "missing _migration table");
}

#[tokio::test]
async fn migration_is_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    // Run twice — should not fail.
    outpass_db::run_migrations(&db).await.unwrap();
    outpass_db::run_migrations(&db).await.unwrap();

    // Verify only one migration record exists.
    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1, "expected exactly one migration record");
}

#[tokio::test]
async fn can_create_record_after_migration() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    outpass_db::run_migrations(&db).await.unwrap();

    db.query(
        "CREATE profile SET \
         role = 'student', \
         status = 'pending', \
         full_name = 'Asha Rao', \
         email = 'asha@example.com', \
         phone = '9876543210', \
         username = 'asha', \
         student_id = 'S-1001'",
    )
    .await
    .unwrap()
    .check()
    .unwrap();

    let mut result = db
        .query("SELECT * FROM profile WHERE username = 'asha'")
        .await
        .unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn unique_index_prevents_duplicate_usernames() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    outpass_db::run_migrations(&db).await.unwrap();

    db.query(
        "CREATE profile SET \
         role = 'warden', \
         status = 'approved', \
         full_name = 'Vikram Shetty', \
         email = 'vikram@example.com', \
         phone = '9876500000', \
         username = 'vikram', \
         employee_id = 'W-42', \
         department = 'Hostel A'",
    )
    .await
    .unwrap()
    .check()
    .unwrap();

    // Same username, different email — should fail.
    let result = db
        .query(
            "CREATE profile SET \
             role = 'warden', \
             status = 'approved', \
             full_name = 'Other Warden', \
             email = 'other@example.com', \
             phone = '9876500001', \
             username = 'vikram', \
             employee_id = 'W-43', \
             department = 'Hostel B'",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "duplicate username should be rejected");
}

#[tokio::test]
async fn invalid_role_is_rejected_by_the_schema() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    outpass_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE profile SET \
             role = 'superuser', \
             status = 'approved', \
             full_name = 'Nobody', \
             email = 'nobody@example.com', \
             phone = '0', \
             username = 'nobody'",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "unknown role should be rejected");
}
