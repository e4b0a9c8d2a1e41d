//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as lowercase strings
//! with ASSERT constraints for validation. Role-specific profile fields
//! are optional columns; which ones must be present follows from `role`
//! and is enforced by the repository layer, not the schema.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Profiles (one per identity; record id = identity handle)
-- =======================================================================
DEFINE TABLE profile SCHEMAFULL;
DEFINE FIELD role ON TABLE profile TYPE string \
    ASSERT $value IN ['student', 'parent', 'security', 'warden', \
    'admin'];
DEFINE FIELD status ON TABLE profile TYPE string \
    ASSERT $value IN ['pending', 'approved', 'rejected'];
DEFINE FIELD full_name ON TABLE profile TYPE string;
DEFINE FIELD email ON TABLE profile TYPE string;
DEFINE FIELD phone ON TABLE profile TYPE string;
DEFINE FIELD username ON TABLE profile TYPE string;

-- Student fields
DEFINE FIELD student_id ON TABLE profile TYPE option<string>;
DEFINE FIELD room_number ON TABLE profile TYPE option<string>;
DEFINE FIELD course ON TABLE profile TYPE option<string>;
DEFINE FIELD year ON TABLE profile TYPE option<string>;
DEFINE FIELD parent_contact ON TABLE profile TYPE option<string>;

-- Parent fields
DEFINE FIELD child_student_id ON TABLE profile TYPE option<string>;
DEFINE FIELD relationship ON TABLE profile TYPE option<string>;
DEFINE FIELD linked_child ON TABLE profile TYPE option<string>;
DEFINE FIELD child_name ON TABLE profile TYPE option<string>;

-- Staff fields
DEFINE FIELD employee_id ON TABLE profile TYPE option<string>;
DEFINE FIELD shift ON TABLE profile TYPE option<string>;
DEFINE FIELD department ON TABLE profile TYPE option<string>;
DEFINE FIELD access_code ON TABLE profile TYPE option<string>;

-- Review decision
DEFINE FIELD decided_at ON TABLE profile TYPE option<datetime>;
DEFINE FIELD decided_by ON TABLE profile TYPE option<string>;

DEFINE FIELD created_at ON TABLE profile TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD last_login ON TABLE profile TYPE option<datetime>;
DEFINE INDEX idx_profile_username ON TABLE profile \
    COLUMNS username UNIQUE;
DEFINE INDEX idx_profile_email ON TABLE profile COLUMNS email UNIQUE;
DEFINE INDEX idx_profile_student_id ON TABLE profile \
    COLUMNS student_id;
DEFINE INDEX idx_profile_status ON TABLE profile COLUMNS status;

-- =======================================================================
-- Credentials (provider-owned; never exposed above the identity seam)
-- =======================================================================
DEFINE TABLE credential SCHEMAFULL;
DEFINE FIELD email ON TABLE credential TYPE string;
DEFINE FIELD password_hash ON TABLE credential TYPE string;
DEFINE FIELD created_at ON TABLE credential TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_credential_email ON TABLE credential \
    COLUMNS email UNIQUE;

-- =======================================================================
-- Gate passes
-- =======================================================================
DEFINE TABLE gate_pass SCHEMAFULL;
DEFINE FIELD student_id ON TABLE gate_pass TYPE string;
DEFINE FIELD reason ON TABLE gate_pass TYPE string;
DEFINE FIELD destination ON TABLE gate_pass TYPE string;
DEFINE FIELD exit_time ON TABLE gate_pass TYPE datetime;
DEFINE FIELD return_time ON TABLE gate_pass TYPE datetime;
DEFINE FIELD contact_person ON TABLE gate_pass TYPE option<string>;
DEFINE FIELD status ON TABLE gate_pass TYPE string \
    ASSERT $value IN ['pending', 'approved', 'rejected'];
DEFINE FIELD decided_at ON TABLE gate_pass TYPE option<datetime>;
DEFINE FIELD decided_by ON TABLE gate_pass TYPE option<string>;
DEFINE FIELD created_at ON TABLE gate_pass TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_gate_pass_student ON TABLE gate_pass \
    COLUMNS student_id;
DEFINE INDEX idx_gate_pass_status ON TABLE gate_pass COLUMNS status;

-- =======================================================================
-- Complaints
-- =======================================================================
DEFINE TABLE complaint SCHEMAFULL;
DEFINE FIELD student_id ON TABLE complaint TYPE string;
DEFINE FIELD kind ON TABLE complaint TYPE string \
    ASSERT $value IN ['maintenance', 'cleanliness', 'food', \
    'facilities', 'other'];
DEFINE FIELD description ON TABLE complaint TYPE string;
DEFINE FIELD location ON TABLE complaint TYPE option<string>;
DEFINE FIELD status ON TABLE complaint TYPE string \
    ASSERT $value IN ['pending', 'approved', 'rejected'];
DEFINE FIELD created_at ON TABLE complaint TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_complaint_student ON TABLE complaint \
    COLUMNS student_id;

-- =======================================================================
-- Audit Log (append-only)
-- =======================================================================
DEFINE TABLE audit_log SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD user_id ON TABLE audit_log TYPE string;
DEFINE FIELD kind ON TABLE audit_log TYPE string \
    ASSERT $value IN ['registration', 'auth', 'gate_pass', 'profile', \
    'complaint', 'system'];
DEFINE FIELD activity ON TABLE audit_log TYPE string;
DEFINE FIELD timestamp ON TABLE audit_log TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_audit_user_time ON TABLE audit_log \
    COLUMNS user_id, timestamp;

-- =======================================================================
-- System counters & configuration
-- =======================================================================
DEFINE TABLE system_counter SCHEMAFULL;
DEFINE FIELD value ON TABLE system_counter TYPE int DEFAULT 0;

DEFINE TABLE system_config SCHEMAFULL;
DEFINE FIELD otp_ttl_secs ON TABLE system_config TYPE int;
DEFINE FIELD otp_max_attempts ON TABLE system_config TYPE int;
DEFINE FIELD min_password_length ON TABLE system_config TYPE int;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_is_nonempty() {
        assert!(!SCHEMA_V1.is_empty());
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
