//! SurrealDB implementation of [`AuditLogRepository`].
//!
//! The `audit_log` table is append-only; the schema denies UPDATE and
//! DELETE outright.

use chrono::{DateTime, Utc};
use outpass_core::error::OutpassResult;
use outpass_core::models::audit::{ActivityKind, AuditEntry, CreateAuditEntry};
use outpass_core::repository::AuditLogRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct AuditRow {
    user_id: String,
    kind: String,
    activity: String,
    timestamp: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct AuditRowWithId {
    record_id: String,
    user_id: String,
    kind: String,
    activity: String,
    timestamp: DateTime<Utc>,
}

fn parse_kind(s: &str) -> Result<ActivityKind, DbError> {
    match s {
        "registration" => Ok(ActivityKind::Registration),
        "auth" => Ok(ActivityKind::Auth),
        "gate_pass" => Ok(ActivityKind::GatePass),
        "profile" => Ok(ActivityKind::Profile),
        "complaint" => Ok(ActivityKind::Complaint),
        "system" => Ok(ActivityKind::System),
        other => Err(DbError::Decode(format!("unknown activity kind: {other}"))),
    }
}

fn kind_to_string(kind: &ActivityKind) -> &'static str {
    match kind {
        ActivityKind::Registration => "registration",
        ActivityKind::Auth => "auth",
        ActivityKind::GatePass => "gate_pass",
        ActivityKind::Profile => "profile",
        ActivityKind::Complaint => "complaint",
        ActivityKind::System => "system",
    }
}

impl AuditRow {
    fn into_entry(self, id: Uuid) -> Result<AuditEntry, DbError> {
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Decode(format!("invalid user UUID: {e}")))?;
        Ok(AuditEntry {
            id,
            user_id,
            kind: parse_kind(&self.kind)?,
            activity: self.activity,
            timestamp: self.timestamp,
        })
    }
}

impl AuditRowWithId {
    fn try_into_entry(self) -> Result<AuditEntry, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        let row = AuditRow {
            user_id: self.user_id,
            kind: self.kind,
            activity: self.activity,
            timestamp: self.timestamp,
        };
        row.into_entry(id)
    }
}

/// SurrealDB implementation of the audit log repository.
#[derive(Clone)]
pub struct SurrealAuditLogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAuditLogRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AuditLogRepository for SurrealAuditLogRepository<C> {
    async fn append(&self, input: CreateAuditEntry) -> OutpassResult<AuditEntry> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('audit_log', $id) SET \
                 user_id = $user_id, \
                 kind = $kind, \
                 activity = $activity",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("kind", kind_to_string(&input.kind).to_string()))
            .bind(("activity", input.activity))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<AuditRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "audit_log".into(),
            id: id_str,
        })?;

        Ok(row.into_entry(id)?)
    }

    async fn list_for_user(&self, user_id: Uuid, limit: u64) -> OutpassResult<Vec<AuditEntry>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM audit_log \
                 WHERE user_id = $user_id \
                 ORDER BY timestamp DESC LIMIT $limit",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("limit", limit))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AuditRowWithId> = result.take(0).map_err(DbError::from)?;
        let entries = rows
            .into_iter()
            .map(|row| row.try_into_entry())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(entries)
    }

    async fn list_recent(
        &self,
        kind: Option<ActivityKind>,
        limit: u64,
    ) -> OutpassResult<Vec<AuditEntry>> {
        let where_clause = if kind.is_some() {
            " WHERE kind = $kind"
        } else {
            ""
        };
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM audit_log{where_clause} \
             ORDER BY timestamp DESC LIMIT $limit"
        );

        let mut builder = self.db.query(&query).bind(("limit", limit));
        if let Some(ref kind) = kind {
            builder = builder.bind(("kind", kind_to_string(kind).to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<AuditRowWithId> = result.take(0).map_err(DbError::from)?;
        let entries = rows
            .into_iter()
            .map(|row| row.try_into_entry())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(entries)
    }
}
