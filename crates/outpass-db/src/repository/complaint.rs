//! SurrealDB implementation of [`ComplaintRepository`].

use chrono::{DateTime, Utc};
use outpass_core::error::OutpassResult;
use outpass_core::models::complaint::{Complaint, ComplaintKind, CreateComplaint};
use outpass_core::repository::ComplaintRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use super::profile::parse_status;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct ComplaintRow {
    student_id: String,
    kind: String,
    description: String,
    location: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct ComplaintRowWithId {
    record_id: String,
    student_id: String,
    kind: String,
    description: String,
    location: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

fn parse_kind(s: &str) -> Result<ComplaintKind, DbError> {
    match s {
        "maintenance" => Ok(ComplaintKind::Maintenance),
        "cleanliness" => Ok(ComplaintKind::Cleanliness),
        "food" => Ok(ComplaintKind::Food),
        "facilities" => Ok(ComplaintKind::Facilities),
        "other" => Ok(ComplaintKind::Other),
        other => Err(DbError::Decode(format!("unknown complaint kind: {other}"))),
    }
}

fn kind_to_string(kind: &ComplaintKind) -> &'static str {
    match kind {
        ComplaintKind::Maintenance => "maintenance",
        ComplaintKind::Cleanliness => "cleanliness",
        ComplaintKind::Food => "food",
        ComplaintKind::Facilities => "facilities",
        ComplaintKind::Other => "other",
    }
}

impl ComplaintRow {
    fn into_complaint(self, id: Uuid) -> Result<Complaint, DbError> {
        let student_id = Uuid::parse_str(&self.student_id)
            .map_err(|e| DbError::Decode(format!("invalid student UUID: {e}")))?;
        Ok(Complaint {
            id,
            student_id,
            kind: parse_kind(&self.kind)?,
            description: self.description,
            location: self.location,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
        })
    }
}

impl ComplaintRowWithId {
    fn try_into_complaint(self) -> Result<Complaint, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        let row = ComplaintRow {
            student_id: self.student_id,
            kind: self.kind,
            description: self.description,
            location: self.location,
            status: self.status,
            created_at: self.created_at,
        };
        row.into_complaint(id)
    }
}

/// SurrealDB implementation of the complaint repository.
#[derive(Clone)]
pub struct SurrealComplaintRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealComplaintRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ComplaintRepository for SurrealComplaintRepository<C> {
    async fn create(&self, input: CreateComplaint) -> OutpassResult<Complaint> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('complaint', $id) SET \
                 student_id = $student_id, \
                 kind = $kind, \
                 description = $description, \
                 location = $location, \
                 status = $status",
            )
            .bind(("id", id_str.clone()))
            .bind(("student_id", input.student_id.to_string()))
            .bind(("kind", kind_to_string(&input.kind).to_string()))
            .bind(("description", input.description))
            .bind(("location", input.location))
            .bind(("status", "pending".to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ComplaintRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "complaint".into(),
            id: id_str,
        })?;

        Ok(row.into_complaint(id)?)
    }

    async fn list_for_student(&self, student_id: Uuid) -> OutpassResult<Vec<Complaint>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM complaint \
                 WHERE student_id = $student_id \
                 ORDER BY created_at DESC",
            )
            .bind(("student_id", student_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ComplaintRowWithId> = result.take(0).map_err(DbError::from)?;
        let complaints = rows
            .into_iter()
            .map(|row| row.try_into_complaint())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(complaints)
    }
}
