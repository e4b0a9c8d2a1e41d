//! SurrealDB implementation of [`GatePassRepository`].

use chrono::{DateTime, Utc};
use outpass_core::error::OutpassResult;
use outpass_core::models::gatepass::{CreateGatePass, GatePassRequest};
use outpass_core::models::profile::{ApprovalStatus, Verdict};
use outpass_core::repository::GatePassRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use super::profile::{parse_decision, parse_status, status_to_string, verdict_to_string};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct GatePassRow {
    student_id: String,
    reason: String,
    destination: String,
    exit_time: DateTime<Utc>,
    return_time: DateTime<Utc>,
    contact_person: Option<String>,
    status: String,
    decided_at: Option<DateTime<Utc>>,
    decided_by: Option<String>,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct GatePassRowWithId {
    record_id: String,
    student_id: String,
    reason: String,
    destination: String,
    exit_time: DateTime<Utc>,
    return_time: DateTime<Utc>,
    contact_person: Option<String>,
    status: String,
    decided_at: Option<DateTime<Utc>>,
    decided_by: Option<String>,
    created_at: DateTime<Utc>,
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

impl GatePassRow {
    fn into_pass(self, id: Uuid) -> Result<GatePassRequest, DbError> {
        let student_id = Uuid::parse_str(&self.student_id)
            .map_err(|e| DbError::Decode(format!("invalid student UUID: {e}")))?;
        Ok(GatePassRequest {
            id,
            student_id,
            reason: self.reason,
            destination: self.destination,
            exit_time: self.exit_time,
            return_time: self.return_time,
            contact_person: self.contact_person,
            status: parse_status(&self.status)?,
            decision: parse_decision(self.decided_at, self.decided_by)?,
            created_at: self.created_at,
        })
    }
}

impl GatePassRowWithId {
    fn try_into_pass(self) -> Result<GatePassRequest, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        let row = GatePassRow {
            student_id: self.student_id,
            reason: self.reason,
            destination: self.destination,
            exit_time: self.exit_time,
            return_time: self.return_time,
            contact_person: self.contact_person,
            status: self.status,
            decided_at: self.decided_at,
            decided_by: self.decided_by,
            created_at: self.created_at,
        };
        row.into_pass(id)
    }
}

/// SurrealDB implementation of the gate-pass repository.
#[derive(Clone)]
pub struct SurrealGatePassRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealGatePassRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> GatePassRepository for SurrealGatePassRepository<C> {
    async fn create(&self, input: CreateGatePass) -> OutpassResult<GatePassRequest> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('gate_pass', $id) SET \
                 student_id = $student_id, \
                 reason = $reason, \
                 destination = $destination, \
                 exit_time = $exit_time, \
                 return_time = $return_time, \
                 contact_person = $contact_person, \
                 status = $status",
            )
            .bind(("id", id_str.clone()))
            .bind(("student_id", input.student_id.to_string()))
            .bind(("reason", input.reason))
            .bind(("destination", input.destination))
            .bind(("exit_time", input.exit_time))
            .bind(("return_time", input.return_time))
            .bind(("contact_person", input.contact_person))
            .bind(("status", "pending".to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<GatePassRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "gate_pass".into(),
            id: id_str,
        })?;

        Ok(row.into_pass(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> OutpassResult<GatePassRequest> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('gate_pass', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GatePassRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "gate_pass".into(),
            id: id_str,
        })?;

        Ok(row.into_pass(id)?)
    }

    async fn list_for_student(&self, student_id: Uuid) -> OutpassResult<Vec<GatePassRequest>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM gate_pass \
                 WHERE student_id = $student_id \
                 ORDER BY created_at DESC",
            )
            .bind(("student_id", student_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GatePassRowWithId> = result.take(0).map_err(DbError::from)?;
        let passes = rows
            .into_iter()
            .map(|row| row.try_into_pass())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(passes)
    }

    async fn list_pending(&self) -> OutpassResult<Vec<GatePassRequest>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM gate_pass \
                 WHERE status = 'pending' ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GatePassRowWithId> = result.take(0).map_err(DbError::from)?;
        let passes = rows
            .into_iter()
            .map(|row| row.try_into_pass())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(passes)
    }

    async fn decide(
        &self,
        id: Uuid,
        verdict: Verdict,
        decided_by: Uuid,
    ) -> OutpassResult<GatePassRequest> {
        let id_str = id.to_string();

        // Conditional transition: only a still-pending pass is updated, so
        // repeat or racing decisions fall through to NotFound.
        let result = self
            .db
            .query(
                "UPDATE type::record('gate_pass', $id) SET \
                 status = $status, \
                 decided_at = time::now(), \
                 decided_by = $decided_by \
                 WHERE status = 'pending'",
            )
            .bind(("id", id_str.clone()))
            .bind(("status", verdict_to_string(&verdict).to_string()))
            .bind(("decided_by", decided_by.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<GatePassRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "gate_pass".into(),
            id: id_str,
        })?;

        Ok(row.into_pass(id)?)
    }

    async fn count_active_for_student(&self, student_id: Uuid) -> OutpassResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM gate_pass \
                 WHERE student_id = $student_id \
                 AND status IN ['pending', 'approved'] GROUP ALL",
            )
            .bind(("student_id", student_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn count_active(&self) -> OutpassResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM gate_pass \
                 WHERE status IN ['pending', 'approved'] GROUP ALL",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn count_by_status(&self, status: ApprovalStatus) -> OutpassResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM gate_pass \
                 WHERE status = $status GROUP ALL",
            )
            .bind(("status", status_to_string(&status).to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
