//! Audit log domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivityKind {
    Registration,
    Auth,
    GatePass,
    Profile,
    Complaint,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    /// The acting principal (submitter, approver, and so on), not the
    /// record the activity touched.
    pub user_id: Uuid,
    pub kind: ActivityKind,
    pub activity: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditEntry {
    pub user_id: Uuid,
    pub kind: ActivityKind,
    pub activity: String,
}
