//! Gate-pass request domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::{ApprovalStatus, Decision};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatePassRequest {
    pub id: Uuid,
    /// Profile id of the student who filed the request.
    pub student_id: Uuid,
    /// Trip reason; free text when the student picked "other".
    pub reason: String,
    pub destination: String,
    pub exit_time: DateTime<Utc>,
    pub return_time: DateTime<Utc>,
    pub contact_person: Option<String>,
    pub status: ApprovalStatus,
    pub decision: Option<Decision>,
    pub created_at: DateTime<Utc>,
}

impl GatePassRequest {
    /// A pass counts as active while it is pending or approved. Rejection is
    /// the only state that retires it.
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            ApprovalStatus::Pending | ApprovalStatus::Approved
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGatePass {
    pub student_id: Uuid,
    pub reason: String,
    pub destination: String,
    pub exit_time: DateTime<Utc>,
    pub return_time: DateTime<Utc>,
    pub contact_person: Option<String>,
}

/// Display fields for the student behind a pending request, denormalized
/// for the approver queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSummary {
    pub full_name: String,
    pub student_id: String,
    pub room_number: String,
}
