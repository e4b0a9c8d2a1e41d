//! Hostel complaint domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::ApprovalStatus;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ComplaintKind {
    Maintenance,
    Cleanliness,
    Food,
    Facilities,
    Other,
}

impl std::fmt::Display for ComplaintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ComplaintKind::Maintenance => "maintenance",
            ComplaintKind::Cleanliness => "cleanliness",
            ComplaintKind::Food => "food",
            ComplaintKind::Facilities => "facilities",
            ComplaintKind::Other => "other",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
    pub id: Uuid,
    pub student_id: Uuid,
    pub kind: ComplaintKind,
    pub description: String,
    pub location: Option<String>,
    /// Complaints are filed pending; resolution is tracked elsewhere.
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComplaint {
    pub student_id: Uuid,
    pub kind: ComplaintKind,
    pub description: String,
    pub location: Option<String>,
}
