//! User profile domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    Student,
    Parent,
    Security,
    Warden,
    Admin,
}

impl Role {
    /// Staff roles are trusted at registration time; everyone else waits for
    /// a warden or admin to review the account.
    pub fn is_auto_approved(&self) -> bool {
        matches!(self, Role::Warden | Role::Admin)
    }

    /// Status a freshly committed profile starts in.
    pub fn initial_status(&self) -> ApprovalStatus {
        if self.is_auto_approved() {
            ApprovalStatus::Approved
        } else {
            ApprovalStatus::Pending
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Role::Student => "student",
            Role::Parent => "parent",
            Role::Security => "security",
            Role::Warden => "warden",
            Role::Admin => "admin",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// Outcome of a review decision. `Pending` is not a verdict, so decisions
/// carry this narrower type instead of [`ApprovalStatus`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Verdict {
    Approved,
    Rejected,
}

impl Verdict {
    pub fn status(&self) -> ApprovalStatus {
        match self {
            Verdict::Approved => ApprovalStatus::Approved,
            Verdict::Rejected => ApprovalStatus::Rejected,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Approved => f.write_str("approved"),
            Verdict::Rejected => f.write_str("rejected"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Relationship {
    Father,
    Mother,
    Guardian,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Shift {
    Morning,
    Evening,
    Night,
}

/// Role-specific profile fields, captured at registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoleDetails {
    Student {
        student_id: String,
        room_number: String,
        course: String,
        /// Year of study, "1" through "4".
        year: String,
        parent_contact: String,
    },
    Parent {
        /// Student id of the child, as entered; resolved to a profile later
        /// via the explicit link step.
        child_student_id: String,
        relationship: Relationship,
    },
    Security {
        employee_id: String,
        shift: Shift,
    },
    Warden {
        employee_id: String,
        department: String,
    },
    Admin {
        /// Entered at registration and stored as-is; nothing validates it.
        access_code: String,
    },
}

impl RoleDetails {
    pub fn role(&self) -> Role {
        match self {
            RoleDetails::Student { .. } => Role::Student,
            RoleDetails::Parent { .. } => Role::Parent,
            RoleDetails::Security { .. } => Role::Security,
            RoleDetails::Warden { .. } => Role::Warden,
            RoleDetails::Admin { .. } => Role::Admin,
        }
    }
}

/// Who decided a pending record and when.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Decision {
    pub decided_at: DateTime<Utc>,
    pub decided_by: Uuid,
}

/// A parent's resolved link to a student profile. Set once via the link
/// step; the name and student id are denormalized for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChildLink {
    pub profile_id: Uuid,
    pub name: String,
    pub student_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Identity handle issued by the auth provider; doubles as the record id.
    pub id: Uuid,
    pub role: Role,
    pub status: ApprovalStatus,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub username: String,
    pub details: RoleDetails,
    /// Parent accounts only; absent until the parent links a child.
    pub linked_child: Option<ChildLink>,
    pub decision: Option<Decision>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfile {
    /// Identity handle from the provider; the profile record reuses it.
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub username: String,
    pub details: RoleDetails,
}

/// The signed-in caller, as services see it. Carries just enough to make
/// authorization decisions without re-reading the profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
    pub status: ApprovalStatus,
}

impl Principal {
    /// Roles allowed to approve or reject pending records.
    pub fn is_approver(&self) -> bool {
        matches!(self.role, Role::Warden | Role::Admin)
    }

    /// Roles allowed to read the pending gate-pass queue.
    pub fn can_view_queue(&self) -> bool {
        matches!(self.role, Role::Warden | Role::Security | Role::Admin)
    }
}

impl From<&UserProfile> for Principal {
    fn from(profile: &UserProfile) -> Self {
        Principal {
            id: profile.id,
            role: profile.role.clone(),
            status: profile.status.clone(),
        }
    }
}
