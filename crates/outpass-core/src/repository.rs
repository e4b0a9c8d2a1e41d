//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Status transitions are conditional
//! updates: they only apply while the record is still pending, so two racing
//! approvers cannot both win.

use uuid::Uuid;

use crate::error::OutpassResult;
use crate::models::{
    audit::{ActivityKind, AuditEntry, CreateAuditEntry},
    complaint::{Complaint, CreateComplaint},
    gatepass::{CreateGatePass, GatePassRequest},
    profile::{ApprovalStatus, ChildLink, CreateProfile, Role, UserProfile, Verdict},
    system::SystemConfig,
};

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

pub trait ProfileRepository: Send + Sync {
    /// Create a profile for a freshly issued identity. The initial status is
    /// derived from the role, never supplied by the caller.
    fn create(&self, input: CreateProfile) -> impl Future<Output = OutpassResult<UserProfile>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = OutpassResult<UserProfile>> + Send;
    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = OutpassResult<UserProfile>> + Send;
    /// Look up a student profile by the human-assigned student id. If several
    /// students share the id, the first match wins.
    fn find_student(
        &self,
        student_id: &str,
    ) -> impl Future<Output = OutpassResult<UserProfile>> + Send;
    /// Pending registrations awaiting review, oldest first.
    fn list_pending(&self) -> impl Future<Output = OutpassResult<Vec<UserProfile>>> + Send;
    /// Apply a review verdict. Fails with `NotFound` if the profile does not
    /// exist or is no longer pending.
    fn decide(
        &self,
        id: Uuid,
        verdict: Verdict,
        decided_by: Uuid,
    ) -> impl Future<Output = OutpassResult<UserProfile>> + Send;
    /// Record the parent-to-child link plus the denormalized display fields.
    fn link_child(
        &self,
        parent_id: Uuid,
        link: ChildLink,
    ) -> impl Future<Output = OutpassResult<UserProfile>> + Send;
    fn touch_last_login(&self, id: Uuid) -> impl Future<Output = OutpassResult<()>> + Send;
    fn count(
        &self,
        role: Option<Role>,
        status: Option<ApprovalStatus>,
    ) -> impl Future<Output = OutpassResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Gate passes
// ---------------------------------------------------------------------------

pub trait GatePassRepository: Send + Sync {
    fn create(
        &self,
        input: CreateGatePass,
    ) -> impl Future<Output = OutpassResult<GatePassRequest>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = OutpassResult<GatePassRequest>> + Send;
    /// Every request the student ever filed, newest first.
    fn list_for_student(
        &self,
        student_id: Uuid,
    ) -> impl Future<Output = OutpassResult<Vec<GatePassRequest>>> + Send;
    /// Requests still awaiting a decision, oldest first.
    fn list_pending(&self) -> impl Future<Output = OutpassResult<Vec<GatePassRequest>>> + Send;
    /// Apply a review verdict. Fails with `NotFound` if the pass does not
    /// exist or is no longer pending.
    fn decide(
        &self,
        id: Uuid,
        verdict: Verdict,
        decided_by: Uuid,
    ) -> impl Future<Output = OutpassResult<GatePassRequest>> + Send;
    /// Passes that are pending or approved for one student.
    fn count_active_for_student(
        &self,
        student_id: Uuid,
    ) -> impl Future<Output = OutpassResult<u64>> + Send;
    /// Passes that are pending or approved across all students.
    fn count_active(&self) -> impl Future<Output = OutpassResult<u64>> + Send;
    fn count_by_status(
        &self,
        status: ApprovalStatus,
    ) -> impl Future<Output = OutpassResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Complaints
// ---------------------------------------------------------------------------

pub trait ComplaintRepository: Send + Sync {
    fn create(
        &self,
        input: CreateComplaint,
    ) -> impl Future<Output = OutpassResult<Complaint>> + Send;
    fn list_for_student(
        &self,
        student_id: Uuid,
    ) -> impl Future<Output = OutpassResult<Vec<Complaint>>> + Send;
}

// ---------------------------------------------------------------------------
// Audit (append-only)
// ---------------------------------------------------------------------------

pub trait AuditLogRepository: Send + Sync {
    /// Append a new audit entry. No update or delete operations exist.
    fn append(
        &self,
        input: CreateAuditEntry,
    ) -> impl Future<Output = OutpassResult<AuditEntry>> + Send;
    fn list_for_user(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> impl Future<Output = OutpassResult<Vec<AuditEntry>>> + Send;
    /// Newest entries across all users, optionally narrowed to one kind.
    fn list_recent(
        &self,
        kind: Option<ActivityKind>,
        limit: u64,
    ) -> impl Future<Output = OutpassResult<Vec<AuditEntry>>> + Send;
}

// ---------------------------------------------------------------------------
// System configuration & counters
// ---------------------------------------------------------------------------

pub trait SystemRepository: Send + Sync {
    /// Increment a named counter and return its new value. Counters are
    /// best-effort statistics, not authoritative state.
    fn increment_counter(&self, name: &str) -> impl Future<Output = OutpassResult<u64>> + Send;
    fn counter(&self, name: &str) -> impl Future<Output = OutpassResult<u64>> + Send;
    fn load_config(&self) -> impl Future<Output = OutpassResult<Option<SystemConfig>>> + Send;
    fn store_config(
        &self,
        config: &SystemConfig,
    ) -> impl Future<Output = OutpassResult<()>> + Send;
}
