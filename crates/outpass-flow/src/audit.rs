//! Activity log browsing for the staff dashboards.

use outpass_core::error::OutpassResult;
use outpass_core::models::audit::{ActivityKind, AuditEntry};
use outpass_core::models::profile::Principal;
use outpass_core::repository::AuditLogRepository;
use uuid::Uuid;

use crate::error::FlowError;

/// Read-only view over the audit trail. Wardens and administrators only.
pub struct ActivityLog<A: AuditLogRepository> {
    audit: A,
}

impl<A: AuditLogRepository> ActivityLog<A> {
    pub fn new(audit: A) -> Self {
        Self { audit }
    }

    /// Latest entries across the whole system, optionally narrowed to one
    /// activity kind.
    pub async fn recent(
        &self,
        by: &Principal,
        kind: Option<ActivityKind>,
        limit: u64,
    ) -> OutpassResult<Vec<AuditEntry>> {
        if !by.is_approver() {
            return Err(FlowError::NotAnApprover.into());
        }
        self.audit.list_recent(kind, limit).await
    }

    /// Latest entries recorded for one user.
    pub async fn for_user(
        &self,
        by: &Principal,
        user_id: Uuid,
        limit: u64,
    ) -> OutpassResult<Vec<AuditEntry>> {
        if !by.is_approver() {
            return Err(FlowError::NotAnApprover.into());
        }
        self.audit.list_for_user(user_id, limit).await
    }
}
