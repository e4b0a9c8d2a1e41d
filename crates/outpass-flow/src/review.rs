//! Registration review — approving or rejecting pending accounts.

use outpass_core::error::OutpassResult;
use outpass_core::models::audit::{ActivityKind, CreateAuditEntry};
use outpass_core::models::profile::{Principal, UserProfile, Verdict};
use outpass_core::repository::{AuditLogRepository, ProfileRepository};
use tracing::warn;
use uuid::Uuid;

use crate::error::FlowError;

/// Review service for pending registrations. Wardens and administrators
/// only.
pub struct RegistrationReview<P: ProfileRepository, A: AuditLogRepository> {
    profiles: P,
    audit: A,
}

impl<P: ProfileRepository, A: AuditLogRepository> RegistrationReview<P, A> {
    pub fn new(profiles: P, audit: A) -> Self {
        Self { profiles, audit }
    }

    /// Registrations still awaiting review, oldest first.
    pub async fn pending_registrations(&self, by: &Principal) -> OutpassResult<Vec<UserProfile>> {
        if !by.is_approver() {
            return Err(FlowError::NotAnApprover.into());
        }
        self.profiles.list_pending().await
    }

    pub async fn approve(&self, by: &Principal, profile_id: Uuid) -> OutpassResult<UserProfile> {
        self.decide(by, profile_id, Verdict::Approved).await
    }

    pub async fn reject(&self, by: &Principal, profile_id: Uuid) -> OutpassResult<UserProfile> {
        self.decide(by, profile_id, Verdict::Rejected).await
    }

    /// Applies a verdict to a pending registration. A repeat decision, or
    /// a lost race against another approver, fails with not-found and
    /// leaves the record unchanged.
    async fn decide(
        &self,
        by: &Principal,
        profile_id: Uuid,
        verdict: Verdict,
    ) -> OutpassResult<UserProfile> {
        if !by.is_approver() {
            return Err(FlowError::NotAnApprover.into());
        }
        let profile = self
            .profiles
            .decide(profile_id, verdict.clone(), by.id)
            .await?;
        if let Err(err) = self
            .audit
            .append(CreateAuditEntry {
                user_id: by.id,
                kind: ActivityKind::Registration,
                activity: format!("registration {} for {}", verdict, profile.full_name),
            })
            .await
        {
            warn!(error = %err, "registration review audit write failed");
        }
        Ok(profile)
    }
}
