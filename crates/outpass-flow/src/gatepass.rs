//! Gate-pass workflow — filing, deciding, and dashboard views.

use chrono::{DateTime, Utc};
use outpass_core::error::{OutpassError, OutpassResult};
use outpass_core::models::audit::{ActivityKind, CreateAuditEntry};
use outpass_core::models::gatepass::{CreateGatePass, GatePassRequest, StudentSummary};
use outpass_core::models::profile::{
    ApprovalStatus, ChildLink, Principal, Role, RoleDetails, Verdict,
};
use outpass_core::models::system::counters;
use outpass_core::repository::{
    AuditLogRepository, GatePassRepository, ProfileRepository, SystemRepository,
};
use tracing::warn;
use uuid::Uuid;

use crate::error::FlowError;

/// Everything a student types into the request form.
#[derive(Debug, Clone)]
pub struct PassForm {
    /// One of the preset reasons, or "other".
    pub reason: String,
    /// Free text, required when the preset is "other".
    pub other_reason: Option<String>,
    pub destination: String,
    pub exit_time: Option<DateTime<Utc>>,
    pub return_time: Option<DateTime<Utc>>,
    pub contact_person: Option<String>,
}

impl PassForm {
    /// Validates the form into a create input owned by `student_id`. The
    /// "other" preset collapses into its free-text reason. Exit and
    /// return times are required but deliberately not ordered against
    /// each other.
    fn into_create(self, student_id: Uuid) -> Result<CreateGatePass, FlowError> {
        let reason = self.reason.trim().to_string();
        if reason.is_empty() {
            return Err(FlowError::MissingField("reason"));
        }
        let reason = if reason == "other" {
            let other = self
                .other_reason
                .as_deref()
                .unwrap_or("")
                .trim()
                .to_string();
            if other.is_empty() {
                return Err(FlowError::MissingField("other reason"));
            }
            other
        } else {
            reason
        };
        let destination = self.destination.trim().to_string();
        if destination.is_empty() {
            return Err(FlowError::MissingField("destination"));
        }
        let exit_time = self.exit_time.ok_or(FlowError::MissingField("exit time"))?;
        let return_time = self
            .return_time
            .ok_or(FlowError::MissingField("return time"))?;
        let contact_person = self
            .contact_person
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        Ok(CreateGatePass {
            student_id,
            reason,
            destination,
            exit_time,
            return_time,
            contact_person,
        })
    }
}

/// A student's dashboard data: the full request history plus the count
/// of passes still in play.
#[derive(Debug, Clone)]
pub struct StudentOverview {
    pub active_passes: u64,
    /// Every request the student filed, newest first.
    pub history: Vec<GatePassRequest>,
}

impl StudentOverview {
    /// The most recent requests, capped at five, for the activity panel.
    pub fn recent_activity(&self) -> &[GatePassRequest] {
        &self.history[..self.history.len().min(5)]
    }
}

/// A pending request enriched with its student for the approver queue.
#[derive(Debug, Clone)]
pub struct PendingGatePass {
    pub request: GatePassRequest,
    /// `None` when the student profile is missing; the entry renders
    /// with a placeholder instead of failing the whole queue.
    pub student: Option<StudentSummary>,
}

/// Headline numbers for the warden dashboard.
#[derive(Debug, Clone)]
pub struct WardenOverview {
    pub approved_students: u64,
    pub pending_registrations: u64,
    pub active_passes: u64,
    pub pending_passes: u64,
}

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone)]
pub struct AdminOverview {
    pub total_profiles: u64,
    pub approved_profiles: u64,
    pub pending_registrations: u64,
    pub active_passes: u64,
}

/// Gate-pass service.
///
/// Students file requests, approvers decide them, and every authorized
/// viewer reads derived counts. Role checks happen here; the repositories
/// below trust their callers.
pub struct GatePassService<
    G: GatePassRepository,
    P: ProfileRepository,
    S: SystemRepository,
    A: AuditLogRepository,
> {
    passes: G,
    profiles: P,
    system: S,
    audit: A,
}

impl<
    G: GatePassRepository,
    P: ProfileRepository,
    S: SystemRepository,
    A: AuditLogRepository,
> GatePassService<G, P, S, A>
{
    pub fn new(passes: G, profiles: P, system: S, audit: A) -> Self {
        Self {
            passes,
            profiles,
            system,
            audit,
        }
    }

    /// Files a new request for the calling student. The pass starts
    /// pending; an approver decides it later.
    pub async fn submit(&self, by: &Principal, form: PassForm) -> OutpassResult<GatePassRequest> {
        if by.role != Role::Student {
            return Err(FlowError::NotAStudent.into());
        }
        let input = form.into_create(by.id)?;

        let pass = self.passes.create(input).await?;

        // Best-effort bookkeeping; the filed pass stands either way.
        if let Err(err) = self.system.increment_counter(counters::GATE_PASSES).await {
            warn!(error = %err, "gate pass counter update failed");
        }
        if let Err(err) = self
            .audit
            .append(CreateAuditEntry {
                user_id: by.id,
                kind: ActivityKind::GatePass,
                activity: format!("gate pass requested to {}", pass.destination),
            })
            .await
        {
            warn!(error = %err, "gate pass audit write failed");
        }

        Ok(pass)
    }

    pub async fn approve(&self, by: &Principal, pass_id: Uuid) -> OutpassResult<GatePassRequest> {
        self.decide(by, pass_id, Verdict::Approved).await
    }

    pub async fn reject(&self, by: &Principal, pass_id: Uuid) -> OutpassResult<GatePassRequest> {
        self.decide(by, pass_id, Verdict::Rejected).await
    }

    /// Applies a verdict to a pending pass. A repeat decision, or a lost
    /// race against another approver, fails with not-found and leaves the
    /// record unchanged.
    async fn decide(
        &self,
        by: &Principal,
        pass_id: Uuid,
        verdict: Verdict,
    ) -> OutpassResult<GatePassRequest> {
        if !by.is_approver() {
            return Err(FlowError::NotAnApprover.into());
        }
        let pass = self.passes.decide(pass_id, verdict.clone(), by.id).await?;
        if let Err(err) = self
            .audit
            .append(CreateAuditEntry {
                user_id: by.id,
                kind: ActivityKind::GatePass,
                activity: format!("gate pass {} for {}", verdict, pass.destination),
            })
            .await
        {
            warn!(error = %err, "gate pass decision audit write failed");
        }
        Ok(pass)
    }

    /// The caller's own request history and active count.
    pub async fn student_overview(&self, by: &Principal) -> OutpassResult<StudentOverview> {
        if by.role != Role::Student {
            return Err(FlowError::NotAStudent.into());
        }
        self.overview_for(by.id).await
    }

    /// The linked child's request history, or `None` while no child is
    /// linked yet.
    pub async fn parent_overview(&self, by: &Principal) -> OutpassResult<Option<StudentOverview>> {
        if by.role != Role::Parent {
            return Err(FlowError::NotAParent.into());
        }
        let parent = self.profiles.get_by_id(by.id).await?;
        let Some(link) = parent.linked_child else {
            return Ok(None);
        };
        Ok(Some(self.overview_for(link.profile_id).await?))
    }

    async fn overview_for(&self, student_id: Uuid) -> OutpassResult<StudentOverview> {
        let history = self.passes.list_for_student(student_id).await?;
        let active_passes = self.passes.count_active_for_student(student_id).await?;
        Ok(StudentOverview {
            active_passes,
            history,
        })
    }

    /// All pending requests, oldest first, each enriched with its
    /// student's display fields by a secondary lookup.
    pub async fn pending_queue(&self, by: &Principal) -> OutpassResult<Vec<PendingGatePass>> {
        if !by.can_view_queue() {
            return Err(FlowError::NotQueueViewer.into());
        }
        let pending = self.passes.list_pending().await?;
        let mut queue = Vec::with_capacity(pending.len());
        for request in pending {
            let student = match self.profiles.get_by_id(request.student_id).await {
                Ok(profile) => match profile.details {
                    RoleDetails::Student {
                        student_id,
                        room_number,
                        ..
                    } => Some(StudentSummary {
                        full_name: profile.full_name,
                        student_id,
                        room_number,
                    }),
                    _ => None,
                },
                Err(OutpassError::NotFound { .. }) => {
                    warn!(request = %request.id, "student profile missing for queued pass");
                    None
                }
                Err(err) => return Err(err),
            };
            queue.push(PendingGatePass { request, student });
        }
        Ok(queue)
    }

    /// Links the calling parent to the student carrying `student_id`.
    /// The link is written once; re-linking is rejected. An unknown id
    /// propagates as not-found and the parent profile stays unchanged.
    pub async fn link_child(&self, by: &Principal, student_id: &str) -> OutpassResult<ChildLink> {
        if by.role != Role::Parent {
            return Err(FlowError::NotAParent.into());
        }
        let student_id = student_id.trim();
        if student_id.is_empty() {
            return Err(FlowError::MissingField("student id").into());
        }
        let parent = self.profiles.get_by_id(by.id).await?;
        if parent.linked_child.is_some() {
            return Err(FlowError::AlreadyLinked.into());
        }

        let student = self.profiles.find_student(student_id).await?;
        let link = match &student.details {
            RoleDetails::Student { student_id, .. } => ChildLink {
                profile_id: student.id,
                name: student.full_name.clone(),
                student_id: student_id.clone(),
            },
            _ => {
                return Err(OutpassError::Internal(
                    "student lookup returned a non-student profile".into(),
                ));
            }
        };
        self.profiles.link_child(by.id, link.clone()).await?;

        if let Err(err) = self
            .audit
            .append(CreateAuditEntry {
                user_id: by.id,
                kind: ActivityKind::Profile,
                activity: format!("linked child {}", link.student_id),
            })
            .await
        {
            warn!(error = %err, "child link audit write failed");
        }

        Ok(link)
    }

    /// Headline numbers for the warden dashboard.
    pub async fn warden_overview(&self, by: &Principal) -> OutpassResult<WardenOverview> {
        if !by.is_approver() {
            return Err(FlowError::NotAnApprover.into());
        }
        Ok(WardenOverview {
            approved_students: self
                .profiles
                .count(Some(Role::Student), Some(ApprovalStatus::Approved))
                .await?,
            pending_registrations: self
                .profiles
                .count(None, Some(ApprovalStatus::Pending))
                .await?,
            active_passes: self.passes.count_active().await?,
            pending_passes: self.passes.count_by_status(ApprovalStatus::Pending).await?,
        })
    }

    /// Headline numbers for the admin dashboard.
    pub async fn admin_overview(&self, by: &Principal) -> OutpassResult<AdminOverview> {
        if by.role != Role::Admin {
            return Err(FlowError::NotAnAdmin.into());
        }
        Ok(AdminOverview {
            total_profiles: self.profiles.count(None, None).await?,
            approved_profiles: self
                .profiles
                .count(None, Some(ApprovalStatus::Approved))
                .await?,
            pending_registrations: self
                .profiles
                .count(None, Some(ApprovalStatus::Pending))
                .await?,
            active_passes: self.passes.count_active().await?,
        })
    }
}
