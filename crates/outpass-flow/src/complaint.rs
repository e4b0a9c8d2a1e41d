//! Complaint filing — students flag hostel issues.

use outpass_core::error::OutpassResult;
use outpass_core::models::audit::{ActivityKind, CreateAuditEntry};
use outpass_core::models::complaint::{Complaint, ComplaintKind, CreateComplaint};
use outpass_core::models::profile::{Principal, Role};
use outpass_core::models::system::counters;
use outpass_core::repository::{AuditLogRepository, ComplaintRepository, SystemRepository};
use tracing::warn;
use uuid::Uuid;

use crate::error::FlowError;

/// Everything a student types into the complaint form.
#[derive(Debug, Clone)]
pub struct ComplaintForm {
    pub kind: Option<ComplaintKind>,
    pub description: String,
    pub location: Option<String>,
}

impl ComplaintForm {
    fn into_create(self, student_id: Uuid) -> Result<CreateComplaint, FlowError> {
        let kind = self.kind.ok_or(FlowError::MissingField("category"))?;
        let description = self.description.trim().to_string();
        if description.is_empty() {
            return Err(FlowError::MissingField("description"));
        }
        let location = self
            .location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        Ok(CreateComplaint {
            student_id,
            kind,
            description,
            location,
        })
    }
}

/// Complaint service. Filing and reading are student-only; review lives
/// outside this system.
pub struct ComplaintService<C: ComplaintRepository, S: SystemRepository, A: AuditLogRepository> {
    complaints: C,
    system: S,
    audit: A,
}

impl<C: ComplaintRepository, S: SystemRepository, A: AuditLogRepository>
    ComplaintService<C, S, A>
{
    pub fn new(complaints: C, system: S, audit: A) -> Self {
        Self {
            complaints,
            system,
            audit,
        }
    }

    /// Lodges a complaint for the calling student.
    pub async fn lodge(&self, by: &Principal, form: ComplaintForm) -> OutpassResult<Complaint> {
        if by.role != Role::Student {
            return Err(FlowError::NotAStudent.into());
        }
        let input = form.into_create(by.id)?;
        let complaint = self.complaints.create(input).await?;

        // Best-effort bookkeeping; the complaint stands either way.
        if let Err(err) = self.system.increment_counter(counters::COMPLAINTS).await {
            warn!(error = %err, "complaint counter update failed");
        }
        if let Err(err) = self
            .audit
            .append(CreateAuditEntry {
                user_id: by.id,
                kind: ActivityKind::Complaint,
                activity: format!("complaint lodged: {}", complaint.kind),
            })
            .await
        {
            warn!(error = %err, "complaint audit write failed");
        }

        Ok(complaint)
    }

    /// The caller's own complaints, newest first.
    pub async fn my_complaints(&self, by: &Principal) -> OutpassResult<Vec<Complaint>> {
        if by.role != Role::Student {
            return Err(FlowError::NotAStudent.into());
        }
        self.complaints.list_for_student(by.id).await
    }
}
