//! Registration flow state machine.
//!
//! A [`RegistrationDraft`] walks a registrant through role selection,
//! profile details, and code verification before anything is persisted.
//! The draft lives entirely in memory; only a successful commit touches
//! the identity provider and the database.

use outpass_core::models::profile::{Role, RoleDetails};

use crate::config::OnboardingConfig;
use crate::error::FlowError;
use crate::otp::OtpChallenge;

/// Where a draft currently sits in the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStep {
    CollectingRole,
    CollectingProfile,
    AwaitingCode,
    Committing,
    Done,
}

/// Everything a registrant types into the profile step.
#[derive(Debug, Clone)]
pub struct ProfileForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub details: RoleDetails,
}

impl ProfileForm {
    /// Trims free-text fields and validates the form against the selected
    /// role and password policy. Returns the cleaned form.
    fn cleaned(mut self, role: &Role, config: &OnboardingConfig) -> Result<Self, FlowError> {
        if self.details.role() != *role {
            return Err(FlowError::RoleFieldsMismatch);
        }
        self.full_name = required(self.full_name, "full name")?;
        self.email = required(self.email, "email")?;
        self.phone = required(self.phone, "phone number")?;
        self.username = required(self.username, "username")?;
        self.details = cleaned_details(self.details)?;
        // Passwords are not trimmed.
        if self.password.is_empty() {
            return Err(FlowError::MissingField("password"));
        }
        if self.password != self.confirm_password {
            return Err(FlowError::PasswordMismatch);
        }
        if self.password.chars().count() < config.min_password_length {
            return Err(FlowError::PasswordTooShort {
                min: config.min_password_length,
            });
        }
        Ok(self)
    }
}

fn required(value: String, name: &'static str) -> Result<String, FlowError> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(FlowError::MissingField(name));
    }
    Ok(value)
}

fn cleaned_details(details: RoleDetails) -> Result<RoleDetails, FlowError> {
    Ok(match details {
        RoleDetails::Student {
            student_id,
            room_number,
            course,
            year,
            parent_contact,
        } => RoleDetails::Student {
            student_id: required(student_id, "student id")?,
            room_number: required(room_number, "room number")?,
            course: required(course, "course")?,
            year: required(year, "year of study")?,
            parent_contact: required(parent_contact, "parent contact")?,
        },
        RoleDetails::Parent {
            child_student_id,
            relationship,
        } => RoleDetails::Parent {
            child_student_id: required(child_student_id, "child's student id")?,
            relationship,
        },
        RoleDetails::Security { employee_id, shift } => RoleDetails::Security {
            employee_id: required(employee_id, "employee id")?,
            shift,
        },
        RoleDetails::Warden {
            employee_id,
            department,
        } => RoleDetails::Warden {
            employee_id: required(employee_id, "employee id")?,
            department: required(department, "department")?,
        },
        RoleDetails::Admin { access_code } => RoleDetails::Admin {
            access_code: required(access_code, "access code")?,
        },
    })
}

/// A registration in progress.
///
/// Steps advance only through the methods here, so a draft can never
/// reach code verification without a validated profile, and going back
/// never loses already-entered values.
#[derive(Debug, Clone)]
pub struct RegistrationDraft {
    step: RegistrationStep,
    role: Option<Role>,
    profile: Option<ProfileForm>,
    challenge: Option<OtpChallenge>,
}

impl RegistrationDraft {
    pub fn new() -> Self {
        Self {
            step: RegistrationStep::CollectingRole,
            role: None,
            profile: None,
            challenge: None,
        }
    }

    pub fn step(&self) -> RegistrationStep {
        self.step
    }

    pub fn role(&self) -> Option<&Role> {
        self.role.as_ref()
    }

    /// The validated profile, present from the code step onward (and
    /// preserved when the registrant goes back to edit).
    pub fn profile(&self) -> Option<&ProfileForm> {
        self.profile.as_ref()
    }

    /// The current verification code, for delivery to the registrant.
    pub fn challenge_code(&self) -> Option<&str> {
        self.challenge.as_ref().map(|c| c.code())
    }

    /// Picks the role to register as and moves on to profile details.
    pub fn select_role(&mut self, role: Role) -> Result<(), FlowError> {
        if self.step != RegistrationStep::CollectingRole {
            return Err(FlowError::WrongStep {
                expected: "role selection",
            });
        }
        self.role = Some(role);
        self.step = RegistrationStep::CollectingProfile;
        Ok(())
    }

    /// Validates and stores the profile form, then issues a verification
    /// code and moves to the code step. The challenge is returned so the
    /// caller can deliver the code.
    pub fn submit_profile(
        &mut self,
        form: ProfileForm,
        config: &OnboardingConfig,
    ) -> Result<&OtpChallenge, FlowError> {
        if self.step != RegistrationStep::CollectingProfile {
            return Err(FlowError::WrongStep {
                expected: "profile details",
            });
        }
        let role = self.role.clone().ok_or(FlowError::RoleNotSelected)?;
        let form = form.cleaned(&role, config)?;
        self.profile = Some(form);
        self.step = RegistrationStep::AwaitingCode;
        Ok(&*self.challenge.insert(OtpChallenge::issue()))
    }

    /// Steps back one screen. Entered values stay on the draft; only the
    /// pending verification code is discarded.
    pub fn back(&mut self) -> Result<(), FlowError> {
        match self.step {
            RegistrationStep::AwaitingCode => {
                self.challenge = None;
                self.step = RegistrationStep::CollectingProfile;
                Ok(())
            }
            RegistrationStep::CollectingProfile => {
                self.step = RegistrationStep::CollectingRole;
                Ok(())
            }
            _ => Err(FlowError::CannotGoBack),
        }
    }

    /// Replaces the pending code with a fresh one.
    pub fn regenerate_code(&mut self) -> Result<&OtpChallenge, FlowError> {
        if self.step != RegistrationStep::AwaitingCode {
            return Err(FlowError::WrongStep {
                expected: "code entry",
            });
        }
        Ok(&*self.challenge.insert(OtpChallenge::issue()))
    }

    pub(crate) fn verify_code(
        &mut self,
        entered: &str,
        config: &OnboardingConfig,
    ) -> Result<(), FlowError> {
        if self.step != RegistrationStep::AwaitingCode {
            return Err(FlowError::WrongStep {
                expected: "code entry",
            });
        }
        let challenge = self.challenge.as_mut().ok_or(FlowError::WrongStep {
            expected: "code entry",
        })?;
        challenge.verify(entered, config)
    }

    pub(crate) fn begin_commit(&mut self) {
        self.step = RegistrationStep::Committing;
    }

    /// Returns the draft to the code step so the registrant can fix the
    /// form (or retry) after a failed commit.
    pub(crate) fn abort_commit(&mut self) {
        self.step = RegistrationStep::AwaitingCode;
    }

    pub(crate) fn finish(&mut self) {
        self.step = RegistrationStep::Done;
    }
}

impl Default for RegistrationDraft {
    fn default() -> Self {
        Self::new()
    }
}
