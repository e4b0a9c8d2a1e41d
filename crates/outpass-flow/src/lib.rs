//! Outpass Flow — registration onboarding, sign-in, and the gate-pass
//! and complaint workflows.

pub mod audit;
pub mod complaint;
pub mod config;
pub mod error;
pub mod gatepass;
pub mod onboarding;
pub mod otp;
pub mod registration;
pub mod review;

pub use audit::ActivityLog;
pub use complaint::{ComplaintForm, ComplaintService};
pub use config::OnboardingConfig;
pub use error::FlowError;
pub use gatepass::{GatePassService, PassForm, PendingGatePass, StudentOverview};
pub use onboarding::OnboardingService;
pub use registration::{ProfileForm, RegistrationDraft, RegistrationStep};
pub use review::RegistrationReview;
