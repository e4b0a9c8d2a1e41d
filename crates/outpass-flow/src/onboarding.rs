//! Onboarding service — registration commit and sign-in orchestration.

use outpass_core::error::{OutpassError, OutpassResult};
use outpass_core::identity::{IdentityError, IdentityProvider};
use outpass_core::models::audit::{ActivityKind, CreateAuditEntry};
use outpass_core::models::profile::{ApprovalStatus, CreateProfile, Principal, Role, UserProfile};
use outpass_core::models::system::counters;
use outpass_core::repository::{AuditLogRepository, ProfileRepository, SystemRepository};
use tracing::warn;

use crate::config::OnboardingConfig;
use crate::error::FlowError;
use crate::registration::RegistrationDraft;

/// Onboarding service.
///
/// Generic over the identity provider and repository implementations so
/// that the flow layer has no dependency on the database crate.
pub struct OnboardingService<
    I: IdentityProvider,
    P: ProfileRepository,
    S: SystemRepository,
    A: AuditLogRepository,
> {
    provider: I,
    profiles: P,
    system: S,
    audit: A,
    config: OnboardingConfig,
}

impl<
    I: IdentityProvider,
    P: ProfileRepository,
    S: SystemRepository,
    A: AuditLogRepository,
> OnboardingService<I, P, S, A>
{
    pub fn new(provider: I, profiles: P, system: S, audit: A, config: OnboardingConfig) -> Self {
        Self {
            provider,
            profiles,
            system,
            audit,
            config,
        }
    }

    pub fn config(&self) -> &OnboardingConfig {
        &self.config
    }

    /// Commits a verified registration: creates the credential with the
    /// identity provider, then the profile record keyed by the new
    /// identity handle.
    ///
    /// On a provider or store failure the draft returns to the code step
    /// with its inputs intact, so the registrant can correct and retry.
    /// On success the fresh identity is signed out again; access starts
    /// at sign-in, after review where the role requires it.
    pub async fn commit(
        &self,
        draft: &mut RegistrationDraft,
        entered_code: &str,
    ) -> OutpassResult<UserProfile> {
        // 1. Check the entered code against the draft's challenge.
        draft.verify_code(entered_code, &self.config)?;

        let form = draft
            .profile()
            .cloned()
            .ok_or_else(|| OutpassError::Internal("registration draft has no profile".into()))?;

        draft.begin_commit();

        // 2. Create the credential. Provider rejections (email in use,
        //    weak password) surface verbatim; nothing was persisted yet.
        let identity = match self
            .provider
            .create_identity(&form.email, &form.password)
            .await
        {
            Ok(id) => id,
            Err(err) => {
                draft.abort_commit();
                return Err(err.into());
            }
        };

        // 3. Persist the profile keyed by the identity handle. The code
        //    and password never reach the store. If this write fails the
        //    credential already exists and is not compensated.
        let created = self
            .profiles
            .create(CreateProfile {
                id: identity,
                full_name: form.full_name,
                email: form.email,
                phone: form.phone,
                username: form.username,
                details: form.details,
            })
            .await;
        let profile = match created {
            Ok(profile) => profile,
            Err(err) => {
                draft.abort_commit();
                return Err(err);
            }
        };

        // 4. Best-effort bookkeeping; a failed counter or audit write
        //    does not undo the registration.
        if let Err(err) = self.system.increment_counter(counters::REGISTRATIONS).await {
            warn!(error = %err, "registration counter update failed");
        }
        if let Err(err) = self
            .audit
            .append(CreateAuditEntry {
                user_id: profile.id,
                kind: ActivityKind::Registration,
                activity: format!("new {} registration: {}", profile.role, profile.full_name),
            })
            .await
        {
            warn!(error = %err, "registration audit write failed");
        }

        // 5. Sign the new identity out so a pending account cannot reach
        //    a dashboard before review.
        self.provider.sign_out().await;
        draft.finish();

        Ok(profile)
    }

    /// Signs a user in to the portal for `role` and returns the caller's
    /// principal.
    ///
    /// The credential may be a username or an email. A correct password
    /// alone is not enough: the stored role must match the portal the
    /// user picked, and reviewed roles must already be approved. Every
    /// rejection past authentication signs the identity back out.
    pub async fn sign_in(
        &self,
        role: Role,
        credential: &str,
        password: &str,
    ) -> OutpassResult<Principal> {
        let credential = credential.trim();

        // 1. Resolve a username to its registered email. Emails carry
        //    '@'; usernames cannot.
        let email = if credential.contains('@') {
            credential.to_string()
        } else {
            match self.profiles.get_by_username(credential).await {
                Ok(profile) => profile.email,
                Err(OutpassError::NotFound { .. }) => {
                    return Err(IdentityError::NotFound.into());
                }
                Err(err) => return Err(err),
            }
        };

        // 2. Verify the credential with the provider. Success makes the
        //    identity current.
        let identity = self.provider.authenticate(&email, password).await?;

        // 3. Load the profile behind the identity. An identity without a
        //    profile is a fatal inconsistency; back out of the session.
        let profile = match self.profiles.get_by_id(identity).await {
            Ok(profile) => profile,
            Err(err) => {
                self.provider.sign_out().await;
                return Err(err);
            }
        };

        // 4. The account must belong to the portal's role.
        if profile.role != role {
            self.provider.sign_out().await;
            return Err(FlowError::RoleMismatch.into());
        }

        // 5. Reviewed roles need an approved account.
        if profile.status != ApprovalStatus::Approved && !profile.role.is_auto_approved() {
            self.provider.sign_out().await;
            return Err(FlowError::AccountNotApproved.into());
        }

        // 6. Stamp the login and audit it.
        if let Err(err) = self.profiles.touch_last_login(profile.id).await {
            self.provider.sign_out().await;
            return Err(err);
        }
        if let Err(err) = self
            .audit
            .append(CreateAuditEntry {
                user_id: profile.id,
                kind: ActivityKind::Auth,
                activity: "signed in".to_string(),
            })
            .await
        {
            warn!(error = %err, "sign-in audit write failed");
        }

        Ok(Principal::from(&profile))
    }
}
