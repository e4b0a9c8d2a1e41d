//! One-time verification codes for registration.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::config::OnboardingConfig;
use crate::error::FlowError;

/// A six-digit code issued when a registration reaches verification.
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    code: String,
    issued_at: DateTime<Utc>,
    attempts: u32,
}

impl OtpChallenge {
    /// Issues a fresh code with a clean attempt budget.
    pub fn issue() -> Self {
        let code = rand::rng().random_range(100_000u32..1_000_000);
        Self {
            code: code.to_string(),
            issued_at: Utc::now(),
            attempts: 0,
        }
    }

    /// The code itself, for delivery to the registrant.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Checks an entered code against this challenge.
    ///
    /// Expiry is checked before the attempt budget, so a stale code
    /// reads as expired rather than exhausted. A mismatch consumes one
    /// attempt; expiry and exhaustion do not.
    pub(crate) fn verify(
        &mut self,
        entered: &str,
        config: &OnboardingConfig,
    ) -> Result<(), FlowError> {
        let age = Utc::now() - self.issued_at;
        if age >= Duration::seconds(config.otp_ttl_secs as i64) {
            return Err(FlowError::CodeExpired);
        }
        if self.attempts >= config.otp_max_attempts {
            return Err(FlowError::TooManyAttempts);
        }
        if entered != self.code {
            self.attempts += 1;
            return Err(FlowError::CodeMismatch);
        }
        Ok(())
    }
}
