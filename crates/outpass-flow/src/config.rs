//! Onboarding configuration.

use outpass_core::models::system::SystemConfig;

/// Configuration for the onboarding flows.
#[derive(Debug, Clone)]
pub struct OnboardingConfig {
    /// Verification code lifetime in seconds (default: 300 = 5 minutes).
    pub otp_ttl_secs: u64,
    /// Wrong entries allowed before a code is burned (default: 5).
    pub otp_max_attempts: u32,
    /// Minimum password length (default: 6, the provider's own floor).
    pub min_password_length: usize,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            otp_ttl_secs: 300,
            otp_max_attempts: 5,
            min_password_length: 6,
        }
    }
}

impl From<SystemConfig> for OnboardingConfig {
    fn from(config: SystemConfig) -> Self {
        Self {
            otp_ttl_secs: config.otp_ttl_secs,
            otp_max_attempts: config.otp_max_attempts,
            min_password_length: config.min_password_length,
        }
    }
}
