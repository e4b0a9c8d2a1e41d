//! System-wide configuration and usage counters.

use serde::{Deserialize, Serialize};

/// Counter names used by the workflow services. Counters are best-effort
/// statistics; they are never read back to enforce anything.
pub mod counters {
    pub const REGISTRATIONS: &str = "registrations";
    pub const GATE_PASSES: &str = "gate_passes";
    pub const COMPLAINTS: &str = "complaints";
}

/// Operational knobs persisted as the single `system_config` record and
/// loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemConfig {
    /// Seconds a registration code stays valid after issue.
    pub otp_ttl_secs: u64,
    /// Wrong entries tolerated before the code must be regenerated.
    pub otp_max_attempts: u32,
    pub min_password_length: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            otp_ttl_secs: 300,
            otp_max_attempts: 5,
            min_password_length: 6,
        }
    }
}
