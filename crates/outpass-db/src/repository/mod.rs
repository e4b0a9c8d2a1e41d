//! SurrealDB repository implementations.

mod audit;
mod complaint;
mod gatepass;
mod profile;
mod system;

pub use audit::SurrealAuditLogRepository;
pub use complaint::SurrealComplaintRepository;
pub use gatepass::SurrealGatePassRepository;
pub use profile::SurrealProfileRepository;
pub use system::SurrealSystemRepository;
