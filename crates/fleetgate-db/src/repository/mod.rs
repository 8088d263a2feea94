//! SurrealDB-backed implementations of the `fleetgate-core`
//! repository traits.

mod audit;
mod corporate;
mod principal;

pub use audit::SurrealAuditLogRepository;
pub use corporate::SurrealCorporateRepository;
pub use principal::SurrealPrincipalRepository;
