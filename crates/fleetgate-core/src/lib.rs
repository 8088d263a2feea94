//! FLEETGATE Core — domain models, the account lockout state machine,
//! and repository trait definitions shared across all crates.

pub mod error;
pub mod lockout;
pub mod models;
pub mod repository;

pub use error::{FleetError, FleetResult};
pub use lockout::{LockoutPolicy, LockoutState};
