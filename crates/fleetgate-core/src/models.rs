//! Domain models for FLEETGATE.
//!
//! These are the core types shared across all crates.

pub mod audit;
pub mod corporate;
pub mod principal;
pub mod role;
