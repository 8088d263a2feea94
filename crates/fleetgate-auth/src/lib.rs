//! FLEETGATE Auth — identifier derivation, temporary-secret bootstrap,
//! password hashing, lockout-aware login, and session token issuance.

pub mod codec;
pub mod config;
pub mod error;
pub mod password;
pub mod provision;
pub mod secret;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use provision::{NewPrincipalInput, ProvisionedPrincipal, ProvisioningService};
pub use service::{AuthService, ChangeSecretInput, LoginInput, LoginOutcome};
pub use token::SessionClaims;
