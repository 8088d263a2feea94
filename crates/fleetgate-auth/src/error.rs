//! Authentication error types.

use fleetgate_core::error::FleetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong identifier or wrong secret — deliberately uninformative
    /// so callers cannot enumerate accounts.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account locked, try again in {minutes_remaining} minutes")]
    AccountLocked { minutes_remaining: i64 },

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for FleetError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => FleetError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::AccountLocked { minutes_remaining } => {
                FleetError::AccountLocked { minutes_remaining }
            }
            AuthError::TokenExpired | AuthError::TokenInvalid(_) => {
                FleetError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            AuthError::Crypto(msg) => FleetError::Crypto(msg),
        }
    }
}
