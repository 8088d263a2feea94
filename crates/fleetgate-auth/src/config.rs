//! Authentication configuration.

use chrono::Duration;
use fleetgate_core::lockout::LockoutPolicy;

/// Configuration for the authentication services.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// PEM-encoded Ed25519 private key for JWT signing.
    pub jwt_private_key_pem: String,
    /// PEM-encoded Ed25519 public key for JWT verification.
    pub jwt_public_key_pem: String,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Session token lifetime in seconds (default: 604_800 = 7 days).
    pub session_lifetime_secs: u64,
    /// Optional pepper prepended to secrets before Argon2id hashing.
    pub pepper: Option<String>,
    /// Minimum secret length for the strength policy.
    pub min_secret_length: usize,
    /// Max consecutive failed login attempts before lockout (default: 5).
    pub max_failed_attempts: u32,
    /// Lockout duration in seconds (default: 1800 = 30 minutes).
    pub lockout_duration_secs: u64,
    /// Days until a rotated secret expires again (default: 90).
    pub secret_rotation_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_private_key_pem: String::new(),
            jwt_public_key_pem: String::new(),
            jwt_issuer: "fleetgate".into(),
            session_lifetime_secs: 604_800,
            pepper: None,
            min_secret_length: 10,
            max_failed_attempts: 5,
            lockout_duration_secs: 1800,
            secret_rotation_days: 90,
        }
    }
}

impl AuthConfig {
    pub fn lockout_policy(&self) -> LockoutPolicy {
        LockoutPolicy {
            max_attempts: self.max_failed_attempts,
            lock_duration: Duration::seconds(self.lockout_duration_secs as i64),
        }
    }

    pub fn rotation_period(&self) -> Duration {
        Duration::days(self.secret_rotation_days)
    }
}
