//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Principal reads other than the
//! login-identifier lookup require a [`TenantScope`] to enforce data
//! isolation. Lockout mutations are atomic per document — the store
//! serializes concurrent attempts against the same principal so that
//! `failed_attempts`/`locked_until` never lose updates.

use chrono::Duration;
use uuid::Uuid;

use crate::error::FleetResult;
use crate::lockout::LockoutPolicy;
use crate::models::{
    audit::{AuditLogEntry, CreateAuditLogEntry},
    corporate::{Corporate, CreateCorporate},
    principal::{CreatePrincipal, Principal, TenantScope},
};

/// Persistent credential store for principals.
pub trait PrincipalRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the login identifier collides
    /// within its (global) uniqueness domain.
    fn create(&self, input: CreatePrincipal) -> impl Future<Output = FleetResult<Principal>> + Send;

    fn get_by_id(
        &self,
        scope: TenantScope,
        id: Uuid,
    ) -> impl Future<Output = FleetResult<Principal>> + Send;

    /// Lookup for authentication. Returns the full record including
    /// `secret_hash`, `failed_attempts`, and `locked_until` — fields
    /// hidden from general reads. The identifier must already be
    /// uppercase-normalized by the caller.
    fn find_for_auth(
        &self,
        login_identifier: &str,
    ) -> impl Future<Output = FleetResult<Principal>> + Send;

    /// Atomically replaces the secret hash, stamps
    /// `secret_changed_at = now`, `secret_expires_at = now + rotation_period`,
    /// and clears `must_rotate_secret`.
    fn set_secret(
        &self,
        id: Uuid,
        new_hash: String,
        rotation_period: Duration,
    ) -> impl Future<Output = FleetResult<Principal>> + Send;

    /// Applies [`LockoutPolicy::on_failure`] and persists the result
    /// as a single atomic conditional update (compare-and-set on
    /// `failed_attempts`). Concurrent failures never under-count.
    fn record_failure(
        &self,
        id: Uuid,
        policy: LockoutPolicy,
    ) -> impl Future<Output = FleetResult<Principal>> + Send;

    /// Resets the lockout machine to `UNLOCKED(0)` and updates
    /// last-login metadata. Only called after successful verification.
    fn record_success(
        &self,
        id: Uuid,
        ip_address: Option<String>,
    ) -> impl Future<Output = FleetResult<Principal>> + Send;

    /// Soft-delete: clears `is_active`. Principals are never
    /// physically removed.
    fn deactivate(
        &self,
        scope: TenantScope,
        id: Uuid,
    ) -> impl Future<Output = FleetResult<()>> + Send;
}

pub trait CorporateRepository: Send + Sync {
    /// Fails with `AlreadyExists` on a corporate-code collision; the
    /// caller re-derives with a fresh suffix.
    fn create(&self, input: CreateCorporate)
    -> impl Future<Output = FleetResult<Corporate>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = FleetResult<Corporate>> + Send;

    fn get_by_code(&self, code: &str) -> impl Future<Output = FleetResult<Corporate>> + Send;
}

/// Append-only login audit trail.
pub trait AuditLogRepository: Send + Sync {
    fn append(
        &self,
        input: CreateAuditLogEntry,
    ) -> impl Future<Output = FleetResult<AuditLogEntry>> + Send;

    /// Most recent entries for one login identifier, newest first.
    fn list_by_login(
        &self,
        login_identifier: &str,
        limit: u64,
    ) -> impl Future<Output = FleetResult<Vec<AuditLogEntry>>> + Send;
}
