//! Principal domain model.
//!
//! A principal is any authenticable identity: super-admin, corporate
//! user, employee, or vendor user. All variants share one credential
//! record; the `role` field discriminates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lockout::LockoutState;
use crate::models::role::Role;

/// Tenant ownership boundary of a principal.
///
/// Immutable after creation. Every credential lookup except the
/// login-identifier lookup is scoped by it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TenantScope {
    pub corporate_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
}

impl TenantScope {
    pub fn corporate(corporate_id: Uuid) -> Self {
        Self {
            corporate_id: Some(corporate_id),
            vendor_id: None,
        }
    }

    /// Scope of the platform itself (super-admins).
    pub fn global() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
    pub corporate_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    /// Globally unique, uppercase. Assigned exactly once at creation
    /// and never recomputed.
    pub login_identifier: String,
    /// Display code for employees; not a login key.
    pub employee_code: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    /// Argon2id PHC string. Never leaves the auth path.
    pub secret_hash: String,
    pub must_rotate_secret: bool,
    pub secret_changed_at: Option<DateTime<Utc>>,
    pub secret_expires_at: Option<DateTime<Utc>>,
    pub failed_attempts: u32,
    pub locked_until: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_login_ip: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    pub fn tenant_scope(&self) -> TenantScope {
        TenantScope {
            corporate_id: self.corporate_id,
            vendor_id: self.vendor_id,
        }
    }

    pub fn lockout_state(&self) -> LockoutState {
        LockoutState {
            failed_attempts: self.failed_attempts,
            locked_until: self.locked_until,
        }
    }
}

/// Creation input. The secret arrives already hashed — hashing happens
/// in the auth layer, never in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePrincipal {
    pub role: Role,
    pub corporate_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub login_identifier: String,
    pub employee_code: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub secret_hash: String,
}
