//! SurrealDB implementation of [`PrincipalRepository`].
//!
//! Lockout mutations are single atomic conditional updates. The
//! failure path is a compare-and-set keyed on `failed_attempts`: the
//! transition is computed from a snapshot with
//! [`LockoutPolicy::on_failure`] and persisted only if the snapshot is
//! still current, otherwise the whole cycle retries. Two concurrent
//! failed logins therefore record two failures — never one.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use fleetgate_core::error::FleetResult;
use fleetgate_core::lockout::{LockoutPolicy, LockoutState};
use fleetgate_core::models::principal::{CreatePrincipal, Principal, TenantScope};
use fleetgate_core::models::role::Role;
use fleetgate_core::repository::PrincipalRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Bounded retries for the lockout compare-and-set. Each miss means a
/// concurrent attempt committed first, so progress is global even when
/// one caller exhausts its budget.
const LOCKOUT_CAS_ATTEMPTS: usize = 8;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct PrincipalRow {
    role: String,
    corporate_id: Option<String>,
    vendor_id: Option<String>,
    login_identifier: String,
    employee_code: Option<String>,
    first_name: String,
    last_name: Option<String>,
    date_of_birth: Option<String>,
    secret_hash: String,
    must_rotate_secret: bool,
    secret_changed_at: Option<DateTime<Utc>>,
    secret_expires_at: Option<DateTime<Utc>>,
    failed_attempts: u32,
    locked_until: Option<DateTime<Utc>>,
    last_login_at: Option<DateTime<Utc>>,
    last_login_ip: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct PrincipalRowWithId {
    record_id: String,
    role: String,
    corporate_id: Option<String>,
    vendor_id: Option<String>,
    login_identifier: String,
    employee_code: Option<String>,
    first_name: String,
    last_name: Option<String>,
    date_of_birth: Option<String>,
    secret_hash: String,
    must_rotate_secret: bool,
    secret_changed_at: Option<DateTime<Utc>>,
    secret_expires_at: Option<DateTime<Utc>>,
    failed_attempts: u32,
    locked_until: Option<DateTime<Utc>>,
    last_login_at: Option<DateTime<Utc>>,
    last_login_ip: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Minimal row for the lockout snapshot read.
#[derive(Debug, SurrealValue)]
struct LockStateRow {
    failed_attempts: u32,
    locked_until: Option<DateTime<Utc>>,
}

fn parse_uuid(field: &str, s: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Query(format!("invalid {field} UUID: {e}")))
}

fn parse_opt_uuid(field: &str, s: Option<String>) -> Result<Option<Uuid>, DbError> {
    s.map(|v| parse_uuid(field, &v)).transpose()
}

fn parse_role(s: &str) -> Result<Role, DbError> {
    Role::from_str(s).ok_or_else(|| DbError::Query(format!("unknown principal role: {s}")))
}

fn parse_opt_date(s: Option<String>) -> Result<Option<NaiveDate>, DbError> {
    s.map(|v| {
        NaiveDate::parse_from_str(&v, "%Y-%m-%d")
            .map_err(|e| DbError::Query(format!("invalid date_of_birth: {e}")))
    })
    .transpose()
}

impl PrincipalRow {
    fn into_principal(self, id: Uuid) -> Result<Principal, DbError> {
        Ok(Principal {
            id,
            role: parse_role(&self.role)?,
            corporate_id: parse_opt_uuid("corporate", self.corporate_id)?,
            vendor_id: parse_opt_uuid("vendor", self.vendor_id)?,
            login_identifier: self.login_identifier,
            employee_code: self.employee_code,
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: parse_opt_date(self.date_of_birth)?,
            secret_hash: self.secret_hash,
            must_rotate_secret: self.must_rotate_secret,
            secret_changed_at: self.secret_changed_at,
            secret_expires_at: self.secret_expires_at,
            failed_attempts: self.failed_attempts,
            locked_until: self.locked_until,
            last_login_at: self.last_login_at,
            last_login_ip: self.last_login_ip,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl PrincipalRowWithId {
    fn try_into_principal(self) -> Result<Principal, DbError> {
        let id = parse_uuid("principal", &self.record_id)?;
        let row = PrincipalRow {
            role: self.role,
            corporate_id: self.corporate_id,
            vendor_id: self.vendor_id,
            login_identifier: self.login_identifier,
            employee_code: self.employee_code,
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: self.date_of_birth,
            secret_hash: self.secret_hash,
            must_rotate_secret: self.must_rotate_secret,
            secret_changed_at: self.secret_changed_at,
            secret_expires_at: self.secret_expires_at,
            failed_attempts: self.failed_attempts,
            locked_until: self.locked_until,
            last_login_at: self.last_login_at,
            last_login_ip: self.last_login_ip,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        row.into_principal(id)
    }
}

/// SurrealDB implementation of the credential store.
#[derive(Clone)]
pub struct SurrealPrincipalRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPrincipalRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PrincipalRepository for SurrealPrincipalRepository<C> {
    async fn create(&self, input: CreatePrincipal) -> FleetResult<Principal> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('principal', $id) SET \
                 role = $role, \
                 corporate_id = $corporate_id, \
                 vendor_id = $vendor_id, \
                 login_identifier = $login_identifier, \
                 employee_code = $employee_code, \
                 first_name = $first_name, \
                 last_name = $last_name, \
                 date_of_birth = $date_of_birth, \
                 secret_hash = $secret_hash, \
                 must_rotate_secret = true, \
                 secret_changed_at = NONE, \
                 secret_expires_at = NONE, \
                 failed_attempts = 0, \
                 locked_until = NONE, \
                 last_login_at = NONE, \
                 last_login_ip = NONE, \
                 is_active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("role", input.role.as_str().to_string()))
            .bind(("corporate_id", input.corporate_id.map(|v| v.to_string())))
            .bind(("vendor_id", input.vendor_id.map(|v| v.to_string())))
            .bind(("login_identifier", input.login_identifier))
            .bind(("employee_code", input.employee_code))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("date_of_birth", input.date_of_birth.map(|d| d.to_string())))
            .bind(("secret_hash", input.secret_hash))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| {
            if DbError::is_unique_violation(&e) {
                DbError::Conflict {
                    entity: "principal".into(),
                }
            } else {
                DbError::Query(e.to_string())
            }
        })?;

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: id_str,
        })?;

        Ok(row.into_principal(id)?)
    }

    async fn get_by_id(&self, scope: TenantScope, id: Uuid) -> FleetResult<Principal> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('principal', $id) \
                 WHERE corporate_id = $corporate_id \
                 AND vendor_id = $vendor_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("corporate_id", scope.corporate_id.map(|v| v.to_string())))
            .bind(("vendor_id", scope.vendor_id.map(|v| v.to_string())))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: id_str,
        })?;

        Ok(row.into_principal(id)?)
    }

    async fn find_for_auth(&self, login_identifier: &str) -> FleetResult<Principal> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM principal \
                 WHERE login_identifier = $login_identifier",
            )
            .bind(("login_identifier", login_identifier.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PrincipalRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: format!("login_identifier={login_identifier}"),
        })?;

        Ok(row.try_into_principal()?)
    }

    async fn set_secret(
        &self,
        id: Uuid,
        new_hash: String,
        rotation_period: Duration,
    ) -> FleetResult<Principal> {
        let id_str = id.to_string();
        let now = Utc::now();

        let result = self
            .db
            .query(
                "UPDATE type::record('principal', $id) SET \
                 secret_hash = $secret_hash, \
                 secret_changed_at = $changed_at, \
                 secret_expires_at = $expires_at, \
                 must_rotate_secret = false, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("secret_hash", new_hash))
            .bind(("changed_at", now))
            .bind(("expires_at", now + rotation_period))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: id_str,
        })?;

        Ok(row.into_principal(id)?)
    }

    async fn record_failure(&self, id: Uuid, policy: LockoutPolicy) -> FleetResult<Principal> {
        let id_str = id.to_string();

        for _ in 0..LOCKOUT_CAS_ATTEMPTS {
            // Snapshot the lockout fields.
            let mut result = self
                .db
                .query(
                    "SELECT failed_attempts, locked_until \
                     FROM type::record('principal', $id)",
                )
                .bind(("id", id_str.clone()))
                .await
                .map_err(DbError::from)?;
            let rows: Vec<LockStateRow> = result.take(0).map_err(DbError::from)?;
            let snapshot = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
                entity: "principal".into(),
                id: id_str.clone(),
            })?;

            let state = LockoutState {
                failed_attempts: snapshot.failed_attempts,
                locked_until: snapshot.locked_until,
            };
            let next = policy.on_failure(state, Utc::now());

            // Compare-and-set: persists only if no concurrent attempt
            // committed since the snapshot.
            let result = self
                .db
                .query(
                    "UPDATE type::record('principal', $id) SET \
                     failed_attempts = $attempts, \
                     locked_until = $locked_until, \
                     updated_at = time::now() \
                     WHERE failed_attempts = $expected",
                )
                .bind(("id", id_str.clone()))
                .bind(("attempts", next.failed_attempts))
                .bind(("locked_until", next.locked_until))
                .bind(("expected", state.failed_attempts))
                .await
                .map_err(DbError::from)?;

            let mut result = result
                .check()
                .map_err(|e| DbError::Query(e.to_string()))?;

            let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
            if let Some(row) = rows.into_iter().next() {
                return Ok(row.into_principal(id)?);
            }
            // CAS missed; re-read and retry.
        }

        Err(DbError::Query("lockout update exceeded retry budget under contention".into()).into())
    }

    async fn record_success(&self, id: Uuid, ip_address: Option<String>) -> FleetResult<Principal> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('principal', $id) SET \
                 failed_attempts = 0, \
                 locked_until = NONE, \
                 last_login_at = time::now(), \
                 last_login_ip = $ip_address, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("ip_address", ip_address))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: id_str,
        })?;

        Ok(row.into_principal(id)?)
    }

    async fn deactivate(&self, scope: TenantScope, id: Uuid) -> FleetResult<()> {
        // Soft-delete: principals are never physically removed.
        let id_str = id.to_string();

        self.db
            .query(
                "UPDATE type::record('principal', $id) SET \
                 is_active = false, updated_at = time::now() \
                 WHERE corporate_id = $corporate_id \
                 AND vendor_id = $vendor_id",
            )
            .bind(("id", id_str))
            .bind(("corporate_id", scope.corporate_id.map(|v| v.to_string())))
            .bind(("vendor_id", scope.vendor_id.map(|v| v.to_string())))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
