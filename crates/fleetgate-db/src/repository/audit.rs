//! SurrealDB implementation of [`AuditLogRepository`].
//!
//! The `audit_log` table is append-only; the schema denies UPDATE and
//! DELETE, so this repository only ever creates and selects.

use chrono::{DateTime, Utc};
use fleetgate_core::error::FleetResult;
use fleetgate_core::models::audit::{AuditLogEntry, AuditOutcome, CreateAuditLogEntry};
use fleetgate_core::repository::AuditLogRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

fn outcome_str(outcome: &AuditOutcome) -> &'static str {
    match outcome {
        AuditOutcome::Success => "Success",
        AuditOutcome::Failure => "Failure",
    }
}

fn parse_outcome(s: &str) -> Result<AuditOutcome, DbError> {
    match s {
        "Success" => Ok(AuditOutcome::Success),
        "Failure" => Ok(AuditOutcome::Failure),
        other => Err(DbError::Query(format!("unknown audit outcome: {other}"))),
    }
}

#[derive(Debug, SurrealValue)]
struct AuditRow {
    principal_id: Option<String>,
    login_identifier: String,
    action: String,
    outcome: String,
    ip_address: Option<String>,
    user_agent: Option<String>,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct AuditRowWithId {
    record_id: String,
    principal_id: Option<String>,
    login_identifier: String,
    action: String,
    outcome: String,
    ip_address: Option<String>,
    user_agent: Option<String>,
    timestamp: DateTime<Utc>,
}

impl AuditRow {
    fn into_entry(self, id: Uuid) -> Result<AuditLogEntry, DbError> {
        Ok(AuditLogEntry {
            id,
            principal_id: self
                .principal_id
                .map(|v| {
                    Uuid::parse_str(&v)
                        .map_err(|e| DbError::Query(format!("invalid principal UUID: {e}")))
                })
                .transpose()?,
            login_identifier: self.login_identifier,
            action: self.action,
            outcome: parse_outcome(&self.outcome)?,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            timestamp: self.timestamp,
        })
    }
}

#[derive(Clone)]
pub struct SurrealAuditLogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAuditLogRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AuditLogRepository for SurrealAuditLogRepository<C> {
    async fn append(&self, input: CreateAuditLogEntry) -> FleetResult<AuditLogEntry> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "CREATE type::record('audit_log', $id) SET \
                 principal_id = $principal_id, \
                 login_identifier = $login_identifier, \
                 action = $action, \
                 outcome = $outcome, \
                 ip_address = $ip_address, \
                 user_agent = $user_agent",
            )
            .bind(("id", id_str.clone()))
            .bind(("principal_id", input.principal_id.map(|v| v.to_string())))
            .bind(("login_identifier", input.login_identifier))
            .bind(("action", input.action))
            .bind(("outcome", outcome_str(&input.outcome).to_string()))
            .bind(("ip_address", input.ip_address))
            .bind(("user_agent", input.user_agent))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<AuditRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "audit_log".into(),
            id: id_str,
        })?;

        Ok(row.into_entry(id)?)
    }

    async fn list_by_login(
        &self,
        login_identifier: &str,
        limit: u64,
    ) -> FleetResult<Vec<AuditLogEntry>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM audit_log \
                 WHERE login_identifier = $login_identifier \
                 ORDER BY timestamp DESC LIMIT $limit",
            )
            .bind(("login_identifier", login_identifier.to_string()))
            .bind(("limit", limit))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AuditRowWithId> = result.take(0).map_err(DbError::from)?;
        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let id = Uuid::parse_str(&row.record_id)
                .map_err(|e| DbError::Query(format!("invalid audit_log UUID: {e}")))?;
            let flat = AuditRow {
                principal_id: row.principal_id,
                login_identifier: row.login_identifier,
                action: row.action,
                outcome: row.outcome,
                ip_address: row.ip_address,
                user_agent: row.user_agent,
                timestamp: row.timestamp,
            };
            entries.push(flat.into_entry(id)?);
        }

        Ok(entries)
    }
}
