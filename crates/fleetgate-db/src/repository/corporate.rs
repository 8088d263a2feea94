//! SurrealDB implementation of [`CorporateRepository`].

use chrono::{DateTime, Utc};
use fleetgate_core::error::FleetResult;
use fleetgate_core::models::corporate::{Corporate, CreateCorporate};
use fleetgate_core::repository::CorporateRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct CorporateRow {
    name: String,
    code: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CorporateRowWithId {
    record_id: String,
    name: String,
    code: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CorporateRow {
    fn into_corporate(self, id: Uuid) -> Corporate {
        Corporate {
            id,
            name: self.name,
            code: self.code,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct SurrealCorporateRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCorporateRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CorporateRepository for SurrealCorporateRepository<C> {
    async fn create(&self, input: CreateCorporate) -> FleetResult<Corporate> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('corporate', $id) SET \
                 name = $name, code = $code, is_active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("code", input.code))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| {
            if DbError::is_unique_violation(&e) {
                DbError::Conflict {
                    entity: "corporate".into(),
                }
            } else {
                DbError::Query(e.to_string())
            }
        })?;

        let rows: Vec<CorporateRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "corporate".into(),
            id: id_str,
        })?;

        Ok(row.into_corporate(id))
    }

    async fn get_by_id(&self, id: Uuid) -> FleetResult<Corporate> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('corporate', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CorporateRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "corporate".into(),
            id: id_str,
        })?;

        Ok(row.into_corporate(id))
    }

    async fn get_by_code(&self, code: &str) -> FleetResult<Corporate> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM corporate \
                 WHERE code = $code",
            )
            .bind(("code", code.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CorporateRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "corporate".into(),
            id: format!("code={code}"),
        })?;

        let id = Uuid::parse_str(&row.record_id)
            .map_err(|e| DbError::Query(format!("invalid corporate UUID: {e}")))?;

        Ok(Corporate {
            id,
            name: row.name,
            code: row.code,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
