//! Database-specific error types and conversions.

use fleetgate_core::error::FleetError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint violated: {entity}")]
    Conflict { entity: String },
}

impl DbError {
    /// SurrealDB reports unique-index violations only through the
    /// error message, so collision detection is textual.
    pub(crate) fn is_unique_violation(err: &surrealdb::Error) -> bool {
        err.to_string().contains("already contains")
    }
}

impl From<DbError> for FleetError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => FleetError::NotFound { entity, id },
            DbError::Conflict { entity } => FleetError::AlreadyExists { entity },
            other => FleetError::Database(other.to_string()),
        }
    }
}
