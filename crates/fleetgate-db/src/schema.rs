//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Corporates (tenants, global scope)
-- =======================================================================
DEFINE TABLE corporate SCHEMAFULL;
DEFINE FIELD name ON TABLE corporate TYPE string;
DEFINE FIELD code ON TABLE corporate TYPE string;
DEFINE FIELD is_active ON TABLE corporate TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE corporate TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE corporate TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_corporate_code ON TABLE corporate \
    COLUMNS code UNIQUE;

-- =======================================================================
-- Principals (all authenticable identities, discriminated by role)
-- =======================================================================
DEFINE TABLE principal SCHEMAFULL;
DEFINE FIELD role ON TABLE principal TYPE string \
    ASSERT $value IN ['SUPER_ADMIN', 'CORPORATE_ADMIN', \
    'CORPORATE_SUPERVISOR', 'EMPLOYEE', 'VENDOR_ADMIN', \
    'VENDOR_SUPERVISOR'];
DEFINE FIELD corporate_id ON TABLE principal TYPE option<string>;
DEFINE FIELD vendor_id ON TABLE principal TYPE option<string>;
DEFINE FIELD login_identifier ON TABLE principal TYPE string;
DEFINE FIELD employee_code ON TABLE principal TYPE option<string>;
DEFINE FIELD first_name ON TABLE principal TYPE string;
DEFINE FIELD last_name ON TABLE principal TYPE option<string>;
DEFINE FIELD date_of_birth ON TABLE principal TYPE option<string>;
DEFINE FIELD secret_hash ON TABLE principal TYPE string;
DEFINE FIELD must_rotate_secret ON TABLE principal TYPE bool \
    DEFAULT true;
DEFINE FIELD secret_changed_at ON TABLE principal \
    TYPE option<datetime>;
DEFINE FIELD secret_expires_at ON TABLE principal \
    TYPE option<datetime>;
DEFINE FIELD failed_attempts ON TABLE principal TYPE int DEFAULT 0;
DEFINE FIELD locked_until ON TABLE principal TYPE option<datetime>;
DEFINE FIELD last_login_at ON TABLE principal TYPE option<datetime>;
DEFINE FIELD last_login_ip ON TABLE principal TYPE option<string>;
DEFINE FIELD is_active ON TABLE principal TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE principal TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE principal TYPE datetime \
    DEFAULT time::now();
-- Login identifiers are globally unique across all tenants.
DEFINE INDEX idx_principal_login ON TABLE principal \
    COLUMNS login_identifier UNIQUE;
DEFINE INDEX idx_principal_corporate ON TABLE principal \
    COLUMNS corporate_id;
DEFINE INDEX idx_principal_employee_code ON TABLE principal \
    COLUMNS employee_code;

-- =======================================================================
-- Login Audit Log (append-only)
-- =======================================================================
DEFINE TABLE audit_log SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD principal_id ON TABLE audit_log TYPE option<string>;
DEFINE FIELD login_identifier ON TABLE audit_log TYPE string;
DEFINE FIELD action ON TABLE audit_log TYPE string;
DEFINE FIELD outcome ON TABLE audit_log TYPE string \
    ASSERT $value IN ['Success', 'Failure'];
DEFINE FIELD ip_address ON TABLE audit_log TYPE option<string>;
DEFINE FIELD user_agent ON TABLE audit_log TYPE option<string>;
DEFINE FIELD timestamp ON TABLE audit_log TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_audit_login_time ON TABLE audit_log \
    COLUMNS login_identifier, timestamp;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
