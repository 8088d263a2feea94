//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    fleetgate_db::run_migrations(&db).await.unwrap();

    // Verify that all tables exist by querying INFO FOR DB.
    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    assert!(info_str.contains("corporate"), "missing corporate table");
    assert!(info_str.contains("principal"), "missing principal table");
    assert!(info_str.contains("audit_log"), "missing audit_log table");
    assert!(info_str.contains("_migration"), "missing _migration table");
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    fleetgate_db::run_migrations(&db).await.unwrap();
    fleetgate_db::run_migrations(&db).await.unwrap();

    // Exactly one migration record per version.
    let mut result = db
        .query("SELECT count() FROM _migration GROUP ALL")
        .await
        .unwrap();
    let counts: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    let count_str = format!("{:?}", counts);
    assert!(count_str.contains("1"), "expected one migration record");
}
