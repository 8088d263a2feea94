//! Integration tests for the principal repository using in-memory
//! SurrealDB.

use chrono::{Duration, NaiveDate, Utc};
use fleetgate_core::error::FleetError;
use fleetgate_core::lockout::LockoutPolicy;
use fleetgate_core::models::principal::{CreatePrincipal, TenantScope};
use fleetgate_core::models::role::Role;
use fleetgate_core::repository::PrincipalRepository;
use fleetgate_db::repository::SurrealPrincipalRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> (Surreal<Db>, SurrealPrincipalRepository<Db>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    fleetgate_db::run_migrations(&db).await.unwrap();
    let repo = SurrealPrincipalRepository::new(db.clone());
    (db, repo)
}

fn employee_input(login_identifier: &str, corporate_id: Uuid) -> CreatePrincipal {
    CreatePrincipal {
        role: Role::Employee,
        corporate_id: Some(corporate_id),
        vendor_id: None,
        login_identifier: login_identifier.into(),
        employee_code: Some("EMP-ACM-ASHARA-0B1C".into()),
        first_name: "Asha".into(),
        last_name: Some("Rao".into()),
        date_of_birth: NaiveDate::from_ymd_opt(1998, 4, 2),
        secret_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
    }
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_and_find_for_auth() {
    let (_db, repo) = setup().await;
    let corporate_id = Uuid::new_v4();

    let created = repo
        .create(employee_input("ACMASHA98", corporate_id))
        .await
        .unwrap();
    assert_eq!(created.login_identifier, "ACMASHA98");
    assert_eq!(created.role, Role::Employee);
    assert!(created.must_rotate_secret);
    assert!(created.is_active);
    assert_eq!(created.failed_attempts, 0);
    assert!(created.locked_until.is_none());
    assert_eq!(
        created.date_of_birth,
        NaiveDate::from_ymd_opt(1998, 4, 2)
    );

    // The auth lookup returns the full credential record.
    let found = repo.find_for_auth("ACMASHA98").await.unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.secret_hash, created.secret_hash);
    assert_eq!(found.corporate_id, Some(corporate_id));
}

#[tokio::test]
async fn duplicate_login_identifier_is_rejected() {
    let (_db, repo) = setup().await;

    repo.create(employee_input("ACMASHA98", Uuid::new_v4()))
        .await
        .unwrap();
    // Uniqueness is global, so a different tenant still collides.
    let err = repo
        .create(employee_input("ACMASHA98", Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::AlreadyExists { .. }));
}

#[tokio::test]
async fn get_by_id_enforces_the_tenant_scope() {
    let (_db, repo) = setup().await;
    let corporate_id = Uuid::new_v4();

    let created = repo
        .create(employee_input("ACMASHA98", corporate_id))
        .await
        .unwrap();

    let found = repo
        .get_by_id(TenantScope::corporate(corporate_id), created.id)
        .await
        .unwrap();
    assert_eq!(found.id, created.id);

    let err = repo
        .get_by_id(TenantScope::corporate(Uuid::new_v4()), created.id)
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::NotFound { .. }));
}

#[tokio::test]
async fn find_for_auth_misses_unknown_identifier() {
    let (_db, repo) = setup().await;

    let err = repo.find_for_auth("NOBODY00").await.unwrap_err();
    assert!(matches!(err, FleetError::NotFound { .. }));
}

#[tokio::test]
async fn deactivate_clears_is_active() {
    let (_db, repo) = setup().await;
    let corporate_id = Uuid::new_v4();

    let created = repo
        .create(employee_input("ACMASHA98", corporate_id))
        .await
        .unwrap();
    repo.deactivate(TenantScope::corporate(corporate_id), created.id)
        .await
        .unwrap();

    // Still findable for auth; the service layer decides the rejection.
    let found = repo.find_for_auth("ACMASHA98").await.unwrap();
    assert!(!found.is_active);
}

// ---------------------------------------------------------------------------
// Secret rotation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn set_secret_stamps_the_rotation_window() {
    let (_db, repo) = setup().await;

    let created = repo
        .create(employee_input("ACMASHA98", Uuid::new_v4()))
        .await
        .unwrap();
    assert!(created.secret_changed_at.is_none());

    let before = Utc::now();
    let updated = repo
        .set_secret(
            created.id,
            "$argon2id$v=19$m=19456,t=2,p=1$bmV3$bmV3aGFzaA".into(),
            Duration::days(90),
        )
        .await
        .unwrap();

    assert!(!updated.must_rotate_secret);
    assert_ne!(updated.secret_hash, created.secret_hash);
    let changed_at = updated.secret_changed_at.unwrap();
    assert!(changed_at >= before);
    assert_eq!(updated.secret_expires_at, Some(changed_at + Duration::days(90)));
}

// ---------------------------------------------------------------------------
// Lockout bookkeeping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failures_accumulate_and_lock_at_the_threshold() {
    let (_db, repo) = setup().await;
    let policy = LockoutPolicy::default();

    let created = repo
        .create(employee_input("ACMASHA98", Uuid::new_v4()))
        .await
        .unwrap();

    for expected in 1..5u32 {
        let updated = repo.record_failure(created.id, policy).await.unwrap();
        assert_eq!(updated.failed_attempts, expected);
        assert!(updated.locked_until.is_none());
    }

    let locked = repo.record_failure(created.id, policy).await.unwrap();
    assert_eq!(locked.failed_attempts, 5);
    let until = locked.locked_until.unwrap();
    assert!(until > Utc::now() + Duration::minutes(29));
}

#[tokio::test]
async fn failure_after_expired_lock_restarts_the_count() {
    let (db, repo) = setup().await;
    let policy = LockoutPolicy::default();

    let created = repo
        .create(employee_input("ACMASHA98", Uuid::new_v4()))
        .await
        .unwrap();
    for _ in 0..5 {
        repo.record_failure(created.id, policy).await.unwrap();
    }

    // Push the lock into the past.
    db.query(
        "UPDATE type::record('principal', $id) SET \
         locked_until = time::now() - 1m",
    )
    .bind(("id", created.id.to_string()))
    .await
    .unwrap()
    .check()
    .unwrap();

    let updated = repo.record_failure(created.id, policy).await.unwrap();
    assert_eq!(updated.failed_attempts, 1);
    assert!(updated.locked_until.is_none());
}

#[tokio::test]
async fn success_resets_the_machine_and_stamps_login_metadata() {
    let (_db, repo) = setup().await;
    let policy = LockoutPolicy::default();

    let created = repo
        .create(employee_input("ACMASHA98", Uuid::new_v4()))
        .await
        .unwrap();
    for _ in 0..3 {
        repo.record_failure(created.id, policy).await.unwrap();
    }

    let updated = repo
        .record_success(created.id, Some("10.0.0.7".into()))
        .await
        .unwrap();
    assert_eq!(updated.failed_attempts, 0);
    assert!(updated.locked_until.is_none());
    assert!(updated.last_login_at.is_some());
    assert_eq!(updated.last_login_ip.as_deref(), Some("10.0.0.7"));
}

#[tokio::test]
async fn concurrent_failures_never_undercount() {
    let (_db, repo) = setup().await;
    let policy = LockoutPolicy::default();

    let created = repo
        .create(employee_input("ACMASHA98", Uuid::new_v4()))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let repo = repo.clone();
        let id = created.id;
        handles.push(tokio::spawn(async move {
            repo.record_failure(id, policy).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = repo.find_for_auth("ACMASHA98").await.unwrap();
    assert_eq!(stored.failed_attempts, 4);
}
