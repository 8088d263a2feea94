//! Integration tests for tenant and principal provisioning using
//! in-memory SurrealDB.

use chrono::NaiveDate;
use fleetgate_auth::config::AuthConfig;
use fleetgate_auth::provision::{NewPrincipalInput, ProvisioningService};
use fleetgate_core::error::FleetError;
use fleetgate_core::models::corporate::CreateCorporate;
use fleetgate_core::models::role::Role;
use fleetgate_core::repository::CorporateRepository;
use fleetgate_db::repository::{SurrealCorporateRepository, SurrealPrincipalRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> (
    Surreal<Db>,
    ProvisioningService<SurrealPrincipalRepository<Db>, SurrealCorporateRepository<Db>>,
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    fleetgate_db::run_migrations(&db).await.unwrap();

    let svc = ProvisioningService::new(
        SurrealPrincipalRepository::new(db.clone()),
        SurrealCorporateRepository::new(db.clone()),
        AuthConfig::default(),
    );
    (db, svc)
}

async fn fixed_corporate(db: &Surreal<Db>, code: &str) -> Uuid {
    let repo = SurrealCorporateRepository::new(db.clone());
    repo.create(CreateCorporate {
        name: "Acme Logistics".into(),
        code: code.into(),
    })
    .await
    .unwrap()
    .id
}

fn asha() -> NewPrincipalInput {
    NewPrincipalInput {
        first_name: "Asha".into(),
        last_name: Some("Rao".into()),
        date_of_birth: NaiveDate::from_ymd_opt(1998, 4, 2).unwrap(),
        secret: None,
    }
}

// ---------------------------------------------------------------------------
// Corporate creation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn super_admin_creates_corporate_with_derived_code() {
    let (_db, svc) = setup().await;

    let corporate = svc
        .create_corporate(Role::SuperAdmin, "Acme Logistics Pvt Ltd")
        .await
        .unwrap();

    assert!(corporate.is_active);
    assert!(
        corporate.code.starts_with("CORP-ACMELO-"),
        "unexpected code: {}",
        corporate.code
    );
    // CORP-ACMELO- plus a 4-hex random suffix.
    assert_eq!(corporate.code.len(), "CORP-ACMELO-".len() + 4);
}

#[tokio::test]
async fn non_super_admin_cannot_create_corporate() {
    let (_db, svc) = setup().await;

    for role in [
        Role::CorporateAdmin,
        Role::CorporateSupervisor,
        Role::Employee,
        Role::VendorAdmin,
        Role::VendorSupervisor,
    ] {
        let err = svc.create_corporate(role, "Acme").await.unwrap_err();
        assert!(matches!(err, FleetError::AuthorizationDenied { .. }));
    }
}

// ---------------------------------------------------------------------------
// Corporate users
// ---------------------------------------------------------------------------

#[tokio::test]
async fn super_admin_creates_corporate_admin() {
    let (db, svc) = setup().await;
    let corporate_id = fixed_corporate(&db, "ACM").await;

    let provisioned = svc
        .create_corporate_user(Role::SuperAdmin, corporate_id, Role::CorporateAdmin, asha())
        .await
        .unwrap();

    assert_eq!(provisioned.principal.role, Role::CorporateAdmin);
    assert_eq!(provisioned.principal.corporate_id, Some(corporate_id));
    assert_eq!(provisioned.principal.login_identifier, "ACMASHA98");
    // Corporate users carry no employee display code.
    assert!(provisioned.principal.employee_code.is_none());
    assert_eq!(provisioned.temporary_secret.as_deref(), Some("asha0204@A1"));
}

#[tokio::test]
async fn corporate_user_role_must_be_admin_or_supervisor() {
    let (db, svc) = setup().await;
    let corporate_id = fixed_corporate(&db, "ACM").await;

    let err = svc
        .create_corporate_user(Role::SuperAdmin, corporate_id, Role::Employee, asha())
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::Validation { .. }));
}

#[tokio::test]
async fn only_super_admin_creates_corporate_users() {
    let (db, svc) = setup().await;
    let corporate_id = fixed_corporate(&db, "ACM").await;

    let err = svc
        .create_corporate_user(
            Role::CorporateAdmin,
            corporate_id,
            Role::CorporateSupervisor,
            asha(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::AuthorizationDenied { .. }));
}

// ---------------------------------------------------------------------------
// Employees
// ---------------------------------------------------------------------------

#[tokio::test]
async fn corporate_admin_creates_employee() {
    let (db, svc) = setup().await;
    let corporate_id = fixed_corporate(&db, "ACM").await;

    let provisioned = svc
        .create_employee(Role::CorporateAdmin, corporate_id, asha())
        .await
        .unwrap();

    let principal = &provisioned.principal;
    assert_eq!(principal.role, Role::Employee);
    assert_eq!(principal.login_identifier, "ACMASHA98");
    assert!(principal.must_rotate_secret);
    let code = principal.employee_code.as_deref().unwrap();
    assert!(code.starts_with("EMP-ACM-ASHARA-"), "unexpected code: {code}");
}

#[tokio::test]
async fn employee_creation_requires_corporate_staff() {
    let (db, svc) = setup().await;
    let corporate_id = fixed_corporate(&db, "ACM").await;

    for role in [Role::SuperAdmin, Role::Employee, Role::VendorAdmin] {
        let err = svc
            .create_employee(role, corporate_id, asha())
            .await
            .unwrap_err();
        assert!(matches!(err, FleetError::AuthorizationDenied { .. }));
    }
}

#[tokio::test]
async fn employee_creation_fails_for_unknown_corporate() {
    let (_db, svc) = setup().await;

    let err = svc
        .create_employee(Role::CorporateAdmin, Uuid::new_v4(), asha())
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::NotFound { .. }));
}

#[tokio::test]
async fn colliding_login_identifiers_fall_back_to_sequence_suffix() {
    let (db, svc) = setup().await;
    let corporate_id = fixed_corporate(&db, "ACM").await;

    // Two Ashas born in the same year derive the same base identifier.
    let first = svc
        .create_employee(Role::CorporateAdmin, corporate_id, asha())
        .await
        .unwrap();
    let second = svc
        .create_employee(
            Role::CorporateAdmin,
            corporate_id,
            NewPrincipalInput {
                first_name: "Asha".into(),
                last_name: Some("Mehta".into()),
                date_of_birth: NaiveDate::from_ymd_opt(1998, 11, 23).unwrap(),
                secret: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(first.principal.login_identifier, "ACMASHA98");
    assert_eq!(second.principal.login_identifier, "ACMASHA982");
}

#[tokio::test]
async fn explicit_secret_skips_the_temporary_one() {
    let (db, svc) = setup().await;
    let corporate_id = fixed_corporate(&db, "ACM").await;

    let provisioned = svc
        .create_employee(
            Role::CorporateAdmin,
            corporate_id,
            NewPrincipalInput {
                secret: Some("Expl1cit&Secret".into()),
                ..asha()
            },
        )
        .await
        .unwrap();

    // Nothing to hand back when the caller chose the secret.
    assert!(provisioned.temporary_secret.is_none());
}

#[tokio::test]
async fn explicit_secret_must_satisfy_the_strength_policy() {
    let (db, svc) = setup().await;
    let corporate_id = fixed_corporate(&db, "ACM").await;

    let err = svc
        .create_employee(
            Role::CorporateAdmin,
            corporate_id,
            NewPrincipalInput {
                secret: Some("weak".into()),
                ..asha()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::Validation { .. }));
}
