//! Principal provisioning — corporate, corporate-user, and employee
//! creation with credential bootstrap.
//!
//! The acting principal is always an explicit argument; nothing here
//! reads ambient request state. Derivation and hashing are explicit
//! service calls so the storage layer never runs implicit hooks.

use chrono::NaiveDate;
use fleetgate_core::error::{FleetError, FleetResult};
use fleetgate_core::models::corporate::{Corporate, CreateCorporate};
use fleetgate_core::models::principal::{CreatePrincipal, Principal};
use fleetgate_core::models::role::Role;
use fleetgate_core::repository::{CorporateRepository, PrincipalRepository};
use tracing::info;
use uuid::Uuid;

use crate::codec;
use crate::config::AuthConfig;
use crate::password;
use crate::secret;

/// Attempts at a fresh random suffix before giving up on a corporate
/// code.
const MAX_CODE_ATTEMPTS: u32 = 5;
/// Sequence suffixes tried when a derived login identifier collides.
const MAX_LOGIN_ID_ATTEMPTS: u32 = 50;

/// Seed fields for a new principal.
#[derive(Debug, Clone)]
pub struct NewPrincipalInput {
    pub first_name: String,
    pub last_name: Option<String>,
    pub date_of_birth: NaiveDate,
    /// Explicit bootstrap secret. When absent a temporary secret is
    /// derived from the seed fields.
    pub secret: Option<String>,
}

/// Creation result. `temporary_secret` is present exactly once, in
/// this response — it is never retrievable again.
#[derive(Debug)]
pub struct ProvisionedPrincipal {
    pub principal: Principal,
    pub temporary_secret: Option<String>,
}

/// Provisioning service. Generic over repositories, like
/// [`crate::service::AuthService`].
pub struct ProvisioningService<P: PrincipalRepository, C: CorporateRepository> {
    principal_repo: P,
    corporate_repo: C,
    config: AuthConfig,
}

impl<P: PrincipalRepository, C: CorporateRepository> ProvisioningService<P, C> {
    pub fn new(principal_repo: P, corporate_repo: C, config: AuthConfig) -> Self {
        Self {
            principal_repo,
            corporate_repo,
            config,
        }
    }

    /// Create a corporate tenant. Super-admin only.
    ///
    /// The code derivation is retried with a fresh random suffix when
    /// the store reports a collision; the store's unique index is the
    /// source of truth.
    pub async fn create_corporate(&self, actor_role: Role, name: &str) -> FleetResult<Corporate> {
        match actor_role {
            Role::SuperAdmin => {}
            Role::CorporateAdmin
            | Role::CorporateSupervisor
            | Role::Employee
            | Role::VendorAdmin
            | Role::VendorSupervisor => {
                return Err(FleetError::AuthorizationDenied {
                    reason: "only a super-admin can create a corporate".into(),
                });
            }
        }

        let mut last_err = None;
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = codec::derive_corporate_code(name, &codec::random_suffix())?;
            match self
                .corporate_repo
                .create(CreateCorporate {
                    name: name.to_string(),
                    code,
                })
                .await
            {
                Ok(corporate) => {
                    info!(corporate_id = %corporate.id, code = %corporate.code, "corporate created");
                    return Ok(corporate);
                }
                Err(FleetError::AlreadyExists { .. }) => {
                    last_err = Some(FleetError::AlreadyExists {
                        entity: "corporate".into(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or(FleetError::Internal(
            "corporate code derivation exhausted retries".into(),
        )))
    }

    /// Create a corporate user (admin or supervisor). Super-admin only.
    pub async fn create_corporate_user(
        &self,
        actor_role: Role,
        corporate_id: Uuid,
        role: Role,
        input: NewPrincipalInput,
    ) -> FleetResult<ProvisionedPrincipal> {
        match actor_role {
            Role::SuperAdmin => {}
            Role::CorporateAdmin
            | Role::CorporateSupervisor
            | Role::Employee
            | Role::VendorAdmin
            | Role::VendorSupervisor => {
                return Err(FleetError::AuthorizationDenied {
                    reason: "only a super-admin can create corporate users".into(),
                });
            }
        }
        match role {
            Role::CorporateAdmin | Role::CorporateSupervisor => {}
            _ => {
                return Err(FleetError::Validation {
                    message: "corporate users must be admins or supervisors".into(),
                });
            }
        }

        let corporate = self.corporate_repo.get_by_id(corporate_id).await?;
        self.create_principal(&corporate, role, None, input).await
    }

    /// Create an employee under a corporate. Corporate admin or
    /// supervisor only. Also derives the display employee code.
    pub async fn create_employee(
        &self,
        actor_role: Role,
        corporate_id: Uuid,
        input: NewPrincipalInput,
    ) -> FleetResult<ProvisionedPrincipal> {
        match actor_role {
            Role::CorporateAdmin | Role::CorporateSupervisor => {}
            Role::SuperAdmin | Role::Employee | Role::VendorAdmin | Role::VendorSupervisor => {
                return Err(FleetError::AuthorizationDenied {
                    reason: "only a corporate admin or supervisor can create employees".into(),
                });
            }
        }

        let corporate = self.corporate_repo.get_by_id(corporate_id).await?;
        let employee_code = codec::derive_employee_code(
            &corporate.code,
            &input.first_name,
            input.last_name.as_deref(),
            &codec::random_suffix(),
        )?;
        self.create_principal(&corporate, Role::Employee, Some(employee_code), input)
            .await
    }

    /// Shared credential bootstrap: derive the login identifier, issue
    /// the bootstrap secret, hash it, and persist. The login
    /// identifier is deterministic, so collisions within the store's
    /// uniqueness domain fall back to an incrementing sequence suffix.
    async fn create_principal(
        &self,
        corporate: &Corporate,
        role: Role,
        employee_code: Option<String>,
        input: NewPrincipalInput,
    ) -> FleetResult<ProvisionedPrincipal> {
        let base_login_id =
            codec::derive_login_id(&corporate.code, &input.first_name, input.date_of_birth)?;

        let (bootstrap_secret, return_secret) = match input.secret {
            Some(explicit) => {
                secret::check_strength(&explicit, self.config.min_secret_length)?;
                (explicit, None)
            }
            None => {
                let generated = secret::temp_secret(&input.first_name, input.date_of_birth)?;
                (generated.clone(), Some(generated))
            }
        };
        let secret_hash =
            password::hash_secret(&bootstrap_secret, self.config.pepper.as_deref())
                .map_err(FleetError::from)?;

        for attempt in 0..MAX_LOGIN_ID_ATTEMPTS {
            let login_identifier = if attempt == 0 {
                base_login_id.clone()
            } else {
                format!("{base_login_id}{}", attempt + 1)
            };

            match self
                .principal_repo
                .create(CreatePrincipal {
                    role,
                    corporate_id: Some(corporate.id),
                    vendor_id: None,
                    login_identifier,
                    employee_code: employee_code.clone(),
                    first_name: input.first_name.clone(),
                    last_name: input.last_name.clone(),
                    date_of_birth: Some(input.date_of_birth),
                    secret_hash: secret_hash.clone(),
                })
                .await
            {
                Ok(principal) => {
                    info!(
                        principal_id = %principal.id,
                        login_identifier = %principal.login_identifier,
                        role = principal.role.as_str(),
                        "principal provisioned"
                    );
                    return Ok(ProvisionedPrincipal {
                        principal,
                        temporary_secret: return_secret,
                    });
                }
                Err(FleetError::AlreadyExists { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(FleetError::Internal(
            "login identifier derivation exhausted sequence suffixes".into(),
        ))
    }
}
