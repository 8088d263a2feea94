//! Authentication service — login and secret rotation orchestration.
//!
//! The single entry point behind every login endpoint (super-admin,
//! corporate user, employee, vendor user). The flow is:
//! lookup → lock check → secret verify → lockout update → audit →
//! session issuance.

use chrono::Utc;
use fleetgate_core::error::{FleetError, FleetResult};
use fleetgate_core::models::audit::{AuditOutcome, CreateAuditLogEntry};
use fleetgate_core::models::principal::{Principal, TenantScope};
use fleetgate_core::repository::{AuditLogRepository, PrincipalRepository};
use tracing::warn;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::secret;
use crate::{password, token};

/// Input for the login flow. `ip_address` and `user_agent` come from
/// the transport layer.
#[derive(Debug)]
pub struct LoginInput {
    pub login_identifier: String,
    pub secret: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Outcome of a successful authentication.
#[derive(Debug)]
pub enum LoginOutcome {
    /// Full session issued. `principal` carries the refreshed
    /// last-login metadata.
    Session { principal: Principal, token: String },
    /// Credentials verified, but the principal must rotate its secret
    /// before receiving a session. No token is issued — only enough
    /// context to call the rotation endpoint.
    MustRotateSecret { principal_id: Uuid },
}

/// Input for the voluntary secret rotation flow.
#[derive(Debug)]
pub struct ChangeSecretInput {
    pub current_secret: String,
    pub new_secret: String,
    pub confirm_secret: String,
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer has
/// no dependency on the database crate.
pub struct AuthService<P: PrincipalRepository, A: AuditLogRepository> {
    principal_repo: P,
    audit_repo: A,
    config: AuthConfig,
}

impl<P: PrincipalRepository, A: AuditLogRepository> AuthService<P, A> {
    pub fn new(principal_repo: P, audit_repo: A, config: AuthConfig) -> Self {
        Self {
            principal_repo,
            audit_repo,
            config,
        }
    }

    /// Authenticate a principal by login identifier and secret.
    ///
    /// Every attempt — success or failure — appends exactly one audit
    /// entry, and any lockout-state change is committed before this
    /// function returns, regardless of later failures.
    pub async fn login(&self, input: LoginInput) -> FleetResult<LoginOutcome> {
        let login_identifier = input.login_identifier.trim().to_uppercase();

        // 1. Lookup. Absent and inactive identifiers produce the same
        //    rejection as a wrong secret — no enumeration signal.
        let principal = match self.principal_repo.find_for_auth(&login_identifier).await {
            Ok(p) => p,
            Err(FleetError::NotFound { .. }) => {
                self.append_audit(None, &login_identifier, AuditOutcome::Failure, &input)
                    .await;
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        if !principal.is_active {
            self.append_audit(
                Some(principal.id),
                &login_identifier,
                AuditOutcome::Failure,
                &input,
            )
            .await;
            return Err(AuthError::InvalidCredentials.into());
        }

        // 2. Lock check, before secret verification, so a locked
        //    account never leaks whether the secret was right.
        let policy = self.config.lockout_policy();
        let state = principal.lockout_state();
        let now = Utc::now();
        if policy.is_locked(state, now) {
            self.append_audit(
                Some(principal.id),
                &login_identifier,
                AuditOutcome::Failure,
                &input,
            )
            .await;
            return Err(AuthError::AccountLocked {
                minutes_remaining: policy.remaining_minutes(state, now),
            }
            .into());
        }

        // 3. Verify.
        let valid = password::verify_secret(
            &input.secret,
            &principal.secret_hash,
            self.config.pepper.as_deref(),
        )
        .map_err(FleetError::from)?;

        // 4. Failure path. The attempt that triggers a lock is itself
        //    rejected as invalid credentials, not yet as locked.
        if !valid {
            self.principal_repo
                .record_failure(principal.id, policy)
                .await?;
            self.append_audit(
                Some(principal.id),
                &login_identifier,
                AuditOutcome::Failure,
                &input,
            )
            .await;
            return Err(AuthError::InvalidCredentials.into());
        }

        // 5. Success: reset the machine, stamp last-login metadata.
        let principal = self
            .principal_repo
            .record_success(principal.id, input.ip_address.clone())
            .await?;
        self.append_audit(
            Some(principal.id),
            &login_identifier,
            AuditOutcome::Success,
            &input,
        )
        .await;

        if principal.must_rotate_secret {
            return Ok(LoginOutcome::MustRotateSecret {
                principal_id: principal.id,
            });
        }

        let token = token::issue_session_token(&principal, &self.config)
            .map_err(FleetError::from)?;
        Ok(LoginOutcome::Session { principal, token })
    }

    /// Voluntary secret rotation for an already-authenticated
    /// principal. Clears `must_rotate_secret` and resets the rotation
    /// window. A failed verification never mutates the stored hash.
    pub async fn change_secret(
        &self,
        scope: TenantScope,
        principal_id: Uuid,
        input: ChangeSecretInput,
    ) -> FleetResult<Principal> {
        if input.new_secret != input.confirm_secret {
            return Err(FleetError::Validation {
                message: "secret confirmation does not match".into(),
            });
        }
        if input.new_secret == input.current_secret {
            return Err(FleetError::Validation {
                message: "new secret must differ from the current one".into(),
            });
        }
        secret::check_strength(&input.new_secret, self.config.min_secret_length)?;

        let principal = self.principal_repo.get_by_id(scope, principal_id).await?;

        let valid = password::verify_secret(
            &input.current_secret,
            &principal.secret_hash,
            self.config.pepper.as_deref(),
        )
        .map_err(FleetError::from)?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        let new_hash = password::hash_secret(&input.new_secret, self.config.pepper.as_deref())
            .map_err(FleetError::from)?;
        self.principal_repo
            .set_secret(principal.id, new_hash, self.config.rotation_period())
            .await
    }

    /// Append one audit entry for a login attempt. An append failure
    /// is logged and swallowed — it must never roll back a lockout
    /// mutation that already committed.
    async fn append_audit(
        &self,
        principal_id: Option<Uuid>,
        login_identifier: &str,
        outcome: AuditOutcome,
        input: &LoginInput,
    ) {
        let entry = CreateAuditLogEntry {
            principal_id,
            login_identifier: login_identifier.to_string(),
            action: "login".into(),
            outcome,
            ip_address: input.ip_address.clone(),
            user_agent: input.user_agent.clone(),
        };
        if let Err(e) = self.audit_repo.append(entry).await {
            warn!(login_identifier, error = %e, "failed to append login audit entry");
        }
    }
}
