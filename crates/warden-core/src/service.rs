// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication protocol.
//!
//! [`AuthService`] orchestrates registration, login, and per-request
//! authentication on top of a [`CredentialStore`], a [`PasswordHasher`], and
//! a [`TokenService`].
//!
//! # Request states
//!
//! ```text
//! Unauthenticated ─(token)─> TokenPresented ─(verify)─> TokenVerified
//!     ─(load user)─> UserLoaded ─(check)─> Authorized | Denied
//! ```
//!
//! `None` token → [`AuthError::AuthenticationRequired`]; a loaded user is an
//! [`AuthContext`]; `Authorized` is `Ok(())` from
//! [`AuthService::authorize_request`].

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::context::AuthContext;
use crate::error::{AuthError, AuthResult, StoreError};
use crate::model::{
    AuthOutcome, LoginRequest, NewPermission, NewRole, NewUser, Permission, RegisterRequest, Role,
    UserProfile, BASELINE_PERMISSIONS, DEFAULT_ROLE,
};
use crate::password::{PasswordConfig, PasswordHasher, MAX_PASSWORD_BYTES};
use crate::rbac;
use crate::store::CredentialStore;
use crate::token::{TokenConfig, TokenService};

/// Plaintext behind the digest that unknown-email logins are checked against.
const DUMMY_PASSWORD: &str = "warden-dummy-password";

/// The authentication and authorization protocol.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    tokens: TokenService,
    dummy_hash: Arc<OnceCell<String>>,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher, tokens: TokenService) -> Self {
        Self {
            store,
            hasher,
            tokens,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Creates an auth service from configuration.
    pub fn from_config(
        store: Arc<dyn CredentialStore>,
        token: TokenConfig,
        password: &PasswordConfig,
    ) -> AuthResult<Self> {
        Ok(Self::new(
            store,
            PasswordHasher::new(password)?,
            TokenService::new(token)?,
        ))
    }

    /// Returns the credential store.
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Returns the token service.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    // =========================================================================
    // Register
    // =========================================================================

    /// Registers a new user and issues a token.
    ///
    /// The requested role (default [`DEFAULT_ROLE`]) is created with the
    /// baseline permissions if it does not exist yet.
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<AuthOutcome> {
        validate_registration(&request)?;

        if self
            .store
            .find_user_by_email_or_username(&request.email, &request.username)
            .await?
            .is_some()
        {
            debug!(username = %request.username, "Registration rejected: user exists");
            return Err(AuthError::conflict("User already exists"));
        }

        let role_name = request.role_name.as_deref().unwrap_or(DEFAULT_ROLE);
        let role = self.ensure_role(role_name).await?;

        let password_hash = self.hasher.hash(&request.password)?;
        let user = self
            .store
            .create_user(NewUser {
                username: request.username,
                email: request.email,
                password_hash,
                role_id: role.id,
            })
            .await?;

        let loaded = self
            .store
            .load_user_with_role(user.id)
            .await?
            .ok_or_else(|| AuthError::internal("Created user could not be loaded"))?;

        let issued = self.tokens.issue(user.id)?;
        info!(user_id = %user.id, role = %role.name, "User registered");

        Ok(AuthOutcome {
            token: issued.token,
            user: loaded.public_view(),
        })
    }

    async fn ensure_role(&self, name: &str) -> AuthResult<Role> {
        if let Some(role) = self.store.find_role_by_name(name).await? {
            return Ok(role);
        }

        let permissions = self.ensure_baseline_permissions().await?;
        let created = self
            .store
            .create_role(NewRole {
                name: name.to_string(),
                permissions: permissions.iter().map(|p| p.id).collect(),
            })
            .await;

        match created {
            Ok(role) => {
                info!(role = %role.name, "Role provisioned with baseline permissions");
                Ok(role)
            }
            Err(e) if e.is_conflict() => {
                debug!(role = %name, "Role created concurrently, reloading");
                self.store.find_role_by_name(name).await?.ok_or_else(|| {
                    AuthError::storage_unavailable(format!("Role '{}' vanished after conflict", name))
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn ensure_baseline_permissions(&self) -> AuthResult<Vec<Permission>> {
        let names = baseline_names();
        let existing = self.store.find_permissions_by_name(&names).await?;

        let absent: Vec<NewPermission> = BASELINE_PERMISSIONS
            .iter()
            .filter(|(name, _)| !existing.iter().any(|p| p.name == *name))
            .map(|(name, description)| NewPermission::new(*name, *description))
            .collect();

        if absent.is_empty() {
            return Ok(existing);
        }

        match self.store.create_permissions(absent).await {
            Ok(_) => {}
            Err(e) if e.is_conflict() => {
                debug!("Baseline permissions created concurrently, reloading");
            }
            Err(e) => return Err(e.into()),
        }

        let resolved = self.store.find_permissions_by_name(&names).await?;
        if resolved.len() != names.len() {
            return Err(StoreError::unavailable("Baseline permissions could not be resolved").into());
        }
        Ok(resolved)
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Verifies credentials and issues a token.
    ///
    /// Unknown email and wrong password both yield
    /// [`AuthError::InvalidCredentials`].
    pub async fn login(&self, request: LoginRequest) -> AuthResult<AuthOutcome> {
        let Some(user) = self.store.find_user_by_email(&request.email).await? else {
            let dummy = self.dummy_hash()?;
            let _ = self.hasher.verify(&request.password, dummy);
            debug!("Login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(&request.password, &user.password_hash) {
            debug!("Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let loaded = self
            .store
            .load_user_with_role(user.id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let issued = self.tokens.issue(user.id)?;
        info!(user_id = %user.id, "User logged in");

        Ok(AuthOutcome {
            token: issued.token,
            user: loaded.public_view(),
        })
    }

    fn dummy_hash(&self) -> AuthResult<&str> {
        self.dummy_hash
            .get_or_try_init(|| self.hasher.hash(DUMMY_PASSWORD))
            .map(String::as_str)
    }

    // =========================================================================
    // Per-request
    // =========================================================================

    /// Authenticates a request from its bearer token.
    ///
    /// The user and its permissions are loaded from the store on every call.
    pub async fn authenticate_request(&self, token: Option<&str>) -> AuthResult<AuthContext> {
        let token = token.ok_or(AuthError::AuthenticationRequired)?;
        let user_id = self.tokens.verify(token)?;

        match self.store.load_user_with_role(user_id).await? {
            Some(user) => Ok(AuthContext::new(user)),
            None => {
                debug!(user_id = %user_id, "Token rejected: subject no longer exists");
                Err(AuthError::InvalidToken)
            }
        }
    }

    /// Checks that the context holds every required permission.
    pub fn authorize_request<S: AsRef<str>>(
        &self,
        context: Option<&AuthContext>,
        required: &[S],
    ) -> AuthResult<()> {
        let result = rbac::authorize(context, required);
        if let (Err(AuthError::Forbidden { missing }), Some(ctx)) = (&result, context) {
            warn!(
                user_id = %ctx.user_id(),
                request_id = %ctx.request_id,
                missing = ?missing,
                "Authorization denied"
            );
        }
        result
    }

    /// Returns the profile of the authenticated user.
    pub fn get_profile(&self, context: &AuthContext) -> UserProfile {
        context.profile()
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("hasher", &self.hasher)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

fn baseline_names() -> Vec<String> {
    BASELINE_PERMISSIONS
        .iter()
        .map(|(name, _)| name.to_string())
        .collect()
}

fn validate_registration(request: &RegisterRequest) -> AuthResult<()> {
    if request.username.trim().is_empty() {
        return Err(AuthError::validation("Username is required"));
    }
    if request.email.trim().is_empty() {
        return Err(AuthError::validation("Email is required"));
    }
    if request.password.is_empty() {
        return Err(AuthError::validation("Password is required"));
    }
    if request.password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::validation(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }
    if matches!(request.role_name.as_deref(), Some(name) if name.trim().is_empty()) {
        return Err(AuthError::validation("Role name must not be empty"));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;

    const SECRET: &str = "service-test-secret-that-is-long-enough";

    fn service() -> (AuthService, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::starting_now());
        let tokens = TokenService::with_clock(TokenConfig::new(SECRET), clock.clone()).unwrap();
        let hasher = PasswordHasher::new(&PasswordConfig::fast_insecure()).unwrap();
        (AuthService::new(store.clone(), hasher, tokens), store, clock)
    }

    #[tokio::test]
    async fn test_register_provisions_default_role() {
        let (service, store, _) = service();

        let outcome = service
            .register(RegisterRequest::new("alice", "a@x.com", "pw123"))
            .await
            .unwrap();
        assert_eq!(outcome.user.role, "User");
        assert_eq!(outcome.user.username, "alice");

        let ctx = service.authenticate_request(Some(&outcome.token)).await.unwrap();
        assert_eq!(
            service.get_profile(&ctx).permissions,
            vec!["read:profile", "update:profile"]
        );
        assert_eq!(store.role_count(), 1);
        assert_eq!(store.permission_count(), 2);
    }

    #[tokio::test]
    async fn test_second_role_reuses_baseline_permissions() {
        let (service, store, _) = service();

        service
            .register(RegisterRequest::new("alice", "a@x.com", "pw123"))
            .await
            .unwrap();
        let bob = service
            .register(RegisterRequest::new("bob", "b@x.com", "pw456").with_role("Editor"))
            .await
            .unwrap();

        assert_eq!(bob.user.role, "Editor");
        assert_eq!(store.role_count(), 2);
        assert_eq!(store.permission_count(), 2);
    }

    #[tokio::test]
    async fn test_register_duplicates_conflict() {
        let (service, store, _) = service();
        service
            .register(RegisterRequest::new("alice", "a@x.com", "pw123"))
            .await
            .unwrap();

        let same_email = service
            .register(RegisterRequest::new("alice2", "a@x.com", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(same_email, AuthError::Conflict { .. }));

        let same_username = service
            .register(RegisterRequest::new("alice", "other@x.com", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(same_username, AuthError::Conflict { .. }));

        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let (service, store, _) = service();

        for request in [
            RegisterRequest::new("", "a@x.com", "pw"),
            RegisterRequest::new("alice", " ", "pw"),
            RegisterRequest::new("alice", "a@x.com", ""),
            RegisterRequest::new("alice", "a@x.com", "x".repeat(MAX_PASSWORD_BYTES + 1)),
            RegisterRequest::new("alice", "a@x.com", "pw").with_role(""),
        ] {
            let err = service.register(request).await.unwrap_err();
            assert!(matches!(err, AuthError::Validation { .. }));
        }
        assert_eq!(store.user_count(), 0);
        assert_eq!(store.role_count(), 0);
    }

    #[tokio::test]
    async fn test_login_errors_are_identical() {
        let (service, _, _) = service();
        service
            .register(RegisterRequest::new("alice", "a@x.com", "pw123"))
            .await
            .unwrap();

        let unknown = service
            .login(LoginRequest::new("nobody@x.com", "pw123"))
            .await
            .unwrap_err();
        let wrong = service
            .login(LoginRequest::new("a@x.com", "wrong"))
            .await
            .unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(unknown.code(), wrong.code());
        assert_eq!(unknown.user_message(), wrong.user_message());
    }

    #[tokio::test]
    async fn test_login_issues_working_token() {
        let (service, _, _) = service();
        let registered = service
            .register(RegisterRequest::new("alice", "a@x.com", "pw123"))
            .await
            .unwrap();

        let outcome = service
            .login(LoginRequest::new("a@x.com", "pw123"))
            .await
            .unwrap();
        assert_eq!(outcome.user.id, registered.user.id);

        let ctx = service.authenticate_request(Some(&outcome.token)).await.unwrap();
        assert!(service.authorize_request(Some(&ctx), &["read:profile"]).is_ok());
    }

    #[tokio::test]
    async fn test_authenticate_request_states() {
        let (service, _, clock) = service();
        let outcome = service
            .register(RegisterRequest::new("alice", "a@x.com", "pw123"))
            .await
            .unwrap();

        assert!(matches!(
            service.authenticate_request(None).await,
            Err(AuthError::AuthenticationRequired)
        ));
        assert!(matches!(
            service.authenticate_request(Some("garbage")).await,
            Err(AuthError::InvalidToken)
        ));

        clock.advance(chrono::Duration::hours(2));
        assert!(matches!(
            service.authenticate_request(Some(&outcome.token)).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_token_for_unknown_subject_is_invalid() {
        let (service, _, _) = service();
        let issued = service.tokens().issue(crate::model::UserId::new()).unwrap();

        assert!(matches!(
            service.authenticate_request(Some(&issued.token)).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_permissions_reresolved_per_request() {
        let (service, store, _) = service();
        let outcome = service
            .register(RegisterRequest::new("alice", "a@x.com", "pw123"))
            .await
            .unwrap();

        let before = service.authenticate_request(Some(&outcome.token)).await.unwrap();
        assert!(service
            .authorize_request(Some(&before), &["admin:users"])
            .is_err());

        let extra = store
            .create_permissions(vec![NewPermission::new("admin:users", "Manage users")])
            .await
            .unwrap();
        store.grant("User", &[extra[0].id]).unwrap();

        let after = service.authenticate_request(Some(&outcome.token)).await.unwrap();
        assert!(service.authorize_request(Some(&after), &["admin:users"]).is_ok());
    }

    #[tokio::test]
    async fn test_authorize_without_context() {
        let (service, _, _) = service();
        assert!(matches!(
            service.authorize_request(None, &["read:profile"]),
            Err(AuthError::AuthenticationRequired)
        ));
    }
}
