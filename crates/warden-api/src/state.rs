// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use warden_core::{AuthService, CredentialStore, MemoryStore};

use crate::config::ApiConfig;
use crate::error::ApiResult;

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// This is the central state container that is passed to all handlers via
/// Axum's state extraction mechanism.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Authentication protocol.
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the auth service.
    pub fn auth(&self) -> &AuthService {
        &self.auth_service
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    store: Option<Arc<dyn CredentialStore>>,
    auth_service: Option<Arc<AuthService>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config: None,
            store: None,
            auth_service: None,
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the credential store. Defaults to an empty [`MemoryStore`].
    pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets a pre-built auth service. Overrides [`store`](Self::store).
    pub fn auth_service(mut self, service: Arc<AuthService>) -> Self {
        self.auth_service = Some(service);
        self
    }

    /// Builds the AppState.
    pub fn build(self) -> ApiResult<AppState> {
        let config = self.config.unwrap_or_default();

        let auth_service = match self.auth_service {
            Some(service) => service,
            None => {
                let store = self
                    .store
                    .unwrap_or_else(|| Arc::new(MemoryStore::new()));
                Arc::new(AuthService::from_config(
                    store,
                    config.token.clone(),
                    &config.password,
                )?)
            }
        };

        Ok(AppState {
            config: Arc::new(config),
            auth_service,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth_service.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<ApiConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::TokenConfig;

    #[test]
    fn test_app_state_builder() {
        let config = ApiConfig::default()
            .with_token(TokenConfig::new("test-secret-key-that-is-long-enough-for-testing"));

        let state = AppState::builder().config(config).build().unwrap();
        assert_eq!(state.auth().tokens().expiration_secs(), 3600);
    }

    #[test]
    fn test_app_state_rejects_empty_secret() {
        let config = ApiConfig::default().with_token(TokenConfig::new(""));
        assert!(AppState::builder().config(config).build().is_err());
    }
}
