// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Pre-wired services and routers for consistent and reproducible testing.
//!
//! Every fixture uses minimal Argon2 cost parameters and a [`ManualClock`]
//! frozen at [`epoch`], so token lifetimes are fully deterministic.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;
use warden_api::{ApiConfig, ApiServer};
use warden_core::{
    AuthService, CredentialStore, LoginRequest, ManualClock, MemoryStore, PasswordConfig,
    PasswordHasher, RegisterRequest, TokenConfig, TokenService,
};

/// Signing secret shared by all fixtures.
pub const TEST_SECRET: &str = "integration-test-secret-that-is-long-enough";

/// Register route.
pub const REGISTER_PATH: &str = "/api/v1/auth/register";
/// Login route.
pub const LOGIN_PATH: &str = "/api/v1/auth/login";
/// Profile route.
pub const PROFILE_PATH: &str = "/api/v1/auth/profile";

/// The instant every fixture clock starts at.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
        .single()
        .expect("valid fixed timestamp")
}

/// Token configuration used by all fixtures.
pub fn token_config() -> TokenConfig {
    TokenConfig::new(TEST_SECRET)
}

/// API configuration used by all fixtures.
pub fn api_config() -> ApiConfig {
    ApiConfig::default()
        .with_token(token_config())
        .with_password(PasswordConfig::fast_insecure())
}

// =============================================================================
// Request Fixtures
// =============================================================================

/// Alice's registration under the default role.
pub fn alice() -> RegisterRequest {
    RegisterRequest::new("alice", "a@x.io", "pw123")
}

/// Alice's login.
pub fn alice_login() -> LoginRequest {
    LoginRequest::new("a@x.io", "pw123")
}

/// Bob's registration under the default role.
pub fn bob() -> RegisterRequest {
    RegisterRequest::new("bob", "b@x.io", "hunter2")
}

// =============================================================================
// ServiceFixture
// =============================================================================

/// An [`AuthService`] wired to a store and a manual clock.
pub struct ServiceFixture {
    /// The service under test.
    pub service: Arc<AuthService>,
    /// The clock the token service reads.
    pub clock: Arc<ManualClock>,
    /// Configuration for routers built from this fixture.
    pub config: ApiConfig,
}

impl ServiceFixture {
    /// Creates a fixture over an empty [`MemoryStore`].
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    /// Creates a fixture over `store`.
    pub fn with_store(store: Arc<dyn CredentialStore>) -> Self {
        let config = api_config();
        let clock = Arc::new(ManualClock::new(epoch()));

        let hasher = PasswordHasher::new(&config.password).expect("valid password config");
        let tokens =
            TokenService::with_clock(config.token.clone(), clock.clone()).expect("valid token config");

        Self {
            service: Arc::new(AuthService::new(store, hasher, tokens)),
            clock,
            config,
        }
    }

    /// Builds the HTTP router over this fixture's service.
    pub fn router(&self) -> Router {
        ApiServer::builder()
            .config(self.config.clone())
            .auth_service(self.service.clone())
            .build()
            .expect("server builds")
            .router()
    }
}

impl Default for ServiceFixture {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// HTTP Helpers
// =============================================================================

/// Builds a JSON POST request.
pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

/// Builds a POST request with a raw body.
pub fn post_raw(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .expect("valid request")
}

/// Builds a GET request, optionally with a bearer token.
pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("valid request")
}

/// Sends `request` through `router` and returns the status and JSON body.
///
/// An empty body is returned as `Value::Null`.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body is JSON")
    };

    (status, body)
}
