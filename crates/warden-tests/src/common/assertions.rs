// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Custom Test Assertions
//!
//! Assertion helpers for auth outcomes and HTTP error bodies.

use axum::http::StatusCode;
use serde_json::Value;
use warden_core::{AuthError, AuthResult};

// =============================================================================
// Domain Assertions
// =============================================================================

/// Asserts that `result` failed with the error `code`.
pub fn assert_auth_error<T: std::fmt::Debug>(result: &AuthResult<T>, code: &str) {
    match result {
        Err(e) => assert_eq!(e.code(), code, "Expected {} but got {:?}", code, e),
        Ok(value) => panic!("Expected {} but got Ok({:?})", code, value),
    }
}

/// Asserts that the error is `Forbidden` for exactly `expected_missing`.
pub fn assert_forbidden(error: &AuthError, expected_missing: &[&str]) {
    match error {
        AuthError::Forbidden { missing } => {
            assert_eq!(missing, expected_missing, "Unexpected missing permissions");
        }
        other => panic!("Expected Forbidden but got {:?}", other),
    }
}

// =============================================================================
// HTTP Assertions
// =============================================================================

/// Asserts the status and the `error.code` field of an error body.
pub fn assert_error_response(status: StatusCode, body: &Value, expected: StatusCode, code: &str) {
    assert_eq!(status, expected, "Unexpected status, body: {}", body);
    assert_eq!(
        body["error"]["code"], code,
        "Unexpected error code, body: {}",
        body
    );
    assert!(
        body["error"]["message"].is_string(),
        "Error body without message: {}",
        body
    );
}

/// Asserts that a success body carries a token and the public user view.
pub fn assert_auth_response(body: &Value, username: &str, role: &str) {
    let token = body["token"].as_str().expect("token is a string");
    assert_eq!(token.split('.').count(), 3, "Token is not a JWT: {}", token);
    assert_eq!(body["user"]["username"], username);
    assert_eq!(body["user"]["role"], role);
    assert!(
        body["user"].get("password_hash").is_none() && body["user"].get("passwordHash").is_none(),
        "Password hash leaked: {}",
        body
    );
}

/// Extracts the token from a success body.
pub fn token_of(body: &Value) -> String {
    body["token"]
        .as_str()
        .expect("token is a string")
        .to_string()
}
