// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error hierarchy for Warden.
//!
//! ```text
//! AuthError (protocol boundary)
//! ├── Conflict                - username/email/role already taken
//! ├── Validation              - malformed registration input
//! ├── InvalidCredentials      - login failure (unknown email OR wrong password)
//! ├── AuthenticationRequired  - no token presented
//! ├── InvalidToken            - malformed, forged, expired, or orphaned token
//! ├── Forbidden               - authenticated but missing a permission
//! ├── StorageUnavailable      - backing store failure
//! └── Internal                - hashing or signing failure
//!
//! StoreError (credential store)
//! ├── Conflict
//! ├── MissingReference
//! └── Unavailable
//! ```
//!
//! `InvalidCredentials` and `InvalidToken` deliberately carry no detail, so
//! callers cannot tell the underlying causes apart.

use thiserror::Error;

/// Result type alias for protocol operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type alias for credential store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// AuthError
// =============================================================================

/// Errors surfaced by the authentication protocol.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A uniqueness constraint was violated.
    #[error("Conflict: {message}")]
    Conflict {
        /// Which constraint was violated.
        message: String,
    },

    /// The request input is malformed.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input.
        message: String,
    },

    /// Login failed. Never says whether the user exists.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No bearer token was presented.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// The bearer token could not be accepted.
    #[error("Invalid token")]
    InvalidToken,

    /// The user lacks at least one required permission.
    #[error("Forbidden: missing {missing:?}")]
    Forbidden {
        /// Required permissions the user does not hold (for logging only).
        missing: Vec<String>,
    },

    /// The credential store could not serve the request.
    #[error("Storage unavailable: {message}")]
    StorageUnavailable {
        /// Underlying reason (for logging, not user-facing).
        message: String,
    },

    /// Hashing or token signing failed.
    #[error("Internal error: {message}")]
    Internal {
        /// Underlying reason (for logging, not user-facing).
        message: String,
    },
}

impl AuthError {
    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a forbidden error listing the missing permissions.
    pub fn forbidden(missing: Vec<String>) -> Self {
        Self::Forbidden { missing }
    }

    /// Creates a storage unavailable error.
    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns a stable code for categorization.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Conflict { .. } => "CONFLICT",
            AuthError::Validation { .. } => "VALIDATION_ERROR",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::Forbidden { .. } => "FORBIDDEN",
            AuthError::StorageUnavailable { .. } => "SERVER_ERROR",
            AuthError::Internal { .. } => "SERVER_ERROR",
        }
    }

    /// Returns a message that is safe to show to the caller.
    ///
    /// Server-side failures collapse to one generic message.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Conflict { .. } => "User already exists".to_string(),
            AuthError::Validation { message } => message.clone(),
            AuthError::InvalidCredentials => "Invalid credentials".to_string(),
            AuthError::AuthenticationRequired => "Authentication required".to_string(),
            AuthError::InvalidToken => "Invalid token".to_string(),
            AuthError::Forbidden { .. } => "Access denied".to_string(),
            AuthError::StorageUnavailable { .. } | AuthError::Internal { .. } => {
                "Internal server error".to_string()
            }
        }
    }

    /// Returns `true` if this error originates on the server side.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            AuthError::StorageUnavailable { .. } | AuthError::Internal { .. }
        )
    }
}

// =============================================================================
// StoreError
// =============================================================================

/// Errors raised by a [`CredentialStore`](crate::store::CredentialStore).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("{entity} with {field} '{value}' already exists")]
    Conflict {
        /// Entity kind (`user`, `role`, `permission`).
        entity: &'static str,
        /// Constrained field.
        field: &'static str,
        /// Offending value.
        value: String,
    },

    /// A write referenced a record that does not exist.
    #[error("{entity} '{id}' does not exist")]
    MissingReference {
        /// Entity kind of the dangling reference.
        entity: &'static str,
        /// The referenced id.
        id: String,
    },

    /// The backing store cannot be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Creates a conflict error.
    pub fn conflict(entity: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        Self::Conflict {
            entity,
            field,
            value: value.into(),
        }
    }

    /// Creates a missing reference error.
    pub fn missing_reference(entity: &'static str, id: impl ToString) -> Self {
        Self::MissingReference {
            entity,
            id: id.to_string(),
        }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Returns `true` if this is a uniqueness violation.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { .. } => AuthError::conflict(err.to_string()),
            StoreError::MissingReference { .. } => AuthError::internal(err.to_string()),
            StoreError::Unavailable(message) => AuthError::storage_unavailable(message),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_conflict_maps_to_conflict() {
        let err: AuthError = StoreError::conflict("user", "email", "a@x.com").into();
        assert!(matches!(err, AuthError::Conflict { .. }));
        assert_eq!(err.code(), "CONFLICT");
    }

    #[test]
    fn test_store_unavailable_is_generic() {
        let err: AuthError = StoreError::unavailable("connection refused to 10.0.0.5").into();
        assert!(err.is_server_error());
        assert_eq!(err.user_message(), "Internal server error");
        assert!(!err.user_message().contains("10.0.0.5"));
    }

    #[test]
    fn test_credential_and_token_errors_carry_no_detail() {
        assert_eq!(AuthError::InvalidCredentials.to_string(), "Invalid credentials");
        assert_eq!(AuthError::InvalidToken.to_string(), "Invalid token");
    }

    #[test]
    fn test_forbidden_user_message_hides_missing() {
        let err = AuthError::forbidden(vec!["admin:users".to_string()]);
        assert_eq!(err.user_message(), "Access denied");
        assert!(err.to_string().contains("admin:users"));
    }
}
