// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-core
//!
//! Role-based authentication and authorization for Warden.
//!
//! This crate holds everything except the transport:
//!
//! - **Model**: `User`, `Role`, `Permission` and their resolved aggregate
//! - **Store**: the `CredentialStore` trait and an in-memory implementation
//! - **Password**: Argon2id hashing
//! - **Token**: HS256 bearer tokens with an injectable clock
//! - **Rbac**: permission resolution with AND semantics
//! - **Service**: register, login, and per-request authentication
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use warden_core::{AuthService, MemoryStore, PasswordConfig, RegisterRequest, TokenConfig};
//!
//! let service = AuthService::from_config(
//!     Arc::new(MemoryStore::new()),
//!     TokenConfig::new(std::env::var("WARDEN_JWT_SECRET")?),
//!     &PasswordConfig::default(),
//! )?;
//!
//! let outcome = service.register(RegisterRequest::new("alice", "a@x.com", "pw123")).await?;
//! let ctx = service.authenticate_request(Some(&outcome.token)).await?;
//! service.authorize_request(Some(&ctx), &["read:profile"])?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Core Modules
// =============================================================================

pub mod clock;
pub mod error;
pub mod model;

// =============================================================================
// Components
// =============================================================================

pub mod password;
pub mod store;
pub mod token;

// =============================================================================
// Protocol
// =============================================================================

pub mod context;
pub mod rbac;
pub mod service;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::AuthContext;
pub use error::{AuthError, AuthResult, StoreError, StoreResult};
pub use model::*;
pub use password::{PasswordConfig, PasswordHasher, MAX_PASSWORD_BYTES};
pub use rbac::{authorize, has_permission, resolve_permissions, PermissionSet};
pub use service::AuthService;
pub use store::{CredentialStore, MemoryStore};
pub use token::{
    Claims, IssuedToken, TokenConfig, TokenService, DEFAULT_EXPIRATION_SECS,
    DEFAULT_INSECURE_SECRET,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
