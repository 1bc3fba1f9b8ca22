// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-api
//!
//! HTTP surface for Warden.
//!
//! A thin axum adapter over [`warden_core::AuthService`]: it decodes
//! requests, runs the bearer token middleware, and maps domain errors to
//! HTTP statuses. It owns no domain logic.
//!
//! | route                        | handler                     |
//! |------------------------------|-----------------------------|
//! | `POST /api/v1/auth/register` | [`handlers::register`]      |
//! | `POST /api/v1/auth/login`    | [`handlers::login`]         |
//! | `GET  /api/v1/auth/profile`  | [`handlers::profile`]       |
//! | `GET  /health`               | [`handlers::health`]        |

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

pub use config::{ApiConfig, CorsConfig, InvalidConfig};
pub use error::{ApiError, ApiResult};
pub use server::{ApiServer, ApiServerBuilder};
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
