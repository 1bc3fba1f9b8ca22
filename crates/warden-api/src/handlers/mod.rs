// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`health`]: Health check endpoint
//! - [`auth`]: Register, login, and profile endpoints

mod auth;
mod health;

pub use auth::*;
pub use health::*;
