// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Warden Integration Tests
//!
//! Integration tests for the Warden authentication server, plus the shared
//! fixtures and store doubles they run on.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Services, routers, and request bodies wired for tests
//!   - `mocks`: Credential store doubles for fault injection
//!   - `assertions`: Helpers for checking HTTP responses
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p warden-tests
//!
//! # Run one suite
//! cargo test -p warden-tests --test integration_protocol
//! cargo test -p warden-tests --test integration_token
//! cargo test -p warden-tests --test integration_api
//! ```
//!
//! ## Test Categories
//!
//! ### Protocol Tests (`integration_protocol.rs`)
//! - Registration, login, and profile flows
//! - Role auto-provisioning and the creation race
//! - Storage outages
//!
//! ### Token Tests (`integration_token.rs`)
//! - Tampering and expiry against a manual clock
//!
//! ### API Tests (`integration_api.rs`)
//! - HTTP status and error body mapping through the router
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use warden_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let fixture = ServiceFixture::new();
//!     let outcome = fixture.service.register(alice()).await.unwrap();
//!     // ... test logic
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::assertions::*;
    pub use crate::common::fixtures::*;
    pub use crate::common::mocks::*;
}
