// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-bin
//!
//! CLI binary for the Warden authentication server.
//!
//! - CLI argument parsing with clap
//! - Configuration file and environment loading
//! - Logging initialization
//! - Graceful shutdown handling
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  main.rs                    │
//! └──────────────────────┬──────────────────────┘
//!                        │
//!                 ┌──────▼──────┐
//!                 │   cli.rs    │
//!                 └──────┬──────┘
//!            ┌───────────┼───────────┐
//!            ▼           ▼           ▼
//!      ┌──────────┐ ┌──────────┐ ┌──────────┐
//!      │ commands │ │  config  │ │ logging  │
//!      └────┬─────┘ └──────────┘ └──────────┘
//!           │
//!    ┌──────▼──────┐   ┌──────────────┐
//!    │  shutdown   │   │  warden-api  │
//!    └─────────────┘   └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the server (default command)
//! warden
//!
//! # Start with a config file on a custom port
//! warden -c /etc/warden/config.yaml run --port 9090
//!
//! # Validate configuration
//! warden validate --show-config
//!
//! # Generate a signing secret
//! warden gen-secret
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use config::{load_config, ConfigFormat, ConfigLoader};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use shutdown::ShutdownCoordinator;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
