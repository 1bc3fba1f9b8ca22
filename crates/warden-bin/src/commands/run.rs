// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use std::sync::Arc;

use tracing::{info, warn};
use warden_api::{ApiConfig, ApiServer};
use warden_core::MemoryStore;

use crate::cli::{Cli, RunArgs};
use crate::config::load_config;
use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

/// Executes the `run` command to start the server.
pub async fn run(cli: &Cli, args: RunArgs) -> BinResult<()> {
    info!("Starting Warden v{}", warden_core::VERSION);

    let config = apply_overrides(load_config(cli.config.as_deref())?, &args);
    config.validate()?;

    let shutdown_timeout = config.shutdown_timeout;
    let server = ApiServer::builder()
        .config(config)
        .store(Arc::new(MemoryStore::new()))
        .build()
        .map_err(|e| BinError::from(e).with_context("Failed to build server"))?;

    info!(
        addr = %server.addr(),
        base_path = %server.state().config.base_path,
        "Server initialized"
    );

    let coordinator = ShutdownCoordinator::new();
    tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.wait_for_shutdown().await }
    });

    let serve = server.run_with_shutdown(coordinator.shutdown_signal());
    tokio::pin!(serve);

    tokio::select! {
        result = &mut serve => result?,
        _ = drain_deadline(&coordinator, shutdown_timeout) => {
            warn!(
                timeout_secs = shutdown_timeout.as_secs(),
                "Graceful shutdown timed out, dropping open connections"
            );
        }
    }

    info!("Warden stopped");
    Ok(())
}

/// Resolves `timeout` after shutdown begins.
async fn drain_deadline(coordinator: &ShutdownCoordinator, timeout: std::time::Duration) {
    coordinator.shutdown_signal().await;
    tokio::time::sleep(timeout).await;
}

fn apply_overrides(mut config: ApiConfig, args: &RunArgs) -> ApiConfig {
    if let Some(host) = args.host {
        config = config.with_host(host);
    }
    if let Some(port) = args.port {
        config = config.with_port(port);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_cli_overrides_win() {
        let args = RunArgs {
            host: Some(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            port: Some(3000),
        };
        let config = apply_overrides(ApiConfig::default(), &args);
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let config = apply_overrides(ApiConfig::default().with_port(9999), &RunArgs::default());
        assert_eq!(config.port, 9999);
    }
}
