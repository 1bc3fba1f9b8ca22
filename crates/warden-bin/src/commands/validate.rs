// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use warden_api::ApiConfig;

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::config::load_config;
use crate::error::{BinError, BinResult};

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let source = cli
        .config
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(defaults)".to_string());

    let config = load_config(cli.config.as_deref())
        .map_err(|e| e.with_context("Configuration validation failed"))?;

    let warnings = collect_warnings(&config);

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", source);
            println!();
            println!("Summary:");
            println!("  Listen:      {}", config.socket_addr());
            println!("  Base path:   {}", config.base_path);
            println!("  Issuer:      {}", config.token.issuer);
            println!("  Token TTL:   {}s", config.token.expiration_secs);
            println!(
                "  Argon2id:    m={} t={} p={}",
                config.password.memory_kib, config.password.iterations, config.password.parallelism
            );

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!("{}", to_yaml(&config)?);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": source,
                "summary": {
                    "listen": config.socket_addr().to_string(),
                    "base_path": config.base_path,
                    "issuer": config.token.issuer,
                    "token_expiration_secs": config.token.expiration_secs,
                },
                "warnings": warnings,
                "config": if args.show_config { Some(&config) } else { None },
            });
            let rendered = serde_json::to_string_pretty(&output)
                .map_err(|e| BinError::runtime(format!("Failed to render JSON: {}", e)))?;
            println!("{}", rendered);
        }
        OutputFormat::Yaml => {
            println!("valid: true");
            println!("config_path: {}", source);
            if !warnings.is_empty() {
                println!("warnings:");
                for warning in &warnings {
                    println!("  - {}", warning);
                }
            }
            if args.show_config {
                println!("config:");
                for line in to_yaml(&config)?.lines() {
                    println!("  {}", line);
                }
            }
        }
    }

    Ok(())
}

fn to_yaml(config: &ApiConfig) -> BinResult<String> {
    serde_yaml::to_string(config).map_err(|e| BinError::runtime(format!("Failed to render YAML: {}", e)))
}

fn collect_warnings(config: &ApiConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.token.uses_insecure_default() {
        warnings.push("Token secret is the development default; set WARDEN_JWT_SECRET".to_string());
    } else if config.token.secret.len() < 32 {
        warnings.push("Token secret is shorter than 32 bytes".to_string());
    }

    if config.cors.allows_any_origin() {
        warnings.push("CORS allows any origin".to_string());
    }

    warnings
}
