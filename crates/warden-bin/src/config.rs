// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading.
//!
//! Reads an optional YAML, TOML, or JSON file into [`ApiConfig`] and layers
//! environment overrides on top.
//!
//! | variable                       | field                   |
//! |--------------------------------|-------------------------|
//! | `WARDEN_JWT_SECRET`            | `token.secret`          |
//! | `JWT_SECRET`                   | `token.secret` (fallback) |
//! | `WARDEN_API_HOST`              | `host`                  |
//! | `WARDEN_API_PORT`              | `port`                  |
//! | `WARDEN_TOKEN_EXPIRATION_SECS` | `token.expiration_secs` |

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use warden_api::ApiConfig;

use crate::error::{BinError, BinResult};

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML (`.yaml`, `.yml`)
    Yaml,
    /// TOML (`.toml`)
    Toml,
    /// JSON (`.json`)
    Json,
}

impl ConfigFormat {
    /// Detects the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    fn parse(self, path: &Path, content: &str) -> BinResult<ApiConfig> {
        match self {
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| BinError::parse(path, e.to_string())),
            Self::Toml => toml::from_str(content).map_err(|e| BinError::parse(path, e.to_string())),
            Self::Json => serde_json::from_str(content).map_err(|e| BinError::parse(path, e.to_string())),
        }
    }
}

// =============================================================================
// ConfigLoader
// =============================================================================

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Loads [`ApiConfig`] from a file and the environment.
pub struct ConfigLoader {
    path: Option<PathBuf>,
    env: EnvLookup,
}

impl ConfigLoader {
    /// Creates a loader that reads the process environment.
    pub fn new(path: Option<&Path>) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
            env: Box::new(|name| std::env::var(name).ok()),
        }
    }

    /// Replaces the environment lookup.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Box::new(lookup);
        self
    }

    /// Loads, overrides, and validates the configuration.
    pub fn load(&self) -> BinResult<ApiConfig> {
        let mut config = self.load_file()?;
        self.apply_env(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    fn load_file(&self) -> BinResult<ApiConfig> {
        let Some(path) = &self.path else {
            debug!("No configuration file given, using defaults");
            return Ok(ApiConfig::default());
        };

        if !path.exists() {
            warn!(path = %path.display(), "Configuration file not found, using defaults");
            return Ok(ApiConfig::default());
        }

        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            BinError::config(format!(
                "Unsupported configuration format: {} (expected .yaml, .yml, .toml or .json)",
                path.display()
            ))
        })?;

        let content = std::fs::read_to_string(path)
            .map_err(|e| BinError::io(e.to_string()).with_context(format!("Reading {}", path.display())))?;

        debug!(path = %path.display(), ?format, "Loaded configuration file");
        format.parse(path, &content)
    }

    fn apply_env(&self, config: &mut ApiConfig) -> BinResult<()> {
        if let Some(secret) = self.var("WARDEN_JWT_SECRET").or_else(|| self.var("JWT_SECRET")) {
            config.token.secret = secret;
        }

        if let Some(host) = self.var("WARDEN_API_HOST") {
            config.host = host
                .parse()
                .map_err(|e| BinError::invalid_env_var("WARDEN_API_HOST", format!("{}", e)))?;
        }

        if let Some(port) = self.var("WARDEN_API_PORT") {
            config.port = port
                .parse()
                .map_err(|e| BinError::invalid_env_var("WARDEN_API_PORT", format!("{}", e)))?;
        }

        if let Some(secs) = self.var("WARDEN_TOKEN_EXPIRATION_SECS") {
            config.token.expiration_secs = secs.parse().map_err(|e| {
                BinError::invalid_env_var("WARDEN_TOKEN_EXPIRATION_SECS", format!("{}", e))
            })?;
        }

        Ok(())
    }

    fn var(&self, name: &str) -> Option<String> {
        (self.env)(name).filter(|value| !value.is_empty())
    }
}

/// Loads the configuration at `path` with process environment overrides.
pub fn load_config(path: Option<&Path>) -> BinResult<ApiConfig> {
    ConfigLoader::new(path).load()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.yaml")), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_path(Path::new("a.YML")), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_path(Path::new("a.ini")), None);
        assert_eq!(ConfigFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let loader = ConfigLoader::new(Some(Path::new("/nonexistent/warden.yaml"))).with_env(env_of(&[]));
        let config = loader.load().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.base_path, "/api/v1");
    }

    #[test]
    fn test_load_yaml() {
        let file = write_config(
            ".yaml",
            "port: 9000\ntoken:\n  secret: yaml-secret-that-is-long-enough-000000\n  expiration_secs: 600\n",
        );
        let config = ConfigLoader::new(Some(file.path())).with_env(env_of(&[])).load().unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.token.secret, "yaml-secret-that-is-long-enough-000000");
        assert_eq!(config.token.expiration_secs, 600);
        assert_eq!(config.token.issuer, "warden");
    }

    #[test]
    fn test_load_toml() {
        let file = write_config(".toml", "port = 9100\nbase_path = \"/api/v2\"\n\n[token]\nissuer = \"acme\"\n");
        let config = ConfigLoader::new(Some(file.path())).with_env(env_of(&[])).load().unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.base_path, "/api/v2");
        assert_eq!(config.token.issuer, "acme");
    }

    #[test]
    fn test_load_json() {
        let file = write_config(".json", r#"{"host": "127.0.0.1", "request_timeout": 5}"#);
        let config = ConfigLoader::new(Some(file.path())).with_env(env_of(&[])).load().unwrap();

        assert_eq!(config.host.to_string(), "127.0.0.1");
        assert_eq!(config.request_timeout.as_secs(), 5);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_config(".ini", "port=1");
        let result = ConfigLoader::new(Some(file.path())).with_env(env_of(&[])).load();
        assert!(matches!(result, Err(BinError::Configuration(_))));
    }

    #[test]
    fn test_parse_error() {
        let file = write_config(".json", "{ not json");
        let result = ConfigLoader::new(Some(file.path())).with_env(env_of(&[])).load();
        assert!(matches!(result, Err(BinError::Parse { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let loader = ConfigLoader::new(None).with_env(env_of(&[
            ("WARDEN_JWT_SECRET", "env-secret-env-secret-env-secret-00"),
            ("WARDEN_API_HOST", "127.0.0.1"),
            ("WARDEN_API_PORT", "7070"),
            ("WARDEN_TOKEN_EXPIRATION_SECS", "120"),
        ]));
        let config = loader.load().unwrap();

        assert_eq!(config.token.secret, "env-secret-env-secret-env-secret-00");
        assert_eq!(config.host.to_string(), "127.0.0.1");
        assert_eq!(config.port, 7070);
        assert_eq!(config.token.expiration_secs, 120);
    }

    #[test]
    fn test_jwt_secret_fallback() {
        let config = ConfigLoader::new(None)
            .with_env(env_of(&[("JWT_SECRET", "fallback-secret")]))
            .load()
            .unwrap();
        assert_eq!(config.token.secret, "fallback-secret");

        let config = ConfigLoader::new(None)
            .with_env(env_of(&[("JWT_SECRET", "fallback"), ("WARDEN_JWT_SECRET", "primary")]))
            .load()
            .unwrap();
        assert_eq!(config.token.secret, "primary");
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_config(".yaml", "port: 9000\n");
        let config = ConfigLoader::new(Some(file.path()))
            .with_env(env_of(&[("WARDEN_API_PORT", "9001")]))
            .load()
            .unwrap();
        assert_eq!(config.port, 9001);
    }

    #[test]
    fn test_invalid_env_value() {
        let result = ConfigLoader::new(None)
            .with_env(env_of(&[("WARDEN_API_PORT", "not-a-port")]))
            .load();
        assert!(matches!(result, Err(BinError::InvalidEnvVar { ref name, .. }) if name == "WARDEN_API_PORT"));
    }

    #[test]
    fn test_validation_runs_after_overrides() {
        let result = ConfigLoader::new(None)
            .with_env(env_of(&[("WARDEN_TOKEN_EXPIRATION_SECS", "0")]))
            .load();
        assert!(matches!(result, Err(BinError::InvalidConfig(_))));
    }
}
