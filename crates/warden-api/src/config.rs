// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use warden_core::{PasswordConfig, TokenConfig};

// =============================================================================
// ApiConfig
// =============================================================================

/// Configuration for the API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host address.
    pub host: IpAddr,
    /// Server port.
    pub port: u16,
    /// Base path for API endpoints.
    pub base_path: String,
    /// Token signing configuration.
    pub token: TokenConfig,
    /// Password hashing cost parameters.
    pub password: PasswordConfig,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Request timeout.
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
    /// Graceful shutdown timeout.
    #[serde(with = "duration_secs")]
    pub shutdown_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
            base_path: "/api/v1".to_string(),
            token: TokenConfig::default(),
            password: PasswordConfig::default(),
            cors: CorsConfig::default(),
            request_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Sets the host address.
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the token configuration.
    pub fn with_token(mut self, token: TokenConfig) -> Self {
        self.token = token;
        self
    }

    /// Sets the password hashing configuration.
    pub fn with_password(mut self, password: PasswordConfig) -> Self {
        self.password = password;
        self
    }

    /// Joins `path` onto the base path.
    pub fn route(&self, path: &str) -> String {
        format!("{}{}", self.base_path.trim_end_matches('/'), path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if !self.base_path.starts_with('/') {
            return Err(InvalidConfig::new("base_path", "must start with '/'"));
        }
        if self.request_timeout.is_zero() {
            return Err(InvalidConfig::new("request_timeout", "must be positive"));
        }
        if self.token.secret.is_empty() {
            return Err(InvalidConfig::new("token.secret", "must not be empty"));
        }
        if self.token.expiration_secs <= 0 {
            return Err(InvalidConfig::new("token.expiration_secs", "must be positive"));
        }
        if self.token.issuer.is_empty() {
            return Err(InvalidConfig::new("token.issuer", "must not be empty"));
        }
        if self.password.iterations == 0 || self.password.parallelism == 0 {
            return Err(InvalidConfig::new(
                "password",
                "iterations and parallelism must be positive",
            ));
        }
        Ok(())
    }
}

/// A configuration value that failed validation.
#[derive(Debug, Clone, Error)]
#[error("Invalid configuration for '{field}': {message}")]
pub struct InvalidConfig {
    /// The offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl InvalidConfig {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// CorsConfig
// =============================================================================

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. `*` allows any origin.
    pub allowed_origins: Vec<String>,
    /// Allowed methods.
    pub allowed_methods: Vec<String>,
    /// Allowed headers.
    pub allowed_headers: Vec<String>,
    /// Max age for preflight cache (seconds).
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec![
                "GET".to_string(),
                "POST".to_string(),
                "OPTIONS".to_string(),
            ],
            allowed_headers: vec![
                "Content-Type".to_string(),
                "Authorization".to_string(),
                "X-Request-ID".to_string(),
            ],
            max_age: 3600,
        }
    }
}

impl CorsConfig {
    /// Creates a restrictive CORS configuration for production.
    pub fn strict(origins: Vec<String>) -> Self {
        Self {
            allowed_origins: origins,
            ..Default::default()
        }
    }

    /// Returns `true` if any origin is allowed.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

// =============================================================================
// Duration as seconds
// =============================================================================

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.base_path, "/api/v1");
        assert_eq!(config.token.expiration_secs, 3600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig::default().with_port(9000);
        assert_eq!(config.socket_addr().port(), 9000);
    }

    #[test]
    fn test_route_joins_base_path() {
        let mut config = ApiConfig::default();
        assert_eq!(config.route("/auth/login"), "/api/v1/auth/login");

        config.base_path = "/api/v2/".to_string();
        assert_eq!(config.route("/auth/login"), "/api/v2/auth/login");
    }

    #[test]
    fn test_validate_rejects_empty_secret() {
        let config = ApiConfig::default().with_token(TokenConfig::new(""));
        let err = config.validate().unwrap_err();
        assert_eq!(err.field, "token.secret");
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ApiConfig =
            serde_json::from_str(r#"{"port": 9090, "request_timeout": 5, "token": {"issuer": "acme"}}"#)
                .unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.token.issuer, "acme");
        assert_eq!(config.token.expiration_secs, 3600);
    }
}
