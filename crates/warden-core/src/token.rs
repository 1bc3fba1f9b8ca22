// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Signed, time-limited bearer tokens.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::error::{AuthError, AuthResult};
use crate::model::UserId;

/// Documented development secret. Must be overridden in production.
pub const DEFAULT_INSECURE_SECRET: &str = "warden-insecure-development-secret";

/// Token lifetime: one hour.
pub const DEFAULT_EXPIRATION_SECS: i64 = 3600;

const ALGORITHM: Algorithm = Algorithm::HS256;
const MIN_SECRET_LEN: usize = 32;

// =============================================================================
// TokenConfig
// =============================================================================

/// Token signing configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// HMAC signing secret.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Token issuer.
    pub issuer: String,
    /// Token lifetime in seconds.
    pub expiration_secs: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_INSECURE_SECRET.to_string(),
            issuer: "warden".to_string(),
            expiration_secs: DEFAULT_EXPIRATION_SECS,
        }
    }
}

impl TokenConfig {
    /// Creates a configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the token lifetime.
    pub fn with_expiration(mut self, duration: Duration) -> Self {
        self.expiration_secs = duration.as_secs() as i64;
        self
    }

    /// Returns `true` if the documented development secret is in use.
    pub fn uses_insecure_default(&self) -> bool {
        self.secret == DEFAULT_INSECURE_SECRET
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AuthResult<()> {
        if self.secret.is_empty() {
            return Err(AuthError::internal("Token secret is not configured"));
        }
        if self.expiration_secs <= 0 {
            return Err(AuthError::internal("Token expiration must be positive"));
        }
        if self.uses_insecure_default() {
            warn!("Using the default token secret; set WARDEN_JWT_SECRET in production");
        } else if self.secret.len() < MIN_SECRET_LEN {
            warn!("Token secret is shorter than recommended (32 bytes)");
        }
        Ok(())
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("expiration_secs", &self.expiration_secs)
            .finish()
    }
}

// =============================================================================
// Claims
// =============================================================================

/// Session claims carried inside a token. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Issuer.
    pub iss: String,
    /// Token ID.
    pub jti: String,
}

impl Claims {
    /// Returns the issuance time.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    /// Returns the expiration time.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// A freshly issued token and its validity window.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Encoded token.
    pub token: String,
    /// Issuance time.
    pub issued_at: DateTime<Utc>,
    /// Expiration time.
    pub expires_at: DateTime<Utc>,
}

// =============================================================================
// TokenService
// =============================================================================

/// Issues and verifies bearer tokens.
///
/// Built once at startup from [`TokenConfig`]; the signing keys never change
/// for the lifetime of the service.
#[derive(Clone)]
pub struct TokenService {
    config: Arc<TokenConfig>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Creates a token service that reads the system clock.
    pub fn new(config: TokenConfig) -> AuthResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a token service with an explicit time source.
    pub fn with_clock(config: TokenConfig, clock: Arc<dyn Clock>) -> AuthResult<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        // Expiry is checked against `clock`, not inside jsonwebtoken.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["sub", "iat", "exp", "iss"]);

        Ok(Self {
            config: Arc::new(config),
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
            clock,
        })
    }

    /// Issues a token for `subject`, valid from now for the configured lifetime.
    pub fn issue(&self, subject: UserId) -> AuthResult<IssuedToken> {
        let issued_at = self.clock.now();
        let expires_at = issued_at + chrono::Duration::seconds(self.config.expiration_secs);

        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.config.issuer.clone(),
            jti: Uuid::now_v7().to_string(),
        };

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AuthError::internal(format!("Failed to create token: {}", e)))?;

        Ok(IssuedToken {
            token,
            issued_at,
            expires_at,
        })
    }

    /// Verifies a token and returns its subject.
    ///
    /// Every failure is reported as [`AuthError::InvalidToken`]; the reason
    /// is only logged.
    pub fn verify(&self, token: &str) -> AuthResult<UserId> {
        self.decode(token).map(|(subject, _)| subject)
    }

    /// Verifies a token and returns its subject together with its claims.
    pub fn decode(&self, token: &str) -> AuthResult<(UserId, Claims)> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                AuthError::InvalidToken
            })?;

        let now = self.clock.now().timestamp();
        if now > claims.exp {
            debug!(sub = %claims.sub, exp = claims.exp, now, "Token rejected: expired");
            return Err(AuthError::InvalidToken);
        }

        let subject = UserId::parse(&claims.sub).ok_or_else(|| {
            debug!("Token rejected: subject is not a user id");
            AuthError::InvalidToken
        })?;

        Ok((subject, claims))
    }

    /// Returns the token lifetime in seconds.
    pub fn expiration_secs(&self) -> i64 {
        self.config.expiration_secs
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.config.issuer)
            .field("algorithm", &ALGORITHM)
            .field("expiration_secs", &self.config.expiration_secs)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const SECRET: &str = "test-secret-key-that-is-long-enough-for-testing";

    fn service_with_clock() -> (TokenService, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let service = TokenService::with_clock(TokenConfig::new(SECRET), clock.clone()).unwrap();
        (service, clock)
    }

    #[test]
    fn test_issue_and_verify() {
        let (service, _) = service_with_clock();
        let user = UserId::new();

        let issued = service.issue(user).unwrap();
        assert_eq!(issued.expires_at - issued.issued_at, chrono::Duration::hours(1));
        assert_eq!(service.verify(&issued.token).unwrap(), user);
    }

    #[test]
    fn test_expiry_follows_clock() {
        let (service, clock) = service_with_clock();
        let issued = service.issue(UserId::new()).unwrap();

        clock.advance(chrono::Duration::minutes(59));
        assert!(service.verify(&issued.token).is_ok());

        // Still valid exactly at `exp`.
        clock.set(issued.expires_at);
        assert!(service.verify(&issued.token).is_ok());

        clock.advance(chrono::Duration::seconds(1));
        assert!(matches!(
            service.verify(&issued.token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let (service, _) = service_with_clock();
        let other = TokenService::new(TokenConfig::new("another-secret-that-is-long-enough-too")).unwrap();

        let issued = other.issue(UserId::new()).unwrap();
        assert!(matches!(service.verify(&issued.token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_wrong_issuer() {
        let (service, _) = service_with_clock();
        let foreign =
            TokenService::new(TokenConfig::new(SECRET).with_issuer("someone-else")).unwrap();

        let issued = foreign.issue(UserId::new()).unwrap();
        assert!(matches!(service.verify(&issued.token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_malformed_token() {
        let (service, _) = service_with_clock();
        assert!(matches!(service.verify("invalid.token.here"), Err(AuthError::InvalidToken)));
        assert!(matches!(service.verify(""), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        let (service, _) = service_with_clock();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "admin".to_string(),
            iat: now,
            exp: now + 3600,
            iss: "warden".to_string(),
            jti: "x".to_string(),
        };
        let token = encode(
            &Header::new(ALGORITHM),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(service.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_config_validation() {
        assert!(TokenConfig::new("").validate().is_err());
        assert!(TokenConfig::default().validate().is_ok());
        assert!(TokenConfig::default().uses_insecure_default());

        let mut config = TokenConfig::new(SECRET);
        config.expiration_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", TokenConfig::new(SECRET));
        assert!(!rendered.contains(SECRET));
    }
}
