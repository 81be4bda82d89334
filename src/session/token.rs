//! Signed access-token issuance and verification.
//!
//! Access tokens are stateless HS256 JWTs carrying identity, device, and
//! household claims. Expiry is deliberately long (a year by default): the
//! target users authenticate rarely, and staleness is enforced by the
//! device-session guard rather than by short token lifetimes.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::session::models::Account;

pub const DEFAULT_ACCESS_TTL_DAYS: i64 = 365;

#[derive(Error, Debug)]
pub enum TokenError {
    /// An account with no current device has no session to mint a token for.
    #[error("account has no active device session")]
    NoDevice,

    #[error("token rejected")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Signing configuration, loaded once at startup and never mutated.
///
/// The secret, issuer, and audience come from trusted external configuration;
/// their absence is a fatal startup error handled by the CLI layer before this
/// struct can exist.
#[derive(Clone)]
pub struct TokenConfig {
    secret: SecretString,
    issuer: String,
    audience: String,
    access_ttl_days: i64,
}

impl TokenConfig {
    #[must_use]
    pub fn new(secret: SecretString, issuer: String, audience: String) -> Self {
        Self {
            secret,
            issuer,
            audience,
            access_ttl_days: DEFAULT_ACCESS_TTL_DAYS,
        }
    }

    #[must_use]
    pub fn with_access_ttl_days(mut self, days: i64) -> Self {
        self.access_ttl_days = days;
        self
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }

    #[must_use]
    pub fn access_ttl_days(&self) -> i64 {
        self.access_ttl_days
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"***")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl_days", &self.access_ttl_days)
            .finish()
    }
}

/// Claims embedded in an access token.
///
/// `device_id` is a capability: the guard accepts it only while it equals the
/// account's stored `current_device_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub username: String,
    pub device_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub household_id: Option<Uuid>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Mints and verifies access tokens with a process-wide symmetric key.
///
/// Safe for concurrent use; the key is read-only after construction.
pub struct TokenIssuer {
    config: TokenConfig,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(config: TokenConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        let encoding = EncodingKey::from_secret(secret);
        let decoding = DecodingKey::from_secret(secret);
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer()]);
        validation.set_audience(&[config.audience()]);
        Self {
            config,
            encoding,
            decoding,
            validation,
        }
    }

    #[must_use]
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Issue a signed access token for an account with an active device.
    ///
    /// # Errors
    /// Returns [`TokenError::NoDevice`] if the account has no current device,
    /// or a signing error from the underlying JWT library.
    pub fn issue(&self, account: &Account) -> Result<String, TokenError> {
        let device_id = account.current_device_id.ok_or(TokenError::NoDevice)?;
        let now = Utc::now();
        let claims = AccessClaims {
            sub: account.id,
            username: account.username.clone(),
            device_id,
            household_id: account.household_id,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::days(self.config.access_ttl_days)).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Verify signature, issuer, audience, and expiry, returning the claims.
    ///
    /// # Errors
    /// Returns a [`TokenError::Jwt`] for any malformed, expired, or
    /// wrongly-signed token.
    pub fn decode(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let data = decode::<AccessClaims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}
