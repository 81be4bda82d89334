//! The session policy engine.
//!
//! Three operations (register, login, refresh) drive the per-account state
//! machine: no session (no device id, no usable refresh token) becomes an
//! active session at login, and a later login fully supersedes it. The last
//! login always wins; there is never more than one live device per account.

use anyhow::Context;
use base64ct::{Base64, Encoding};
use chrono::{Duration, Utc};
use rand::{RngCore, rngs::OsRng};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::session::error::{AuthError, StoreError};
use crate::session::password;
use crate::session::repo::{
    CredentialRepository, NewAccount, NewRefreshToken, RefreshTokenRepository,
};
use crate::session::token::TokenIssuer;

/// Raw entropy per refresh token, before base64 encoding.
const REFRESH_TOKEN_BYTES: usize = 64;
const REFRESH_TOKEN_TTL_DAYS: i64 = 365;

const MSG_USERNAME_TAKEN: &str = "User already exists.";
/// One message for unknown username and wrong password, so responses do not
/// confirm which usernames exist.
const MSG_INVALID_CREDENTIALS: &str = "Invalid credentials.";
/// One message for unknown, revoked, and expired refresh tokens.
const MSG_INVALID_REFRESH: &str = "Invalid or expired session. Please log in again.";
const MSG_NO_DEVICE_SESSION: &str = "Invalid session state. Please log in again.";

/// Tokens and identity returned by a successful login or refresh.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub username: String,
    pub household_id: Option<Uuid>,
}

/// Coordinates the credential store, refresh-token store, and token issuer.
///
/// Generic over the repository traits so the policy logic can be tested
/// against in-memory stores.
pub struct AuthService<C, R> {
    credentials: Arc<C>,
    refresh_tokens: Arc<R>,
    issuer: TokenIssuer,
}

impl<C: CredentialRepository, R: RefreshTokenRepository> AuthService<C, R> {
    pub fn new(credentials: Arc<C>, refresh_tokens: Arc<R>, issuer: TokenIssuer) -> Self {
        Self {
            credentials,
            refresh_tokens,
            issuer,
        }
    }

    /// The credential store, shared with the device-session guard for its
    /// request-time freshness checks.
    #[must_use]
    pub fn credentials(&self) -> &Arc<C> {
        &self.credentials
    }

    #[must_use]
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Register a new account. No tokens are issued; registration and login
    /// are decoupled.
    ///
    /// # Errors
    /// `Conflict` when the username is taken, including when a concurrent
    /// registration wins the race at the unique index.
    pub async fn register(&self, username: &str, plaintext: &str) -> Result<(), AuthError> {
        if self.credentials.exists(username).await? {
            return Err(AuthError::Conflict(MSG_USERNAME_TAKEN));
        }

        let password_hash = password::hash(plaintext)?;
        let account = match self
            .credentials
            .create(NewAccount {
                username: username.to_string(),
                password_hash,
            })
            .await
        {
            Ok(account) => account,
            Err(StoreError::Conflict) => return Err(AuthError::Conflict(MSG_USERNAME_TAKEN)),
            Err(err) => return Err(err.into()),
        };

        info!(username = %account.username, "new account registered");
        Ok(())
    }

    /// Authenticate and establish the account's sole active session.
    ///
    /// On success the account gets a fresh random device id, which instantly
    /// invalidates every previously issued access token at the guard even
    /// though those tokens remain cryptographically valid. All prior refresh
    /// tokens are deleted, and a new refresh token plus access token are
    /// returned. Device id and token replacement are persisted atomically.
    ///
    /// # Errors
    /// `Unauthorized` with a generic message for bad credentials.
    pub async fn login(&self, username: &str, plaintext: &str) -> Result<SessionTokens, AuthError> {
        let Some(mut account) = self.credentials.get_by_username(username).await? else {
            return Err(AuthError::Unauthorized(MSG_INVALID_CREDENTIALS));
        };

        if !password::verify(plaintext, &account.password_hash) {
            return Err(AuthError::Unauthorized(MSG_INVALID_CREDENTIALS));
        }

        account.current_device_id = Some(Uuid::new_v4());

        let refresh = self
            .refresh_tokens
            .establish_session(
                &account,
                NewRefreshToken {
                    token: generate_refresh_token()?,
                    expires_at: Utc::now() + Duration::days(REFRESH_TOKEN_TTL_DAYS),
                    account_id: account.id,
                },
            )
            .await?;

        let access_token = self
            .issuer
            .issue(&account)
            .context("failed to sign access token")?;

        info!(username = %account.username, "session established");

        Ok(SessionTokens {
            access_token,
            refresh_token: refresh.token,
            username: account.username,
            household_id: account.household_id,
        })
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The refresh token itself is returned unchanged: no rotation, no expiry
    /// extension, no mutation of any stored state.
    ///
    /// # Errors
    /// `Unauthorized` when the token is unknown, revoked, or expired, or when
    /// the account's session was invalidated externally (no device id).
    pub async fn refresh(&self, token: &str) -> Result<SessionTokens, AuthError> {
        let Some((stored, account)) = self.refresh_tokens.find_by_token_with_account(token).await?
        else {
            return Err(AuthError::Unauthorized(MSG_INVALID_REFRESH));
        };

        if !stored.is_usable(Utc::now()) {
            return Err(AuthError::Unauthorized(MSG_INVALID_REFRESH));
        }

        if account.current_device_id.is_none() {
            return Err(AuthError::Unauthorized(MSG_NO_DEVICE_SESSION));
        }

        let access_token = self
            .issuer
            .issue(&account)
            .context("failed to sign access token")?;

        Ok(SessionTokens {
            access_token,
            refresh_token: stored.token,
            username: account.username,
            household_id: account.household_id,
        })
    }
}

/// Generate an opaque refresh token: 64 random bytes, base64-encoded.
fn generate_refresh_token() -> anyhow::Result<String> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate refresh token")?;
    Ok(Base64::encode_string(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_tokens_carry_full_entropy() -> anyhow::Result<()> {
        let token = generate_refresh_token()?;
        let decoded = Base64::decode_vec(&token)
            .map_err(|_| anyhow::anyhow!("refresh token is not valid base64"))?;
        assert_eq!(decoded.len(), REFRESH_TOKEN_BYTES);

        let other = generate_refresh_token()?;
        assert_ne!(token, other);
        Ok(())
    }
}
