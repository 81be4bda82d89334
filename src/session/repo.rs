//! Repository traits for credential and refresh-token storage.
//!
//! The policy engine and the device-session guard are generic over these
//! traits so they can be exercised against in-memory stores in tests and
//! against Postgres in production.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::session::error::StoreResult;
use crate::session::models::{Account, RefreshToken};

/// Input for creating an account. Ids and timestamps are store-assigned.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
}

/// Input for persisting a refresh token. The opaque value is generated by the
/// policy engine, not by the store.
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub account_id: Uuid,
}

/// Persistence of account identity and password hashes.
///
/// Stores never hash or verify passwords; they only move bytes.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Check whether a username is taken (exact, case-sensitive match).
    async fn exists(&self, username: &str) -> StoreResult<bool>;

    async fn get_by_username(&self, username: &str) -> StoreResult<Option<Account>>;

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Account>>;

    /// Create an account. Returns [`StoreError::Conflict`] when the username
    /// is already present, including when two registrations race: the unique
    /// index decides the winner, not the prior `exists` check.
    ///
    /// [`StoreError::Conflict`]: crate::session::error::StoreError::Conflict
    async fn create(&self, account: NewAccount) -> StoreResult<Account>;

    /// Persist mutated fields, notably `current_device_id` and
    /// `household_id`. Used by household-join flows and future logout.
    async fn update(&self, account: &Account) -> StoreResult<()>;
}

/// Persistence of opaque refresh tokens, keyed by account.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Look up a token by its opaque value, joined with its account.
    async fn find_by_token_with_account(
        &self,
        token: &str,
    ) -> StoreResult<Option<(RefreshToken, Account)>>;

    /// All tokens for an account, revoked ones included.
    async fn list_by_account(&self, account_id: Uuid) -> StoreResult<Vec<RefreshToken>>;

    async fn create(&self, token: NewRefreshToken) -> StoreResult<RefreshToken>;

    /// Bulk-delete every token for an account. Returns the number removed.
    async fn delete_all_for_account(&self, account_id: Uuid) -> StoreResult<u64>;

    /// Atomically establish a new single-device session: persist the
    /// account's `current_device_id` as carried on `account`, delete all
    /// prior refresh tokens for it, and insert `token` in one transaction.
    /// Two concurrent logins cannot both observe themselves as the sole
    /// session, and an aborted request leaves no partial write behind.
    async fn establish_session(
        &self,
        account: &Account,
        token: NewRefreshToken,
    ) -> StoreResult<RefreshToken>;
}
