//! Row models for accounts and refresh tokens.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered account.
///
/// `current_device_id` doubles as the session marker: `None` means no active
/// session, `Some` identifies the single device allowed to use the account.
/// It is replaced on every successful login and cleared only by an explicit
/// logout or administrative action.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub household_id: Option<Uuid>,
    pub current_device_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// An opaque refresh token persisted for an account.
///
/// At most one non-revoked, non-expired token exists per account; prior tokens
/// are deleted in bulk when a new session is established.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub account_id: Uuid,
}

impl RefreshToken {
    /// A token expiring exactly now is already expired (exclusive upper bound).
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    #[must_use]
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired(now)
    }
}
