//! Request-time device-session freshness check.
//!
//! A well-formed, correctly signed, unexpired access token is necessary but
//! not sufficient: the token's device claim must also equal the account's
//! current device id, read fresh from the store on every call. This is what
//! turns "single active device" into an enforced invariant: a stolen or old
//! token becomes useless the moment another device logs in.

use thiserror::Error;

use crate::session::error::StoreError;
use crate::session::models::Account;
use crate::session::repo::CredentialRepository;
use crate::session::token::AccessClaims;

pub const MSG_STALE_DEVICE: &str = "Expired session or invalid device. Please log in again.";

#[derive(Error, Debug)]
pub enum GuardError {
    #[error("{0}")]
    Unauthorized(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Authenticated identity attached to a request once the guard has passed.
#[derive(Debug, Clone)]
pub struct Principal {
    pub account_id: uuid::Uuid,
    pub username: String,
    pub device_id: uuid::Uuid,
    pub household_id: Option<uuid::Uuid>,
}

impl Principal {
    fn from_account(account: &Account, claims: &AccessClaims) -> Self {
        Self {
            account_id: account.id,
            username: account.username.clone(),
            device_id: claims.device_id,
            // Household membership may have changed since the token was
            // minted; the stored value wins over the claim.
            household_id: account.household_id,
        }
    }
}

/// Validate the device claim against the account's current device id.
///
/// Always reads the account fresh, never from a cache, so the check
/// reflects the latest login.
///
/// # Errors
/// `Unauthorized` when the account is gone or the device ids differ;
/// `Store` for storage failures.
pub async fn check_device_session<C: CredentialRepository>(
    credentials: &C,
    claims: &AccessClaims,
) -> Result<Principal, GuardError> {
    let Some(account) = credentials.get_by_id(claims.sub).await? else {
        return Err(GuardError::Unauthorized(MSG_STALE_DEVICE));
    };

    if account.current_device_id != Some(claims.device_id) {
        return Err(GuardError::Unauthorized(MSG_STALE_DEVICE));
    }

    Ok(Principal::from_account(&account, claims))
}
