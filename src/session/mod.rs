//! Credential and session management core.
//!
//! The pieces, leaf first: [`password`] wraps Argon2id hashing, [`repo`]
//! defines the credential and refresh-token store contracts with Postgres
//! implementations in [`pg`], [`token`] mints and verifies signed access
//! tokens, [`service`] is the policy engine that drives login, registration,
//! and refresh, and [`guard`] re-validates the device claim on every
//! authenticated request.
//!
//! ## Single active device
//!
//! Each login assigns the account a fresh random device id and replaces its
//! refresh token. Access tokens embed the device id they were minted for; the
//! guard compares that claim against the stored id on every request, so a
//! login on one device silently strands every other device's tokens despite
//! their year-long expiry.

pub mod error;
pub mod guard;
pub mod models;
pub mod password;
pub mod pg;
pub mod repo;
pub mod service;
pub mod token;

pub use error::{AuthError, StoreError};
pub use guard::{GuardError, Principal, check_device_session};
pub use models::{Account, RefreshToken};
pub use pg::{PgCredentialRepository, PgRefreshTokenRepository};
pub use repo::{CredentialRepository, NewAccount, NewRefreshToken, RefreshTokenRepository};
pub use service::{AuthService, SessionTokens};
pub use token::{AccessClaims, TokenConfig, TokenIssuer};
