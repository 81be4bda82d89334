//! Errors crossing the storage and policy-engine boundaries.

use thiserror::Error;

/// Storage-layer failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Unique constraint hit, e.g. two concurrent registrations racing on the
    /// same username.
    #[error("record already exists")]
    Conflict,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Structured outcome of a policy-engine operation.
///
/// The transport layer maps these to status codes; the engine never panics or
/// throws across the service boundary. Unauthorized messages are deliberately
/// generic so callers cannot tell which factor failed.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Conflict(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
