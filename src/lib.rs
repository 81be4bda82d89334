//! # Dispensa (Credential & Session Core)
//!
//! `dispensa` is the authentication core of a multi-device shared-groceries
//! household application. It handles username/password registration and
//! login, signed access-token issuance, refresh-token lifecycle, and a strict
//! single-active-device session policy.
//!
//! ## Single Active Device
//!
//! Every successful login assigns the account a fresh random device id and
//! deletes all prior refresh tokens. Access tokens embed the device id they
//! were minted for, and the device-session guard re-validates that claim
//! against stored state on every authenticated request. The last login always
//! wins, and tokens held by any other device stop working immediately despite
//! their long expiry.
//!
//! ## Tokens
//!
//! - **Access tokens** are stateless HS256 JWTs with a deliberately long
//!   lifetime (a year by default): the target users re-authenticate rarely,
//!   and staleness is enforced by the guard rather than by short expiries.
//! - **Refresh tokens** are opaque 64-byte random values, one active per
//!   account, not rotated on use.
//!
//! The signing secret, issuer, and audience are loaded once at startup from
//! CLI/environment configuration; missing values abort startup.

pub mod api;
pub mod cli;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        // Should be a hex string (full SHA-1 is 40 chars, but could be short)
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
