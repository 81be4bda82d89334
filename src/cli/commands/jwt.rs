//! Token-signing configuration arguments.
//!
//! Secret, issuer, and audience are required: their absence is a fatal
//! configuration error that aborts startup before the server binds a socket.

use anyhow::{Context, Result};
use clap::{Arg, Command};
use secrecy::SecretString;

use crate::session::token::DEFAULT_ACCESS_TTL_DAYS;

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_JWT_ISSUER: &str = "jwt-issuer";
pub const ARG_JWT_AUDIENCE: &str = "jwt-audience";
pub const ARG_ACCESS_TTL_DAYS: &str = "access-ttl-days";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Symmetric secret used to sign access tokens")
                .env("DISPENSA_JWT_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_JWT_ISSUER)
                .long(ARG_JWT_ISSUER)
                .help("Issuer claim embedded in and required of access tokens")
                .env("DISPENSA_JWT_ISSUER")
                .required(true),
        )
        .arg(
            Arg::new(ARG_JWT_AUDIENCE)
                .long(ARG_JWT_AUDIENCE)
                .help("Audience claim embedded in and required of access tokens")
                .env("DISPENSA_JWT_AUDIENCE")
                .required(true),
        )
        .arg(
            Arg::new(ARG_ACCESS_TTL_DAYS)
                .long(ARG_ACCESS_TTL_DAYS)
                .help("Access-token lifetime in days (long-lived: household users re-authenticate rarely)")
                .env("DISPENSA_ACCESS_TTL_DAYS")
                .default_value("365")
                .value_parser(clap::value_parser!(i64)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub secret: SecretString,
    pub issuer: String,
    pub audience: String,
    pub access_ttl_days: i64,
}

impl Options {
    /// Read the signing options out of parsed matches.
    ///
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let secret = matches
            .get_one::<String>(ARG_JWT_SECRET)
            .cloned()
            .context("missing required argument: --jwt-secret")?;
        let issuer = matches
            .get_one::<String>(ARG_JWT_ISSUER)
            .cloned()
            .context("missing required argument: --jwt-issuer")?;
        let audience = matches
            .get_one::<String>(ARG_JWT_AUDIENCE)
            .cloned()
            .context("missing required argument: --jwt-audience")?;
        let access_ttl_days = matches
            .get_one::<i64>(ARG_ACCESS_TTL_DAYS)
            .copied()
            .unwrap_or(DEFAULT_ACCESS_TTL_DAYS);

        Ok(Self {
            secret: SecretString::from(secret),
            issuer,
            audience,
            access_ttl_days,
        })
    }
}
