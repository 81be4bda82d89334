//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the
//! appropriate action, such as starting the API server with its signing
//! configuration.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::jwt;
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let jwt_opts = jwt::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        jwt_secret: jwt_opts.secret,
        jwt_issuer: jwt_opts.issuer,
        jwt_audience: jwt_opts.audience,
        access_ttl_days: jwt_opts.access_ttl_days,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_configuration_yields_server_action() {
        temp_env::with_vars(
            [
                ("DISPENSA_DSN", Some("postgres://user@localhost:5432/dispensa")),
                ("DISPENSA_JWT_SECRET", Some("a-signing-secret")),
                ("DISPENSA_JWT_ISSUER", Some("dispensa.test")),
                ("DISPENSA_JWT_AUDIENCE", Some("dispensa-clients")),
                ("DISPENSA_ACCESS_TTL_DAYS", Some("30")),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec!["dispensa"]);
                let action = handler(&matches);
                assert!(action.is_ok());
                if let Ok(Action::Server(args)) = action {
                    assert_eq!(args.port, 8080);
                    assert_eq!(args.dsn, "postgres://user@localhost:5432/dispensa");
                    assert_eq!(args.jwt_issuer, "dispensa.test");
                    assert_eq!(args.jwt_audience, "dispensa-clients");
                    assert_eq!(args.access_ttl_days, 30);
                }
            },
        );
    }
}
