use crate::{api, session::TokenConfig};
use anyhow::Result;
use secrecy::SecretString;

pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub jwt_secret: SecretString,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub access_ttl_days: i64,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("port", &self.port)
            .field("dsn", &self.dsn)
            .field("jwt_secret", &"***")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("access_ttl_days", &self.access_ttl_days)
            .finish()
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database connection or server startup fails.
pub async fn execute(args: Args) -> Result<()> {
    let token_config = TokenConfig::new(args.jwt_secret, args.jwt_issuer, args.jwt_audience)
        .with_access_ttl_days(args.access_ttl_days);

    api::serve(args.port, args.dsn, token_config).await
}
