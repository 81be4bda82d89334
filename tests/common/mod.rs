//! Shared fixtures for the integration suites.

pub mod mock_repos;

use std::sync::Arc;

use secrecy::SecretString;

use dispensa::session::{AuthService, TokenConfig, TokenIssuer};
use self::mock_repos::MockStore;

/// A policy engine wired to one shared in-memory store.
pub fn test_service() -> (AuthService<MockStore, MockStore>, Arc<MockStore>) {
    let store = Arc::new(MockStore::new());
    let issuer = TokenIssuer::new(TokenConfig::new(
        SecretString::from("integration-test-secret-32-bytes!!"),
        "dispensa.test".to_string(),
        "dispensa-clients".to_string(),
    ));
    let service = AuthService::new(Arc::clone(&store), Arc::clone(&store), issuer);
    (service, store)
}
