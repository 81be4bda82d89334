//! In-memory repositories backing the integration suites.
//!
//! One `MockStore` implements both repository traits so that
//! `establish_session` can touch accounts and tokens together, mirroring the
//! single transaction the Postgres implementation uses.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use dispensa::session::error::{StoreError, StoreResult};
use dispensa::session::{
    Account, CredentialRepository, NewAccount, NewRefreshToken, RefreshToken,
    RefreshTokenRepository,
};

#[derive(Default, Clone)]
pub struct MockStore {
    accounts: Arc<DashMap<Uuid, Account>>,
    by_username: Arc<DashMap<String, Uuid>>,
    tokens: Arc<DashMap<Uuid, RefreshToken>>,
    by_token: Arc<DashMap<String, Uuid>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an account directly, bypassing registration.
    #[allow(dead_code)]
    pub fn insert_account(&self, account: Account) {
        self.by_username.insert(account.username.clone(), account.id);
        self.accounts.insert(account.id, account);
    }

    /// Remove an account, leaving any of its tokens behind.
    #[allow(dead_code)]
    pub fn remove_account(&self, id: Uuid) {
        if let Some((_, account)) = self.accounts.remove(&id) {
            self.by_username.remove(&account.username);
        }
    }

    #[allow(dead_code)]
    pub fn account_by_username(&self, username: &str) -> Option<Account> {
        self.by_username
            .get(username)
            .and_then(|id| self.accounts.get(id.value()).map(|r| r.value().clone()))
    }

    /// Tokens currently stored for an account, any state.
    #[allow(dead_code)]
    pub fn tokens_for(&self, account_id: Uuid) -> Vec<RefreshToken> {
        self.tokens
            .iter()
            .filter(|r| r.value().account_id == account_id)
            .map(|r| r.value().clone())
            .collect()
    }

    /// Mutate a stored token in place, e.g. to backdate its expiry.
    #[allow(dead_code)]
    pub fn update_token<F: FnOnce(&mut RefreshToken)>(&self, token: &str, f: F) {
        if let Some(id) = self.by_token.get(token).map(|r| *r.value()) {
            if let Some(mut stored) = self.tokens.get_mut(&id) {
                f(&mut stored);
            }
        }
    }

    fn insert_token(&self, token: NewRefreshToken) -> RefreshToken {
        let row = RefreshToken {
            id: Uuid::new_v4(),
            token: token.token,
            created_at: Utc::now(),
            expires_at: token.expires_at,
            revoked: false,
            account_id: token.account_id,
        };
        self.by_token.insert(row.token.clone(), row.id);
        self.tokens.insert(row.id, row.clone());
        row
    }

    fn remove_tokens_for(&self, account_id: Uuid) -> u64 {
        let stale: Vec<Uuid> = self
            .tokens
            .iter()
            .filter(|r| r.value().account_id == account_id)
            .map(|r| r.value().id)
            .collect();
        let count = stale.len() as u64;
        for id in stale {
            if let Some((_, token)) = self.tokens.remove(&id) {
                self.by_token.remove(&token.token);
            }
        }
        count
    }
}

#[async_trait]
impl CredentialRepository for MockStore {
    async fn exists(&self, username: &str) -> StoreResult<bool> {
        Ok(self.by_username.contains_key(username))
    }

    async fn get_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        Ok(self.account_by_username(username))
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Account>> {
        Ok(self.accounts.get(&id).map(|r| r.value().clone()))
    }

    async fn create(&self, account: NewAccount) -> StoreResult<Account> {
        if self.by_username.contains_key(&account.username) {
            return Err(StoreError::Conflict);
        }
        let row = Account {
            id: Uuid::new_v4(),
            username: account.username,
            password_hash: account.password_hash,
            household_id: None,
            current_device_id: None,
            created_at: Utc::now(),
        };
        self.insert_account(row.clone());
        Ok(row)
    }

    async fn update(&self, account: &Account) -> StoreResult<()> {
        self.insert_account(account.clone());
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenRepository for MockStore {
    async fn find_by_token_with_account(
        &self,
        token: &str,
    ) -> StoreResult<Option<(RefreshToken, Account)>> {
        let Some(stored) = self
            .by_token
            .get(token)
            .and_then(|id| self.tokens.get(id.value()).map(|r| r.value().clone()))
        else {
            return Ok(None);
        };
        let Some(account) = self.accounts.get(&stored.account_id).map(|r| r.value().clone())
        else {
            return Ok(None);
        };
        Ok(Some((stored, account)))
    }

    async fn list_by_account(&self, account_id: Uuid) -> StoreResult<Vec<RefreshToken>> {
        Ok(self.tokens_for(account_id))
    }

    async fn create(&self, token: NewRefreshToken) -> StoreResult<RefreshToken> {
        Ok(self.insert_token(token))
    }

    async fn delete_all_for_account(&self, account_id: Uuid) -> StoreResult<u64> {
        Ok(self.remove_tokens_for(account_id))
    }

    async fn establish_session(
        &self,
        account: &Account,
        token: NewRefreshToken,
    ) -> StoreResult<RefreshToken> {
        self.insert_account(account.clone());
        self.remove_tokens_for(account.id);
        Ok(self.insert_token(token))
    }
}
