//! Postgres-backed repositories.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

use crate::session::error::{StoreError, StoreResult};
use crate::session::models::{Account, RefreshToken};
use crate::session::repo::{
    CredentialRepository, NewAccount, NewRefreshToken, RefreshTokenRepository,
};

const ACCOUNT_COLUMNS: &str =
    "id, username, password_hash, household_id, current_device_id, created_at";
const TOKEN_COLUMNS: &str = "id, token, created_at, expires_at, revoked, account_id";

#[derive(Clone)]
pub struct PgCredentialRepository {
    pool: PgPool,
}

impl PgCredentialRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialRepository for PgCredentialRepository {
    async fn exists(&self, username: &str) -> StoreResult<bool> {
        let query = "SELECT 1 FROM users WHERE username = $1 LIMIT 1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;
        Ok(row.is_some())
    }

    async fn get_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        let query =
            format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE username = $1");
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = %query
        );
        let account = sqlx::query_as::<_, Account>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;
        Ok(account)
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Account>> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = $1");
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = %query
        );
        let account = sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;
        Ok(account)
    }

    async fn create(&self, account: NewAccount) -> StoreResult<Account> {
        let query = format!(
            "INSERT INTO users (id, username, password_hash, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = %query
        );
        let created = sqlx::query_as::<_, Account>(&query)
            .bind(Uuid::new_v4())
            .bind(&account.username)
            .bind(&account.password_hash)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match created {
            Ok(created) => Ok(created),
            // The unique index on username decides registration races.
            Err(err) if is_unique_violation(&err) => Err(StoreError::Conflict),
            Err(err) => Err(err.into()),
        }
    }

    async fn update(&self, account: &Account) -> StoreResult<()> {
        let query = "UPDATE users
             SET household_id = $2, current_device_id = $3
             WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(account.id)
            .bind(account.household_id)
            .bind(account.current_device_id)
            .execute(&self.pool)
            .instrument(span)
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgRefreshTokenRepository {
    pool: PgPool,
}

impl PgRefreshTokenRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    async fn find_by_token_with_account(
        &self,
        token: &str,
    ) -> StoreResult<Option<(RefreshToken, Account)>> {
        let query = "SELECT
             t.id AS token_id, t.token, t.created_at AS token_created_at,
             t.expires_at, t.revoked, t.account_id,
             u.id, u.username, u.password_hash, u.household_id,
             u.current_device_id, u.created_at
         FROM refresh_tokens t
         JOIN users u ON u.id = t.account_id
         WHERE t.token = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(token)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        use sqlx::Row;
        let stored = RefreshToken {
            id: row.try_get("token_id")?,
            token: row.try_get("token")?,
            created_at: row.try_get("token_created_at")?,
            expires_at: row.try_get("expires_at")?,
            revoked: row.try_get("revoked")?,
            account_id: row.try_get("account_id")?,
        };
        let account = Account {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            household_id: row.try_get("household_id")?,
            current_device_id: row.try_get("current_device_id")?,
            created_at: row.try_get("created_at")?,
        };
        Ok(Some((stored, account)))
    }

    async fn list_by_account(&self, account_id: Uuid) -> StoreResult<Vec<RefreshToken>> {
        let query = format!(
            "SELECT {TOKEN_COLUMNS} FROM refresh_tokens
             WHERE account_id = $1
             ORDER BY created_at"
        );
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = %query
        );
        let tokens = sqlx::query_as::<_, RefreshToken>(&query)
            .bind(account_id)
            .fetch_all(&self.pool)
            .instrument(span)
            .await?;
        Ok(tokens)
    }

    async fn create(&self, token: NewRefreshToken) -> StoreResult<RefreshToken> {
        let query = format!(
            "INSERT INTO refresh_tokens (id, token, created_at, expires_at, revoked, account_id)
             VALUES ($1, $2, $3, $4, FALSE, $5)
             RETURNING {TOKEN_COLUMNS}"
        );
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = %query
        );
        let created = sqlx::query_as::<_, RefreshToken>(&query)
            .bind(Uuid::new_v4())
            .bind(&token.token)
            .bind(Utc::now())
            .bind(token.expires_at)
            .bind(token.account_id)
            .fetch_one(&self.pool)
            .instrument(span)
            .await?;
        Ok(created)
    }

    async fn delete_all_for_account(&self, account_id: Uuid) -> StoreResult<u64> {
        let query = "DELETE FROM refresh_tokens WHERE account_id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(account_id)
            .execute(&self.pool)
            .instrument(span)
            .await?;
        Ok(result.rows_affected())
    }

    async fn establish_session(
        &self,
        account: &Account,
        token: NewRefreshToken,
    ) -> StoreResult<RefreshToken> {
        // One transaction covers the device-id write and the token swap, so a
        // concurrent login either sees all of this session or none of it.
        let mut tx = self.pool.begin().await?;

        let query = "UPDATE users SET current_device_id = $2 WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(account.id)
            .bind(account.current_device_id)
            .execute(&mut *tx)
            .instrument(span)
            .await?;

        let query = "DELETE FROM refresh_tokens WHERE account_id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(account.id)
            .execute(&mut *tx)
            .instrument(span)
            .await?;

        let query = format!(
            "INSERT INTO refresh_tokens (id, token, created_at, expires_at, revoked, account_id)
             VALUES ($1, $2, $3, $4, FALSE, $5)
             RETURNING {TOKEN_COLUMNS}"
        );
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = %query
        );
        let created = sqlx::query_as::<_, RefreshToken>(&query)
            .bind(Uuid::new_v4())
            .bind(&token.token)
            .bind(Utc::now())
            .bind(token.expires_at)
            .bind(token.account_id)
            .fetch_one(&mut *tx)
            .instrument(span)
            .await?;

        tx.commit().await?;
        Ok(created)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}
