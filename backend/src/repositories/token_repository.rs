//! Database repository for issued session tokens.
//!
//! The `session_tokens` table is the validator-side record of every opaque
//! bearer token this service hands out. Rows cascade away when their user is
//! deleted.

use crate::database::models::{CreateSessionToken, SessionToken, User};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

pub struct TokenRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> TokenRepository<'a> {
    /// Creates a new TokenRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Persists a freshly issued token.
    ///
    /// Fails with a FOREIGN KEY violation when `user_id` does not reference
    /// an existing user; callers translate that into their own error type.
    pub async fn create_token(&self, token: CreateSessionToken) -> Result<SessionToken> {
        let token = sqlx::query_as::<_, SessionToken>(
            r#"
            INSERT INTO session_tokens (id, user_id, token, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, user_id, token, created_at
            "#,
        )
        .bind(&token.id)
        .bind(&token.user_id)
        .bind(&token.token)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(token)
    }

    /// Resolves a bearer token to its user.
    ///
    /// # Returns
    /// `Some(User)` when the token is known, `None` otherwise
    pub async fn get_user_by_token(&self, token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.name, u.email, u.password_hash, u.created_at, u.updated_at
            FROM session_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }
}
