//! Opaque session token issuance.
//!
//! Tokens are unstructured random strings; nothing about the user is
//! recoverable from the token itself. Validation happens by lookup against
//! the `session_tokens` table, not by decoding.

use crate::database::models::{CreateSessionToken, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::token_repository::TokenRepository;
use rand::{Rng, distributions::Alphanumeric};
use sqlx::SqlitePool;
use uuid::Uuid;

/// 48 alphanumeric characters, well past the 128-bit entropy floor for a
/// bearer credential.
const TOKEN_LENGTH: usize = 48;

pub struct TokenService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
}

impl<'a> TokenService<'a> {
    /// Creates a new TokenService instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Issues a new bearer token bound to `user_id`.
    ///
    /// The caller is expected to have confirmed the user exists; this
    /// method trusts its input and reports a foreign-key violation as an
    /// `Identity` error.
    ///
    /// # Returns
    /// The token string. It is returned exactly once and is not
    /// recoverable afterwards other than by possessing it.
    pub async fn issue(&self, user_id: &str) -> ServiceResult<String> {
        let token = Self::generate_token();

        let repo = TokenRepository::new(self.pool);
        repo.create_token(CreateSessionToken {
            id: Uuid::now_v7().to_string(),
            user_id: user_id.to_string(),
            token: token.clone(),
        })
        .await
        .map_err(|e| {
            let error_msg = e.to_string();
            if error_msg.contains("FOREIGN KEY constraint failed") {
                ServiceError::identity(format!("Unknown user: {}", user_id))
            } else {
                ServiceError::Database { source: e }
            }
        })?;

        Ok(token)
    }

    /// Resolves a bearer token back to its user, if the token is known.
    pub async fn resolve(&self, token: &str) -> ServiceResult<Option<User>> {
        let repo = TokenRepository::new(self.pool);
        let user = repo.get_user_by_token(token).await?;

        Ok(user)
    }

    fn generate_token() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect()
    }
}
