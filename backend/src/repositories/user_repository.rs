//! Database repository for user management operations.
//!
//! Provides CRUD operations for registered users.

use crate::database::models::{CreateUserRecord, User};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

/// Repository for user database operations.
///
/// Handles all persistence operations for the User entity. The email column
/// carries a unique constraint; callers that want a friendlier error should
/// check for duplicates first and treat the constraint as a race backstop.
pub struct UserRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new user in the database.
    ///
    /// # Arguments
    /// * `user` - CreateUserRecord DTO containing the user's details
    ///
    /// # Returns
    /// The newly created User with all fields populated
    pub async fn create_user(&self, user: CreateUserRecord) -> Result<User> {
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, name, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok(user)
    }

    /// Retrieves a user by their unique identifier.
    ///
    /// # Arguments
    /// * `id` - User ID (UUID format)
    ///
    /// # Returns
    /// `Some(User)` if found, `None` otherwise
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Retrieves a user by their email.
    ///
    /// # Arguments
    /// * `email` - Email to search for
    ///
    /// # Returns
    /// `Some(User)` if found, `None` otherwise
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Checks if an email already exists in the system.
    ///
    /// # Arguments
    /// * `email` - Email to check
    ///
    /// # Returns
    /// `true` if a user with this email exists
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Checks if email exists excluding a specific user.
    ///
    /// # Arguments
    /// * `email` - Email to check
    /// * `exclude_user_id` - User ID to exclude from check
    ///
    /// # Returns
    /// `true` if another user with this email exists
    pub async fn email_exists_excluding(&self, email: &str, exclude_user_id: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ? AND id != ?")
                .bind(email)
                .bind(exclude_user_id)
                .fetch_one(self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Overwrites a user's profile columns and bumps `updated_at`.
    ///
    /// # Arguments
    /// * `id` - User ID to update
    /// * `name`, `email`, `password_hash` - Full replacement values; callers
    ///   merge optional input onto the current row before calling
    ///
    /// # Returns
    /// The updated User, or `None` if the id does not exist
    pub async fn update_user(
        &self,
        id: &str,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = ?, email = ?, password_hash = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, name, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Replaces a user's password digest and bumps `updated_at`.
    ///
    /// # Returns
    /// The number of rows affected (0 when the id does not exist)
    pub async fn update_password(&self, id: &str, password_hash: &str) -> Result<u64> {
        let rows_affected =
            sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
                .bind(password_hash)
                .bind(Utc::now())
                .bind(id)
                .execute(self.pool)
                .await?
                .rows_affected();

        Ok(rows_affected)
    }

    /// Permanently removes a user.
    ///
    /// # Returns
    /// The number of rows affected (0 when the id does not exist)
    pub async fn delete_user(&self, id: &str) -> Result<u64> {
        let rows_affected = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}
