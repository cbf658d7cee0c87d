//! User business logic service.
//!
//! Handles all user-related business operations

use crate::database::models::{CreateUser, CreateUserRecord, UpdateUser, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use crate::utils::password::{hash_password, verify_password};
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

pub struct UserService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserService<'a> {
    /// Creates a new UserService instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Registers a new user with full validation.
    ///
    /// # Arguments
    /// * `create_user` - User creation data transfer object
    ///
    /// # Returns
    /// The newly created User with all fields populated. The plaintext
    /// password is hashed before it reaches the repository.
    ///
    /// # Errors
    /// Returns `ServiceError` for:
    /// - Validation failures
    /// - An email already owned by another user
    pub async fn create_user(&self, create_user: CreateUser) -> ServiceResult<User> {
        // Input validation using validator crate
        if let Err(validation_errors) = create_user.validate() {
            return Err(ServiceError::from_validation_errors(validation_errors));
        }

        let email = create_user.email.trim().to_string();
        let repo = UserRepository::new(self.pool);

        // Check if user already exists
        if repo.email_exists(&email).await? {
            return Err(ServiceError::already_exists("User with email", &email));
        }

        let password_hash = hash_password(&create_user.password)?;

        let record = CreateUserRecord {
            id: Uuid::now_v7().to_string(),
            name: create_user.name,
            email: email.clone(),
            password_hash,
        };

        // The unique index backstops the existence check against races.
        let user = repo.create_user(record).await.map_err(|e| {
            let error_msg = e.to_string();
            if error_msg.contains("UNIQUE constraint failed: users.email") {
                ServiceError::already_exists("User with email", &email)
            } else {
                ServiceError::Database { source: e }
            }
        })?;

        tracing::info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Retrieves a user by ID with existence verification.
    ///
    /// # Arguments
    /// * `id` - User ID (UUID format)
    ///
    /// # Returns
    /// The requested User if found
    ///
    /// # Errors
    /// Returns `ServiceError::NotFound` if user doesn't exist
    pub async fn get_user_required(&self, id: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;
        Ok(user)
    }

    /// Applies a partial profile update.
    ///
    /// Name, email, and password are each independently optional. A changed
    /// email must not belong to a different user; a changed password is
    /// re-hashed before storage.
    ///
    /// # Errors
    /// Returns `ServiceError` for validation failures, an unknown id, or an
    /// email owned by another user
    pub async fn update_user(&self, id: &str, update: UpdateUser) -> ServiceResult<User> {
        if let Err(validation_errors) = update.validate() {
            return Err(ServiceError::from_validation_errors(validation_errors));
        }

        let repo = UserRepository::new(self.pool);
        let current = repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;

        let email = match update.email {
            Some(email) => {
                let email = email.trim().to_string();
                if email != current.email && repo.email_exists_excluding(&email, id).await? {
                    return Err(ServiceError::already_exists("User with email", &email));
                }
                email
            }
            None => current.email.clone(),
        };

        let name = update.name.unwrap_or_else(|| current.name.clone());

        let password_hash = match update.password {
            Some(password) => hash_password(&password)?,
            None => current.password_hash.clone(),
        };

        let user = repo
            .update_user(id, &name, &email, &password_hash)
            .await
            .map_err(|e| {
                let error_msg = e.to_string();
                if error_msg.contains("UNIQUE constraint failed: users.email") {
                    ServiceError::already_exists("User with email", &email)
                } else {
                    ServiceError::Database { source: e }
                }
            })?
            .ok_or_else(|| ServiceError::not_found("User", id))?;

        Ok(user)
    }

    /// Permanently deletes a user.
    ///
    /// Issued session tokens disappear with the row via the token table's
    /// own cascade; pending reset codes simply age out of the ephemeral
    /// store.
    ///
    /// # Errors
    /// Returns `ServiceError::NotFound` if user doesn't exist
    pub async fn delete_user(&self, id: &str) -> ServiceResult<()> {
        let repo = UserRepository::new(self.pool);
        let rows_affected = repo.delete_user(id).await?;

        if rows_affected == 0 {
            return Err(ServiceError::not_found("User", id));
        }

        tracing::info!("Deleted user {}", id);
        Ok(())
    }

    /// Checks an email/password pair and returns the matching user.
    ///
    /// Unknown email and wrong password are indistinguishable from the
    /// caller's side; both produce `InvalidCredentials`.
    pub async fn authenticate_user(&self, email: &str, password: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_email(email.trim())
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(ServiceError::InvalidCredentials);
        }

        Ok(user)
    }
}
