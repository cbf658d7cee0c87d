//! Core business logic for the authentication system.

use crate::auth::models::*;
use crate::config::Config;
use crate::database::models::User;
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use crate::services::email_service::EmailService;
use crate::services::otp_service::OtpService;
use crate::services::token_service::TokenService;
use crate::services::user_service::UserService;
use crate::utils::password::hash_password;
use sqlx::SqlitePool;
use validator::Validate;

/// Authentication service for handling login, token issuance, and the
/// password-recovery flow
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
    user_service: UserService<'a>,
    otp_service: OtpService,
    /// Mailer for reset codes; absent when SMTP is not configured
    email_service: Option<EmailService>,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService instance
    pub fn new(pool: &'a SqlitePool, otp_service: OtpService, config: &Config) -> Self {
        let email_service = match config.email_config() {
            Some(email_config) => match EmailService::new(email_config) {
                Ok(service) => Some(service),
                Err(e) => {
                    tracing::warn!(
                        "Failed to initialize email service: {}. Email notifications will be disabled.",
                        e
                    );
                    None
                }
            },
            None => {
                tracing::warn!(
                    "Email configuration not found. Email notifications will be disabled."
                );
                None
            }
        };

        AuthService {
            pool,
            user_service: UserService::new(pool),
            otp_service,
            email_service,
        }
    }

    /// Authenticate a user and issue a bearer token
    pub async fn login(&self, login_request: LoginRequest) -> ServiceResult<LoginResponse> {
        if let Err(validation_errors) = login_request.validate() {
            return Err(ServiceError::from_validation_errors(validation_errors));
        }

        let user = self
            .user_service
            .authenticate_user(&login_request.email, &login_request.password)
            .await?;

        let token_service = TokenService::new(self.pool);
        let token = token_service.issue(&user.id).await?;

        tracing::info!("User {} logged in", user.id);

        Ok(LoginResponse {
            user: user.into(),
            token,
        })
    }

    /// Start password recovery: generate a reset code and mail it.
    ///
    /// The code goes out through the mailer only; it is never part of the
    /// response. Delivery is fire-and-forget, so a mailer failure does not
    /// fail the request.
    ///
    /// # Errors
    /// Returns `ServiceError::NotFound` when the email is not registered
    pub async fn forgot_password(&self, request: ForgotPasswordRequest) -> ServiceResult<()> {
        if let Err(validation_errors) = request.validate() {
            return Err(ServiceError::from_validation_errors(validation_errors));
        }

        let email = request.email.trim();
        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", email))?;

        let code = self.otp_service.request(&user.id).await?;
        self.try_send_reset_email(&user, code).await;

        Ok(())
    }

    /// Check a reset code for the given user
    pub async fn verify_otp(&self, request: VerifyOtpRequest) -> ServiceResult<()> {
        if let Err(validation_errors) = request.validate() {
            return Err(ServiceError::from_validation_errors(validation_errors));
        }

        self.otp_service
            .verify(&request.user_id, request.otp)
            .await
    }

    /// Final recovery step: store a new password digest.
    ///
    /// Callers must have completed code verification for this user first;
    /// ordering is the contract, no verification state is re-checked here.
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> ServiceResult<()> {
        if let Err(validation_errors) = request.validate() {
            return Err(ServiceError::from_validation_errors(validation_errors));
        }

        let user = self.user_service.get_user_required(&request.user_id).await?;

        let password_hash = hash_password(&request.password)?;
        let repo = UserRepository::new(self.pool);
        let rows_affected = repo.update_password(&user.id, &password_hash).await?;

        if rows_affected == 0 {
            return Err(ServiceError::not_found("User", &request.user_id));
        }

        tracing::info!("Password reset for user {}", user.id);
        Ok(())
    }

    /// Attempts to send the reset code, logging but not failing when the
    /// mailer is unavailable
    async fn try_send_reset_email(&self, user: &User, code: u32) {
        if let Some(ref email_service) = self.email_service {
            match email_service
                .send_password_reset_email(&user.email, &user.name, code)
                .await
            {
                Ok(_) => {
                    tracing::info!("Password reset email sent to {}", user.email);
                }
                Err(e) => {
                    tracing::error!("Failed to send password reset email to {}: {}", user.email, e);
                }
            }
        } else {
            tracing::warn!(
                "Email service not configured. Password reset email not sent to {}",
                user.email
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::CreateUser;
    use crate::database::test_pool;
    use crate::repositories::ephemeral_store::{EphemeralStore, InMemoryEphemeralStore};
    use std::sync::Arc;

    async fn register(pool: &SqlitePool, name: &str, email: &str, password: &str) -> User {
        UserService::new(pool)
            .create_user(CreateUser {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
            .unwrap()
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_returns_token_and_public_user() {
        let pool = test_pool().await;
        let auth = AuthService::new(
            &pool,
            OtpService::new(Arc::new(InMemoryEphemeralStore::new())),
            &Config::for_tests(),
        );

        let user = register(&pool, "A", "a@x.com", "password1").await;

        let response = auth.login(login_request("a@x.com", "password1")).await.unwrap();
        assert_eq!(response.user.id, user.id);
        assert!(!response.token.is_empty());
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let pool = test_pool().await;
        let auth = AuthService::new(
            &pool,
            OtpService::new(Arc::new(InMemoryEphemeralStore::new())),
            &Config::for_tests(),
        );

        register(&pool, "A", "a@x.com", "password1").await;

        let wrong_password = auth.login(login_request("a@x.com", "password2")).await;
        let unknown_email = auth.login(login_request("z@x.com", "password1")).await;

        // Both paths must be indistinguishable.
        assert!(matches!(
            wrong_password,
            Err(ServiceError::InvalidCredentials)
        ));
        assert!(matches!(unknown_email, Err(ServiceError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_forgot_password_for_unknown_email_is_not_found() {
        let pool = test_pool().await;
        let auth = AuthService::new(
            &pool,
            OtpService::new(Arc::new(InMemoryEphemeralStore::new())),
            &Config::for_tests(),
        );

        let result = auth
            .forgot_password(ForgotPasswordRequest {
                email: "z@x.com".to_string(),
            })
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_reset_password_for_unknown_user_is_not_found() {
        let pool = test_pool().await;
        let auth = AuthService::new(
            &pool,
            OtpService::new(Arc::new(InMemoryEphemeralStore::new())),
            &Config::for_tests(),
        );

        let result = auth
            .reset_password(ResetPasswordRequest {
                user_id: "missing".to_string(),
                password: "newpass123".to_string(),
            })
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_full_password_recovery_flow() {
        let pool = test_pool().await;
        let store = Arc::new(InMemoryEphemeralStore::new());
        let otp_service = OtpService::new(store.clone());
        let auth = AuthService::new(&pool, otp_service, &Config::for_tests());

        let user = register(&pool, "A", "a@x.com", "password1").await;

        auth.login(login_request("a@x.com", "password1")).await.unwrap();

        auth.forgot_password(ForgotPasswordRequest {
            email: "a@x.com".to_string(),
        })
        .await
        .unwrap();

        // Pull the code out of the backing store the way the mailer gets it.
        let payload = store
            .get(&OtpService::storage_key(&user.id))
            .await
            .unwrap()
            .expect("a pending reset code");
        let record: serde_json::Value = serde_json::from_str(&payload).unwrap();
        let code = record["code"].as_u64().unwrap() as u32;

        auth.verify_otp(VerifyOtpRequest {
            user_id: user.id.clone(),
            otp: code,
        })
        .await
        .unwrap();

        auth.reset_password(ResetPasswordRequest {
            user_id: user.id.clone(),
            password: "newpass123".to_string(),
        })
        .await
        .unwrap();

        let old_password = auth.login(login_request("a@x.com", "password1")).await;
        assert!(matches!(old_password, Err(ServiceError::InvalidCredentials)));

        auth.login(login_request("a@x.com", "newpass123")).await.unwrap();
    }

    #[tokio::test]
    async fn test_verify_otp_delegates_failures() {
        let pool = test_pool().await;
        let auth = AuthService::new(
            &pool,
            OtpService::new(Arc::new(InMemoryEphemeralStore::new())),
            &Config::for_tests(),
        );

        let user = register(&pool, "A", "a@x.com", "password1").await;

        let result = auth
            .verify_otp(VerifyOtpRequest {
                user_id: user.id,
                otp: 123_456,
            })
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound { .. })));
    }
}
