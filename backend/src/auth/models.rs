//! Data structures for authentication-related entities.
//!
//! This module defines the request and response payloads for login and the
//! password-recovery flow, used for data transfer within the
//! authentication handlers and service.

use crate::database::models::PublicUser;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request payload
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response containing the bearer token and user info
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: PublicUser,
    pub token: String,
}

/// First recovery step: ask for a reset code by email
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,
}

/// Second recovery step: present the emailed code
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[validate(length(min = 1, message = "User ID is required"))]
    pub user_id: String,

    #[validate(range(min = 100_000, max = 999_999, message = "Code must be a 6-digit number"))]
    pub otp: u32,
}

/// Third recovery step: set the new password
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "User ID is required"))]
    pub user_id: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}
