//! Handler functions for authentication-related API endpoints.
//!
//! These functions process incoming HTTP requests for login and password
//! recovery, parse request data, and interact with the `auth::service` for
//! core business logic.

use crate::api::common::{ApiResponse, service_error_to_http};
use crate::auth::middleware::CurrentUser;
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::config::Config;
use crate::database::models::PublicUser;
use crate::services::otp_service::OtpService;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(pool): Extension<SqlitePool>,
    Extension(otp_service): Extension<OtpService>,
    Extension(config): Extension<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<LoginResponse>>, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, otp_service, &config);

    match auth_service.login(payload).await {
        Ok(response) => Ok(ResponseJson(ApiResponse::success(
            response,
            "Login successful",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle a password reset code request
#[axum::debug_handler]
pub async fn forgot_password(
    Extension(pool): Extension<SqlitePool>,
    Extension(otp_service): Extension<OtpService>,
    Extension(config): Extension<Config>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<ResponseJson<serde_json::Value>, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, otp_service, &config);

    // The code itself only travels by email, never in the response.
    match auth_service.forgot_password(payload).await {
        Ok(()) => Ok(ResponseJson(serde_json::json!({
            "message": "Password reset code sent. Please check your email."
        }))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle reset code verification
#[axum::debug_handler]
pub async fn verify_otp(
    Extension(pool): Extension<SqlitePool>,
    Extension(otp_service): Extension<OtpService>,
    Extension(config): Extension<Config>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<ResponseJson<serde_json::Value>, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, otp_service, &config);

    match auth_service.verify_otp(payload).await {
        Ok(()) => Ok(ResponseJson(serde_json::json!({
            "message": "Code verified successfully."
        }))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle the final password reset step
#[axum::debug_handler]
pub async fn reset_password(
    Extension(pool): Extension<SqlitePool>,
    Extension(otp_service): Extension<OtpService>,
    Extension(config): Extension<Config>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<ResponseJson<serde_json::Value>, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, otp_service, &config);

    match auth_service.reset_password(payload).await {
        Ok(()) => Ok(ResponseJson(serde_json::json!({
            "message": "Password reset successfully."
        }))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Get current user information from the bearer token
#[axum::debug_handler]
pub async fn me(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<ResponseJson<ApiResponse<PublicUser>>, (StatusCode, String)> {
    Ok(ResponseJson(ApiResponse::success(
        user.into(),
        "User retrieved successfully",
    )))
}
