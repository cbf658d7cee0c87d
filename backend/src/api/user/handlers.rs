//! Handler functions for user registration and profile management API endpoints.
//!
//! These functions process requests for user data, interact with the
//! `UserService`, and return user-specific information.

use crate::api::common::{ApiResponse, service_error_to_http};
use crate::database::models::{CreateUser, PublicUser, UpdateUser};
use crate::services::user_service::UserService;
use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;

/// Registers a new user.
#[axum::debug_handler]
pub async fn create_user(
    Extension(pool): Extension<SqlitePool>,
    Json(payload): Json<CreateUser>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<PublicUser>>), (StatusCode, String)> {
    let user_service = UserService::new(&pool);

    match user_service.create_user(payload).await {
        Ok(user) => Ok((
            StatusCode::CREATED,
            ResponseJson(ApiResponse::success(
                user.into(),
                "User registered successfully",
            )),
        )),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Retrieves a user by its ID.
#[axum::debug_handler]
pub async fn get_user(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
) -> Result<ResponseJson<ApiResponse<PublicUser>>, (StatusCode, String)> {
    let user_service = UserService::new(&pool);

    match user_service.get_user_required(&id).await {
        Ok(user) => Ok(ResponseJson(ApiResponse::success(
            user.into(),
            "User retrieved successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Applies a partial update to a user.
#[axum::debug_handler]
pub async fn update_user(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUser>,
) -> Result<ResponseJson<ApiResponse<PublicUser>>, (StatusCode, String)> {
    let user_service = UserService::new(&pool);

    match user_service.update_user(&id, payload).await {
        Ok(user) => Ok(ResponseJson(ApiResponse::success(
            user.into(),
            "User updated successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Deletes a user by its ID.
#[axum::debug_handler]
pub async fn delete_user(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
) -> Result<ResponseJson<serde_json::Value>, (StatusCode, String)> {
    let user_service = UserService::new(&pool);

    match user_service.delete_user(&id).await {
        Ok(()) => Ok(ResponseJson(serde_json::json!({
            "message": "User deleted successfully"
        }))),
        Err(error) => Err(service_error_to_http(error)),
    }
}
