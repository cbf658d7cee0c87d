//! Middleware for protecting authenticated routes.
//!
//! This module validates opaque bearer tokens against the session-token
//! table and makes the resolved user available to downstream handlers.

use crate::database::models::User;
use crate::services::token_service::TokenService;
use axum::{
    extract::{Extension, Request},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use sqlx::SqlitePool;

/// Caller identity resolved from the bearer token
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Bearer token authentication middleware
pub async fn token_auth(
    Extension(pool): Extension<SqlitePool>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // Extract Authorization header
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Check if it's a Bearer token
    if !auth_header.starts_with("Bearer ") {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let token = &auth_header[7..]; // Remove "Bearer " prefix

    let token_service = TokenService::new(&pool);
    match token_service.resolve(token).await {
        Ok(Some(user)) => {
            // Add the resolved user to request extensions for use in handlers
            request.extensions_mut().insert(CurrentUser(user));
            Ok(next.run(request).await)
        }
        Ok(None) => Err(StatusCode::UNAUTHORIZED),
        Err(e) => {
            tracing::error!("Token lookup failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
