//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle endpoints like user login and the password-recovery
//! steps. These are designed to be integrated into the main Axum router.

use crate::auth::handlers::*;
use crate::auth::middleware::*;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/verify-otp", post(verify_otp))
        .route("/reset-password", post(reset_password))
        .route("/me", get(me).layer(middleware::from_fn(token_auth)))
}
