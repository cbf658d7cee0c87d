//! Defines the HTTP routes for user registration and profile management.
//!
//! Registration is open; reading, updating, and deleting a profile require
//! a bearer token.

use super::handlers::{create_user, delete_user, get_user, update_user};
use crate::auth::middleware::token_auth;
use axum::{
    Router, middleware,
    routing::{get, post},
};

pub async fn user_router() -> Router {
    Router::new()
        .route("/", post(create_user))
        .route(
            "/{id}",
            get(get_user)
                .put(update_user)
                .delete(delete_user)
                .layer(middleware::from_fn(token_auth)),
        )
}
