//! Main entry point for the Gatehouse backend.
//!
//! This file initializes the Axum web server, sets up database connections,
//! and registers all API routes and middleware.
//! It orchestrates the application's startup and defines its overall structure.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod repositories;
mod services;
mod utils;

use crate::api::common::ApiResponse;
use crate::repositories::ephemeral_store::InMemoryEphemeralStore;
use crate::services::otp_service::OtpService;
use axum::{Extension, Router, response::Json, routing::get};
use config::Config;
use database::Database;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::init;

#[tokio::main]
async fn main() {
    init();

    let config = Config::from_env().unwrap();
    let db = Database::new(&config).await.unwrap();
    let pool = db.pool().clone();

    // One shared passcode store for the whole process.
    let otp_service = OtpService::new(Arc::new(InMemoryEphemeralStore::new()));

    let app = Router::new()
        .route("/", get(root_handler))
        .nest("/api/user", api::user::routes::user_router().await)
        .nest("/auth", auth::routes::auth_router())
        .layer(Extension(pool))
        .layer(Extension(config.clone()))
        .layer(Extension(otp_service));

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await.unwrap();

    info!("Starting Gatehouse server on port {}", config.server_port);
    axum::serve(listener, app).await.unwrap();
}

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "Gatehouse Backend",
            "version": "0.1.0"
        }),
        "Welcome to Gatehouse API",
    ))
}
