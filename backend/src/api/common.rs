//! Error handling utilities for API responses.
//!
//! Provides structured error responses and conversion between service-layer
//! errors and HTTP responses.
//!
//! # Response Format
//! All errors return consistent JSON responses containing:
//! - `error`: Human-readable message
//! - `error_type`: Machine-readable error category
//! - `details`: Optional field-specific validation errors
//!
//! # Error Handling Flow
//! 1. Service layer returns domain-specific `ServiceError`
//! 2. `service_error_to_http` converts to appropriate HTTP response

use crate::errors::ServiceError;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Standard API response wrapper for all endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Indicates if the request was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable message
    pub message: String,
    /// Error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    /// Request timestamp
    pub timestamp: String,
}

/// Error details for failed requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Machine-readable error type identifier
    pub error_type: String,
    /// Field-specific validation errors when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Field-specific validation error details
#[derive(Debug, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the field with validation error
    pub field: String,
    /// Description of the validation failure
    pub message: String,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create a successful response with default message
    pub fn ok(data: T) -> Self {
        Self::success(data, "Request successful")
    }

    /// Create an error response
    pub fn error(
        message: impl Into<String>,
        error_type: impl Into<String>,
        details: Option<Vec<FieldError>>,
    ) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: message.into(),
            error: Some(ErrorDetails {
                error_type: error_type.into(),
                details,
            }),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Converts ServiceError to appropriate HTTP response with standard format
pub fn service_error_to_http(error: ServiceError) -> (StatusCode, String) {
    let (status, error_type, message) = match error {
        ServiceError::Validation { message } => {
            (StatusCode::BAD_REQUEST, "validation_error", message)
        }
        ServiceError::NotFound { entity, identifier } => (
            StatusCode::NOT_FOUND,
            "not_found",
            format!("{} '{}' not found", entity, identifier),
        ),
        ServiceError::AlreadyExists { entity, identifier } => (
            StatusCode::CONFLICT,
            "already_exists",
            format!("{} '{}' already exists", entity, identifier),
        ),
        ServiceError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "Invalid credentials".to_string(),
        ),
        ServiceError::Expired { entity } => (
            StatusCode::BAD_REQUEST,
            "expired",
            format!("{} has expired", entity),
        ),
        ServiceError::Mismatch { entity } => (
            StatusCode::BAD_REQUEST,
            "mismatch",
            format!("{} does not match", entity),
        ),
        ServiceError::Identity { message } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "identity_error", message)
        }
        ServiceError::Database { source } => {
            tracing::error!("Database error: {}", source);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "database_error",
                "Internal server error".to_string(),
            )
        }
        ServiceError::ExternalService { message } => {
            (StatusCode::BAD_GATEWAY, "external_service_error", message)
        }
    };

    let error_response = ApiResponse::<()>::error(message, error_type, None);
    (status, serde_json::to_string(&error_response).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_status_mapping() {
        let cases = vec![
            (
                service_error_to_http(ServiceError::validation("bad input")).0,
                StatusCode::BAD_REQUEST,
            ),
            (
                service_error_to_http(ServiceError::not_found("User", "u-1")).0,
                StatusCode::NOT_FOUND,
            ),
            (
                service_error_to_http(ServiceError::already_exists("User with email", "a@x.com")).0,
                StatusCode::CONFLICT,
            ),
            (
                service_error_to_http(ServiceError::InvalidCredentials).0,
                StatusCode::UNAUTHORIZED,
            ),
            (
                service_error_to_http(ServiceError::expired("OTP")).0,
                StatusCode::BAD_REQUEST,
            ),
            (
                service_error_to_http(ServiceError::mismatch("OTP")).0,
                StatusCode::BAD_REQUEST,
            ),
            (
                service_error_to_http(ServiceError::identity("unknown user")).0,
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];

        for (actual, expected) in cases {
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_error_body_is_structured() {
        let (_, body) = service_error_to_http(ServiceError::not_found("User", "u-1"));
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(parsed["success"], false);
        assert_eq!(parsed["error"]["error_type"], "not_found");
        assert_eq!(parsed["message"], "User 'u-1' not found");
    }

    #[test]
    fn test_invalid_credentials_message_is_stable() {
        // Unknown email and wrong password must produce identical bodies.
        let (_, body) = service_error_to_http(ServiceError::InvalidCredentials);
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["message"], "Invalid credentials");
    }
}
