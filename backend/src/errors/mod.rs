//! Global application error types and handlers.
//!
//! This module defines custom error types that are used across the entire
//! backend application and provides mechanisms for consistent error handling
//! and response formatting.

use thiserror::Error;

/// Generic service error that can be used across all entities
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("{entity} already exists: {identifier}")]
    AlreadyExists { entity: String, identifier: String },

    /// Covers both unknown-email and wrong-password login failures.
    /// The message must stay identical for both paths.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{entity} has expired")]
    Expired { entity: String },

    #[error("{entity} does not match")]
    Mismatch { entity: String },

    #[error("Identity error: {message}")]
    Identity { message: String },

    #[error("Database error: {source}")]
    Database {
        #[from]
        source: anyhow::Error,
    },
    #[error("External service error: {message}")]
    ExternalService { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    // Helper constructors for common patterns

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn already_exists(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn expired(entity: impl Into<String>) -> Self {
        Self::Expired {
            entity: entity.into(),
        }
    }

    pub fn mismatch(entity: impl Into<String>) -> Self {
        Self::Mismatch {
            entity: entity.into(),
        }
    }

    pub fn identity(message: impl Into<String>) -> Self {
        Self::Identity {
            message: message.into(),
        }
    }

    pub fn external_service(message: impl Into<String>) -> Self {
        Self::ExternalService {
            message: message.into(),
        }
    }

    /// Flattens validator errors into a single Validation error message.
    pub fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let error_messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    format!(
                        "{}: {}",
                        field,
                        error.message.as_ref().unwrap_or(&"Invalid value".into())
                    )
                })
            })
            .collect();

        Self::validation(error_messages.join(", "))
    }
}
