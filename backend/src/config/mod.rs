//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the database URL, server port, and optional SMTP credentials.

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub server_port: u16,
    email: Option<EmailConfig>,
}

/// SMTP settings for outbound mail. All fields are required together; a
/// partially configured mailer is treated as unconfigured.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid number")?;

        let acquire_timeout_seconds = env::var("DB_ACQUIRE_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u64>()
            .context("DB_ACQUIRE_TIMEOUT_SECONDS must be a valid number")?;

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("SERVER_PORT must be a valid number")?;

        Ok(Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            server_port,
            email: Self::email_from_env()?,
        })
    }

    /// Returns SMTP settings when the mailer is fully configured.
    pub fn email_config(&self) -> Option<EmailConfig> {
        self.email.clone()
    }

    fn email_from_env() -> Result<Option<EmailConfig>> {
        let smtp_host = match env::var("SMTP_HOST") {
            Ok(host) => host,
            Err(_) => return Ok(None),
        };

        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .context("SMTP_PORT must be a valid number")?;

        let smtp_username = env::var("SMTP_USERNAME").context("SMTP_USERNAME not set")?;
        let smtp_password = env::var("SMTP_PASSWORD").context("SMTP_PASSWORD not set")?;
        let from_email = env::var("SMTP_FROM_EMAIL").context("SMTP_FROM_EMAIL not set")?;
        let from_name = env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Gatehouse".to_string());

        Ok(Some(EmailConfig {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            from_email,
            from_name,
        }))
    }
}

#[cfg(test)]
impl Config {
    /// Minimal configuration for unit tests: in-memory database, no mailer.
    pub fn for_tests() -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout_seconds: 3,
            server_port: 0,
            email: None,
        }
    }
}
