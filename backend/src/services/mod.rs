//! Module for core business logic services.
//!
//! This module encapsulates services that perform specific business operations
//! and orchestrate interactions between different parts of the application,
//! such as managing user records or the password-recovery passcode lifecycle.

pub mod email_service;
pub mod otp_service;
pub mod token_service;
pub mod user_service;
