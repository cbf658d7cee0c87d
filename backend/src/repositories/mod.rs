//! Data access layer.
//!
//! Repositories own all persistence operations: SQL for the durable tables
//! and the keyed ephemeral store used for short-lived passcodes.

pub mod ephemeral_store;
pub mod token_repository;
pub mod user_repository;
