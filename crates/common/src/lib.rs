//! Shared utilities, configuration, and error handling for AgriSense
//!
//! This crate provides common functionality used across the AgriSense application:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - Password hashing and constant-time comparison
//! - Custom axum extractors

pub mod config;
pub mod crypto;
pub mod error;
pub mod extractors;

pub use config::{Config, Environment};
pub use crypto::{constant_time_eq, hash_password, verify_password};
pub use error::{Error, Result};
pub use extractors::ValidatedJson;
