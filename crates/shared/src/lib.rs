//! Shared errors, configuration and token handling for Orgkas.
//!
//! This crate provides common pieces used across all other crates:
//! - Application-wide error types and the tagged operation outcome
//! - Configuration management
//! - JWT claims and the token service

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::{AppError, AppResult, Outcome};
pub use jwt::{JwtError, JwtService};
