//! Core business logic for Orgkas.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Running-balance cashbook engine
//! - `template` - Conditional page template evaluator
//! - `auth` - Roles and password hashing
//! - `dues` - Dues status rules and their cashbook postings
//! - `assessment` - Assessment score validation and per-member averages
//! - `archery` - Archery game layout and scoring
//! - `dashboard` - Dashboard statistics and monthly chart series

pub mod archery;
pub mod assessment;
pub mod auth;
pub mod dashboard;
pub mod dues;
pub mod ledger;
pub mod template;
