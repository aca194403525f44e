//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - JSON routes under `/api/v1`
//! - HTML pages rendered through the template evaluator
//! - Authentication middleware and role guards
//! - The error response shape shared by every route

pub mod error;
pub mod middleware;
pub mod pages;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use axum::Router;
use orgkas_core::template::LayoutSource;
use orgkas_db::LedgerGate;
use orgkas_shared::JwtService;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Serializes every cashbook write, including dues postings.
    pub ledger_gate: LedgerGate,
    /// Layout and page fragments for HTML pages.
    pub layouts: Arc<dyn LayoutSource>,
}

impl AppState {
    /// Creates the state with a fresh ledger gate.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        jwt_service: JwtService,
        layouts: Arc<dyn LayoutSource>,
    ) -> Self {
        Self {
            db: Arc::new(db),
            jwt_service: Arc::new(jwt_service),
            ledger_gate: LedgerGate::new(),
            layouts,
        }
    }

    /// Returns a clone of the connection pool for a repository.
    #[must_use]
    pub fn conn(&self) -> DatabaseConnection {
        (*self.db).clone()
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .merge(pages::routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
