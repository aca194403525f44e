//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};

pub mod archery;
pub mod assessments;
pub mod auth;
pub mod cashbook;
pub mod dashboard;
pub mod dues;
pub mod health;
pub mod members;
pub mod organization;
pub mod tariffs;
pub mod users;

/// Creates the API router; everything but login and logout requires a token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(cashbook::routes())
        .merge(dues::routes())
        .merge(members::routes())
        .merge(tariffs::routes())
        .merge(assessments::routes())
        .merge(archery::routes())
        .merge(organization::routes())
        .merge(dashboard::routes())
        .merge(users::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new().merge(auth::routes()).merge(protected_routes)
}
