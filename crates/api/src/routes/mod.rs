//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::user_context_middleware};

pub mod health;
pub mod reports;
pub mod templates;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(reports::routes())
        .merge(templates::routes())
        .layer(middleware::from_fn(user_context_middleware));

    Router::new().merge(health::routes()).merge(protected_routes)
}
