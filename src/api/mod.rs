//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod routes;

pub use routes::create_router;

use axum::{middleware as axum_middleware, Router};

use crate::AppState;

/// API routes behind the identity and logging middleware, ready to nest
pub fn protected_router() -> Router<AppState> {
    // Layers run outermost-last: logging -> identity -> handler
    create_router()
        .layer(axum_middleware::from_fn(middleware::identity_middleware))
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
