//! # user-api
//!
//! HTTP layer for the user service. Today this is the health surface consumed by
//! load balancers and orchestrators.

pub mod routes;

use axum::Router;
use std::sync::Arc;
use user_db::HealthProbe;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub probe: HealthProbe,
}

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
