//! API routes module

pub mod health;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// Create all API routes (mounted under `/api`)
pub fn routes(state: &AppState) -> Router {
    Router::new().merge(products::router(state))
}

pub use health::ready_router;
