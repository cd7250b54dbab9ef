use axum::Router;

use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub mod auth;
pub mod cart;
pub mod doc;
pub mod health;
pub mod products;

// Build the page router without binding state; it will be provided at the top level.
pub fn create_storefront_router() -> Router<AppState> {
    Router::new()
        .merge(products::router())
        .merge(cart::router())
        .merge(auth::router())
}

/// Parse a numeric id from a path segment; anything that is not an `i32` is an unknown resource.
pub fn parse_id(segment: &str, resource: &str) -> AppResult<i32> {
    segment
        .parse::<i32>()
        .map_err(|_| AppError::NotFound(format!("{resource} {segment}")))
}
