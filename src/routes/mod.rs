//! Router assembly.

mod common;
mod entity;

pub use common::common_routes;
pub use entity::entity_routes;

use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;

/// Common routes at the root, resource routes under `prefix`.
///
/// Request bodies above `max_body_bytes` are answered with 413 before any handler runs.
/// Each layer is applied on its own so the router re-boxes the response body in between.
pub fn app(state: AppState, prefix: &str, max_body_bytes: usize) -> Router {
    let api = entity_routes(state);
    let router = if prefix.is_empty() || prefix == "/" {
        common_routes().merge(api)
    } else {
        common_routes().nest(prefix, api)
    };
    router
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(DefaultBodyLimit::disable())
        .layer(CorsLayer::permissive())
}
