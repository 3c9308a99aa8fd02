//! Resource CRUD routes. Parameterized paths; handlers resolve the schema by name.

use crate::handlers::entity::{create, delete as delete_handler, list, read, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .route("/:resource", get(list).post(create))
        .route(
            "/:resource/:id",
            get(read).put(update).patch(update).delete(delete_handler),
        )
        .with_state(state)
}
