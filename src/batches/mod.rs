// Batch (class cohort) management

pub mod handlers;
pub mod models;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_batches))
        .route("/", post(handlers::create_batch))
        .route("/:id", put(handlers::update_batch))
        .route("/:id", delete(handlers::delete_batch))
}
