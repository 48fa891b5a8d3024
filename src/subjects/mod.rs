// Subject management

pub mod handlers;
pub mod models;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::AppState;

pub use models::Subject;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_subjects))
        .route("/", post(handlers::create_subject))
        .route("/:id", put(handlers::update_subject))
        .route("/:id", delete(handlers::delete_subject))
}
