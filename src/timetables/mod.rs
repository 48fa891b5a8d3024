// Weekly timetable management

pub mod handlers;
pub mod models;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_entry))
        .route("/batch/:batch_id", get(handlers::batch_timetable))
        .route("/mine", get(handlers::my_timetable))
        .route("/:id", delete(handlers::delete_entry))
}
