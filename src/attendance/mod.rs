// Attendance tracking: self-marking, staff review, and percentage stats

pub mod handlers;
pub mod models;
pub mod percentage;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/mark", post(handlers::mark_attendance))
        .route("/mine", get(handlers::my_attendance))
        .route("/batch/:batch_id", get(handlers::batch_attendance))
        .route("/confirm/:id", put(handlers::confirm_attendance))
        .route("/override", post(handlers::override_attendance))
}
