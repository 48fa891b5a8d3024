// Assignments, submissions and grading

pub mod handlers;
pub mod models;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Staff routes
        .route("/", post(handlers::create_assignment))
        .route("/teacher", get(handlers::teacher_assignments))
        .route("/:id/submissions", get(handlers::list_submissions))
        .route(
            "/submissions/:submission_id/grade",
            put(handlers::grade_submission),
        )
        // Student routes
        .route("/mine", get(handlers::student_assignments))
        .route("/:id/submit", post(handlers::submit_assignment))
}
