// Admission workflow: public applications reviewed by staff

pub mod handlers;
pub mod models;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register_admission))
        .route("/", get(handlers::list_pending_admissions))
        .route("/:id/approve", put(handlers::approve_admission))
        .route("/:id/reject", put(handlers::reject_admission))
}
