// Authentication module
// Credential store, token issuance, refresh-token lifecycle, and the
// role-based access guard used by every protected route

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

use axum::{routing::post, Router};

use crate::AppState;

pub use error::AuthError;
pub use middleware::{CurrentUser, StaffOnly, StudentOnly};
pub use models::{
    LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterRequest, Role, User,
    UserResponse,
};
pub use service::AuthService;

/// Routes mounted under /api/auth
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register_handler))
        .route("/login", post(handlers::login_handler))
        .route("/refresh", post(handlers::refresh_handler))
        .route("/logout", post(handlers::logout_handler))
}
