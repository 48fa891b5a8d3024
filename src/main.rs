pub mod admissions;
pub mod assignments;
pub mod attendance;
pub mod auth;
pub mod batches;
pub mod client;
pub mod db;
pub mod error;
pub mod grades;
pub mod stats;
pub mod subjects;
pub mod timetables;
pub mod validation;

use axum::{routing::get, Router};
use sqlx::PgPool;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::repository::{RefreshTokenRepository, UserRepository};
use auth::token::TokenService;
use auth::AuthService;

/// OpenAPI documentation for the auth and subject surfaces
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::register_handler,
        auth::handlers::login_handler,
        auth::handlers::refresh_handler,
        auth::handlers::logout_handler,
        subjects::handlers::list_subjects,
        subjects::handlers::create_subject,
        subjects::handlers::update_subject,
        subjects::handlers::delete_subject,
    ),
    components(
        schemas(
            auth::models::Role,
            auth::models::UserResponse,
            auth::models::RegisterRequest,
            auth::models::LoginRequest,
            auth::models::RefreshRequest,
            auth::models::LoginResponse,
            auth::models::RefreshResponse,
            subjects::models::Subject,
            subjects::models::CreateSubject,
            subjects::models::UpdateSubject,
        )
    ),
    tags(
        (name = "auth", description = "Authentication and session lifecycle"),
        (name = "subjects", description = "Subject management endpoints")
    ),
    info(
        title = "Coaching Center API",
        version = "1.0.0",
        description = "REST API for managing students, batches, admissions, attendance, assignments and timetables"
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth: AuthService,
}

/// Assemble the state with the default access-token lifetime
pub fn build_state(pool: PgPool, jwt_secret: String) -> AppState {
    build_state_with_tokens(pool, TokenService::new(jwt_secret))
}

/// Assemble the state from an explicitly configured token service
pub fn build_state_with_tokens(pool: PgPool, tokens: TokenService) -> AppState {
    let users = UserRepository::new(pool.clone());
    let refresh_tokens = RefreshTokenRepository::new(pool.clone());
    AppState {
        db: pool,
        auth: AuthService::new(users, refresh_tokens, tokens),
    }
}

async fn root() -> &'static str {
    "API is running..."
}

/// Creates and configures the application router.
/// Every domain module contributes its own sub-router.
pub fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(root))
        .nest("/api/auth", auth::routes())
        .nest("/api/subjects", subjects::routes())
        .nest("/api/batches", batches::routes())
        .nest("/api/admissions", admissions::routes())
        .nest("/api/stats", stats::routes())
        .nest("/api/attendance", attendance::routes())
        .nest("/api/assignments", assignments::routes())
        .nest("/api/timetables", timetables::routes())
        .nest("/api/grades", grades::routes())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Coaching Center API - Starting...");

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let jwt_secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "5000".to_string());

    let tokens = match std::env::var("ACCESS_TOKEN_TTL_SECS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
    {
        Some(ttl) => TokenService::with_access_ttl(jwt_secret, ttl),
        None => TokenService::new(jwt_secret),
    };

    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    let app = create_router(build_state_with_tokens(db_pool, tokens));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Coaching Center API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}

#[cfg(test)]
mod tests;
