// Dashboard statistics for staff

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::auth::StaffOnly;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_students: i64,
    pub total_teachers: i64,
    pub total_batches: i64,
    pub total_subjects: i64,
    pub pending_admissions_count: i64,
}

/// GET /api/stats - entity counts (staff). Soft-deleted batches are
/// excluded, matching the batch listing.
pub async fn get_stats(
    State(state): State<AppState>,
    StaffOnly(_user): StaffOnly,
) -> Result<Json<Stats>, ApiError> {
    let total_students: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'Student'")
            .fetch_one(&state.db)
            .await?;
    let total_teachers: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'Teacher'")
            .fetch_one(&state.db)
            .await?;
    let total_batches: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM batches WHERE is_active = TRUE")
            .fetch_one(&state.db)
            .await?;
    let total_subjects: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subjects")
        .fetch_one(&state.db)
        .await?;
    let pending_admissions_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM pending_admissions WHERE status = 'Pending'")
            .fetch_one(&state.db)
            .await?;

    Ok(Json(Stats {
        total_students,
        total_teachers,
        total_batches,
        total_subjects,
        pending_admissions_count,
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(get_stats))
}
