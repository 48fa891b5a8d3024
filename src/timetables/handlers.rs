// Timetable handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::auth::{CurrentUser, StaffOnly, StudentOnly};
use crate::error::ApiError;
use crate::timetables::models::{
    CreateTimetableEntry, TimetableEntry, TimetableEntryWithNames, TimetableQuery,
};
use crate::AppState;

/// POST /api/timetables - create an entry, teacher = current user (staff)
pub async fn create_entry(
    State(state): State<AppState>,
    StaffOnly(user): StaffOnly,
    Json(payload): Json<CreateTimetableEntry>,
) -> Result<(StatusCode, Json<TimetableEntry>), ApiError> {
    payload.validate()?;

    let entry = sqlx::query_as::<_, TimetableEntry>(
        "INSERT INTO timetable_entries (batch_id, subject_id, day_of_week, start_time, end_time, teacher_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id, batch_id, subject_id, day_of_week, start_time, end_time, teacher_id, created_at",
    )
    .bind(payload.batch)
    .bind(payload.subject)
    .bind(payload.day_of_week)
    .bind(&payload.start_time)
    .bind(&payload.end_time)
    .bind(user.id)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("User {} created timetable entry {}", user.id, entry.id);
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/timetables/batch/:batchId - entries for a batch (any authenticated)
pub async fn batch_timetable(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(batch_id): Path<i32>,
) -> Result<Json<Vec<TimetableEntryWithNames>>, ApiError> {
    let entries = sqlx::query_as::<_, TimetableEntryWithNames>(
        "SELECT t.id, t.batch_id, t.subject_id, s.name AS subject_name,
                t.day_of_week, t.start_time, t.end_time, u.name AS teacher_name
         FROM timetable_entries t
         JOIN subjects s ON s.id = t.subject_id
         LEFT JOIN users u ON u.id = t.teacher_id
         WHERE t.batch_id = $1
         ORDER BY t.day_of_week, t.start_time",
    )
    .bind(batch_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}

/// GET /api/timetables/mine - a student's entries, optional batch filter
pub async fn my_timetable(
    State(state): State<AppState>,
    StudentOnly(_user): StudentOnly,
    Query(query): Query<TimetableQuery>,
) -> Result<Json<Vec<TimetableEntryWithNames>>, ApiError> {
    let entries = sqlx::query_as::<_, TimetableEntryWithNames>(
        "SELECT t.id, t.batch_id, t.subject_id, s.name AS subject_name,
                t.day_of_week, t.start_time, t.end_time, u.name AS teacher_name
         FROM timetable_entries t
         JOIN subjects s ON s.id = t.subject_id
         LEFT JOIN users u ON u.id = t.teacher_id
         WHERE $1::int IS NULL OR t.batch_id = $1
         ORDER BY t.day_of_week, t.start_time",
    )
    .bind(query.batch_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}

/// DELETE /api/timetables/:id - remove an entry (staff)
pub async fn delete_entry(
    State(state): State<AppState>,
    StaffOnly(_user): StaffOnly,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let result = sqlx::query("DELETE FROM timetable_entries WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound {
            resource: "Timetable entry".to_string(),
            id: id.to_string(),
        });
    }

    Ok(Json(json!({ "message": "Timetable entry removed" })))
}
