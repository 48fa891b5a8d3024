// Attendance handlers: students mark themselves, staff review and override

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::attendance::models::{
    Attendance, AttendanceStatus, AttendanceWithBatch, AttendanceWithStudent, BatchQuery,
    MarkAttendance, MineQuery, MyAttendanceResponse, OverrideAttendance,
};
use crate::attendance::percentage::compute_stats;
use crate::auth::{StaffOnly, StudentOnly};
use crate::error::ApiError;
use crate::AppState;

/// POST /api/attendance/mark - student marks self Present for today
pub async fn mark_attendance(
    State(state): State<AppState>,
    StudentOnly(user): StudentOnly,
    Json(payload): Json<MarkAttendance>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let today = Utc::now().date_naive();

    let attendance = sqlx::query_as::<_, Attendance>(
        "INSERT INTO attendance (student_id, batch_id, date, status) VALUES ($1, $2, $3, 'Present')
         RETURNING id, student_id, batch_id, date, status, is_confirmed, created_at",
    )
    .bind(user.id)
    .bind(payload.batch_id)
    .bind(today)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        // The (student, batch, date) triple is unique; concurrent marks for
        // the same day both land here instead of racing a pre-check
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return ApiError::BadRequest(
                    "Attendance already marked for today in this batch".to_string(),
                );
            }
        }
        ApiError::DatabaseError(e)
    })?;

    tracing::info!("Student {} marked attendance for batch {}", user.id, payload.batch_id);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Attendance marked successfully",
            "attendance": attendance,
        })),
    ))
}

/// GET /api/attendance/mine - student's own history and percentage
pub async fn my_attendance(
    State(state): State<AppState>,
    StudentOnly(user): StudentOnly,
    Query(query): Query<MineQuery>,
) -> Result<Json<MyAttendanceResponse>, ApiError> {
    let records = sqlx::query_as::<_, AttendanceWithBatch>(
        "SELECT a.id, a.batch_id, b.name AS batch_name, a.date, a.status, a.is_confirmed
         FROM attendance a
         JOIN batches b ON b.id = a.batch_id
         WHERE a.student_id = $1 AND ($2::int IS NULL OR a.batch_id = $2)
         ORDER BY a.date DESC",
    )
    .bind(user.id)
    .bind(query.batch_id)
    .fetch_all(&state.db)
    .await?;

    let statuses: Vec<AttendanceStatus> = records.iter().map(|r| r.status).collect();
    let stats = compute_stats(&statuses);

    Ok(Json(MyAttendanceResponse { records, stats }))
}

/// GET /api/attendance/batch/:batchId - records for a batch and date (staff)
pub async fn batch_attendance(
    State(state): State<AppState>,
    StaffOnly(_user): StaffOnly,
    Path(batch_id): Path<i32>,
    Query(query): Query<BatchQuery>,
) -> Result<Json<Vec<AttendanceWithStudent>>, ApiError> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let records = sqlx::query_as::<_, AttendanceWithStudent>(
        "SELECT a.id, a.student_id, u.name AS student_name, u.email AS student_email,
                a.date, a.status, a.is_confirmed
         FROM attendance a
         JOIN users u ON u.id = a.student_id
         WHERE a.batch_id = $1 AND a.date = $2
         ORDER BY u.name",
    )
    .bind(batch_id)
    .bind(date)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(records))
}

/// PUT /api/attendance/confirm/:id - staff confirms a record
pub async fn confirm_attendance(
    State(state): State<AppState>,
    StaffOnly(_user): StaffOnly,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let attendance = sqlx::query_as::<_, Attendance>(
        "UPDATE attendance SET is_confirmed = TRUE WHERE id = $1
         RETURNING id, student_id, batch_id, date, status, is_confirmed, created_at",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "Attendance record".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(json!({
        "message": "Attendance confirmed",
        "attendance": attendance,
    })))
}

/// POST /api/attendance/override - staff upserts a record as confirmed
pub async fn override_attendance(
    State(state): State<AppState>,
    StaffOnly(_user): StaffOnly,
    Json(payload): Json<OverrideAttendance>,
) -> Result<Json<Value>, ApiError> {
    let record = sqlx::query_as::<_, Attendance>(
        "INSERT INTO attendance (student_id, batch_id, date, status, is_confirmed)
         VALUES ($1, $2, $3, $4, TRUE)
         ON CONFLICT (student_id, batch_id, date)
         DO UPDATE SET status = EXCLUDED.status, is_confirmed = TRUE
         RETURNING id, student_id, batch_id, date, status, is_confirmed, created_at",
    )
    .bind(payload.student_id)
    .bind(payload.batch_id)
    .bind(payload.date)
    .bind(payload.status)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(
        "Attendance override for student {} in batch {} on {}",
        payload.student_id,
        payload.batch_id,
        payload.date
    );
    Ok(Json(json!({
        "message": "Attendance updated successfully",
        "record": record,
    })))
}
