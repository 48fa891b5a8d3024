// Admission workflow handlers
// Applicants register publicly; staff review and approve or reject.
// Approval creates the actual user record with role Student.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sqlx::FromRow;
use validator::Validate;

use crate::admissions::models::{
    AdmissionResponse, AdmissionStatus, BatchSummary, PendingAdmission, RegisterAdmission,
};
use crate::auth::models::Role;
use crate::auth::password::PasswordService;
use crate::auth::{StaffOnly, UserResponse};
use crate::error::ApiError;
use crate::AppState;

#[derive(FromRow)]
struct AdmissionWithBatch {
    id: i32,
    name: String,
    email: String,
    status: AdmissionStatus,
    created_at: DateTime<Utc>,
    batch_id: i32,
    batch_name: String,
}

/// POST /api/admissions/register - public admission application.
/// The password is hashed immediately; no plaintext is ever stored.
pub async fn register_admission(
    State(state): State<AppState>,
    Json(payload): Json<RegisterAdmission>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    payload.validate()?;

    let user_exists = state.auth.users().email_exists(&payload.email).await?;
    let pending_exists: Option<bool> = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM pending_admissions WHERE LOWER(email) = LOWER($1))",
    )
    .bind(&payload.email)
    .fetch_one(&state.db)
    .await?;

    if user_exists || pending_exists.unwrap_or(false) {
        return Err(ApiError::BadRequest(
            "Email already registered or admission is pending".to_string(),
        ));
    }

    let password_hash = PasswordService::hash_password(&payload.password)?;

    let admission = sqlx::query_as::<_, PendingAdmission>(
        "INSERT INTO pending_admissions (name, email, password_hash, applied_for_batch)
         VALUES ($1, $2, $3, $4)
         RETURNING id, name, email, password_hash, applied_for_batch, status, created_at",
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&password_hash)
    .bind(payload.applied_for_batch)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Admission request {} submitted for {}", admission.id, admission.email);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Admission request submitted successfully",
            "id": admission.id,
        })),
    ))
}

/// GET /api/admissions - pending admissions with batch populated (staff)
pub async fn list_pending_admissions(
    State(state): State<AppState>,
    StaffOnly(_user): StaffOnly,
) -> Result<Json<Vec<AdmissionResponse>>, ApiError> {
    let rows = sqlx::query_as::<_, AdmissionWithBatch>(
        "SELECT a.id, a.name, a.email, a.status, a.created_at,
                b.id AS batch_id, b.name AS batch_name
         FROM pending_admissions a
         JOIN batches b ON b.id = a.applied_for_batch
         WHERE a.status = 'Pending'
         ORDER BY a.created_at",
    )
    .fetch_all(&state.db)
    .await?;

    let admissions = rows
        .into_iter()
        .map(|r| AdmissionResponse {
            id: r.id,
            name: r.name,
            email: r.email,
            status: r.status,
            applied_for_batch: BatchSummary {
                id: r.batch_id,
                name: r.batch_name,
            },
            created_at: r.created_at,
        })
        .collect();

    Ok(Json(admissions))
}

async fn load_pending(state: &AppState, id: i32) -> Result<PendingAdmission, ApiError> {
    let admission = sqlx::query_as::<_, PendingAdmission>(
        "SELECT id, name, email, password_hash, applied_for_batch, status, created_at
         FROM pending_admissions WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?;

    // A decided admission is treated the same as a missing one
    match admission {
        Some(a) if a.status.is_pending() => Ok(a),
        _ => Err(ApiError::NotFound {
            resource: "Valid pending admission".to_string(),
            id: id.to_string(),
        }),
    }
}

/// PUT /api/admissions/:id/approve - create the Student user (staff)
pub async fn approve_admission(
    State(state): State<AppState>,
    StaffOnly(_user): StaffOnly,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let admission = load_pending(&state, id).await?;

    let user = state
        .auth
        .users()
        .create_user(
            &admission.name,
            &admission.email,
            &admission.password_hash,
            Role::Student,
        )
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    sqlx::query("UPDATE pending_admissions SET status = 'Approved' WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    tracing::info!("Admission {} approved, created user {}", id, user.id);
    Ok(Json(json!({
        "message": "Admission approved and User created",
        "user": UserResponse::from(user),
    })))
}

/// PUT /api/admissions/:id/reject - mark rejected (staff)
pub async fn reject_admission(
    State(state): State<AppState>,
    StaffOnly(_user): StaffOnly,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    load_pending(&state, id).await?;

    sqlx::query("UPDATE pending_admissions SET status = 'Rejected' WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    tracing::info!("Admission {} rejected", id);
    Ok(Json(json!({ "message": "Admission rejected" })))
}
