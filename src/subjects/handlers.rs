// Subject CRUD handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::auth::{CurrentUser, StaffOnly};
use crate::error::ApiError;
use crate::subjects::models::{CreateSubject, Subject, UpdateSubject};
use crate::AppState;

/// GET /api/subjects - list all subjects
#[utoipa::path(
    get,
    path = "/api/subjects",
    responses(
        (status = 200, description = "All subjects", body = Vec<Subject>),
        (status = 401, description = "Missing or invalid access token"),
    ),
    tag = "subjects"
)]
pub async fn list_subjects(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<Subject>>, ApiError> {
    let subjects = sqlx::query_as::<_, Subject>(
        "SELECT id, name, code, description, created_at FROM subjects ORDER BY id",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(subjects))
}

/// POST /api/subjects - create a subject (staff)
#[utoipa::path(
    post,
    path = "/api/subjects",
    request_body = CreateSubject,
    responses(
        (status = 201, description = "Subject created", body = Subject),
        (status = 400, description = "Duplicate code or invalid input"),
        (status = 403, description = "Role not allowed"),
    ),
    tag = "subjects"
)]
pub async fn create_subject(
    State(state): State<AppState>,
    StaffOnly(_user): StaffOnly,
    Json(payload): Json<CreateSubject>,
) -> Result<(StatusCode, Json<Subject>), ApiError> {
    payload.validate()?;

    let exists: Option<bool> =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM subjects WHERE code = $1)")
            .bind(&payload.code)
            .fetch_one(&state.db)
            .await?;

    if exists.unwrap_or(false) {
        tracing::warn!("Attempt to create duplicate subject code: {}", payload.code);
        return Err(ApiError::BadRequest(
            "Subject with this code already exists".to_string(),
        ));
    }

    let subject = sqlx::query_as::<_, Subject>(
        "INSERT INTO subjects (name, code, description) VALUES ($1, $2, $3)
         RETURNING id, name, code, description, created_at",
    )
    .bind(&payload.name)
    .bind(&payload.code)
    .bind(&payload.description)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Created subject {} ({})", subject.id, subject.code);
    Ok((StatusCode::CREATED, Json(subject)))
}

/// PUT /api/subjects/:id - partial update (staff)
#[utoipa::path(
    put,
    path = "/api/subjects/{id}",
    params(("id" = i32, Path, description = "Subject ID")),
    request_body = UpdateSubject,
    responses(
        (status = 200, description = "Updated", body = Subject),
        (status = 400, description = "Duplicate code or invalid input"),
        (status = 404, description = "Subject not found"),
    ),
    tag = "subjects"
)]
pub async fn update_subject(
    State(state): State<AppState>,
    StaffOnly(_user): StaffOnly,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateSubject>,
) -> Result<Json<Subject>, ApiError> {
    payload.validate()?;

    let existing = sqlx::query_as::<_, Subject>(
        "SELECT id, name, code, description, created_at FROM subjects WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "Subject".to_string(),
        id: id.to_string(),
    })?;

    let subject = sqlx::query_as::<_, Subject>(
        "UPDATE subjects SET name = $1, code = $2, description = $3 WHERE id = $4
         RETURNING id, name, code, description, created_at",
    )
    .bind(payload.name.unwrap_or(existing.name))
    .bind(payload.code.unwrap_or(existing.code))
    .bind(payload.description.or(existing.description))
    .bind(id)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        // The code column is unique; renaming onto a taken code fails the
        // same way a duplicate create does
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return ApiError::BadRequest(
                    "Subject with this code already exists".to_string(),
                );
            }
        }
        ApiError::DatabaseError(e)
    })?;

    Ok(Json(subject))
}

/// DELETE /api/subjects/:id - hard delete (staff)
#[utoipa::path(
    delete,
    path = "/api/subjects/{id}",
    params(("id" = i32, Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Removed"),
        (status = 404, description = "Subject not found"),
    ),
    tag = "subjects"
)]
pub async fn delete_subject(
    State(state): State<AppState>,
    StaffOnly(_user): StaffOnly,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound {
            resource: "Subject".to_string(),
            id: id.to_string(),
        });
    }

    Ok(Json(json!({ "message": "Subject removed" })))
}
