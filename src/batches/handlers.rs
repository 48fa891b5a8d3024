// Batch CRUD handlers (soft delete via is_active)

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sqlx::{FromRow, PgPool};
use validator::Validate;

use crate::auth::{CurrentUser, StaffOnly};
use crate::batches::models::{Batch, BatchRow, CreateBatch, UpdateBatch};
use crate::error::ApiError;
use crate::subjects::Subject;
use crate::AppState;

#[derive(FromRow)]
struct SubjectLink {
    batch_id: i32,
    id: i32,
    name: String,
    code: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

/// Load the subjects linked to each of the given batches in one query
async fn subjects_by_batch(
    pool: &PgPool,
    batch_ids: &[i32],
) -> Result<HashMap<i32, Vec<Subject>>, ApiError> {
    let links = sqlx::query_as::<_, SubjectLink>(
        "SELECT bs.batch_id, s.id, s.name, s.code, s.description, s.created_at
         FROM batch_subjects bs
         JOIN subjects s ON s.id = bs.subject_id
         WHERE bs.batch_id = ANY($1)
         ORDER BY s.id",
    )
    .bind(batch_ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<i32, Vec<Subject>> = HashMap::new();
    for link in links {
        grouped.entry(link.batch_id).or_default().push(Subject {
            id: link.id,
            name: link.name,
            code: link.code,
            description: link.description,
            created_at: link.created_at,
        });
    }
    Ok(grouped)
}

async fn load_batch(pool: &PgPool, id: i32) -> Result<Option<BatchRow>, ApiError> {
    Ok(sqlx::query_as::<_, BatchRow>(
        "SELECT id, name, description, is_active, created_at FROM batches WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?)
}

async fn populate(pool: &PgPool, row: BatchRow) -> Result<Batch, ApiError> {
    let mut grouped = subjects_by_batch(pool, &[row.id]).await?;
    let subjects = grouped.remove(&row.id).unwrap_or_default();
    Ok(Batch::from_row(row, subjects))
}

/// GET /api/batches - active batches with subjects populated
pub async fn list_batches(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<Batch>>, ApiError> {
    let rows = sqlx::query_as::<_, BatchRow>(
        "SELECT id, name, description, is_active, created_at
         FROM batches WHERE is_active = TRUE ORDER BY id",
    )
    .fetch_all(&state.db)
    .await?;

    let ids: Vec<i32> = rows.iter().map(|b| b.id).collect();
    let mut grouped = subjects_by_batch(&state.db, &ids).await?;

    let batches = rows
        .into_iter()
        .map(|row| {
            let subjects = grouped.remove(&row.id).unwrap_or_default();
            Batch::from_row(row, subjects)
        })
        .collect();

    Ok(Json(batches))
}

/// POST /api/batches - create with a subject id list (staff)
pub async fn create_batch(
    State(state): State<AppState>,
    StaffOnly(_user): StaffOnly,
    Json(payload): Json<CreateBatch>,
) -> Result<(StatusCode, Json<Batch>), ApiError> {
    payload.validate()?;

    let mut tx = state.db.begin().await?;

    let row = sqlx::query_as::<_, BatchRow>(
        "INSERT INTO batches (name, description) VALUES ($1, $2)
         RETURNING id, name, description, is_active, created_at",
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .fetch_one(&mut *tx)
    .await?;

    for subject_id in &payload.subjects {
        sqlx::query("INSERT INTO batch_subjects (batch_id, subject_id) VALUES ($1, $2)")
            .bind(row.id)
            .bind(subject_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    tracing::info!("Created batch {}", row.id);
    let batch = populate(&state.db, row).await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

/// PUT /api/batches/:id - partial update incl. subject list (staff)
pub async fn update_batch(
    State(state): State<AppState>,
    StaffOnly(_user): StaffOnly,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateBatch>,
) -> Result<Json<Batch>, ApiError> {
    payload.validate()?;

    let existing = load_batch(&state.db, id).await?.ok_or_else(|| ApiError::NotFound {
        resource: "Batch".to_string(),
        id: id.to_string(),
    })?;

    let mut tx = state.db.begin().await?;

    let row = sqlx::query_as::<_, BatchRow>(
        "UPDATE batches SET name = $1, description = $2, is_active = $3 WHERE id = $4
         RETURNING id, name, description, is_active, created_at",
    )
    .bind(payload.name.unwrap_or(existing.name))
    .bind(payload.description.or(existing.description))
    .bind(payload.is_active.unwrap_or(existing.is_active))
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(subject_ids) = payload.subjects {
        sqlx::query("DELETE FROM batch_subjects WHERE batch_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for subject_id in subject_ids {
            sqlx::query("INSERT INTO batch_subjects (batch_id, subject_id) VALUES ($1, $2)")
                .bind(id)
                .bind(subject_id)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;

    let batch = populate(&state.db, row).await?;
    Ok(Json(batch))
}

/// DELETE /api/batches/:id - soft delete (staff)
pub async fn delete_batch(
    State(state): State<AppState>,
    StaffOnly(_user): StaffOnly,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let result = sqlx::query("UPDATE batches SET is_active = FALSE WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound {
            resource: "Batch".to_string(),
            id: id.to_string(),
        });
    }

    Ok(Json(json!({ "message": "Batch marked as inactive" })))
}
