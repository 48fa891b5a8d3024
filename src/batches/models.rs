// Batch data model and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::subjects::Subject;

/// Batch row as stored; subject links live in a join table
#[derive(Debug, Clone, FromRow)]
pub struct BatchRow {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Batch with its subjects populated
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub subjects: Vec<Subject>,
}

impl Batch {
    pub fn from_row(row: BatchRow, subjects: Vec<Subject>) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            is_active: row.is_active,
            created_at: row.created_at,
            subjects,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBatch {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub subjects: Vec<i32>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBatch {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub subjects: Option<Vec<i32>>,
    pub is_active: Option<bool>,
}
