// Assignment and submission models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "submission_status", rename_all = "PascalCase")]
pub enum SubmissionStatus {
    Submitted,
    Graded,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub batch_id: i32,
    pub subject_id: i32,
    pub due_date: DateTime<Utc>,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: i32,
    pub assignment_id: i32,
    pub student_id: i32,
    pub content: String,
    pub status: SubmissionStatus,
    pub grade: Option<i32>,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignment {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub batch: i32,
    pub subject: i32,
    pub due_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAssignment {
    #[validate(length(min = 1))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GradeSubmission {
    #[validate(custom = "crate::validation::validate_grade_range")]
    pub grade: i32,
    pub feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAssignmentsQuery {
    pub batch_id: Option<i32>,
}

/// Assignment joined with batch and subject names
#[derive(Debug, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentWithNames {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub batch_id: i32,
    pub batch_name: String,
    pub subject_id: i32,
    pub subject_name: String,
    pub due_date: DateTime<Utc>,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
}

/// Assignment merged with the requesting student's own submission, if any
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAssignment {
    #[serde(flatten)]
    pub assignment: AssignmentWithNames,
    pub submission: Option<Submission>,
}

/// Submission joined with student identity for grading views
#[derive(Debug, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionWithStudent {
    pub id: i32,
    pub student_id: i32,
    pub student_name: String,
    pub student_email: String,
    pub content: String,
    pub status: SubmissionStatus,
    pub grade: Option<i32>,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}
