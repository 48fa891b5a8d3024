// Assignment and submission handlers

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::assignments::models::{
    Assignment, AssignmentWithNames, CreateAssignment, GradeSubmission, StudentAssignment,
    StudentAssignmentsQuery, SubmitAssignment, Submission, SubmissionWithStudent,
};
use crate::auth::models::Role;
use crate::auth::{StaffOnly, StudentOnly};
use crate::error::ApiError;
use crate::AppState;

/// POST /api/assignments - create an assignment, creator = current user (staff)
pub async fn create_assignment(
    State(state): State<AppState>,
    StaffOnly(user): StaffOnly,
    Json(payload): Json<CreateAssignment>,
) -> Result<(StatusCode, Json<Assignment>), ApiError> {
    payload.validate()?;

    let assignment = sqlx::query_as::<_, Assignment>(
        "INSERT INTO assignments (title, description, batch_id, subject_id, due_date, created_by)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id, title, description, batch_id, subject_id, due_date, created_by, created_at",
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(payload.batch)
    .bind(payload.subject)
    .bind(payload.due_date)
    .bind(user.id)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("User {} created assignment {}", user.id, assignment.id);
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// GET /api/assignments/teacher - Admin sees all, Teacher only own (staff)
pub async fn teacher_assignments(
    State(state): State<AppState>,
    StaffOnly(user): StaffOnly,
) -> Result<Json<Vec<AssignmentWithNames>>, ApiError> {
    let creator_filter = match user.role {
        Role::Admin => None,
        _ => Some(user.id),
    };

    let assignments = sqlx::query_as::<_, AssignmentWithNames>(
        "SELECT a.id, a.title, a.description, a.batch_id, b.name AS batch_name,
                a.subject_id, s.name AS subject_name, a.due_date, a.created_by, a.created_at
         FROM assignments a
         JOIN batches b ON b.id = a.batch_id
         JOIN subjects s ON s.id = a.subject_id
         WHERE $1::int IS NULL OR a.created_by = $1
         ORDER BY a.created_at DESC",
    )
    .bind(creator_filter)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(assignments))
}

/// GET /api/assignments/mine - assignments merged with the student's own
/// submissions so the caller knows what is already handed in
pub async fn student_assignments(
    State(state): State<AppState>,
    StudentOnly(user): StudentOnly,
    Query(query): Query<StudentAssignmentsQuery>,
) -> Result<Json<Vec<StudentAssignment>>, ApiError> {
    let assignments = sqlx::query_as::<_, AssignmentWithNames>(
        "SELECT a.id, a.title, a.description, a.batch_id, b.name AS batch_name,
                a.subject_id, s.name AS subject_name, a.due_date, a.created_by, a.created_at
         FROM assignments a
         JOIN batches b ON b.id = a.batch_id
         JOIN subjects s ON s.id = a.subject_id
         WHERE $1::int IS NULL OR a.batch_id = $1
         ORDER BY a.due_date",
    )
    .bind(query.batch_id)
    .fetch_all(&state.db)
    .await?;

    let submissions = sqlx::query_as::<_, Submission>(
        "SELECT id, assignment_id, student_id, content, status, grade, feedback,
                created_at, updated_at
         FROM submissions WHERE student_id = $1",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;

    let mut by_assignment: HashMap<i32, Submission> = submissions
        .into_iter()
        .map(|s| (s.assignment_id, s))
        .collect();

    let results = assignments
        .into_iter()
        .map(|assignment| {
            let submission = by_assignment.remove(&assignment.id);
            StudentAssignment {
                assignment,
                submission,
            }
        })
        .collect();

    Ok(Json(results))
}

/// POST /api/assignments/:id/submit - student hands in content
pub async fn submit_assignment(
    State(state): State<AppState>,
    StudentOnly(user): StudentOnly,
    Path(assignment_id): Path<i32>,
    Json(payload): Json<SubmitAssignment>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    payload.validate()?;

    let exists: Option<bool> =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM assignments WHERE id = $1)")
            .bind(assignment_id)
            .fetch_one(&state.db)
            .await?;
    if !exists.unwrap_or(false) {
        return Err(ApiError::NotFound {
            resource: "Assignment".to_string(),
            id: assignment_id.to_string(),
        });
    }

    let submission = sqlx::query_as::<_, Submission>(
        "INSERT INTO submissions (assignment_id, student_id, content) VALUES ($1, $2, $3)
         RETURNING id, assignment_id, student_id, content, status, grade, feedback,
                   created_at, updated_at",
    )
    .bind(assignment_id)
    .bind(user.id)
    .bind(&payload.content)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        // The (assignment, student) pair is unique; a second submit races here
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return ApiError::BadRequest("Assignment already submitted".to_string());
            }
        }
        ApiError::DatabaseError(e)
    })?;

    tracing::info!("Student {} submitted assignment {}", user.id, assignment_id);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Submitted successfully",
            "submission": submission,
        })),
    ))
}

/// GET /api/assignments/:id/submissions - submissions for grading (staff)
pub async fn list_submissions(
    State(state): State<AppState>,
    StaffOnly(_user): StaffOnly,
    Path(assignment_id): Path<i32>,
) -> Result<Json<Vec<SubmissionWithStudent>>, ApiError> {
    let submissions = sqlx::query_as::<_, SubmissionWithStudent>(
        "SELECT s.id, s.student_id, u.name AS student_name, u.email AS student_email,
                s.content, s.status, s.grade, s.feedback, s.created_at
         FROM submissions s
         JOIN users u ON u.id = s.student_id
         WHERE s.assignment_id = $1
         ORDER BY s.created_at",
    )
    .bind(assignment_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(submissions))
}

/// PUT /api/assignments/submissions/:submissionId/grade - grade it (staff)
pub async fn grade_submission(
    State(state): State<AppState>,
    StaffOnly(user): StaffOnly,
    Path(submission_id): Path<i32>,
    Json(payload): Json<GradeSubmission>,
) -> Result<Json<Value>, ApiError> {
    payload.validate()?;

    let submission = sqlx::query_as::<_, Submission>(
        "UPDATE submissions SET grade = $1, feedback = $2, status = 'Graded', updated_at = NOW()
         WHERE id = $3
         RETURNING id, assignment_id, student_id, content, status, grade, feedback,
                   created_at, updated_at",
    )
    .bind(payload.grade)
    .bind(&payload.feedback)
    .bind(submission_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "Submission".to_string(),
        id: submission_id.to_string(),
    })?;

    tracing::info!("User {} graded submission {}", user.id, submission_id);
    Ok(Json(json!({
        "message": "Graded successfully",
        "submission": submission,
    })))
}
