// Student grade summary: graded submissions plus attendance percentage

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::attendance::models::AttendanceStatus;
use crate::attendance::percentage::compute_stats;
use crate::auth::StudentOnly;
use crate::error::ApiError;
use crate::AppState;

/// Graded submission joined with its assignment for the summary view
#[derive(Debug, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentGrade {
    pub id: i32,
    pub assignment_id: i32,
    pub assignment_title: String,
    pub due_date: DateTime<Utc>,
    pub grade: Option<i32>,
    pub feedback: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSummary {
    pub average_grade: i64,
    pub total_graded_assignments: usize,
    pub attendance_percentage: u32,
    pub recent_grades: Vec<RecentGrade>,
}

/// Rounded mean of the grades, treating a missing grade as zero
fn average_grade(grades: &[Option<i32>]) -> i64 {
    if grades.is_empty() {
        return 0;
    }
    let total: i64 = grades.iter().map(|g| i64::from(g.unwrap_or(0))).sum();
    ((total as f64) / (grades.len() as f64)).round() as i64
}

/// GET /api/grades/mine - the student's overall summary
pub async fn my_grades_summary(
    State(state): State<AppState>,
    StudentOnly(user): StudentOnly,
) -> Result<Json<GradeSummary>, ApiError> {
    let recent_grades = sqlx::query_as::<_, RecentGrade>(
        "SELECT s.id, s.assignment_id, a.title AS assignment_title, a.due_date,
                s.grade, s.feedback, s.updated_at
         FROM submissions s
         JOIN assignments a ON a.id = s.assignment_id
         WHERE s.student_id = $1 AND s.status = 'Graded'
         ORDER BY s.updated_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;

    let grades: Vec<Option<i32>> = recent_grades.iter().map(|g| g.grade).collect();

    let statuses: Vec<AttendanceStatus> =
        sqlx::query_scalar("SELECT status FROM attendance WHERE student_id = $1")
            .bind(user.id)
            .fetch_all(&state.db)
            .await?;

    Ok(Json(GradeSummary {
        average_grade: average_grade(&grades),
        total_graded_assignments: recent_grades.len(),
        attendance_percentage: compute_stats(&statuses).percentage,
        recent_grades,
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/mine", get(my_grades_summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_grades_averages_to_zero() {
        assert_eq!(average_grade(&[]), 0);
    }

    #[test]
    fn test_average_is_rounded() {
        assert_eq!(average_grade(&[Some(80), Some(90)]), 85);
        // 70 + 75 + 81 = 226 / 3 = 75.33 -> 75
        assert_eq!(average_grade(&[Some(70), Some(75), Some(81)]), 75);
        // 50 + 51 = 101 / 2 = 50.5 -> 51
        assert_eq!(average_grade(&[Some(50), Some(51)]), 51);
    }

    #[test]
    fn test_missing_grade_counts_as_zero() {
        assert_eq!(average_grade(&[Some(100), None]), 50);
    }
}
