// Weekly timetable model and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "weekday", rename_all = "PascalCase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    pub id: i32,
    pub batch_id: i32,
    pub subject_id: i32,
    pub day_of_week: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
    pub teacher_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimetableEntry {
    pub batch: i32,
    pub subject: i32,
    pub day_of_week: DayOfWeek,
    #[validate(custom = "crate::validation::validate_time_of_day")]
    pub start_time: String,
    #[validate(custom = "crate::validation::validate_time_of_day")]
    pub end_time: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableQuery {
    pub batch_id: Option<i32>,
}

/// Entry joined with subject and teacher names
#[derive(Debug, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntryWithNames {
    pub id: i32,
    pub batch_id: i32,
    pub subject_id: i32,
    pub subject_name: String,
    pub day_of_week: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
    pub teacher_name: Option<String>,
}
