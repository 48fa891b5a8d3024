// Attendance data model and DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "attendance_status", rename_all = "PascalCase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    /// Late still counts as attended for percentage purposes
    pub fn counts_as_present(&self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: i32,
    pub student_id: i32,
    pub batch_id: i32,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub is_confirmed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendance {
    pub batch_id: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideAttendance {
    pub student_id: i32,
    pub batch_id: i32,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MineQuery {
    pub batch_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct BatchQuery {
    pub date: Option<NaiveDate>,
}

/// Record joined with its batch name for the student's own history
#[derive(Debug, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceWithBatch {
    pub id: i32,
    pub batch_id: i32,
    pub batch_name: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub is_confirmed: bool,
}

/// Record joined with student identity for the staff batch view
#[derive(Debug, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceWithStudent {
    pub id: i32,
    pub student_id: i32,
    pub student_name: String,
    pub student_email: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub is_confirmed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    pub total_days: i64,
    pub present_days: i64,
    pub percentage: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyAttendanceResponse {
    pub records: Vec<AttendanceWithBatch>,
    pub stats: AttendanceStats,
}
