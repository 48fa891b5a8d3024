// Pending admission model and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Admission lifecycle. Approve and reject are only legal from Pending;
/// a decided admission never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "admission_status", rename_all = "PascalCase")]
pub enum AdmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl AdmissionStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, AdmissionStatus::Pending)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PendingAdmission {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub applied_for_batch: i32,
    pub status: AdmissionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAdmission {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub applied_for_batch: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub id: i32,
    pub name: String,
}

/// Admission with its batch populated (password hash excluded)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub status: AdmissionStatus,
    pub applied_for_batch: BatchSummary,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pending_admissions_are_actionable() {
        assert!(AdmissionStatus::Pending.is_pending());
        assert!(!AdmissionStatus::Approved.is_pending());
        assert!(!AdmissionStatus::Rejected.is_pending());
    }

    #[test]
    fn test_status_serializes_pascal_case() {
        assert_eq!(
            serde_json::to_string(&AdmissionStatus::Pending).unwrap(),
            "\"Pending\""
        );
    }
}
