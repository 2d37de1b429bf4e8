//! Assignment submissions and grades

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DomainError;

/// A file handed in for an assignment. Several submissions per
/// (student, assignment) are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub student_id: Uuid,
    /// Reference into blob storage
    pub file_ref: String,
    pub grade: Option<i32>,
    pub feedback: String,
    pub graded_by: Option<Uuid>,
    pub submitted_at: DateTime<Utc>,
    pub graded_at: Option<DateTime<Utc>>,
}

impl Submission {
    pub fn new(assignment_id: Uuid, student_id: Uuid, file_ref: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            assignment_id,
            student_id,
            file_ref,
            grade: None,
            feedback: String::new(),
            graded_by: None,
            submitted_at: Utc::now(),
            graded_at: None,
        }
    }

    pub fn is_graded(&self) -> bool {
        self.grade.is_some()
    }
}

/// Grade entered by an instructor
#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    pub value: i32,
    pub feedback: String,
    pub graded_by: Uuid,
    pub graded_at: DateTime<Utc>,
}

impl Grade {
    /// Validate `value` against the assignment's maximum score
    pub fn new(
        value: i32,
        max_score: i32,
        feedback: String,
        graded_by: Uuid,
    ) -> Result<Self, DomainError> {
        if !(0..=max_score).contains(&value) {
            return Err(DomainError::InvalidGrade {
                grade: value,
                max_score,
            });
        }

        Ok(Self {
            value,
            feedback,
            graded_by,
            graded_at: Utc::now(),
        })
    }
}
