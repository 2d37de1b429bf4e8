//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;
use uuid::Uuid;

/// Business rule violations and precondition failures of the course workflow.
///
/// These errors are independent of the web/infrastructure layer; the HTTP
/// mapping lives in `crate::error`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),

    #[error("Course not found: {0}")]
    CourseNotFound(Uuid),

    #[error("Module not found: {0}")]
    ModuleNotFound(Uuid),

    #[error("Lesson not found: {0}")]
    LessonNotFound(Uuid),

    #[error("Assignment not found: {0}")]
    AssignmentNotFound(Uuid),

    #[error("Submission not found: {0}")]
    SubmissionNotFound(Uuid),

    #[error("Notification not found: {0}")]
    NotificationNotFound(Uuid),

    #[error("Comment not found: {0}")]
    CommentNotFound(Uuid),

    /// The user is not a member of the course
    #[error("User {user_id} is not enrolled in course {course_id}")]
    NotEnrolled { user_id: Uuid, course_id: Uuid },

    /// The user is already a member of the course
    #[error("User {user_id} is already enrolled in course {course_id}")]
    AlreadyEnrolled { user_id: Uuid, course_id: Uuid },

    /// The course reached its enrollment cap
    #[error("Enrollment limit of {limit} reached for course {course_id}")]
    EnrollmentLimitReached { course_id: Uuid, limit: i32 },

    /// Some prerequisite courses have no certificate for the user
    #[error("Prerequisites not met for course {course_id}: {} missing", missing.len())]
    PrerequisitesNotMet { course_id: Uuid, missing: Vec<Uuid> },

    /// Certificate requested for a course the user has not completed
    #[error("Course {course_id} is not complete for user {user_id}")]
    CourseNotComplete { user_id: Uuid, course_id: Uuid },

    /// Every generated certificate number collided with an existing one
    #[error("Certificate generation failed after {attempts} attempts")]
    CertificateGenerationFailed { attempts: u32 },

    /// Storage kept reporting conflicting concurrent writes
    #[error("Concurrent modification not resolved after {attempts} attempts")]
    ConcurrentModificationRetry { attempts: u32 },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid grade {grade}: must be between 0 and {max_score}")]
    InvalidGrade { grade: i32, max_score: i32 },

    /// Ordering position already taken within the parent
    #[error("Position {position} already used in {parent_id}")]
    DuplicatePosition { parent_id: Uuid, position: i32 },

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl DomainError {
    /// Create a not-enrolled error
    pub fn not_enrolled(user_id: Uuid, course_id: Uuid) -> Self {
        Self::NotEnrolled { user_id, course_id }
    }

    /// Create a permission denied error
    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied(reason.into())
    }

    /// Check if this is a client error (user's fault)
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::CertificateGenerationFailed { .. } | Self::ConcurrentModificationRetry { .. }
        )
    }

    /// Check if this is a transient error (retry may help)
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ConcurrentModificationRetry { .. })
    }
}
