//! Store module
//!
//! Persistence interfaces consumed by the handlers, with a PostgreSQL
//! implementation and an in-memory implementation. Every write with a
//! uniqueness invariant is a single conditional write, never
//! read-then-write.

mod error;
mod memory;
mod postgres;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Assignment, Category, Certificate, Comment, Course, CourseModule, CourseOutline, Lesson,
    LessonCompletion, NewNotification, Notification, Submission,
};

pub use error::{StoreError, StoreResult, CERTIFICATE_NUMBER_CONSTRAINT};
pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Result of an insert-if-absent write
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome<T> {
    /// This call wrote the row
    Inserted(T),
    /// A row with the same key already existed; nothing was written
    Existing(T),
}

impl<T> InsertOutcome<T> {
    pub fn was_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted(_))
    }
}

/// Result of a lesson completion upsert
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionUpsert {
    pub completion: LessonCompletion,
    /// `false` when an existing record had its timestamp refreshed
    pub created: bool,
}

/// Result of an enrollment attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollOutcome {
    Enrolled,
    AlreadyEnrolled,
    LimitReached,
}

/// Category → Course → Module → Lesson → Assignment
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn insert_category(&self, category: Category) -> StoreResult<Category>;

    /// Categories ordered by position
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;

    async fn insert_course(&self, course: Course) -> StoreResult<Course>;

    async fn get_course(&self, course_id: Uuid) -> StoreResult<Option<Course>>;

    /// Active courses, newest first, optionally within one category
    async fn list_courses(&self, category_id: Option<Uuid>) -> StoreResult<Vec<Course>>;

    /// Fails with `UniqueViolation` when the position is taken in the course
    async fn insert_module(&self, module: CourseModule) -> StoreResult<CourseModule>;

    async fn get_module(&self, module_id: Uuid) -> StoreResult<Option<CourseModule>>;

    /// Fails with `UniqueViolation` when the position is taken in the module
    async fn insert_lesson(&self, lesson: Lesson) -> StoreResult<Lesson>;

    async fn get_lesson(&self, lesson_id: Uuid) -> StoreResult<Option<Lesson>>;

    /// Lessons of a module ordered by position
    async fn list_lessons(&self, module_id: Uuid) -> StoreResult<Vec<Lesson>>;

    /// Modules of a course ordered by position
    async fn list_modules(&self, course_id: Uuid) -> StoreResult<Vec<CourseModule>>;

    async fn insert_assignment(&self, assignment: Assignment) -> StoreResult<Assignment>;

    async fn get_assignment(&self, assignment_id: Uuid) -> StoreResult<Option<Assignment>>;

    /// Modules and their lesson ids, ordered by position, read as one
    /// consistent snapshot
    async fn course_outline(&self, course_id: Uuid) -> StoreResult<CourseOutline>;
}

/// Membership of users in courses
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    async fn is_enrolled(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<bool>;

    /// Check the cap and insert the membership atomically
    async fn enroll(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        limit: Option<i32>,
    ) -> StoreResult<EnrollOutcome>;

    /// Returns `false` when the user was not enrolled
    async fn unenroll(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<bool>;

    async fn count_enrollments(&self, course_id: Uuid) -> StoreResult<i64>;

    /// Ids of the users enrolled in the course
    async fn course_students(&self, course_id: Uuid) -> StoreResult<Vec<Uuid>>;

    async fn enrolled_courses(&self, user_id: Uuid) -> StoreResult<Vec<Course>>;
}

/// Lesson completions and module milestones
#[async_trait]
pub trait CompletionStore: Send + Sync {
    /// Insert the (user, lesson) completion or refresh its timestamp
    async fn upsert_completion(
        &self,
        user_id: Uuid,
        lesson_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> StoreResult<CompletionUpsert>;

    /// Ids of the course's lessons completed by the user
    async fn completed_lesson_ids(&self, user_id: Uuid, course_id: Uuid)
        -> StoreResult<HashSet<Uuid>>;

    /// Record that the user completed the module; `true` only for the call
    /// that wrote the milestone
    async fn record_module_milestone(
        &self,
        user_id: Uuid,
        module_id: Uuid,
        reached_at: DateTime<Utc>,
    ) -> StoreResult<bool>;
}

#[async_trait]
pub trait CertificateStore: Send + Sync {
    async fn find_certificate(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> StoreResult<Option<Certificate>>;

    /// Insert unless a certificate exists for (user, course). A clash on the
    /// certificate number fails with `UniqueViolation` on
    /// `CERTIFICATE_NUMBER_CONSTRAINT`.
    async fn insert_certificate_if_absent(
        &self,
        certificate: Certificate,
    ) -> StoreResult<InsertOutcome<Certificate>>;

    /// Certificates of one user, or of everyone when `user_id` is `None`
    async fn list_certificates(&self, user_id: Option<Uuid>) -> StoreResult<Vec<Certificate>>;
}

/// Append-only notification sink
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn append_notification(&self, notification: NewNotification)
        -> StoreResult<Notification>;

    /// Newest first
    async fn list_notifications(&self, user_id: Uuid) -> StoreResult<Vec<Notification>>;

    /// Returns `false` when no such notification belongs to the user
    async fn mark_notification_read(&self, user_id: Uuid, notification_id: Uuid)
        -> StoreResult<bool>;
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn insert_submission(&self, submission: Submission) -> StoreResult<Submission>;

    async fn get_submission(&self, submission_id: Uuid) -> StoreResult<Option<Submission>>;

    async fn save_grade(&self, submission: &Submission) -> StoreResult<()>;

    async fn list_submissions_by_student(&self, student_id: Uuid) -> StoreResult<Vec<Submission>>;

    /// Ungraded submissions, restricted to one instructor's courses when given
    async fn list_pending_submissions(
        &self,
        instructor_id: Option<Uuid>,
    ) -> StoreResult<Vec<Submission>>;
}

/// Threaded discussion under lessons
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Fails with `MissingReference` when the lesson or parent is unknown
    async fn insert_comment(&self, comment: Comment) -> StoreResult<Comment>;

    async fn get_comment(&self, comment_id: Uuid) -> StoreResult<Option<Comment>>;

    /// Newest first
    async fn list_comments(&self, lesson_id: Uuid) -> StoreResult<Vec<Comment>>;
}

/// Everything the handlers need
pub trait PlatformStore:
    ContentStore
    + EnrollmentStore
    + CompletionStore
    + CertificateStore
    + NotificationStore
    + SubmissionStore
    + CommentStore
{
}

impl<T> PlatformStore for T where
    T: ContentStore
        + EnrollmentStore
        + CompletionStore
        + CertificateStore
        + NotificationStore
        + SubmissionStore
        + CommentStore
{
}

/// Shared handle used across handlers and requests
pub type SharedStore = Arc<dyn PlatformStore>;
