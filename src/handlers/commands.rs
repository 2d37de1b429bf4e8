//! Command definitions
//!
//! Commands represent intentions to change the system state; results are
//! what the handlers report back.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Certificate, Course, CourseModule, CourseProgress, Lesson, LessonCompletion};

// =========================================================================
// Progress and certificates
// =========================================================================

/// Command to record that a user finished a lesson
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkLessonCompleteCommand {
    pub user_id: Uuid,
    pub lesson_id: Uuid,
}

impl MarkLessonCompleteCommand {
    pub fn new(user_id: Uuid, lesson_id: Uuid) -> Self {
        Self { user_id, lesson_id }
    }
}

/// Result of marking a lesson complete
#[derive(Debug, Clone, Serialize)]
pub struct CompletionResult {
    pub completion: LessonCompletion,
    /// `false` when an existing completion was refreshed
    pub created: bool,
    /// Completed / total lessons of the lesson's module
    pub module_ratio: f64,
    /// This call took the module to 100%
    pub module_completed_now: bool,
    /// This call minted the course certificate
    pub course_completed_now: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Certificate>,
}

/// Command to request a certificate on demand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateCertificateCommand {
    pub course_id: Uuid,
    /// Recipient; defaults to the acting user, only admins may name another
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

impl GenerateCertificateCommand {
    pub fn new(course_id: Uuid) -> Self {
        Self {
            course_id,
            user_id: None,
        }
    }

    pub fn for_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

/// Outcome of an issuance attempt
#[derive(Debug, Clone, PartialEq)]
pub enum IssueOutcome {
    /// Minted by this call
    Issued(Certificate),
    /// A certificate already existed, possibly written by a concurrent call
    AlreadyIssued(Certificate),
    /// The course is not complete for the user
    Abstained,
}

impl IssueOutcome {
    pub fn certificate(&self) -> Option<&Certificate> {
        match self {
            IssueOutcome::Issued(cert) | IssueOutcome::AlreadyIssued(cert) => Some(cert),
            IssueOutcome::Abstained => None,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, IssueOutcome::Issued(_))
    }
}

/// Result of an on-demand certificate request
#[derive(Debug, Clone, Serialize)]
pub struct CertificateResult {
    pub certificate: Certificate,
    pub newly_issued: bool,
}

// =========================================================================
// Enrollment
// =========================================================================

/// Command to enroll a user in a course
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollCommand {
    pub user_id: Uuid,
    pub course_id: Uuid,
}

impl EnrollCommand {
    pub fn new(user_id: Uuid, course_id: Uuid) -> Self {
        Self { user_id, course_id }
    }
}

// =========================================================================
// Submissions
// =========================================================================

/// Command to submit work for an assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAssignmentCommand {
    pub assignment_id: Uuid,
    /// Reference into blob storage for the uploaded file
    pub file_ref: String,
}

impl SubmitAssignmentCommand {
    pub fn new(assignment_id: Uuid, file_ref: impl Into<String>) -> Self {
        Self {
            assignment_id,
            file_ref: file_ref.into(),
        }
    }
}

/// Command to grade a submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeSubmissionCommand {
    pub submission_id: Uuid,
    pub grade: i32,
    #[serde(default)]
    pub feedback: String,
}

impl GradeSubmissionCommand {
    pub fn new(submission_id: Uuid, grade: i32) -> Self {
        Self {
            submission_id,
            grade,
            feedback: String::new(),
        }
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = feedback.into();
        self
    }
}

// =========================================================================
// Read models
// =========================================================================

/// Course detail as seen by the acting user
#[derive(Debug, Clone, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub student_count: i64,
    pub is_enrolled: bool,
    /// Completed lessons in percent, present for enrolled users
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_percent: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LessonView {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleView {
    #[serde(flatten)]
    pub module: CourseModule,
    pub lessons: Vec<LessonView>,
}

/// Modules and lessons of a course with the user's completion flags
#[derive(Debug, Clone, Serialize)]
pub struct CourseContent {
    pub course_id: Uuid,
    pub modules: Vec<ModuleView>,
}

/// Progress of a user through a course
#[derive(Debug, Clone, Serialize)]
pub struct ProgressReport {
    pub progress: CourseProgress,
    pub percent: f64,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Certificate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_certificate_command() {
        let course_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let cmd = GenerateCertificateCommand::new(course_id);
        assert!(cmd.user_id.is_none());

        let cmd = cmd.for_user(user_id);
        assert_eq!(cmd.user_id, Some(user_id));
    }

    #[test]
    fn test_grade_command_feedback() {
        let cmd = GradeSubmissionCommand::new(Uuid::new_v4(), 80).with_feedback("Good work");
        assert_eq!(cmd.grade, 80);
        assert_eq!(cmd.feedback, "Good work");
    }

    #[test]
    fn test_issue_outcome_accessors() {
        assert!(IssueOutcome::Abstained.certificate().is_none());
        assert!(!IssueOutcome::Abstained.is_fresh());
    }
}
