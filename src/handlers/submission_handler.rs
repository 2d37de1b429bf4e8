//! Submission Handler
//!
//! Records assignment submissions and instructor grades.

use uuid::Uuid;

use crate::domain::{
    ContentItem, DomainError, Grade, NewNotification, OperationContext, Submission,
};
use crate::error::AppError;
use crate::notification::Notifier;
use crate::store::SharedStore;

use super::{GradeSubmissionCommand, SubmitAssignmentCommand};

/// Handler for submissions and grading
pub struct SubmissionHandler {
    store: SharedStore,
    notifier: Notifier,
}

impl SubmissionHandler {
    pub fn new(store: SharedStore) -> Self {
        Self {
            notifier: Notifier::new(store.clone()),
            store,
        }
    }

    /// Append a submission; earlier submissions are kept
    pub async fn submit(
        &self,
        command: SubmitAssignmentCommand,
        context: &OperationContext,
    ) -> Result<Submission, AppError> {
        if command.file_ref.trim().is_empty() {
            return Err(DomainError::Validation("file_ref must not be empty".to_string()).into());
        }

        let assignment = self
            .store
            .get_assignment(command.assignment_id)
            .await?
            .ok_or(DomainError::AssignmentNotFound(command.assignment_id))?;
        let course_id = ContentItem::Assignment(&assignment).owning_course();

        if !self.store.is_enrolled(context.user_id, course_id).await? {
            return Err(DomainError::not_enrolled(context.user_id, course_id).into());
        }

        let submission = self
            .store
            .insert_submission(Submission::new(
                command.assignment_id,
                context.user_id,
                command.file_ref,
            ))
            .await?;

        tracing::info!(
            submission_id = %submission.id,
            assignment_id = %submission.assignment_id,
            student_id = %submission.student_id,
            "Assignment submitted"
        );

        Ok(submission)
    }

    /// Grade a submission as the course instructor or an administrator
    pub async fn grade(
        &self,
        command: GradeSubmissionCommand,
        context: &OperationContext,
    ) -> Result<Submission, AppError> {
        let mut submission = self
            .store
            .get_submission(command.submission_id)
            .await?
            .ok_or(DomainError::SubmissionNotFound(command.submission_id))?;

        let assignment = self
            .store
            .get_assignment(submission.assignment_id)
            .await?
            .ok_or(DomainError::AssignmentNotFound(submission.assignment_id))?;

        let course_id = ContentItem::Assignment(&assignment).owning_course();
        let course = self
            .store
            .get_course(course_id)
            .await?
            .ok_or(DomainError::CourseNotFound(course_id))?;

        if !context.can_manage(&course) {
            return Err(DomainError::permission_denied(
                "only the course instructor or an administrator may grade",
            )
            .into());
        }

        let grade = Grade::new(
            command.grade,
            assignment.max_score,
            command.feedback,
            context.user_id,
        )?;

        submission.grade = Some(grade.value);
        submission.feedback = grade.feedback;
        submission.graded_by = Some(grade.graded_by);
        submission.graded_at = Some(grade.graded_at);
        self.store.save_grade(&submission).await?;

        tracing::info!(
            submission_id = %submission.id,
            grade = grade.value,
            graded_by = %context.user_id,
            "Submission graded"
        );

        self.notifier
            .notify(NewNotification::graded(
                submission.student_id,
                &assignment.title,
                grade.value,
                assignment.max_score,
            ))
            .await;

        Ok(submission)
    }

    /// The actor's own submissions
    pub async fn mine(&self, context: &OperationContext) -> Result<Vec<Submission>, AppError> {
        Ok(self
            .store
            .list_submissions_by_student(context.user_id)
            .await?)
    }

    /// Ungraded submissions: all for admins, own courses for instructors
    pub async fn pending(&self, context: &OperationContext) -> Result<Vec<Submission>, AppError> {
        if !context.can_author() {
            return Err(DomainError::permission_denied(
                "only instructors and administrators may review submissions",
            )
            .into());
        }

        let scope: Option<Uuid> = if context.is_admin() {
            None
        } else {
            Some(context.user_id)
        };
        Ok(self.store.list_pending_submissions(scope).await?)
    }
}
