//! Enrollment Handler
//!
//! Adds and removes course memberships. Prerequisites are satisfied by a
//! valid certificate for each prerequisite course.

use uuid::Uuid;

use crate::domain::{Course, DomainError, NewNotification, OperationContext};
use crate::error::AppError;
use crate::notification::Notifier;
use crate::store::{EnrollOutcome, SharedStore};

use super::EnrollCommand;

/// Handler for course enrollment
pub struct EnrollmentHandler {
    store: SharedStore,
    notifier: Notifier,
}

impl EnrollmentHandler {
    pub fn new(store: SharedStore) -> Self {
        Self {
            notifier: Notifier::new(store.clone()),
            store,
        }
    }

    /// Execute the enroll command
    pub async fn execute(
        &self,
        command: EnrollCommand,
        context: &OperationContext,
    ) -> Result<Course, AppError> {
        if command.user_id != context.user_id && !context.is_admin() {
            return Err(DomainError::permission_denied("cannot enroll another user").into());
        }

        let user_id = command.user_id;
        let course = self.load_course(command.course_id).await?;

        let missing = self.missing_prerequisites(user_id, &course).await?;
        if !missing.is_empty() {
            return Err(DomainError::PrerequisitesNotMet {
                course_id: course.id,
                missing,
            }
            .into());
        }

        match self
            .store
            .enroll(user_id, course.id, course.enrollment_limit)
            .await?
        {
            EnrollOutcome::Enrolled => {}
            EnrollOutcome::AlreadyEnrolled => {
                return Err(DomainError::AlreadyEnrolled {
                    user_id,
                    course_id: course.id,
                }
                .into());
            }
            EnrollOutcome::LimitReached => {
                return Err(DomainError::EnrollmentLimitReached {
                    course_id: course.id,
                    limit: course.enrollment_limit.unwrap_or_default(),
                }
                .into());
            }
        }

        tracing::info!(%user_id, course_id = %course.id, "User enrolled");
        self.notifier
            .notify(NewNotification::enrolled(user_id, &course.title))
            .await;

        Ok(course)
    }

    /// Remove the actor from a course
    pub async fn unenroll(
        &self,
        course_id: Uuid,
        context: &OperationContext,
    ) -> Result<(), AppError> {
        let course = self.load_course(course_id).await?;

        if !self.store.unenroll(context.user_id, course.id).await? {
            return Err(DomainError::not_enrolled(context.user_id, course.id).into());
        }

        tracing::info!(user_id = %context.user_id, course_id = %course.id, "User unenrolled");
        Ok(())
    }

    /// Courses the actor is enrolled in
    pub async fn my_courses(&self, context: &OperationContext) -> Result<Vec<Course>, AppError> {
        Ok(self.store.enrolled_courses(context.user_id).await?)
    }

    /// Prerequisite courses without a valid certificate for the user
    async fn missing_prerequisites(
        &self,
        user_id: Uuid,
        course: &Course,
    ) -> Result<Vec<Uuid>, AppError> {
        let mut missing = Vec::new();
        for prerequisite_id in &course.prerequisite_ids {
            let certified = self
                .store
                .find_certificate(user_id, *prerequisite_id)
                .await?
                .is_some_and(|cert| cert.is_valid());
            if !certified {
                missing.push(*prerequisite_id);
            }
        }
        Ok(missing)
    }

    async fn load_course(&self, course_id: Uuid) -> Result<Course, AppError> {
        self.store
            .get_course(course_id)
            .await?
            .ok_or_else(|| DomainError::CourseNotFound(course_id).into())
    }
}
