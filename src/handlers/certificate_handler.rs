//! Certificate Handler
//!
//! Decides from recorded completions whether a user finished a course and
//! mints the certificate at most once per (user, course). Reached from the
//! completion handler and from on-demand requests; both paths share
//! `load_progress` and `issue_if_complete`.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    Certificate, CertificateNumberSource, Course, CourseOutline, CourseProgress, DigestNumberSource,
    DomainError, NewNotification, OperationContext,
};
use crate::error::AppError;
use crate::notification::Notifier;
use crate::store::{InsertOutcome, SharedStore};

use super::{CertificateResult, GenerateCertificateCommand, IssueOutcome};

/// Mint attempts before a number collision is reported
pub const DEFAULT_MINT_ATTEMPTS: u32 = 5;

/// Handler for certificate issuance
#[derive(Clone)]
pub struct CertificateHandler {
    store: SharedStore,
    notifier: Notifier,
    numbers: Arc<dyn CertificateNumberSource>,
    max_attempts: u32,
}

impl CertificateHandler {
    pub fn new(store: SharedStore) -> Self {
        Self {
            notifier: Notifier::new(store.clone()),
            store,
            numbers: Arc::new(DigestNumberSource::default()),
            max_attempts: DEFAULT_MINT_ATTEMPTS,
        }
    }

    pub fn with_number_source(mut self, numbers: Arc<dyn CertificateNumberSource>) -> Self {
        self.numbers = numbers;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Recompute a user's progress through a course from the store
    pub async fn load_progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<CourseProgress, AppError> {
        let (_, progress) = self.load_outline_progress(user_id, course_id).await?;
        Ok(progress)
    }

    /// Progress together with the outline snapshot it was computed from
    pub async fn load_outline_progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<(CourseOutline, CourseProgress), AppError> {
        let outline = self.store.course_outline(course_id).await?;
        let completed = self.store.completed_lesson_ids(user_id, course_id).await?;
        let progress = CourseProgress::compute(&outline, &completed);

        tracing::debug!(
            %user_id,
            %course_id,
            completed = progress.completed_lessons(),
            total = progress.total_lessons(),
            "Course progress recomputed"
        );

        Ok((outline, progress))
    }

    /// Issue the certificate if the course is complete for the user.
    ///
    /// An existing certificate is returned without recomputing anything.
    pub async fn issue_if_complete(
        &self,
        user_id: Uuid,
        course: &Course,
    ) -> Result<IssueOutcome, AppError> {
        if let Some(existing) = self.store.find_certificate(user_id, course.id).await? {
            return Ok(IssueOutcome::AlreadyIssued(existing));
        }

        let progress = self.load_progress(user_id, course.id).await?;
        if !progress.is_complete() {
            return Ok(IssueOutcome::Abstained);
        }

        self.mint(user_id, course).await
    }

    async fn mint(&self, user_id: Uuid, course: &Course) -> Result<IssueOutcome, AppError> {
        for attempt in 1..=self.max_attempts {
            let minted_at = Utc::now();
            let number = self.numbers.generate(user_id, course.id, minted_at);
            let candidate = Certificate::issue(user_id, course.id, number, minted_at);

            match self.store.insert_certificate_if_absent(candidate).await {
                Ok(InsertOutcome::Inserted(certificate)) => {
                    tracing::info!(
                        %user_id,
                        course_id = %course.id,
                        certificate_number = %certificate.certificate_number,
                        "Certificate issued"
                    );
                    self.notifier
                        .notify(NewNotification::course_completed(
                            user_id,
                            &course.title,
                            &certificate.certificate_number,
                        ))
                        .await;
                    return Ok(IssueOutcome::Issued(certificate));
                }
                Ok(InsertOutcome::Existing(certificate)) => {
                    return Ok(IssueOutcome::AlreadyIssued(certificate));
                }
                Err(e) if e.is_certificate_number_collision() => {
                    tracing::warn!(
                        "Certificate number collision, retrying (attempt {}/{})",
                        attempt,
                        self.max_attempts
                    );
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::CertificateGenerationFailed {
            attempts: self.max_attempts,
        }
        .into())
    }

    /// On-demand issuance. Admins may target another user.
    pub async fn execute(
        &self,
        command: GenerateCertificateCommand,
        context: &OperationContext,
    ) -> Result<CertificateResult, AppError> {
        let user_id = match command.user_id {
            Some(user_id) if user_id != context.user_id => {
                if !context.is_admin() {
                    return Err(DomainError::permission_denied(
                        "only administrators may issue certificates for other users",
                    )
                    .into());
                }
                user_id
            }
            _ => context.user_id,
        };

        let course = self
            .store
            .get_course(command.course_id)
            .await?
            .ok_or(DomainError::CourseNotFound(command.course_id))?;

        match self.issue_if_complete(user_id, &course).await? {
            IssueOutcome::Issued(certificate) => Ok(CertificateResult {
                certificate,
                newly_issued: true,
            }),
            IssueOutcome::AlreadyIssued(certificate) => Ok(CertificateResult {
                certificate,
                newly_issued: false,
            }),
            IssueOutcome::Abstained => Err(DomainError::CourseNotComplete {
                user_id,
                course_id: course.id,
            }
            .into()),
        }
    }

    /// The actor's certificates; every certificate for an admin
    pub async fn list(&self, context: &OperationContext) -> Result<Vec<Certificate>, AppError> {
        let scope = if context.is_admin() {
            None
        } else {
            Some(context.user_id)
        };
        Ok(self.store.list_certificates(scope).await?)
    }
}
