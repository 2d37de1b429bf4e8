//! Completion Handler
//!
//! Records lesson completions and reacts to the thresholds they cross:
//! a module reaching 100% notifies once, a course reaching 100% hands off
//! to the certificate handler.

use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{DomainError, NewNotification, OperationContext};
use crate::error::AppError;
use crate::notification::Notifier;
use crate::store::{CompletionUpsert, SharedStore};

use super::{CertificateHandler, CompletionResult, IssueOutcome, MarkLessonCompleteCommand};

/// Attempts of the completion upsert under write conflicts
const MAX_RETRIES: u32 = 3;

/// Handler for lesson completion
#[derive(Clone)]
pub struct CompletionHandler {
    store: SharedStore,
    notifier: Notifier,
    certificates: CertificateHandler,
}

impl CompletionHandler {
    pub fn new(store: SharedStore) -> Self {
        Self {
            notifier: Notifier::new(store.clone()),
            certificates: CertificateHandler::new(store.clone()),
            store,
        }
    }

    /// Use a configured certificate handler for the automatic path
    pub fn with_certificates(mut self, certificates: CertificateHandler) -> Self {
        self.certificates = certificates;
        self
    }

    /// Execute the mark-complete command
    pub async fn execute(
        &self,
        command: MarkLessonCompleteCommand,
        context: &OperationContext,
    ) -> Result<CompletionResult, AppError> {
        if command.user_id != context.user_id && !context.is_admin() {
            return Err(DomainError::permission_denied(
                "cannot record progress for another user",
            )
            .into());
        }

        let user_id = command.user_id;
        let lesson = self
            .store
            .get_lesson(command.lesson_id)
            .await?
            .ok_or(DomainError::LessonNotFound(command.lesson_id))?;

        if !self.store.is_enrolled(user_id, lesson.course_id).await? {
            return Err(DomainError::not_enrolled(user_id, lesson.course_id).into());
        }

        let upsert = self.upsert_with_retry(user_id, lesson.id).await?;

        tracing::info!(
            %user_id,
            lesson_id = %lesson.id,
            created = upsert.created,
            "Lesson completed"
        );

        let (outline, progress) = self
            .certificates
            .load_outline_progress(user_id, lesson.course_id)
            .await?;

        let module_progress = progress.module(lesson.module_id);
        let module_ratio = module_progress.map(|m| m.ratio()).unwrap_or(0.0);

        let mut module_completed_now = false;
        if module_progress.is_some_and(|m| m.is_complete()) {
            module_completed_now = self
                .store
                .record_module_milestone(user_id, lesson.module_id, upsert.completion.completed_at)
                .await?;
        }

        let mut course = None;
        if module_completed_now || progress.is_complete() {
            course = self.store.get_course(lesson.course_id).await?;
        }

        if module_completed_now {
            let module_title = outline
                .module(lesson.module_id)
                .map(|m| m.title.as_str())
                .unwrap_or_default();
            let course_title = course.as_ref().map(|c| c.title.as_str()).unwrap_or_default();

            tracing::info!(%user_id, module_id = %lesson.module_id, "Module completed");
            self.notifier
                .notify(NewNotification::module_completed(
                    user_id,
                    module_title,
                    course_title,
                ))
                .await;
        }

        let mut course_completed_now = false;
        let mut certificate = None;
        if progress.is_complete() {
            let course = course.ok_or(DomainError::CourseNotFound(lesson.course_id))?;
            if let IssueOutcome::Issued(minted) =
                self.certificates.issue_if_complete(user_id, &course).await?
            {
                course_completed_now = true;
                certificate = Some(minted);
            }
        }

        Ok(CompletionResult {
            completion: upsert.completion,
            created: upsert.created,
            module_ratio,
            module_completed_now,
            course_completed_now,
            certificate,
        })
    }

    /// Upsert the completion, retrying on conflicting concurrent writes
    async fn upsert_with_retry(
        &self,
        user_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<CompletionUpsert, AppError> {
        for attempt in 0..MAX_RETRIES {
            match self
                .store
                .upsert_completion(user_id, lesson_id, Utc::now())
                .await
            {
                Ok(upsert) => return Ok(upsert),
                Err(e) if e.is_retryable() && attempt < MAX_RETRIES - 1 => {
                    let delay = Duration::from_millis(50 * (attempt as u64 + 1));
                    tokio::time::sleep(delay).await;
                    tracing::warn!(
                        "Completion write conflict, retrying (attempt {}/{})",
                        attempt + 1,
                        MAX_RETRIES
                    );
                    continue;
                }
                Err(e) if e.is_retryable() => break,
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::ConcurrentModificationRetry {
            attempts: MAX_RETRIES,
        }
        .into())
    }
}
