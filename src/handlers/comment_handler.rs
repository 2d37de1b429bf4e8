//! Comment Handler
//!
//! Lesson discussion threads. Course members and the course's managers
//! may post; a reply notifies the author of the parent comment.

use uuid::Uuid;

use crate::domain::{
    Comment, ContentItem, DomainError, Lesson, NewComment, NewNotification, OperationContext,
};
use crate::error::AppError;
use crate::notification::Notifier;
use crate::store::SharedStore;

/// Handler for lesson comments
pub struct CommentHandler {
    store: SharedStore,
    notifier: Notifier,
}

impl CommentHandler {
    pub fn new(store: SharedStore) -> Self {
        Self {
            notifier: Notifier::new(store.clone()),
            store,
        }
    }

    /// Post a comment or a reply under a lesson
    pub async fn post(
        &self,
        lesson_id: Uuid,
        request: NewComment,
        context: &OperationContext,
    ) -> Result<Comment, AppError> {
        if request.content.trim().is_empty() {
            return Err(DomainError::Validation("content must not be empty".to_string()).into());
        }

        let lesson = self.load_lesson(lesson_id).await?;
        self.ensure_participant(&lesson, context).await?;

        let parent = match request.parent_id {
            Some(parent_id) => {
                let parent = self
                    .store
                    .get_comment(parent_id)
                    .await?
                    .ok_or(DomainError::CommentNotFound(parent_id))?;
                if parent.lesson_id != lesson.id {
                    return Err(DomainError::Validation(
                        "a reply must stay under the lesson of its parent".to_string(),
                    )
                    .into());
                }
                Some(parent)
            }
            None => None,
        };

        let comment = self
            .store
            .insert_comment(Comment::new(
                lesson.id,
                context.user_id,
                request.parent_id,
                request.content,
            ))
            .await?;

        tracing::info!(
            comment_id = %comment.id,
            lesson_id = %lesson.id,
            user_id = %context.user_id,
            reply = comment.is_reply(),
            "Comment posted"
        );

        if let Some(parent) = parent.filter(|p| p.user_id != context.user_id) {
            self.notifier
                .notify(NewNotification::comment_reply(parent.user_id, &lesson.title))
                .await;
        }

        Ok(comment)
    }

    /// Comments of a lesson, newest first
    pub async fn list(&self, lesson_id: Uuid) -> Result<Vec<Comment>, AppError> {
        let lesson = self.load_lesson(lesson_id).await?;
        Ok(self.store.list_comments(lesson.id).await?)
    }

    async fn load_lesson(&self, lesson_id: Uuid) -> Result<Lesson, AppError> {
        self.store
            .get_lesson(lesson_id)
            .await?
            .ok_or_else(|| DomainError::LessonNotFound(lesson_id).into())
    }

    async fn ensure_participant(
        &self,
        lesson: &Lesson,
        context: &OperationContext,
    ) -> Result<(), AppError> {
        let course_id = ContentItem::Lesson(lesson).owning_course();
        let course = self
            .store
            .get_course(course_id)
            .await?
            .ok_or(DomainError::CourseNotFound(course_id))?;

        if context.can_manage(&course) || self.store.is_enrolled(context.user_id, course.id).await? {
            return Ok(());
        }
        Err(DomainError::not_enrolled(context.user_id, course.id).into())
    }
}
