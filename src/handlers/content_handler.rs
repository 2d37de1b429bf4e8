//! Content Handler
//!
//! Authoring of the content hierarchy and the read views built on it.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    Assignment, Category, ContentItem, Course, CourseModule, DomainError, Lesson,
    NewAssignment, NewCategory, NewCourse, NewLesson, NewModule, NewNotification,
    OperationContext,
};
use crate::error::AppError;
use crate::notification::Notifier;
use crate::store::{SharedStore, StoreError};

use super::{
    CertificateHandler, CourseContent, CourseDetail, LessonView, ModuleView, ProgressReport,
};

/// Handler for content authoring and course views
pub struct ContentHandler {
    store: SharedStore,
}

/// Turn a position clash reported by the store into a domain error
fn position_conflict(parent_id: Uuid, position: i32) -> impl FnOnce(StoreError) -> AppError {
    move |e| match e {
        StoreError::UniqueViolation { .. } => {
            DomainError::DuplicatePosition { parent_id, position }.into()
        }
        other => other.into(),
    }
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{} must not be empty", field)).into());
    }
    Ok(())
}

impl ContentHandler {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    // =========================================================================
    // Authoring
    // =========================================================================

    pub async fn create_category(
        &self,
        request: NewCategory,
        context: &OperationContext,
    ) -> Result<Category, AppError> {
        if !context.is_admin() {
            return Err(
                DomainError::permission_denied("only administrators manage categories").into(),
            );
        }
        require_text("name", &request.name)?;
        require_text("slug", &request.slug)?;

        let category = Category {
            id: Uuid::new_v4(),
            name: request.name,
            description: request.description,
            slug: request.slug,
            position: request.position,
            created_at: Utc::now(),
        };

        Ok(self.store.insert_category(category).await?)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        Ok(self.store.list_categories().await?)
    }

    /// Create a course taught by the actor
    pub async fn create_course(
        &self,
        request: NewCourse,
        context: &OperationContext,
    ) -> Result<Course, AppError> {
        if !context.can_author() {
            return Err(DomainError::permission_denied("only instructors create courses").into());
        }
        require_text("title", &request.title)?;
        if request.enrollment_limit.is_some_and(|limit| limit < 0) {
            return Err(
                DomainError::Validation("enrollment_limit must not be negative".to_string()).into(),
            );
        }

        if let Some(category_id) = request.category_id {
            self.ensure_category(category_id).await?;
        }

        for prerequisite_id in &request.prerequisite_ids {
            if self.store.get_course(*prerequisite_id).await?.is_none() {
                return Err(DomainError::CourseNotFound(*prerequisite_id).into());
            }
        }

        let now = Utc::now();
        let course = Course {
            id: Uuid::new_v4(),
            category_id: request.category_id,
            instructor_id: context.user_id,
            title: request.title,
            description: request.description,
            level: request.level,
            duration_hours: request.duration_hours,
            duration_minutes: request.duration_minutes,
            enrollment_limit: request.enrollment_limit,
            prerequisite_ids: request.prerequisite_ids,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let course = self.store.insert_course(course).await?;
        tracing::info!(
            course_id = %course.id,
            instructor_id = %course.instructor_id,
            "Course created"
        );
        Ok(course)
    }

    /// Active courses of the catalog, optionally within one category
    pub async fn list_courses(&self, category_id: Option<Uuid>) -> Result<Vec<Course>, AppError> {
        if let Some(category_id) = category_id {
            self.ensure_category(category_id).await?;
        }
        Ok(self.store.list_courses(category_id).await?)
    }

    pub async fn create_module(
        &self,
        request: NewModule,
        context: &OperationContext,
    ) -> Result<CourseModule, AppError> {
        require_text("title", &request.title)?;
        let course = self.load_course(request.course_id).await?;
        self.ensure_manager(context, &course)?;

        let module = CourseModule {
            id: Uuid::new_v4(),
            course_id: course.id,
            title: request.title,
            description: request.description,
            position: request.position,
            created_at: Utc::now(),
        };

        self.store
            .insert_module(module)
            .await
            .map_err(position_conflict(course.id, request.position))
    }

    pub async fn create_lesson(
        &self,
        request: NewLesson,
        context: &OperationContext,
    ) -> Result<Lesson, AppError> {
        require_text("title", &request.title)?;
        let module = self
            .store
            .get_module(request.module_id)
            .await?
            .ok_or(DomainError::ModuleNotFound(request.module_id))?;
        let course = self
            .load_course(ContentItem::Module(&module).owning_course())
            .await?;
        self.ensure_manager(context, &course)?;

        let lesson = Lesson {
            id: Uuid::new_v4(),
            module_id: module.id,
            course_id: course.id,
            title: request.title,
            content: request.content,
            video_url: request.video_url,
            position: request.position,
            created_at: Utc::now(),
        };

        self.store
            .insert_lesson(lesson)
            .await
            .map_err(position_conflict(module.id, request.position))
    }

    pub async fn create_assignment(
        &self,
        request: NewAssignment,
        context: &OperationContext,
    ) -> Result<Assignment, AppError> {
        require_text("title", &request.title)?;
        if request.max_score < 0 {
            return Err(
                DomainError::Validation("max_score must not be negative".to_string()).into(),
            );
        }

        let lesson = self
            .store
            .get_lesson(request.lesson_id)
            .await?
            .ok_or(DomainError::LessonNotFound(request.lesson_id))?;
        let course = self
            .load_course(ContentItem::Lesson(&lesson).owning_course())
            .await?;
        self.ensure_manager(context, &course)?;

        let assignment = Assignment {
            id: Uuid::new_v4(),
            lesson_id: lesson.id,
            course_id: course.id,
            title: request.title,
            description: request.description,
            due_date: request.due_date,
            max_score: request.max_score,
            points: request.points,
            created_at: Utc::now(),
        };

        let assignment = self.store.insert_assignment(assignment).await?;

        let notifier = Notifier::new(self.store.clone());
        for student_id in self.store.course_students(course.id).await? {
            notifier
                .notify(NewNotification::assignment_posted(
                    student_id,
                    &assignment.title,
                    &course.title,
                    assignment.due_date,
                ))
                .await;
        }

        Ok(assignment)
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub async fn course_detail(
        &self,
        course_id: Uuid,
        context: &OperationContext,
    ) -> Result<CourseDetail, AppError> {
        let course = self.load_course(course_id).await?;
        let student_count = self.store.count_enrollments(course.id).await?;
        let is_enrolled = self.store.is_enrolled(context.user_id, course.id).await?;

        let progress_percent = if is_enrolled {
            let progress = CertificateHandler::new(self.store.clone())
                .load_progress(context.user_id, course.id)
                .await?;
            Some(progress.percent())
        } else {
            None
        };

        Ok(CourseDetail {
            course,
            student_count,
            is_enrolled,
            progress_percent,
        })
    }

    /// Modules and lessons in order, flagged with the actor's completions
    pub async fn course_content(
        &self,
        course_id: Uuid,
        context: &OperationContext,
    ) -> Result<CourseContent, AppError> {
        let course = self.load_course(course_id).await?;
        if !context.can_manage(&course)
            && !self.store.is_enrolled(context.user_id, course.id).await?
        {
            return Err(DomainError::not_enrolled(context.user_id, course.id).into());
        }

        let completed = self
            .store
            .completed_lesson_ids(context.user_id, course.id)
            .await?;

        let mut modules = Vec::new();
        for module in self.store.list_modules(course.id).await? {
            let lessons = self
                .store
                .list_lessons(module.id)
                .await?
                .into_iter()
                .map(|lesson| LessonView {
                    completed: completed.contains(&lesson.id),
                    lesson,
                })
                .collect();
            modules.push(ModuleView { module, lessons });
        }

        Ok(CourseContent {
            course_id: course.id,
            modules,
        })
    }

    /// The actor's progress through a course they are enrolled in
    pub async fn progress(
        &self,
        course_id: Uuid,
        context: &OperationContext,
    ) -> Result<ProgressReport, AppError> {
        let course = self.load_course(course_id).await?;
        if !self.store.is_enrolled(context.user_id, course.id).await? {
            return Err(DomainError::not_enrolled(context.user_id, course.id).into());
        }

        let progress = CertificateHandler::new(self.store.clone())
            .load_progress(context.user_id, course.id)
            .await?;
        let certificate = self.store.find_certificate(context.user_id, course.id).await?;

        Ok(ProgressReport {
            percent: progress.percent(),
            complete: progress.is_complete(),
            progress,
            certificate,
        })
    }

    async fn load_course(&self, course_id: Uuid) -> Result<Course, AppError> {
        self.store
            .get_course(course_id)
            .await?
            .ok_or_else(|| DomainError::CourseNotFound(course_id).into())
    }

    async fn ensure_category(&self, category_id: Uuid) -> Result<(), AppError> {
        let known = self
            .store
            .list_categories()
            .await?
            .iter()
            .any(|c| c.id == category_id);
        if !known {
            return Err(DomainError::CategoryNotFound(category_id).into());
        }
        Ok(())
    }

    fn ensure_manager(&self, context: &OperationContext, course: &Course) -> Result<(), AppError> {
        if !context.can_manage(course) {
            return Err(DomainError::permission_denied(
                "only the course instructor or an administrator may edit its content",
            )
            .into());
        }
        Ok(())
    }
}
