//! In-memory Store
//!
//! Single-process implementation of every store trait. All state lives
//! behind one async mutex, so each trait method is one critical section
//! and conditional writes are atomic. Used by tests and by the
//! `STORAGE_BACKEND=memory` development mode.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    Assignment, Category, Certificate, Comment, Course, CourseModule, CourseOutline, Lesson,
    LessonCompletion, ModuleOutline, NewNotification, Notification, Submission,
};

use super::{
    CertificateStore, CommentStore, CompletionStore, CompletionUpsert, ContentStore, EnrollOutcome,
    EnrollmentStore, InsertOutcome, NotificationStore, StoreError, StoreResult, SubmissionStore,
    CERTIFICATE_NUMBER_CONSTRAINT,
};

#[derive(Debug, Default)]
struct MemoryState {
    categories: Vec<Category>,
    courses: HashMap<Uuid, Course>,
    modules: HashMap<Uuid, CourseModule>,
    lessons: HashMap<Uuid, Lesson>,
    assignments: HashMap<Uuid, Assignment>,
    /// (user, course)
    enrollments: HashSet<(Uuid, Uuid)>,
    /// (user, lesson)
    completions: HashMap<(Uuid, Uuid), LessonCompletion>,
    /// (user, module)
    milestones: HashSet<(Uuid, Uuid)>,
    /// (user, course)
    certificates: HashMap<(Uuid, Uuid), Certificate>,
    certificate_numbers: HashSet<String>,
    notifications: Vec<Notification>,
    submissions: Vec<Submission>,
    comments: Vec<Comment>,
}

impl MemoryState {
    fn sorted_modules(&self, course_id: Uuid) -> Vec<&CourseModule> {
        let mut modules: Vec<_> = self
            .modules
            .values()
            .filter(|m| m.course_id == course_id)
            .collect();
        modules.sort_by_key(|m| m.position);
        modules
    }

    fn sorted_lessons(&self, module_id: Uuid) -> Vec<&Lesson> {
        let mut lessons: Vec<_> = self
            .lessons
            .values()
            .filter(|l| l.module_id == module_id)
            .collect();
        lessons.sort_by_key(|l| l.position);
        lessons
    }
}

/// In-memory implementation of all store traits
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
    injected_conflicts: Arc<AtomicU32>,
    notifications_down: Arc<AtomicBool>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` completion upserts fail with `StoreError::Conflict`
    pub fn inject_completion_conflicts(&self, count: u32) {
        self.injected_conflicts.store(count, Ordering::SeqCst);
    }

    /// Make the notification sink reject (or accept again) every append
    pub fn set_notifications_down(&self, down: bool) {
        self.notifications_down.store(down, Ordering::SeqCst);
    }

    /// Number of stored lesson completions across all users
    pub async fn completion_count(&self) -> usize {
        self.state.lock().await.completions.len()
    }

    fn take_injected_conflict(&self) -> bool {
        self.injected_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

fn unique_violation(constraint: &str) -> StoreError {
    StoreError::UniqueViolation {
        constraint: constraint.to_string(),
    }
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn insert_category(&self, category: Category) -> StoreResult<Category> {
        let mut state = self.state.lock().await;
        if state.categories.iter().any(|c| c.slug == category.slug) {
            return Err(unique_violation("categories_slug_key"));
        }
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let state = self.state.lock().await;
        let mut categories = state.categories.clone();
        categories.sort_by_key(|c| c.position);
        Ok(categories)
    }

    async fn insert_course(&self, course: Course) -> StoreResult<Course> {
        let mut state = self.state.lock().await;
        if let Some(missing) = course
            .prerequisite_ids
            .iter()
            .find(|id| !state.courses.contains_key(id))
        {
            return Err(StoreError::MissingReference {
                entity: "Course",
                id: *missing,
            });
        }
        state.courses.insert(course.id, course.clone());
        Ok(course)
    }

    async fn get_course(&self, course_id: Uuid) -> StoreResult<Option<Course>> {
        Ok(self.state.lock().await.courses.get(&course_id).cloned())
    }

    async fn list_courses(&self, category_id: Option<Uuid>) -> StoreResult<Vec<Course>> {
        let state = self.state.lock().await;
        let mut courses: Vec<Course> = state
            .courses
            .values()
            .filter(|c| c.is_active)
            .filter(|c| category_id.map_or(true, |id| c.category_id == Some(id)))
            .cloned()
            .collect();
        courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(courses)
    }

    async fn insert_module(&self, module: CourseModule) -> StoreResult<CourseModule> {
        let mut state = self.state.lock().await;
        if !state.courses.contains_key(&module.course_id) {
            return Err(StoreError::MissingReference {
                entity: "Course",
                id: module.course_id,
            });
        }
        if state
            .modules
            .values()
            .any(|m| m.course_id == module.course_id && m.position == module.position)
        {
            return Err(unique_violation("course_modules_course_id_position_key"));
        }
        state.modules.insert(module.id, module.clone());
        Ok(module)
    }

    async fn get_module(&self, module_id: Uuid) -> StoreResult<Option<CourseModule>> {
        Ok(self.state.lock().await.modules.get(&module_id).cloned())
    }

    async fn insert_lesson(&self, lesson: Lesson) -> StoreResult<Lesson> {
        let mut state = self.state.lock().await;
        if !state.modules.contains_key(&lesson.module_id) {
            return Err(StoreError::MissingReference {
                entity: "Module",
                id: lesson.module_id,
            });
        }
        if state
            .lessons
            .values()
            .any(|l| l.module_id == lesson.module_id && l.position == lesson.position)
        {
            return Err(unique_violation("lessons_module_id_position_key"));
        }
        state.lessons.insert(lesson.id, lesson.clone());
        Ok(lesson)
    }

    async fn get_lesson(&self, lesson_id: Uuid) -> StoreResult<Option<Lesson>> {
        Ok(self.state.lock().await.lessons.get(&lesson_id).cloned())
    }

    async fn list_lessons(&self, module_id: Uuid) -> StoreResult<Vec<Lesson>> {
        let state = self.state.lock().await;
        Ok(state.sorted_lessons(module_id).into_iter().cloned().collect())
    }

    async fn list_modules(&self, course_id: Uuid) -> StoreResult<Vec<CourseModule>> {
        let state = self.state.lock().await;
        Ok(state.sorted_modules(course_id).into_iter().cloned().collect())
    }

    async fn insert_assignment(&self, assignment: Assignment) -> StoreResult<Assignment> {
        let mut state = self.state.lock().await;
        if !state.lessons.contains_key(&assignment.lesson_id) {
            return Err(StoreError::MissingReference {
                entity: "Lesson",
                id: assignment.lesson_id,
            });
        }
        state.assignments.insert(assignment.id, assignment.clone());
        Ok(assignment)
    }

    async fn get_assignment(&self, assignment_id: Uuid) -> StoreResult<Option<Assignment>> {
        Ok(self.state.lock().await.assignments.get(&assignment_id).cloned())
    }

    async fn course_outline(&self, course_id: Uuid) -> StoreResult<CourseOutline> {
        let state = self.state.lock().await;
        let modules = state
            .sorted_modules(course_id)
            .into_iter()
            .map(|module| ModuleOutline {
                module_id: module.id,
                title: module.title.clone(),
                lesson_ids: state
                    .sorted_lessons(module.id)
                    .into_iter()
                    .map(|l| l.id)
                    .collect(),
            })
            .collect();

        Ok(CourseOutline { course_id, modules })
    }
}

#[async_trait]
impl EnrollmentStore for InMemoryStore {
    async fn is_enrolled(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<bool> {
        Ok(self
            .state
            .lock()
            .await
            .enrollments
            .contains(&(user_id, course_id)))
    }

    async fn enroll(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        limit: Option<i32>,
    ) -> StoreResult<EnrollOutcome> {
        let mut state = self.state.lock().await;
        if state.enrollments.contains(&(user_id, course_id)) {
            return Ok(EnrollOutcome::AlreadyEnrolled);
        }
        if let Some(limit) = limit {
            let enrolled = state
                .enrollments
                .iter()
                .filter(|(_, c)| *c == course_id)
                .count();
            if enrolled as i64 >= i64::from(limit) {
                return Ok(EnrollOutcome::LimitReached);
            }
        }
        state.enrollments.insert((user_id, course_id));
        Ok(EnrollOutcome::Enrolled)
    }

    async fn unenroll(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<bool> {
        Ok(self
            .state
            .lock()
            .await
            .enrollments
            .remove(&(user_id, course_id)))
    }

    async fn count_enrollments(&self, course_id: Uuid) -> StoreResult<i64> {
        let state = self.state.lock().await;
        Ok(state
            .enrollments
            .iter()
            .filter(|(_, c)| *c == course_id)
            .count() as i64)
    }

    async fn course_students(&self, course_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let state = self.state.lock().await;
        Ok(state
            .enrollments
            .iter()
            .filter(|(_, c)| *c == course_id)
            .map(|(u, _)| *u)
            .collect())
    }

    async fn enrolled_courses(&self, user_id: Uuid) -> StoreResult<Vec<Course>> {
        let state = self.state.lock().await;
        let mut courses: Vec<Course> = state
            .enrollments
            .iter()
            .filter(|(u, _)| *u == user_id)
            .filter_map(|(_, c)| state.courses.get(c).cloned())
            .collect();
        courses.sort_by_key(|c| c.created_at);
        Ok(courses)
    }
}

#[async_trait]
impl CompletionStore for InMemoryStore {
    async fn upsert_completion(
        &self,
        user_id: Uuid,
        lesson_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> StoreResult<CompletionUpsert> {
        if self.take_injected_conflict() {
            return Err(StoreError::Conflict("injected conflict".to_string()));
        }

        let mut state = self.state.lock().await;
        let mut created = false;
        let completion = state
            .completions
            .entry((user_id, lesson_id))
            .and_modify(|c| c.completed_at = completed_at)
            .or_insert_with(|| {
                created = true;
                LessonCompletion {
                    id: Uuid::new_v4(),
                    user_id,
                    lesson_id,
                    completed_at,
                }
            })
            .clone();

        Ok(CompletionUpsert {
            completion,
            created,
        })
    }

    async fn completed_lesson_ids(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> StoreResult<HashSet<Uuid>> {
        let state = self.state.lock().await;
        Ok(state
            .completions
            .keys()
            .filter(|(u, lesson_id)| {
                *u == user_id
                    && state
                        .lessons
                        .get(lesson_id)
                        .is_some_and(|l| l.course_id == course_id)
            })
            .map(|(_, lesson_id)| *lesson_id)
            .collect())
    }

    async fn record_module_milestone(
        &self,
        user_id: Uuid,
        module_id: Uuid,
        _reached_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        Ok(self
            .state
            .lock()
            .await
            .milestones
            .insert((user_id, module_id)))
    }
}

#[async_trait]
impl CertificateStore for InMemoryStore {
    async fn find_certificate(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> StoreResult<Option<Certificate>> {
        Ok(self
            .state
            .lock()
            .await
            .certificates
            .get(&(user_id, course_id))
            .cloned())
    }

    async fn insert_certificate_if_absent(
        &self,
        certificate: Certificate,
    ) -> StoreResult<InsertOutcome<Certificate>> {
        let mut state = self.state.lock().await;
        let key = (certificate.user_id, certificate.course_id);

        if let Some(existing) = state.certificates.get(&key) {
            return Ok(InsertOutcome::Existing(existing.clone()));
        }
        if state
            .certificate_numbers
            .contains(&certificate.certificate_number)
        {
            return Err(unique_violation(CERTIFICATE_NUMBER_CONSTRAINT));
        }

        state
            .certificate_numbers
            .insert(certificate.certificate_number.clone());
        state.certificates.insert(key, certificate.clone());
        Ok(InsertOutcome::Inserted(certificate))
    }

    async fn list_certificates(&self, user_id: Option<Uuid>) -> StoreResult<Vec<Certificate>> {
        let state = self.state.lock().await;
        let mut certificates: Vec<Certificate> = state
            .certificates
            .values()
            .filter(|c| user_id.map_or(true, |u| c.user_id == u))
            .cloned()
            .collect();
        certificates.sort_by_key(|c| c.issued_at);
        Ok(certificates)
    }
}

#[async_trait]
impl NotificationStore for InMemoryStore {
    async fn append_notification(
        &self,
        notification: NewNotification,
    ) -> StoreResult<Notification> {
        if self.notifications_down.load(Ordering::SeqCst) {
            return Err(StoreError::SinkUnavailable(
                "notification sink is down".to_string(),
            ));
        }

        let stored = Notification {
            id: Uuid::new_v4(),
            user_id: notification.user_id,
            kind: notification.kind,
            title: notification.title,
            message: notification.message,
            read: false,
            created_at: Utc::now(),
        };
        self.state.lock().await.notifications.push(stored.clone());
        Ok(stored)
    }

    async fn list_notifications(&self, user_id: Uuid) -> StoreResult<Vec<Notification>> {
        let state = self.state.lock().await;
        Ok(state
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_notification_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        match state
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id && n.user_id == user_id)
        {
            Some(notification) => {
                notification.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl SubmissionStore for InMemoryStore {
    async fn insert_submission(&self, submission: Submission) -> StoreResult<Submission> {
        let mut state = self.state.lock().await;
        if !state.assignments.contains_key(&submission.assignment_id) {
            return Err(StoreError::MissingReference {
                entity: "Assignment",
                id: submission.assignment_id,
            });
        }
        state.submissions.push(submission.clone());
        Ok(submission)
    }

    async fn get_submission(&self, submission_id: Uuid) -> StoreResult<Option<Submission>> {
        let state = self.state.lock().await;
        Ok(state
            .submissions
            .iter()
            .find(|s| s.id == submission_id)
            .cloned())
    }

    async fn save_grade(&self, submission: &Submission) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let stored = state
            .submissions
            .iter_mut()
            .find(|s| s.id == submission.id)
            .ok_or(StoreError::MissingReference {
                entity: "Submission",
                id: submission.id,
            })?;

        stored.grade = submission.grade;
        stored.feedback = submission.feedback.clone();
        stored.graded_by = submission.graded_by;
        stored.graded_at = submission.graded_at;
        Ok(())
    }

    async fn list_submissions_by_student(&self, student_id: Uuid) -> StoreResult<Vec<Submission>> {
        let state = self.state.lock().await;
        Ok(state
            .submissions
            .iter()
            .filter(|s| s.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn list_pending_submissions(
        &self,
        instructor_id: Option<Uuid>,
    ) -> StoreResult<Vec<Submission>> {
        let state = self.state.lock().await;
        Ok(state
            .submissions
            .iter()
            .filter(|s| !s.is_graded())
            .filter(|s| match instructor_id {
                None => true,
                Some(instructor_id) => state
                    .assignments
                    .get(&s.assignment_id)
                    .and_then(|a| state.courses.get(&a.course_id))
                    .is_some_and(|c| c.instructor_id == instructor_id),
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CommentStore for InMemoryStore {
    async fn insert_comment(&self, comment: Comment) -> StoreResult<Comment> {
        let mut state = self.state.lock().await;
        if !state.lessons.contains_key(&comment.lesson_id) {
            return Err(StoreError::MissingReference {
                entity: "Lesson",
                id: comment.lesson_id,
            });
        }
        if let Some(parent_id) = comment.parent_id {
            if !state.comments.iter().any(|c| c.id == parent_id) {
                return Err(StoreError::MissingReference {
                    entity: "Comment",
                    id: parent_id,
                });
            }
        }
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, comment_id: Uuid) -> StoreResult<Option<Comment>> {
        let state = self.state.lock().await;
        Ok(state.comments.iter().find(|c| c.id == comment_id).cloned())
    }

    async fn list_comments(&self, lesson_id: Uuid) -> StoreResult<Vec<Comment>> {
        let state = self.state.lock().await;
        Ok(state
            .comments
            .iter()
            .rev()
            .filter(|c| c.lesson_id == lesson_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CourseLevel, NotificationKind};

    fn course(id: Uuid) -> Course {
        Course {
            id,
            category_id: None,
            instructor_id: Uuid::new_v4(),
            title: "Systems".to_string(),
            description: String::new(),
            level: CourseLevel::Beginner,
            duration_hours: 1,
            duration_minutes: 0,
            enrollment_limit: None,
            prerequisite_ids: Vec::new(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn module(course_id: Uuid, position: i32) -> CourseModule {
        CourseModule {
            id: Uuid::new_v4(),
            course_id,
            title: format!("Module {}", position),
            description: String::new(),
            position,
            created_at: Utc::now(),
        }
    }

    fn lesson(module: &CourseModule, position: i32) -> Lesson {
        Lesson {
            id: Uuid::new_v4(),
            module_id: module.id,
            course_id: module.course_id,
            title: format!("Lesson {}", position),
            content: String::new(),
            video_url: None,
            position,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_upsert_completion_refreshes_in_place() {
        let store = InMemoryStore::new();
        let user_id = Uuid::new_v4();
        let lesson_id = Uuid::new_v4();

        let first = store
            .upsert_completion(user_id, lesson_id, Utc::now())
            .await
            .unwrap();
        let later = Utc::now() + chrono::Duration::seconds(5);
        let second = store.upsert_completion(user_id, lesson_id, later).await.unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.completion.id, second.completion.id);
        assert_eq!(second.completion.completed_at, later);
        assert_eq!(store.completion_count().await, 1);
    }

    #[tokio::test]
    async fn test_outline_is_ordered_by_position() {
        let store = InMemoryStore::new();
        let course_id = Uuid::new_v4();
        store.insert_course(course(course_id)).await.unwrap();

        let second = store.insert_module(module(course_id, 2)).await.unwrap();
        let first = store.insert_module(module(course_id, 1)).await.unwrap();
        let l2 = store.insert_lesson(lesson(&first, 2)).await.unwrap();
        let l1 = store.insert_lesson(lesson(&first, 1)).await.unwrap();

        let outline = store.course_outline(course_id).await.unwrap();
        assert_eq!(outline.modules.len(), 2);
        assert_eq!(outline.modules[0].module_id, first.id);
        assert_eq!(outline.modules[0].lesson_ids, vec![l1.id, l2.id]);
        assert_eq!(outline.modules[1].module_id, second.id);
        assert!(outline.modules[1].lesson_ids.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_lesson_position_rejected() {
        let store = InMemoryStore::new();
        let course_id = Uuid::new_v4();
        store.insert_course(course(course_id)).await.unwrap();
        let m = store.insert_module(module(course_id, 1)).await.unwrap();

        store.insert_lesson(lesson(&m, 1)).await.unwrap();
        let err = store.insert_lesson(lesson(&m, 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_certificate_insert_if_absent() {
        let store = InMemoryStore::new();
        let user_id = Uuid::new_v4();
        let course_id = Uuid::new_v4();

        let first = Certificate::issue(user_id, course_id, "CERT-A".to_string(), Utc::now());
        let second = Certificate::issue(user_id, course_id, "CERT-B".to_string(), Utc::now());

        let outcome = store.insert_certificate_if_absent(first.clone()).await.unwrap();
        assert!(outcome.was_inserted());

        let outcome = store.insert_certificate_if_absent(second).await.unwrap();
        assert_eq!(outcome, InsertOutcome::Existing(first));
    }

    #[tokio::test]
    async fn test_certificate_number_collision() {
        let store = InMemoryStore::new();
        let taken = Certificate::issue(Uuid::new_v4(), Uuid::new_v4(), "CERT-X".to_string(), Utc::now());
        let clash = Certificate::issue(Uuid::new_v4(), Uuid::new_v4(), "CERT-X".to_string(), Utc::now());

        store.insert_certificate_if_absent(taken).await.unwrap();
        let err = store.insert_certificate_if_absent(clash).await.unwrap_err();
        assert!(err.is_certificate_number_collision());
    }

    #[tokio::test]
    async fn test_enrollment_limit() {
        let store = InMemoryStore::new();
        let course_id = Uuid::new_v4();

        let first = store.enroll(Uuid::new_v4(), course_id, Some(1)).await.unwrap();
        let second = store.enroll(Uuid::new_v4(), course_id, Some(1)).await.unwrap();

        assert_eq!(first, EnrollOutcome::Enrolled);
        assert_eq!(second, EnrollOutcome::LimitReached);
        assert_eq!(store.count_enrollments(course_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_injected_conflicts_are_consumed() {
        let store = InMemoryStore::new();
        store.inject_completion_conflicts(1);

        let user_id = Uuid::new_v4();
        let lesson_id = Uuid::new_v4();
        let err = store
            .upsert_completion(user_id, lesson_id, Utc::now())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(store
            .upsert_completion(user_id, lesson_id, Utc::now())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_notifications_newest_first_and_read_flag() {
        let store = InMemoryStore::new();
        let user_id = Uuid::new_v4();

        store
            .append_notification(NewNotification::new(user_id, NotificationKind::Grade, "a", "first"))
            .await
            .unwrap();
        let latest = store
            .append_notification(NewNotification::new(user_id, NotificationKind::Grade, "b", "second"))
            .await
            .unwrap();

        let listed = store.list_notifications(user_id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, latest.id);

        assert!(store.mark_notification_read(user_id, latest.id).await.unwrap());
        assert!(!store
            .mark_notification_read(Uuid::new_v4(), latest.id)
            .await
            .unwrap());
        assert!(store.list_notifications(user_id).await.unwrap()[0].read);
    }

    #[tokio::test]
    async fn test_list_courses_skips_inactive_and_filters_category() {
        let store = InMemoryStore::new();
        let category_id = Uuid::new_v4();

        let mut filed = course(Uuid::new_v4());
        filed.category_id = Some(category_id);
        let loose = course(Uuid::new_v4());
        let mut retired = course(Uuid::new_v4());
        retired.is_active = false;
        retired.category_id = Some(category_id);

        for c in [filed.clone(), loose.clone(), retired] {
            store.insert_course(c).await.unwrap();
        }

        assert_eq!(store.list_courses(None).await.unwrap().len(), 2);
        let in_category = store.list_courses(Some(category_id)).await.unwrap();
        assert_eq!(in_category, vec![filed]);
    }

    #[tokio::test]
    async fn test_comment_reply_needs_known_parent() {
        let store = InMemoryStore::new();
        let course_id = Uuid::new_v4();
        store.insert_course(course(course_id)).await.unwrap();
        let m = store.insert_module(module(course_id, 1)).await.unwrap();
        let l = store.insert_lesson(lesson(&m, 1)).await.unwrap();

        let orphan = Comment::new(l.id, Uuid::new_v4(), Some(Uuid::new_v4()), "hi".to_string());
        let err = store.insert_comment(orphan).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingReference { entity: "Comment", .. }));

        let first = store
            .insert_comment(Comment::new(l.id, Uuid::new_v4(), None, "first".to_string()))
            .await
            .unwrap();
        let reply = store
            .insert_comment(Comment::new(l.id, Uuid::new_v4(), Some(first.id), "second".to_string()))
            .await
            .unwrap();

        let listed = store.list_comments(l.id).await.unwrap();
        assert_eq!(listed.iter().map(|c| c.id).collect::<Vec<_>>(), vec![reply.id, first.id]);
    }
}
