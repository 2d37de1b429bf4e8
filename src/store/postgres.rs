//! PostgreSQL Store
//!
//! sqlx implementation of the store traits. Uniqueness invariants are
//! backed by constraints in `migrations/0001_initial.sql` and written with
//! `INSERT ... ON CONFLICT`.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::{
    Assignment, Category, Certificate, CertificateStatus, Comment, Course, CourseLevel, CourseModule,
    CourseOutline, Lesson, LessonCompletion, ModuleOutline, NewNotification, Notification,
    NotificationKind, Submission,
};

use super::{
    CertificateStore, CommentStore, CompletionStore, CompletionUpsert, ContentStore, EnrollOutcome,
    EnrollmentStore, InsertOutcome, NotificationStore, StoreError, StoreResult, SubmissionStore,
};

// =========================================================================
// Row types
// =========================================================================

#[derive(Debug, FromRow)]
struct CourseRow {
    id: Uuid,
    category_id: Option<Uuid>,
    instructor_id: Uuid,
    title: String,
    description: String,
    level: String,
    duration_hours: i32,
    duration_minutes: i32,
    enrollment_limit: Option<i32>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CourseRow {
    fn into_course(self, prerequisite_ids: Vec<Uuid>) -> Course {
        Course {
            id: self.id,
            category_id: self.category_id,
            instructor_id: self.instructor_id,
            title: self.title,
            description: self.description,
            level: CourseLevel::from(self.level),
            duration_hours: self.duration_hours,
            duration_minutes: self.duration_minutes,
            enrollment_limit: self.enrollment_limit,
            prerequisite_ids,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct CompletionRow {
    id: Uuid,
    user_id: Uuid,
    lesson_id: Uuid,
    completed_at: DateTime<Utc>,
    inserted: bool,
}

#[derive(Debug, FromRow)]
struct CertificateRow {
    id: Uuid,
    user_id: Uuid,
    course_id: Uuid,
    certificate_number: String,
    status: String,
    issued_at: DateTime<Utc>,
}

impl From<CertificateRow> for Certificate {
    fn from(row: CertificateRow) -> Self {
        Certificate {
            id: row.id,
            user_id: row.user_id,
            course_id: row.course_id,
            certificate_number: row.certificate_number,
            status: CertificateStatus::from(row.status),
            issued_at: row.issued_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct NotificationRow {
    id: Uuid,
    user_id: Uuid,
    kind: String,
    title: String,
    message: String,
    read: bool,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: row.id,
            user_id: row.user_id,
            kind: NotificationKind::from(row.kind),
            title: row.title,
            message: row.message,
            read: row.read,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct SubmissionRow {
    id: Uuid,
    assignment_id: Uuid,
    student_id: Uuid,
    file_ref: String,
    grade: Option<i32>,
    feedback: String,
    graded_by: Option<Uuid>,
    submitted_at: DateTime<Utc>,
    graded_at: Option<DateTime<Utc>>,
}

impl From<SubmissionRow> for Submission {
    fn from(row: SubmissionRow) -> Self {
        Submission {
            id: row.id,
            assignment_id: row.assignment_id,
            student_id: row.student_id,
            file_ref: row.file_ref,
            grade: row.grade,
            feedback: row.feedback,
            graded_by: row.graded_by,
            submitted_at: row.submitted_at,
            graded_at: row.graded_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct CommentRow {
    id: Uuid,
    lesson_id: Uuid,
    user_id: Uuid,
    parent_id: Option<Uuid>,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            lesson_id: row.lesson_id,
            user_id: row.user_id,
            parent_id: row.parent_id,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

const COURSE_COLUMNS: &str = r#"
    c.id, c.category_id, c.instructor_id, c.title, c.description, c.level,
    c.duration_hours, c.duration_minutes, c.enrollment_limit, c.is_active,
    c.created_at, c.updated_at
"#;

const LESSON_SELECT: &str = r#"
    SELECT l.id, l.module_id, m.course_id, l.title, l.content, l.video_url, l.position, l.created_at
    FROM lessons l
    JOIN course_modules m ON m.id = l.module_id
"#;

const ASSIGNMENT_SELECT: &str = r#"
    SELECT a.id, a.lesson_id, m.course_id, a.title, a.description, a.due_date,
           a.max_score, a.points, a.created_at
    FROM assignments a
    JOIN lessons l ON l.id = a.lesson_id
    JOIN course_modules m ON m.id = l.module_id
"#;

const SUBMISSION_COLUMNS: &str = r#"
    s.id, s.assignment_id, s.student_id, s.file_ref, s.grade, s.feedback,
    s.graded_by, s.submitted_at, s.graded_at
"#;

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new PgStore with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn prerequisites_of(&self, course_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT prerequisite_id FROM course_prerequisites
            WHERE course_id = $1
            ORDER BY prerequisite_id
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}

type LessonTuple = (
    Uuid,
    Uuid,
    Uuid,
    String,
    String,
    Option<String>,
    i32,
    DateTime<Utc>,
);

fn lesson_from_row(
    (id, module_id, course_id, title, content, video_url, position, created_at): LessonTuple,
) -> Lesson {
    Lesson {
        id,
        module_id,
        course_id,
        title,
        content,
        video_url,
        position,
        created_at,
    }
}

// =========================================================================
// ContentStore
// =========================================================================

#[async_trait]
impl ContentStore for PgStore {
    async fn insert_category(&self, category: Category) -> StoreResult<Category> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, slug, position, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.slug)
        .bind(category.position)
        .bind(category.created_at)
        .execute(&self.pool)
        .await?;

        Ok(category)
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let rows: Vec<(Uuid, String, String, String, i32, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT id, name, description, slug, position, created_at
            FROM categories
            ORDER BY position, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, description, slug, position, created_at)| Category {
                id,
                name,
                description,
                slug,
                position,
                created_at,
            })
            .collect())
    }

    async fn insert_course(&self, course: Course) -> StoreResult<Course> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO courses (
                id, category_id, instructor_id, title, description, level,
                duration_hours, duration_minutes, enrollment_limit, is_active,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(course.id)
        .bind(course.category_id)
        .bind(course.instructor_id)
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.level.to_string())
        .bind(course.duration_hours)
        .bind(course.duration_minutes)
        .bind(course.enrollment_limit)
        .bind(course.is_active)
        .bind(course.created_at)
        .bind(course.updated_at)
        .execute(&mut *tx)
        .await?;

        for prerequisite_id in &course.prerequisite_ids {
            sqlx::query(
                "INSERT INTO course_prerequisites (course_id, prerequisite_id) VALUES ($1, $2)",
            )
            .bind(course.id)
            .bind(prerequisite_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(course)
    }

    async fn get_course(&self, course_id: Uuid) -> StoreResult<Option<Course>> {
        let row: Option<CourseRow> =
            sqlx::query_as(&format!("SELECT {} FROM courses c WHERE c.id = $1", COURSE_COLUMNS))
                .bind(course_id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => {
                let prerequisites = self.prerequisites_of(row.id).await?;
                Ok(Some(row.into_course(prerequisites)))
            }
            None => Ok(None),
        }
    }

    async fn list_courses(&self, category_id: Option<Uuid>) -> StoreResult<Vec<Course>> {
        let rows: Vec<CourseRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM courses c
            WHERE c.is_active AND ($1::uuid IS NULL OR c.category_id = $1)
            ORDER BY c.created_at DESC
            "#,
            COURSE_COLUMNS
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        let mut courses = Vec::with_capacity(rows.len());
        for row in rows {
            let prerequisites = self.prerequisites_of(row.id).await?;
            courses.push(row.into_course(prerequisites));
        }
        Ok(courses)
    }

    async fn insert_module(&self, module: CourseModule) -> StoreResult<CourseModule> {
        sqlx::query(
            r#"
            INSERT INTO course_modules (id, course_id, title, description, position, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(module.id)
        .bind(module.course_id)
        .bind(&module.title)
        .bind(&module.description)
        .bind(module.position)
        .bind(module.created_at)
        .execute(&self.pool)
        .await?;

        Ok(module)
    }

    async fn get_module(&self, module_id: Uuid) -> StoreResult<Option<CourseModule>> {
        let row: Option<(Uuid, Uuid, String, String, i32, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT id, course_id, title, description, position, created_at
            FROM course_modules
            WHERE id = $1
            "#,
        )
        .bind(module_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(
            |(id, course_id, title, description, position, created_at)| CourseModule {
                id,
                course_id,
                title,
                description,
                position,
                created_at,
            },
        ))
    }

    async fn insert_lesson(&self, lesson: Lesson) -> StoreResult<Lesson> {
        sqlx::query(
            r#"
            INSERT INTO lessons (id, module_id, title, content, video_url, position, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(lesson.id)
        .bind(lesson.module_id)
        .bind(&lesson.title)
        .bind(&lesson.content)
        .bind(&lesson.video_url)
        .bind(lesson.position)
        .bind(lesson.created_at)
        .execute(&self.pool)
        .await?;

        Ok(lesson)
    }

    async fn get_lesson(&self, lesson_id: Uuid) -> StoreResult<Option<Lesson>> {
        let row: Option<LessonTuple> =
            sqlx::query_as(&format!("{} WHERE l.id = $1", LESSON_SELECT))
            .bind(lesson_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(lesson_from_row))
    }

    async fn list_lessons(&self, module_id: Uuid) -> StoreResult<Vec<Lesson>> {
        let rows: Vec<LessonTuple> = sqlx::query_as(&format!(
            "{} WHERE l.module_id = $1 ORDER BY l.position",
            LESSON_SELECT
        ))
        .bind(module_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(lesson_from_row).collect())
    }

    async fn list_modules(&self, course_id: Uuid) -> StoreResult<Vec<CourseModule>> {
        let rows: Vec<(Uuid, Uuid, String, String, i32, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT id, course_id, title, description, position, created_at
            FROM course_modules
            WHERE course_id = $1
            ORDER BY position
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(id, course_id, title, description, position, created_at)| CourseModule {
                    id,
                    course_id,
                    title,
                    description,
                    position,
                    created_at,
                },
            )
            .collect())
    }

    async fn insert_assignment(&self, assignment: Assignment) -> StoreResult<Assignment> {
        sqlx::query(
            r#"
            INSERT INTO assignments (
                id, lesson_id, title, description, due_date, max_score, points, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(assignment.id)
        .bind(assignment.lesson_id)
        .bind(&assignment.title)
        .bind(&assignment.description)
        .bind(assignment.due_date)
        .bind(assignment.max_score)
        .bind(assignment.points)
        .bind(assignment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(assignment)
    }

    async fn get_assignment(&self, assignment_id: Uuid) -> StoreResult<Option<Assignment>> {
        let row: Option<(Uuid, Uuid, Uuid, String, String, DateTime<Utc>, i32, i32, DateTime<Utc>)> =
            sqlx::query_as(&format!("{} WHERE a.id = $1", ASSIGNMENT_SELECT))
                .bind(assignment_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(
            |(id, lesson_id, course_id, title, description, due_date, max_score, points, created_at)| {
                Assignment {
                    id,
                    lesson_id,
                    course_id,
                    title,
                    description,
                    due_date,
                    max_score,
                    points,
                    created_at,
                }
            },
        ))
    }

    async fn course_outline(&self, course_id: Uuid) -> StoreResult<CourseOutline> {
        // One statement, so modules and lessons come from the same snapshot
        let rows: Vec<(Uuid, String, Option<Uuid>)> = sqlx::query_as(
            r#"
            SELECT m.id, m.title, l.id
            FROM course_modules m
            LEFT JOIN lessons l ON l.module_id = m.id
            WHERE m.course_id = $1
            ORDER BY m.position, l.position
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        let mut modules: Vec<ModuleOutline> = Vec::new();
        for (module_id, title, lesson_id) in rows {
            if modules.last().map(|m| m.module_id) != Some(module_id) {
                modules.push(ModuleOutline {
                    module_id,
                    title,
                    lesson_ids: Vec::new(),
                });
            }
            if let (Some(lesson_id), Some(module)) = (lesson_id, modules.last_mut()) {
                module.lesson_ids.push(lesson_id);
            }
        }

        Ok(CourseOutline { course_id, modules })
    }
}

// =========================================================================
// EnrollmentStore
// =========================================================================

#[async_trait]
impl EnrollmentStore for PgStore {
    async fn is_enrolled(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM enrollments WHERE user_id = $1 AND course_id = $2)",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn enroll(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        limit: Option<i32>,
    ) -> StoreResult<EnrollOutcome> {
        let mut tx = self.pool.begin().await?;

        // Serialize enrollments of the same course so the cap holds
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM courses WHERE id = $1 FOR UPDATE")
                .bind(course_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(StoreError::MissingReference {
                entity: "Course",
                id: course_id,
            });
        }

        let already: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM enrollments WHERE user_id = $1 AND course_id = $2)",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(&mut *tx)
        .await?;
        if already {
            return Ok(EnrollOutcome::AlreadyEnrolled);
        }

        if let Some(limit) = limit {
            let enrolled: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE course_id = $1")
                    .bind(course_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if enrolled >= i64::from(limit) {
                return Ok(EnrollOutcome::LimitReached);
            }
        }

        sqlx::query(
            r#"
            INSERT INTO enrollments (user_id, course_id, enrolled_at)
            VALUES ($1, $2, NOW())
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(EnrollOutcome::Enrolled)
    }

    async fn unenroll(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<bool> {
        let rows = sqlx::query("DELETE FROM enrollments WHERE user_id = $1 AND course_id = $2")
            .bind(user_id)
            .bind(course_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }

    async fn count_enrollments(&self, course_id: Uuid) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE course_id = $1")
            .bind(course_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn course_students(&self, course_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT user_id FROM enrollments WHERE course_id = $1")
                .bind(course_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids)
    }

    async fn enrolled_courses(&self, user_id: Uuid) -> StoreResult<Vec<Course>> {
        let rows: Vec<CourseRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM courses c
            JOIN enrollments e ON e.course_id = c.id
            WHERE e.user_id = $1
            ORDER BY c.created_at
            "#,
            COURSE_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut courses = Vec::with_capacity(rows.len());
        for row in rows {
            let prerequisites = self.prerequisites_of(row.id).await?;
            courses.push(row.into_course(prerequisites));
        }
        Ok(courses)
    }
}

// =========================================================================
// CompletionStore
// =========================================================================

#[async_trait]
impl CompletionStore for PgStore {
    async fn upsert_completion(
        &self,
        user_id: Uuid,
        lesson_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> StoreResult<CompletionUpsert> {
        // xmax = 0 only for a freshly inserted tuple
        let row: CompletionRow = sqlx::query_as(
            r#"
            INSERT INTO lesson_completions (id, user_id, lesson_id, completed_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, lesson_id)
            DO UPDATE SET completed_at = EXCLUDED.completed_at
            RETURNING id, user_id, lesson_id, completed_at, (xmax = 0) AS inserted
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(lesson_id)
        .bind(completed_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(CompletionUpsert {
            completion: LessonCompletion {
                id: row.id,
                user_id: row.user_id,
                lesson_id: row.lesson_id,
                completed_at: row.completed_at,
            },
            created: row.inserted,
        })
    }

    async fn completed_lesson_ids(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> StoreResult<HashSet<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT lc.lesson_id
            FROM lesson_completions lc
            JOIN lessons l ON l.id = lc.lesson_id
            JOIN course_modules m ON m.id = l.module_id
            WHERE lc.user_id = $1 AND m.course_id = $2
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn record_module_milestone(
        &self,
        user_id: Uuid,
        module_id: Uuid,
        reached_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let rows = sqlx::query(
            r#"
            INSERT INTO module_milestones (user_id, module_id, reached_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, module_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(module_id)
        .bind(reached_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows == 1)
    }
}

// =========================================================================
// CertificateStore
// =========================================================================

#[async_trait]
impl CertificateStore for PgStore {
    async fn find_certificate(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> StoreResult<Option<Certificate>> {
        let row: Option<CertificateRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, course_id, certificate_number, status, issued_at
            FROM certificates
            WHERE user_id = $1 AND course_id = $2
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Certificate::from))
    }

    async fn insert_certificate_if_absent(
        &self,
        certificate: Certificate,
    ) -> StoreResult<InsertOutcome<Certificate>> {
        let inserted: Option<CertificateRow> = sqlx::query_as(
            r#"
            INSERT INTO certificates (id, user_id, course_id, certificate_number, status, issued_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, course_id) DO NOTHING
            RETURNING id, user_id, course_id, certificate_number, status, issued_at
            "#,
        )
        .bind(certificate.id)
        .bind(certificate.user_id)
        .bind(certificate.course_id)
        .bind(&certificate.certificate_number)
        .bind(certificate.status.to_string())
        .bind(certificate.issued_at)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok(InsertOutcome::Inserted(row.into()));
        }

        // Lost the race: the winner's row is committed once ON CONFLICT fires
        let existing = self
            .find_certificate(certificate.user_id, certificate.course_id)
            .await?
            .ok_or(StoreError::MissingReference {
                entity: "Certificate",
                id: certificate.course_id,
            })?;

        Ok(InsertOutcome::Existing(existing))
    }

    async fn list_certificates(&self, user_id: Option<Uuid>) -> StoreResult<Vec<Certificate>> {
        let rows: Vec<CertificateRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, course_id, certificate_number, status, issued_at
            FROM certificates
            WHERE $1::uuid IS NULL OR user_id = $1
            ORDER BY issued_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Certificate::from).collect())
    }
}

// =========================================================================
// NotificationStore
// =========================================================================

#[async_trait]
impl NotificationStore for PgStore {
    async fn append_notification(
        &self,
        notification: NewNotification,
    ) -> StoreResult<Notification> {
        let row: NotificationRow = sqlx::query_as(
            r#"
            INSERT INTO notifications (id, user_id, kind, title, message, read, created_at)
            VALUES ($1, $2, $3, $4, $5, false, NOW())
            RETURNING id, user_id, kind, title, message, read, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(notification.user_id)
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list_notifications(&self, user_id: Uuid) -> StoreResult<Vec<Notification>> {
        let rows: Vec<NotificationRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, kind, title, message, read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 200
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Notification::from).collect())
    }

    async fn mark_notification_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> StoreResult<bool> {
        let rows = sqlx::query(
            "UPDATE notifications SET read = true WHERE id = $1 AND user_id = $2",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows > 0)
    }
}

// =========================================================================
// SubmissionStore
// =========================================================================

#[async_trait]
impl SubmissionStore for PgStore {
    async fn insert_submission(&self, submission: Submission) -> StoreResult<Submission> {
        sqlx::query(
            r#"
            INSERT INTO submissions (
                id, assignment_id, student_id, file_ref, grade, feedback,
                graded_by, submitted_at, graded_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(submission.id)
        .bind(submission.assignment_id)
        .bind(submission.student_id)
        .bind(&submission.file_ref)
        .bind(submission.grade)
        .bind(&submission.feedback)
        .bind(submission.graded_by)
        .bind(submission.submitted_at)
        .bind(submission.graded_at)
        .execute(&self.pool)
        .await?;

        Ok(submission)
    }

    async fn get_submission(&self, submission_id: Uuid) -> StoreResult<Option<Submission>> {
        let row: Option<SubmissionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM submissions s WHERE s.id = $1",
            SUBMISSION_COLUMNS
        ))
        .bind(submission_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Submission::from))
    }

    async fn save_grade(&self, submission: &Submission) -> StoreResult<()> {
        let rows = sqlx::query(
            r#"
            UPDATE submissions
            SET grade = $2, feedback = $3, graded_by = $4, graded_at = $5
            WHERE id = $1
            "#,
        )
        .bind(submission.id)
        .bind(submission.grade)
        .bind(&submission.feedback)
        .bind(submission.graded_by)
        .bind(submission.graded_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(StoreError::MissingReference {
                entity: "Submission",
                id: submission.id,
            });
        }
        Ok(())
    }

    async fn list_submissions_by_student(&self, student_id: Uuid) -> StoreResult<Vec<Submission>> {
        let rows: Vec<SubmissionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM submissions s WHERE s.student_id = $1 ORDER BY s.submitted_at",
            SUBMISSION_COLUMNS
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Submission::from).collect())
    }

    async fn list_pending_submissions(
        &self,
        instructor_id: Option<Uuid>,
    ) -> StoreResult<Vec<Submission>> {
        let rows: Vec<SubmissionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM submissions s
            JOIN assignments a ON a.id = s.assignment_id
            JOIN lessons l ON l.id = a.lesson_id
            JOIN course_modules m ON m.id = l.module_id
            JOIN courses c ON c.id = m.course_id
            WHERE s.grade IS NULL AND ($1::uuid IS NULL OR c.instructor_id = $1)
            ORDER BY s.submitted_at
            "#,
            SUBMISSION_COLUMNS
        ))
        .bind(instructor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Submission::from).collect())
    }
}

// =========================================================================
// CommentStore
// =========================================================================

#[async_trait]
impl CommentStore for PgStore {
    async fn insert_comment(&self, comment: Comment) -> StoreResult<Comment> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, lesson_id, user_id, parent_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(comment.id)
        .bind(comment.lesson_id)
        .bind(comment.user_id)
        .bind(comment.parent_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn get_comment(&self, comment_id: Uuid) -> StoreResult<Option<Comment>> {
        let row: Option<CommentRow> = sqlx::query_as(
            r#"
            SELECT id, lesson_id, user_id, parent_id, content, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Comment::from))
    }

    async fn list_comments(&self, lesson_id: Uuid) -> StoreResult<Vec<Comment>> {
        let rows: Vec<CommentRow> = sqlx::query_as(
            r#"
            SELECT id, lesson_id, user_id, parent_id, content, created_at
            FROM comments
            WHERE lesson_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(lesson_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }
}
