//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Assignment, Category, Certificate, Comment, Course, CourseModule, Lesson, NewAssignment,
    NewCategory, NewComment, NewCourse, NewLesson, NewModule, Notification, OperationContext,
    Submission,
};
use crate::error::AppError;
use crate::handlers::{
    CertificateResult, CommentHandler, CompletionResult, ContentHandler, CourseContent, CourseDetail,
    EnrollCommand, EnrollmentHandler, GenerateCertificateCommand, GradeSubmissionCommand,
    MarkLessonCompleteCommand, ProgressReport, SubmissionHandler, SubmitAssignmentCommand,
};
use crate::notification::Notifier;
use crate::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListCoursesQuery {
    #[serde(default)]
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateCertificateRequest {
    pub course_id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAssignmentRequest {
    pub file_ref: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GradeSubmissionRequest {
    pub grade: i32,
    #[serde(default)]
    pub feedback: String,
}

#[derive(Debug, Serialize)]
pub struct EnrollResponse {
    pub course_id: Uuid,
    pub user_id: Uuid,
    pub enrolled: bool,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/categories", post(create_category).get(list_categories))
        .route("/courses", post(create_course).get(list_courses))
        .route("/courses/mine", get(my_courses))
        .route("/courses/:course_id", get(get_course))
        // Enrollment
        .route("/courses/:course_id/enroll", post(enroll))
        .route("/courses/:course_id/unenroll", post(unenroll))
        // Views
        .route("/courses/:course_id/content", get(course_content))
        .route("/courses/:course_id/progress", get(course_progress))
        // Authoring
        .route("/modules", post(create_module))
        .route("/lessons", post(create_lesson))
        .route("/assignments", post(create_assignment))
        // Progress
        .route("/lessons/:lesson_id/complete", post(mark_lesson_complete))
        // Discussion
        .route(
            "/lessons/:lesson_id/comments",
            post(post_comment).get(list_comments),
        )
        // Submissions
        .route("/assignments/:assignment_id/submit", post(submit_assignment))
        .route("/submissions/mine", get(my_submissions))
        .route("/submissions/pending", get(pending_submissions))
        .route("/submissions/:submission_id/grade", post(grade_submission))
        // Certificates
        .route("/certificates", get(list_certificates))
        .route("/certificates/generate", post(generate_certificate))
        // Notifications
        .route("/notifications", get(list_notifications))
        .route("/notifications/:notification_id/read", post(mark_notification_read))
}

// =========================================================================
// Catalog
// =========================================================================

async fn create_category(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = ContentHandler::new(state.store)
        .create_category(request, &context)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(ContentHandler::new(state.store).list_categories().await?))
}

async fn create_course(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<NewCourse>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let course = ContentHandler::new(state.store)
        .create_course(request, &context)
        .await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<ListCoursesQuery>,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = ContentHandler::new(state.store)
        .list_courses(query.category_id)
        .await?;
    Ok(Json(courses))
}

async fn get_course(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CourseDetail>, AppError> {
    let detail = ContentHandler::new(state.store)
        .course_detail(course_id, &context)
        .await?;
    Ok(Json(detail))
}

async fn my_courses(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<Vec<Course>>, AppError> {
    Ok(Json(EnrollmentHandler::new(state.store).my_courses(&context).await?))
}

// =========================================================================
// Enrollment
// =========================================================================

async fn enroll(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<EnrollResponse>, AppError> {
    let course = EnrollmentHandler::new(state.store)
        .execute(EnrollCommand::new(context.user_id, course_id), &context)
        .await?;

    Ok(Json(EnrollResponse {
        course_id: course.id,
        user_id: context.user_id,
        enrolled: true,
    }))
}

async fn unenroll(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(course_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    EnrollmentHandler::new(state.store)
        .unenroll(course_id, &context)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// Views
// =========================================================================

async fn course_content(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CourseContent>, AppError> {
    let content = ContentHandler::new(state.store)
        .course_content(course_id, &context)
        .await?;
    Ok(Json(content))
}

async fn course_progress(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<ProgressReport>, AppError> {
    let report = ContentHandler::new(state.store)
        .progress(course_id, &context)
        .await?;
    Ok(Json(report))
}

// =========================================================================
// Authoring
// =========================================================================

async fn create_module(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<NewModule>,
) -> Result<(StatusCode, Json<CourseModule>), AppError> {
    let module = ContentHandler::new(state.store)
        .create_module(request, &context)
        .await?;
    Ok((StatusCode::CREATED, Json(module)))
}

async fn create_lesson(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<NewLesson>,
) -> Result<(StatusCode, Json<Lesson>), AppError> {
    let lesson = ContentHandler::new(state.store)
        .create_lesson(request, &context)
        .await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

async fn create_assignment(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<NewAssignment>,
) -> Result<(StatusCode, Json<Assignment>), AppError> {
    let assignment = ContentHandler::new(state.store)
        .create_assignment(request, &context)
        .await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

// =========================================================================
// Progress
// =========================================================================

async fn mark_lesson_complete(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(lesson_id): Path<Uuid>,
) -> Result<Json<CompletionResult>, AppError> {
    let result = state
        .completions()
        .execute(MarkLessonCompleteCommand::new(context.user_id, lesson_id), &context)
        .await?;
    Ok(Json(result))
}

// =========================================================================
// Discussion
// =========================================================================

async fn post_comment(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(lesson_id): Path<Uuid>,
    Json(request): Json<NewComment>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let comment = CommentHandler::new(state.store)
        .post(lesson_id, request, &context)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn list_comments(
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
) -> Result<Json<Vec<Comment>>, AppError> {
    Ok(Json(CommentHandler::new(state.store).list(lesson_id).await?))
}

// =========================================================================
// Submissions
// =========================================================================

async fn submit_assignment(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(assignment_id): Path<Uuid>,
    Json(request): Json<SubmitAssignmentRequest>,
) -> Result<(StatusCode, Json<Submission>), AppError> {
    let submission = SubmissionHandler::new(state.store)
        .submit(
            SubmitAssignmentCommand::new(assignment_id, request.file_ref),
            &context,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

async fn grade_submission(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(submission_id): Path<Uuid>,
    Json(request): Json<GradeSubmissionRequest>,
) -> Result<Json<Submission>, AppError> {
    let command =
        GradeSubmissionCommand::new(submission_id, request.grade).with_feedback(request.feedback);
    let submission = SubmissionHandler::new(state.store)
        .grade(command, &context)
        .await?;
    Ok(Json(submission))
}

async fn my_submissions(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<Vec<Submission>>, AppError> {
    Ok(Json(SubmissionHandler::new(state.store).mine(&context).await?))
}

async fn pending_submissions(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<Vec<Submission>>, AppError> {
    Ok(Json(SubmissionHandler::new(state.store).pending(&context).await?))
}

// =========================================================================
// Certificates
// =========================================================================

async fn generate_certificate(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<GenerateCertificateRequest>,
) -> Result<(StatusCode, Json<CertificateResult>), AppError> {
    let mut command = GenerateCertificateCommand::new(request.course_id);
    if let Some(user_id) = request.user_id {
        command = command.for_user(user_id);
    }

    let result = state.certificates().execute(command, &context).await?;
    let status = if result.newly_issued {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(result)))
}

async fn list_certificates(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<Vec<Certificate>>, AppError> {
    Ok(Json(state.certificates().list(&context).await?))
}

// =========================================================================
// Notifications
// =========================================================================

async fn list_notifications(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<Vec<Notification>>, AppError> {
    Ok(Json(Notifier::new(state.store).list(context.user_id).await?))
}

async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(notification_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    Notifier::new(state.store)
        .mark_read(context.user_id, notification_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_certificate_request_deserialize() {
        let course_id = Uuid::new_v4();
        let json = format!(r#"{{"course_id": "{}"}}"#, course_id);

        let req: GenerateCertificateRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req.course_id, course_id);
        assert!(req.user_id.is_none());
    }

    #[test]
    fn test_grade_request_defaults() {
        let req: GradeSubmissionRequest = serde_json::from_str(r#"{"grade": 17}"#).unwrap();
        assert_eq!(req.grade, 17);
        assert!(req.feedback.is_empty());
    }

    #[test]
    fn test_new_assignment_default_max_score() {
        let json = format!(
            r#"{{"lesson_id": "{}", "title": "Quiz", "due_date": "2026-01-01T00:00:00Z"}}"#,
            Uuid::new_v4()
        );
        let req: NewAssignment = serde_json::from_str(&json).unwrap();
        assert_eq!(req.max_score, 100);
        assert_eq!(req.points, 0);
    }
}
