//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;
use crate::store::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing required header: {0}")]
    MissingHeader(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx) unless the store reports a constraint
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    /// HTTP status, machine-readable code and optional details
    fn classify(&self) -> (StatusCode, &'static str, Option<String>) {
        match self {
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::MissingHeader(header) => {
                (StatusCode::BAD_REQUEST, "missing_header", Some(header.clone()))
            }
            AppError::Domain(domain_err) => classify_domain(domain_err),
            AppError::Store(store_err) => classify_store(store_err),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        }
    }
}

fn classify_domain(err: &DomainError) -> (StatusCode, &'static str, Option<String>) {
    match err {
        // 404 Not Found
        DomainError::CategoryNotFound(id) => {
            (StatusCode::NOT_FOUND, "category_not_found", Some(id.to_string()))
        }
        DomainError::CourseNotFound(id) => {
            (StatusCode::NOT_FOUND, "course_not_found", Some(id.to_string()))
        }
        DomainError::ModuleNotFound(id) => {
            (StatusCode::NOT_FOUND, "module_not_found", Some(id.to_string()))
        }
        DomainError::LessonNotFound(id) => {
            (StatusCode::NOT_FOUND, "lesson_not_found", Some(id.to_string()))
        }
        DomainError::AssignmentNotFound(id) => {
            (StatusCode::NOT_FOUND, "assignment_not_found", Some(id.to_string()))
        }
        DomainError::SubmissionNotFound(id) => {
            (StatusCode::NOT_FOUND, "submission_not_found", Some(id.to_string()))
        }
        DomainError::NotificationNotFound(id) => {
            (StatusCode::NOT_FOUND, "notification_not_found", Some(id.to_string()))
        }
        DomainError::CommentNotFound(id) => {
            (StatusCode::NOT_FOUND, "comment_not_found", Some(id.to_string()))
        }

        // 403 Forbidden
        DomainError::NotEnrolled { course_id, .. } => {
            (StatusCode::FORBIDDEN, "not_enrolled", Some(course_id.to_string()))
        }
        DomainError::PermissionDenied(msg) => {
            (StatusCode::FORBIDDEN, "permission_denied", Some(msg.clone()))
        }

        // 409 Conflict
        DomainError::AlreadyEnrolled { course_id, .. } => {
            (StatusCode::CONFLICT, "already_enrolled", Some(course_id.to_string()))
        }
        DomainError::EnrollmentLimitReached { limit, .. } => {
            (StatusCode::CONFLICT, "enrollment_limit_reached", Some(format!("limit {}", limit)))
        }
        DomainError::DuplicatePosition { position, .. } => {
            (StatusCode::CONFLICT, "duplicate_position", Some(position.to_string()))
        }

        // 422 Unprocessable Entity
        DomainError::PrerequisitesNotMet { missing, .. } => {
            let missing = missing.iter().map(ToString::to_string).collect::<Vec<_>>();
            (StatusCode::UNPROCESSABLE_ENTITY, "prerequisites_not_met", Some(missing.join(",")))
        }
        DomainError::CourseNotComplete { course_id, .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "course_not_complete", Some(course_id.to_string()))
        }
        DomainError::InvalidGrade { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "invalid_grade", Some(err.to_string()))
        }

        // 400 Bad Request
        DomainError::Validation(msg) => {
            (StatusCode::BAD_REQUEST, "validation_failed", Some(msg.clone()))
        }

        // 5xx
        DomainError::CertificateGenerationFailed { attempts } => {
            tracing::error!(attempts, "Certificate number space exhausted");
            (StatusCode::INTERNAL_SERVER_ERROR, "certificate_generation_failed", None)
        }
        DomainError::ConcurrentModificationRetry { attempts } => {
            tracing::error!(attempts, "Concurrent modification retries exhausted");
            (StatusCode::SERVICE_UNAVAILABLE, "concurrent_modification", None)
        }
    }
}

fn classify_store(err: &StoreError) -> (StatusCode, &'static str, Option<String>) {
    match err {
        StoreError::UniqueViolation { constraint } => {
            (StatusCode::CONFLICT, "unique_violation", Some(constraint.clone()))
        }
        StoreError::MissingReference { entity, id } => {
            (StatusCode::NOT_FOUND, "reference_not_found", Some(format!("{} {}", entity, id)))
        }
        StoreError::Conflict(_) | StoreError::SinkUnavailable(_) => {
            tracing::error!("Store unavailable: {}", err);
            (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", None)
        }
        StoreError::Database(e) => {
            tracing::error!("Database error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = self.classify();

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
