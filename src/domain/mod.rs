//! Domain module
//!
//! Core domain types and business rules.

pub mod certificate;
pub mod comment;
pub mod content;
pub mod context;
pub mod error;
pub mod notification;
pub mod progress;
pub mod submission;

pub use certificate::{Certificate, CertificateNumberSource, CertificateStatus, DigestNumberSource};
pub use comment::{Comment, NewComment};
pub use content::{
    Assignment, Category, ContentItem, Course, CourseLevel, CourseModule, Lesson, NewAssignment,
    NewCategory, NewCourse, NewLesson, NewModule,
};
pub use context::{OperationContext, Role};
pub use error::DomainError;
pub use notification::{NewNotification, Notification, NotificationKind};
pub use progress::{CourseOutline, CourseProgress, LessonCompletion, ModuleOutline, ModuleProgress};
pub use submission::{Grade, Submission};
