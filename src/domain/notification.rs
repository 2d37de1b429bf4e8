//! Notifications
//!
//! User-directed messages emitted by workflow transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Assignment,
    Grade,
    Comment,
    Enrollment,
    Progression,
    Achievement,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Assignment => "assignment",
            NotificationKind::Grade => "grade",
            NotificationKind::Comment => "comment",
            NotificationKind::Enrollment => "enrollment",
            NotificationKind::Progression => "progression",
            NotificationKind::Achievement => "achievement",
        }
    }
}

impl From<String> for NotificationKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "assignment" => NotificationKind::Assignment,
            "grade" => NotificationKind::Grade,
            "comment" => NotificationKind::Comment,
            "progression" => NotificationKind::Progression,
            "enrollment" => NotificationKind::Enrollment,
            "achievement" => NotificationKind::Achievement,
            _ => NotificationKind::Progression,
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Notification waiting to be appended
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl NewNotification {
    pub fn new(
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn enrolled(user_id: Uuid, course_title: &str) -> Self {
        Self::new(
            user_id,
            NotificationKind::Enrollment,
            "Enrollment confirmed",
            format!("You are now enrolled in the course: {}", course_title),
        )
    }

    pub fn module_completed(user_id: Uuid, module_title: &str, course_title: &str) -> Self {
        Self::new(
            user_id,
            NotificationKind::Progression,
            "Module completed",
            format!(
                "You completed the module '{}' of the course '{}'",
                module_title, course_title
            ),
        )
    }

    pub fn course_completed(user_id: Uuid, course_title: &str, certificate_number: &str) -> Self {
        Self::new(
            user_id,
            NotificationKind::Achievement,
            "Course completed",
            format!(
                "Congratulations! You completed the course '{}'. Certificate {} has been issued.",
                course_title, certificate_number
            ),
        )
    }

    pub fn assignment_posted(
        user_id: Uuid,
        assignment_title: &str,
        course_title: &str,
        due_date: DateTime<Utc>,
    ) -> Self {
        Self::new(
            user_id,
            NotificationKind::Assignment,
            "New assignment",
            format!(
                "'{}' was posted in '{}', due {}",
                assignment_title,
                course_title,
                due_date.format("%Y-%m-%d %H:%M UTC")
            ),
        )
    }

    pub fn comment_reply(user_id: Uuid, lesson_title: &str) -> Self {
        Self::new(
            user_id,
            NotificationKind::Comment,
            "New reply",
            format!("Someone replied to your comment on '{}'", lesson_title),
        )
    }

    pub fn graded(user_id: Uuid, assignment_title: &str, grade: i32, max_score: i32) -> Self {
        Self::new(
            user_id,
            NotificationKind::Grade,
            "New grade",
            format!(
                "Your submission for '{}' was graded {}/{}",
                assignment_title, grade, max_score
            ),
        )
    }
}
