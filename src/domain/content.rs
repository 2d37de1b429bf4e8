//! Content Hierarchy
//!
//! Category → Course → Module → Lesson → Assignment. Every entity below
//! the course carries the id of its owning course so that ownership checks
//! never need to walk the hierarchy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Difficulty level of a course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CourseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl From<String> for CourseLevel {
    fn from(s: String) -> Self {
        match s.as_str() {
            "intermediate" => CourseLevel::Intermediate,
            "advanced" => CourseLevel::Advanced,
            _ => CourseLevel::Beginner,
        }
    }
}

impl std::fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CourseLevel::Beginner => write!(f, "beginner"),
            CourseLevel::Intermediate => write!(f, "intermediate"),
            CourseLevel::Advanced => write!(f, "advanced"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub slug: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub instructor_id: Uuid,
    pub title: String,
    pub description: String,
    pub level: CourseLevel,
    pub duration_hours: i32,
    pub duration_minutes: i32,
    /// Maximum number of enrolled students, unlimited when absent
    pub enrollment_limit: Option<i32>,
    /// Courses whose certificate is required before enrolling
    pub prerequisite_ids: Vec<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseModule {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    /// Unique within the course
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: Uuid,
    pub module_id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub content: String,
    pub video_url: Option<String>,
    /// Unique within the module
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub max_score: i32,
    pub points: i32,
    pub created_at: DateTime<Utc>,
}

/// Any node of the hierarchy below the category level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContentItem<'a> {
    Course(&'a Course),
    Module(&'a CourseModule),
    Lesson(&'a Lesson),
    Assignment(&'a Assignment),
}

impl ContentItem<'_> {
    /// Id of the course this item belongs to (itself for a course)
    pub fn owning_course(&self) -> Uuid {
        match self {
            ContentItem::Course(course) => course.id,
            ContentItem::Module(module) => module.course_id,
            ContentItem::Lesson(lesson) => lesson.course_id,
            ContentItem::Assignment(assignment) => assignment.course_id,
        }
    }
}

// =========================================================================
// Creation payloads
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub slug: String,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourse {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub level: CourseLevel,
    #[serde(default)]
    pub duration_hours: i32,
    #[serde(default)]
    pub duration_minutes: i32,
    #[serde(default)]
    pub enrollment_limit: Option<i32>,
    #[serde(default)]
    pub prerequisite_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewModule {
    pub course_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLesson {
    pub module_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub video_url: Option<String>,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssignment {
    pub lesson_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: DateTime<Utc>,
    #[serde(default = "default_max_score")]
    pub max_score: i32,
    #[serde(default)]
    pub points: i32,
}

fn default_max_score() -> i32 {
    100
}
