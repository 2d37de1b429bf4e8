//! Lesson Comments
//!
//! Discussion attached to a lesson. A reply points at its parent comment,
//! which must belong to the same lesson.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub user_id: Uuid,
    /// Comment this one replies to
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(lesson_id: Uuid, user_id: Uuid, parent_id: Option<Uuid>, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            lesson_id,
            user_id,
            parent_id,
            content,
            created_at: Utc::now(),
        }
    }

    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}
