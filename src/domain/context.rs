//! Operation Context
//!
//! The acting user and tracing metadata of the current operation. The
//! context is passed explicitly to every handler; nothing reads ambient
//! request state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Course;

/// Role of the acting user as asserted by the upstream identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Student,
    Instructor,
    Admin,
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "instructor" => Role::Instructor,
            "admin" => Role::Admin,
            _ => Role::Student,
        }
    }
}

/// Context for an operation, used for authorization and tracing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationContext {
    /// Acting user
    pub user_id: Uuid,

    pub role: Role,

    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl OperationContext {
    /// Create a context for a student
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: Role::Student,
            correlation_id: None,
        }
    }

    /// Create context with role
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Create context with correlation ID
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Generate a new correlation ID if not present
    pub fn ensure_correlation_id(&mut self) -> Uuid {
        *self.correlation_id.get_or_insert_with(Uuid::new_v4)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// May create courses
    pub fn can_author(&self) -> bool {
        matches!(self.role, Role::Instructor | Role::Admin)
    }

    /// Course instructor or administrator
    pub fn can_manage(&self, course: &Course) -> bool {
        self.is_admin() || course.instructor_id == self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CourseLevel;
    use chrono::Utc;

    fn course_taught_by(instructor_id: Uuid) -> Course {
        Course {
            id: Uuid::new_v4(),
            category_id: None,
            instructor_id,
            title: "Rust".to_string(),
            description: String::new(),
            level: CourseLevel::Beginner,
            duration_hours: 0,
            duration_minutes: 0,
            enrollment_limit: None,
            prerequisite_ids: Vec::new(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_context_builder() {
        let user_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();

        let context = OperationContext::new(user_id)
            .with_role(Role::Instructor)
            .with_correlation_id(correlation_id);

        assert_eq!(context.user_id, user_id);
        assert_eq!(context.role, Role::Instructor);
        assert_eq!(context.correlation_id, Some(correlation_id));
        assert!(context.can_author());
    }

    #[test]
    fn test_ensure_correlation_id() {
        let mut context = OperationContext::new(Uuid::new_v4());
        assert!(context.correlation_id.is_none());

        let id = context.ensure_correlation_id();
        assert_eq!(context.correlation_id, Some(id));

        // Calling again should return the same ID
        assert_eq!(context.ensure_correlation_id(), id);
    }

    #[test]
    fn test_can_manage() {
        let instructor = Uuid::new_v4();
        let course = course_taught_by(instructor);

        assert!(OperationContext::new(instructor).can_manage(&course));
        assert!(OperationContext::new(Uuid::new_v4())
            .with_role(Role::Admin)
            .can_manage(&course));
        assert!(!OperationContext::new(Uuid::new_v4())
            .with_role(Role::Instructor)
            .can_manage(&course));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(Role::from("ADMIN"), Role::Admin);
        assert_eq!(Role::from("instructor"), Role::Instructor);
        assert_eq!(Role::from("anything"), Role::Student);
    }
}
