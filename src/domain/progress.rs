//! Course Progress
//!
//! Lesson completion records and the aggregation rules that decide when a
//! module and a course are complete for a user. `CourseProgress::compute`
//! is the only place where completion is decided; the completion tracker
//! and the certificate issuer both go through it.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Completion of one lesson by one user. Unique per (user, lesson).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonCompletion {
    pub id: Uuid,
    pub user_id: Uuid,
    pub lesson_id: Uuid,
    pub completed_at: DateTime<Utc>,
}

/// Ordered lesson ids of one module, as read in a single snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleOutline {
    pub module_id: Uuid,
    pub title: String,
    pub lesson_ids: Vec<Uuid>,
}

/// Ordered modules of one course, as read in a single snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseOutline {
    pub course_id: Uuid,
    pub modules: Vec<ModuleOutline>,
}

impl CourseOutline {
    pub fn module(&self, module_id: Uuid) -> Option<&ModuleOutline> {
        self.modules.iter().find(|m| m.module_id == module_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleProgress {
    pub module_id: Uuid,
    pub completed_lessons: usize,
    pub total_lessons: usize,
}

impl ModuleProgress {
    /// Completed / total, `0.0` for a module without lessons
    pub fn ratio(&self) -> f64 {
        if self.total_lessons == 0 {
            return 0.0;
        }
        self.completed_lessons as f64 / self.total_lessons as f64
    }

    pub fn is_empty(&self) -> bool {
        self.total_lessons == 0
    }

    /// An empty module is never complete
    pub fn is_complete(&self) -> bool {
        !self.is_empty() && self.completed_lessons == self.total_lessons
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseProgress {
    pub course_id: Uuid,
    pub modules: Vec<ModuleProgress>,
}

impl CourseProgress {
    /// Aggregate a user's completed lessons over a course outline.
    ///
    /// Completions of lessons that are no longer part of the outline are
    /// ignored, so the numerator can never exceed the denominator.
    pub fn compute(outline: &CourseOutline, completed: &HashSet<Uuid>) -> Self {
        let modules = outline
            .modules
            .iter()
            .map(|module| ModuleProgress {
                module_id: module.module_id,
                completed_lessons: module
                    .lesson_ids
                    .iter()
                    .filter(|id| completed.contains(id))
                    .count(),
                total_lessons: module.lesson_ids.len(),
            })
            .collect();

        Self {
            course_id: outline.course_id,
            modules,
        }
    }

    pub fn module(&self, module_id: Uuid) -> Option<&ModuleProgress> {
        self.modules.iter().find(|m| m.module_id == module_id)
    }

    /// Every non-empty module is complete and at least one exists.
    pub fn is_complete(&self) -> bool {
        let mut non_empty = self.modules.iter().filter(|m| !m.is_empty()).peekable();
        non_empty.peek().is_some() && non_empty.all(ModuleProgress::is_complete)
    }

    pub fn completed_lessons(&self) -> usize {
        self.modules.iter().map(|m| m.completed_lessons).sum()
    }

    pub fn total_lessons(&self) -> usize {
        self.modules.iter().map(|m| m.total_lessons).sum()
    }

    /// Percentage of completed lessons, one decimal place, `0.0` without lessons
    pub fn percent(&self) -> f64 {
        let total = self.total_lessons();
        if total == 0 {
            return 0.0;
        }
        let raw = self.completed_lessons() as f64 / total as f64 * 100.0;
        (raw * 10.0).round() / 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline(modules: &[usize]) -> CourseOutline {
        CourseOutline {
            course_id: Uuid::new_v4(),
            modules: modules
                .iter()
                .enumerate()
                .map(|(i, &lessons)| ModuleOutline {
                    module_id: Uuid::new_v4(),
                    title: format!("Module {}", i + 1),
                    lesson_ids: (0..lessons).map(|_| Uuid::new_v4()).collect(),
                })
                .collect(),
        }
    }

    fn all_lessons(outline: &CourseOutline) -> HashSet<Uuid> {
        outline
            .modules
            .iter()
            .flat_map(|m| m.lesson_ids.iter().copied())
            .collect()
    }

    #[test]
    fn test_course_without_modules_is_never_complete() {
        let outline = outline(&[]);
        let progress = CourseProgress::compute(&outline, &HashSet::new());

        assert!(!progress.is_complete());
        assert_eq!(progress.percent(), 0.0);
    }

    #[test]
    fn test_course_with_only_empty_modules_is_never_complete() {
        let outline = outline(&[0, 0]);
        let completed: HashSet<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let progress = CourseProgress::compute(&outline, &completed);

        assert!(!progress.is_complete());
        assert!(progress.modules.iter().all(|m| !m.is_complete()));
    }

    #[test]
    fn test_empty_module_is_excluded_from_aggregate() {
        let outline = outline(&[2, 0]);
        let progress = CourseProgress::compute(&outline, &all_lessons(&outline));

        assert!(progress.is_complete());
        assert_eq!(progress.percent(), 100.0);
    }

    #[test]
    fn test_half_complete_module() {
        let outline = outline(&[2]);
        let first = outline.modules[0].lesson_ids[0];
        let progress = CourseProgress::compute(&outline, &HashSet::from([first]));

        let module = &progress.modules[0];
        assert_eq!(module.ratio(), 0.5);
        assert!(!module.is_complete());
        assert!(!progress.is_complete());
        assert_eq!(progress.percent(), 50.0);
    }

    #[test]
    fn test_one_incomplete_module_blocks_course() {
        let outline = outline(&[1, 2]);
        let mut completed = all_lessons(&outline);
        completed.remove(&outline.modules[1].lesson_ids[1]);

        let progress = CourseProgress::compute(&outline, &completed);
        assert!(progress.modules[0].is_complete());
        assert!(!progress.modules[1].is_complete());
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_foreign_completions_do_not_count() {
        let outline = outline(&[1]);
        let completed = HashSet::from([Uuid::new_v4(), Uuid::new_v4()]);
        let progress = CourseProgress::compute(&outline, &completed);

        assert_eq!(progress.completed_lessons(), 0);
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_percent_rounds_to_one_decimal() {
        let outline = outline(&[3]);
        let first = outline.modules[0].lesson_ids[0];
        let progress = CourseProgress::compute(&outline, &HashSet::from([first]));

        assert_eq!(progress.percent(), 33.3);
    }
}
