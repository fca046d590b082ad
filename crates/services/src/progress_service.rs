use std::sync::Arc;

use aula_core::model::{Course, LessonId, ProgressRecord, UserId};
use aula_core::sequence::LessonSequence;
use storage::repository::ProgressRepository;

use crate::error::ProgressServiceError;

/// Read-side rollup of a user's standing in one course.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseProgressSummary {
    pub total_lessons: usize,
    pub completed_lessons: usize,
    pub percent_complete: f64,
}

/// Read-only queries over persisted playback progress.
///
/// Writes go through the lesson view's tracker; this service only aggregates
/// what the tracker has stored.
#[derive(Clone)]
pub struct ProgressService {
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(progress: Arc<dyn ProgressRepository>) -> Self {
        Self { progress }
    }

    /// Fetch the stored progress row for one (user, lesson) pair.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if repository access fails.
    pub async fn lesson_progress(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
    ) -> Result<Option<ProgressRecord>, ProgressServiceError> {
        let record = self.progress.get_progress(user_id, lesson_id).await?;
        Ok(record)
    }

    /// Compute the user's completion rollup across every lesson of a course.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if repository access fails.
    pub async fn course_progress(
        &self,
        user_id: UserId,
        course: &Course,
    ) -> Result<CourseProgressSummary, ProgressServiceError> {
        let sequence = LessonSequence::from_course(course);
        let lesson_ids: Vec<LessonId> = sequence.refs().map(|r| r.lesson_id).collect();

        let records = self.progress.list_progress(user_id, &lesson_ids).await?;
        let completed_lessons = records.iter().filter(|r| r.completed()).count();
        let total_lessons = lesson_ids.len();

        #[allow(clippy::cast_precision_loss)]
        let percent_complete = if total_lessons == 0 {
            0.0
        } else {
            completed_lessons as f64 / total_lessons as f64 * 100.0
        };

        Ok(CourseProgressSummary {
            total_lessons,
            completed_lessons,
            percent_complete,
        })
    }
}
