use std::sync::Arc;

use aula_core::Clock;
use aula_core::model::{CourseId, LessonId, UserId};
use storage::repository::Storage;

use crate::course_service::CourseService;
use crate::error::{AppServicesError, LessonViewError};
use crate::lessons::{LessonViewSession, NavigationSink};
use crate::progress_service::ProgressService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    storage: Storage,
    course_service: Arc<CourseService>,
    progress_service: Arc<ProgressService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock))
    }

    /// Build services over an in-memory store, for tests and prototyping.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: Storage, clock: Clock) -> Self {
        let course_service = Arc::new(CourseService::new(clock, Arc::clone(&storage.courses)));
        let progress_service = Arc::new(ProgressService::new(Arc::clone(&storage.progress)));
        Self {
            clock,
            storage,
            course_service,
            progress_service,
        }
    }

    #[must_use]
    pub fn courses(&self) -> Arc<CourseService> {
        Arc::clone(&self.course_service)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress_service)
    }

    /// Open a lesson view for the given course/lesson pair.
    ///
    /// Returns `Ok(None)` while the course is unavailable (not loaded or not
    /// found); the caller defers rendering and no retry is initiated here.
    ///
    /// # Errors
    ///
    /// Returns `LessonViewError::LessonNotFound` if the course exists but the
    /// lesson id does not occur in its sequence, or `LessonViewError::Storage`
    /// on repository failures.
    pub async fn open_lesson(
        &self,
        course_id: CourseId,
        lesson_id: LessonId,
        user_id: Option<UserId>,
        navigator: Arc<dyn NavigationSink>,
    ) -> Result<Option<LessonViewSession>, LessonViewError> {
        let Some(course) = self.storage.courses.get_course(course_id).await? else {
            return Ok(None);
        };

        let session = LessonViewSession::open(
            &course,
            lesson_id,
            user_id,
            self.clock,
            Arc::clone(&self.storage.progress),
            navigator,
        )?;
        Ok(Some(session))
    }
}
