use async_trait::async_trait;
use aula_core::model::{Course, CourseId, LessonId, ProgressRecord, UserId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Partial write against one (user, lesson) progress row.
///
/// Absent fields keep the stored value; on first insert they default to
/// percent 0 / not completed. The row key is the (user, lesson) pair and the
/// write is last-write-wins — no sequencing token is carried.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub percent: Option<f64>,
    pub completed: Option<bool>,
    pub last_watched: DateTime<Utc>,
}

impl ProgressUpdate {
    /// Throttled playback write: percent + timestamp, completed untouched.
    #[must_use]
    pub fn watched(percent: f64, last_watched: DateTime<Utc>) -> Self {
        Self {
            percent: Some(percent),
            completed: None,
            last_watched,
        }
    }

    /// Completion write: completed = true, percent forced to 100.
    #[must_use]
    pub fn completed(last_watched: DateTime<Utc>) -> Self {
        Self {
            percent: Some(100.0),
            completed: Some(true),
            last_watched,
        }
    }
}

/// Repository contract for course aggregates.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Persist or update a course aggregate (course, modules, lessons).
    ///
    /// Replaces the previously stored module/lesson children wholesale.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the aggregate cannot be stored.
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError>;

    /// Fetch a fully loaded course aggregate by ID.
    ///
    /// Returns `Ok(None)` when the course does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError>;

    /// List course aggregates, newest first, up to the given limit.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn list_courses(&self, limit: u32) -> Result<Vec<Course>, StorageError>;

    /// Delete a course and its modules/lessons. Progress rows are kept.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn delete_course(&self, id: CourseId) -> Result<(), StorageError>;
}

/// Repository contract for per-user playback progress.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Create-or-overwrite the progress row keyed by (user, lesson).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn upsert_progress(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
        update: ProgressUpdate,
    ) -> Result<(), StorageError>;

    /// Fetch the progress row for one (user, lesson) pair, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn get_progress(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
    ) -> Result<Option<ProgressRecord>, StorageError>;

    /// Fetch all progress rows a user holds for the given lessons.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn list_progress(
        &self,
        user_id: UserId,
        lesson_ids: &[LessonId],
    ) -> Result<Vec<ProgressRecord>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    courses: Arc<Mutex<HashMap<CourseId, Course>>>,
    progress: Arc<Mutex<HashMap<(UserId, LessonId), ProgressRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            courses: Arc::new(Mutex::new(HashMap::new())),
            progress: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        let mut guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(course.id(), course.clone());
        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_courses(&self, limit: u32) -> Result<Vec<Course>, StorageError> {
        let guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut courses: Vec<Course> = guard.values().cloned().collect();
        courses.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(a.id().cmp(&b.id())));
        courses.truncate(limit as usize);
        Ok(courses)
    }

    async fn delete_course(&self, id: CourseId) -> Result<(), StorageError> {
        let mut guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn upsert_progress(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
        update: ProgressUpdate,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let existing = guard.get(&(user_id, lesson_id));
        let percent = update
            .percent
            .unwrap_or_else(|| existing.map_or(0.0, ProgressRecord::percent));
        let completed = update
            .completed
            .unwrap_or_else(|| existing.is_some_and(ProgressRecord::completed));

        let record = ProgressRecord::from_persisted(
            user_id,
            lesson_id,
            percent,
            completed,
            update.last_watched,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;

        guard.insert((user_id, lesson_id), record);
        Ok(())
    }

    async fn get_progress(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&(user_id, lesson_id)).cloned())
    }

    async fn list_progress(
        &self,
        user_id: UserId,
        lesson_ids: &[LessonId],
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut records: Vec<ProgressRecord> = lesson_ids
            .iter()
            .filter_map(|lesson_id| guard.get(&(user_id, *lesson_id)).cloned())
            .collect();
        records.sort_by_key(ProgressRecord::lesson_id);
        Ok(records)
    }
}

/// Aggregates course and progress repositories behind trait objects for easy
/// backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub courses: Arc<dyn CourseRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let courses: Arc<dyn CourseRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        Self { courses, progress }
    }
}
