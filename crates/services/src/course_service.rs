use std::sync::Arc;

use aula_core::Clock;
use aula_core::model::{Course, CourseId, Module};
use storage::repository::CourseRepository;
use uuid::Uuid;

use crate::error::CourseServiceError;

/// Orchestrates course administration and acts as the course data provider
/// for the viewer.
///
/// A missing or unreachable course is "no course available yet": `get_course`
/// reports `Ok(None)` for the former and the caller defers rendering; no
/// retry is initiated here.
#[derive(Clone)]
pub struct CourseService {
    clock: Clock,
    courses: Arc<dyn CourseRepository>,
}

impl CourseService {
    #[must_use]
    pub fn new(clock: Clock, courses: Arc<dyn CourseRepository>) -> Self {
        Self { clock, courses }
    }

    /// Create a new course aggregate and persist it.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Course` for validation failures.
    /// Returns `CourseServiceError::Storage` if persistence fails.
    pub async fn create_course(
        &self,
        title: String,
        description: Option<String>,
        modules: Vec<Module>,
    ) -> Result<CourseId, CourseServiceError> {
        let now = self.clock.now();
        let course = Course::new(CourseId::new(Uuid::new_v4()), title, description, now, modules)?;
        self.courses.upsert_course(&course).await?;
        Ok(course.id())
    }

    /// Persist an already-built course aggregate, replacing its children.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if persistence fails.
    pub async fn save_course(&self, course: &Course) -> Result<(), CourseServiceError> {
        self.courses.upsert_course(course).await?;
        Ok(())
    }

    /// Fetch a fully loaded course aggregate by ID.
    ///
    /// Returns `Ok(None)` when the course does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn get_course(&self, id: CourseId) -> Result<Option<Course>, CourseServiceError> {
        let course = self.courses.get_course(id).await?;
        Ok(course)
    }

    /// List courses, newest first, up to the given limit.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn list_courses(&self, limit: u32) -> Result<Vec<Course>, CourseServiceError> {
        let courses = self.courses.list_courses(limit).await?;
        Ok(courses)
    }

    /// Delete a course and its modules/lessons.
    ///
    /// Viewer progress rows are left in place.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn delete_course(&self, id: CourseId) -> Result<(), CourseServiceError> {
        self.courses.delete_course(id).await?;
        Ok(())
    }
}
