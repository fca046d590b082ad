use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{LessonId, UserId};

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("progress percent out of range: {value}")]
    InvalidPercent { value: f64 },
}

/// Persisted playback progress for one (user, lesson) pair.
///
/// Records are created on the first qualifying playback event and overwritten
/// on every later one; the storage key is the (user, lesson) pair and writes
/// are last-write-wins. Records are never deleted by the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    user_id: UserId,
    lesson_id: LessonId,
    percent: f64,
    completed: bool,
    last_watched: DateTime<Utc>,
}

impl ProgressRecord {
    /// Rehydrate a progress record from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidPercent` if the percent is not a finite
    /// value in `0.0..=100.0`.
    pub fn from_persisted(
        user_id: UserId,
        lesson_id: LessonId,
        percent: f64,
        completed: bool,
        last_watched: DateTime<Utc>,
    ) -> Result<Self, ProgressError> {
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(ProgressError::InvalidPercent { value: percent });
        }

        Ok(Self {
            user_id,
            lesson_id,
            percent,
            completed,
            last_watched,
        })
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    #[must_use]
    pub fn percent(&self) -> f64 {
        self.percent
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn last_watched(&self) -> DateTime<Utc> {
        self.last_watched
    }
}
