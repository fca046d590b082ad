use thiserror::Error;
use url::Url;

use crate::model::ids::LessonId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson title cannot be empty")]
    EmptyTitle,

    #[error("video source is not a valid URL: {raw}")]
    InvalidVideoSource { raw: String },
}

//
// ─── VIDEO SOURCE ──────────────────────────────────────────────────────────────
//

/// Validated location of a lesson's video asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSource(Url);

impl VideoSource {
    /// Parse a video source from a URL string.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::InvalidVideoSource` if the string is not a URL.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, LessonError> {
        let s = raw.as_ref().trim();
        let url = Url::parse(s).map_err(|_| LessonError::InvalidVideoSource {
            raw: s.to_string(),
        })?;
        Ok(Self(url))
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.0
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// A single viewable lesson, owned by exactly one module.
///
/// The order key is scoped to the owning module and is not required to be
/// contiguous; global ordering is derived in `sequence`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    title: String,
    description: Option<String>,
    duration_secs: u32,
    order_index: i32,
    video: Option<VideoSource>,
}

impl Lesson {
    /// Creates a lesson with a validated title.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTitle` if the title is blank.
    pub fn new(
        id: LessonId,
        title: impl Into<String>,
        description: Option<String>,
        duration_secs: u32,
        order_index: i32,
        video: Option<VideoSource>,
    ) -> Result<Self, LessonError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(LessonError::EmptyTitle);
        }

        Ok(Self {
            id,
            title,
            description,
            duration_secs,
            order_index,
            video,
        })
    }

    #[must_use]
    pub fn id(&self) -> LessonId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    #[must_use]
    pub fn order_index(&self) -> i32 {
        self.order_index
    }

    #[must_use]
    pub fn video(&self) -> Option<&VideoSource> {
        self.video.as_ref()
    }
}
