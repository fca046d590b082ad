mod course;
mod ids;
mod lesson;
mod module;
mod progress;

pub use ids::{CourseId, LessonId, ModuleId, ParseIdError, UserId};

pub use course::{Course, CourseError};
pub use lesson::{Lesson, LessonError, VideoSource};
pub use module::{Module, ModuleError};
pub use progress::{ProgressError, ProgressRecord};
