#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod sequence;
pub mod time;

pub use error::Error;
pub use time::Clock;

pub use sequence::{LessonNavigation, LessonRef, LessonSequence, SequenceEntry};
