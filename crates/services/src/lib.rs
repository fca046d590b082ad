#![forbid(unsafe_code)]

pub mod app_services;
pub mod course_service;
pub mod error;
pub mod lessons;
pub mod progress_service;

pub use aula_core::Clock;

pub use app_services::AppServices;
pub use course_service::CourseService;
pub use error::{AppServicesError, CourseServiceError, LessonViewError, ProgressServiceError};
pub use progress_service::{CourseProgressSummary, ProgressService};

pub use lessons::{
    AUTO_ADVANCE_DELAY, AutoAdvance, CompletionOutcome, LessonViewSession, NavigationSink,
    PlaybackEvent, PlaybackMonitor, ProgressTracker, RecordingNavigator, ViewState,
};
