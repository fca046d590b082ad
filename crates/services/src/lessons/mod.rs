mod navigation;
mod playback;
mod tracker;
mod view;

// Public API of the lesson-view subsystem.
pub use crate::error::LessonViewError;
pub use navigation::{AUTO_ADVANCE_DELAY, AutoAdvance, NavigationSink, RecordingNavigator};
pub use playback::{COMPLETION_THRESHOLD_PERCENT, PlaybackEvent, PlaybackMonitor};
pub use tracker::{CompletionOutcome, ProgressTracker, ViewState, is_checkpoint};
pub use view::LessonViewSession;
