use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use aula_core::model::{CourseId, LessonId, ModuleId};
use tokio::task::JoinHandle;

/// Delay between completion and the automatic jump to the successor lesson.
pub const AUTO_ADVANCE_DELAY: Duration = Duration::from_millis(2000);

/// Route-change sink invoked by auto-advance.
///
/// Fire-and-forget: the caller does not observe an outcome.
#[async_trait]
pub trait NavigationSink: Send + Sync {
    async fn navigate_to(&self, course_id: CourseId, module_id: ModuleId, lesson_id: LessonId);
}

/// Handle to a scheduled auto-advance navigation.
///
/// The timer is tied to the owning view: dropping the handle aborts the task,
/// so a torn-down view can never navigate.
#[derive(Debug)]
pub struct AutoAdvance {
    handle: JoinHandle<()>,
}

impl AutoAdvance {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }

    /// Cancel the pending navigation.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// True once the navigation has fired (or the task was aborted).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for AutoAdvance {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Navigation sink that records calls; for testing and prototyping.
#[derive(Default)]
pub struct RecordingNavigator {
    calls: Mutex<Vec<(CourseId, ModuleId, LessonId)>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the navigations seen so far, in arrival order.
    #[must_use]
    pub fn calls(&self) -> Vec<(CourseId, ModuleId, LessonId)> {
        self.calls.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl NavigationSink for RecordingNavigator {
    async fn navigate_to(&self, course_id: CourseId, module_id: ModuleId, lesson_id: LessonId) {
        if let Ok(mut guard) = self.calls.lock() {
            guard.push((course_id, module_id, lesson_id));
        }
    }
}
