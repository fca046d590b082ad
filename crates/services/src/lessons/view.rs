use std::sync::Arc;
use std::time::Duration;

use aula_core::Clock;
use aula_core::model::{Course, CourseId, Lesson, LessonId, ModuleId, UserId};
use aula_core::sequence::{LessonRef, LessonSequence, SequenceEntry};
use storage::repository::ProgressRepository;

use super::navigation::{AUTO_ADVANCE_DELAY, AutoAdvance, NavigationSink};
use super::playback::PlaybackEvent;
use super::tracker::{CompletionOutcome, ProgressTracker, ViewState};
use crate::error::LessonViewError;

/// One mounted view of a lesson: the located sequence position plus the
/// progress tracker and the pending auto-advance, tied together for the
/// lifetime of the view.
///
/// Dropping the session tears the view down; a scheduled auto-advance that
/// has not fired yet is cancelled with it.
pub struct LessonViewSession {
    course_id: CourseId,
    entry: SequenceEntry,
    previous: Option<LessonRef>,
    next: Option<LessonRef>,
    tracker: ProgressTracker,
    navigator: Arc<dyn NavigationSink>,
    advance_delay: Duration,
    pending_advance: Option<AutoAdvance>,
}

impl LessonViewSession {
    /// Open a view over the given (fully loaded) course aggregate.
    ///
    /// Runs the sequence builder and locates the lesson and its neighbors.
    ///
    /// # Errors
    ///
    /// Returns `LessonViewError::LessonNotFound` when the lesson id does not
    /// occur in the course.
    pub fn open(
        course: &Course,
        lesson_id: LessonId,
        user_id: Option<UserId>,
        clock: Clock,
        progress: Arc<dyn ProgressRepository>,
        navigator: Arc<dyn NavigationSink>,
    ) -> Result<Self, LessonViewError> {
        let sequence = LessonSequence::from_course(course);
        let navigation = sequence.locate(lesson_id);
        let Some(entry) = navigation.current else {
            return Err(LessonViewError::LessonNotFound);
        };

        let tracker = ProgressTracker::new(clock, progress, user_id, lesson_id);

        Ok(Self {
            course_id: course.id(),
            entry,
            previous: navigation.previous,
            next: navigation.next,
            tracker,
            navigator,
            advance_delay: AUTO_ADVANCE_DELAY,
            pending_advance: None,
        })
    }

    /// Override the auto-advance delay (tests, previews).
    #[must_use]
    pub fn with_advance_delay(mut self, delay: Duration) -> Self {
        self.advance_delay = delay;
        self
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.entry.module_id()
    }

    #[must_use]
    pub fn lesson(&self) -> &Lesson {
        self.entry.lesson()
    }

    #[must_use]
    pub fn previous_lesson(&self) -> Option<LessonRef> {
        self.previous
    }

    #[must_use]
    pub fn next_lesson(&self) -> Option<LessonRef> {
        self.next
    }

    #[must_use]
    pub fn state(&self) -> ViewState {
        self.tracker.state()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.tracker.is_completed()
    }

    /// True while an auto-advance navigation is scheduled but has not fired.
    #[must_use]
    pub fn has_pending_advance(&self) -> bool {
        self.pending_advance
            .as_ref()
            .is_some_and(|advance| !advance.is_finished())
    }

    /// Feed one playback event into the view.
    pub async fn handle_event(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::Progress(percent) => self.handle_progress(percent).await,
            PlaybackEvent::Complete => self.handle_complete().await,
        }
    }

    /// Consume a playback progress percentage.
    pub async fn handle_progress(&mut self, percent: f64) {
        self.tracker.record_progress(percent).await;
    }

    /// Consume a completion signal; on first persisted completion with a
    /// successor present, schedules the deferred navigation.
    pub async fn handle_complete(&mut self) {
        if self.tracker.record_completion().await == CompletionOutcome::Completed {
            self.schedule_auto_advance();
        }
    }

    /// Cancel a scheduled auto-advance without tearing the view down.
    pub fn cancel_auto_advance(&mut self) {
        self.pending_advance = None;
    }

    fn schedule_auto_advance(&mut self) {
        let Some(next) = self.next else {
            return;
        };

        let navigator = Arc::clone(&self.navigator);
        let course_id = self.course_id;
        let delay = self.advance_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            navigator
                .navigate_to(course_id, next.module_id, next.lesson_id)
                .await;
        });

        self.pending_advance = Some(AutoAdvance::new(handle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use aula_core::model::{Module, ModuleId};
    use aula_core::time::{fixed_clock, fixed_now};
    use storage::repository::{InMemoryRepository, ProgressRepository};
    use super::super::navigation::RecordingNavigator;

    fn lesson(id: u128, order_index: i32) -> Lesson {
        Lesson::new(
            LessonId::from_u128(id),
            format!("Aula {id}"),
            None,
            60,
            order_index,
            None,
        )
        .unwrap()
    }

    fn build_course() -> Course {
        let m0 = Module::new(
            ModuleId::from_u128(10),
            "M0",
            0,
            vec![lesson(1, 0), lesson(2, 1)],
        )
        .unwrap();
        let m1 = Module::new(ModuleId::from_u128(11), "M1", 1, vec![lesson(3, 0)]).unwrap();
        Course::new(
            CourseId::from_u128(1),
            "Curso",
            None,
            fixed_now(),
            vec![m0, m1],
        )
        .unwrap()
    }

    fn open_session(
        course: &Course,
        lesson_id: LessonId,
        repo: Arc<InMemoryRepository>,
        navigator: Arc<RecordingNavigator>,
    ) -> LessonViewSession {
        LessonViewSession::open(
            course,
            lesson_id,
            Some(UserId::from_u128(7)),
            fixed_clock(),
            repo,
            navigator,
        )
        .unwrap()
    }

    #[test]
    fn open_unknown_lesson_is_not_found() {
        let course = build_course();
        let result = LessonViewSession::open(
            &course,
            LessonId::from_u128(99),
            None,
            fixed_clock(),
            Arc::new(InMemoryRepository::new()),
            Arc::new(RecordingNavigator::new()),
        );
        assert!(matches!(result, Err(LessonViewError::LessonNotFound)));
    }

    #[tokio::test]
    async fn open_resolves_neighbors() {
        let course = build_course();
        let session = open_session(
            &course,
            LessonId::from_u128(2),
            Arc::new(InMemoryRepository::new()),
            Arc::new(RecordingNavigator::new()),
        );

        assert_eq!(session.module_id(), ModuleId::from_u128(10));
        assert_eq!(
            session.previous_lesson().map(|r| r.lesson_id),
            Some(LessonId::from_u128(1))
        );
        assert_eq!(
            session.next_lesson().map(|r| r.lesson_id),
            Some(LessonId::from_u128(3))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn completion_navigates_to_successor_after_delay() {
        let course = build_course();
        let repo = Arc::new(InMemoryRepository::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let mut session = open_session(
            &course,
            LessonId::from_u128(2),
            repo.clone(),
            navigator.clone(),
        );

        session.handle_complete().await;
        assert!(session.is_completed());
        assert!(session.has_pending_advance());
        assert!(navigator.calls().is_empty());

        // Paused tokio time fast-forwards through the 2000 ms delay.
        tokio::time::sleep(Duration::from_millis(2100)).await;

        assert_eq!(
            navigator.calls(),
            vec![(
                CourseId::from_u128(1),
                ModuleId::from_u128(11),
                LessonId::from_u128(3),
            )]
        );
        assert!(!session.has_pending_advance());
    }

    #[tokio::test(start_paused = true)]
    async fn completing_last_lesson_schedules_nothing() {
        let course = build_course();
        let navigator = Arc::new(RecordingNavigator::new());
        let mut session = open_session(
            &course,
            LessonId::from_u128(3),
            Arc::new(InMemoryRepository::new()),
            navigator.clone(),
        );

        session.handle_complete().await;
        assert!(session.is_completed());
        assert!(!session.has_pending_advance());

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert!(navigator.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_before_delay_cancels_navigation() {
        let course = build_course();
        let navigator = Arc::new(RecordingNavigator::new());
        let mut session = open_session(
            &course,
            LessonId::from_u128(1),
            Arc::new(InMemoryRepository::new()),
            navigator.clone(),
        );

        session.handle_complete().await;
        assert!(session.has_pending_advance());
        drop(session);

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert!(navigator.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_complete_signals_schedule_once() {
        let course = build_course();
        let navigator = Arc::new(RecordingNavigator::new());
        let mut session = open_session(
            &course,
            LessonId::from_u128(1),
            Arc::new(InMemoryRepository::new()),
            navigator.clone(),
        );

        session.handle_complete().await;
        session.handle_complete().await;
        session.handle_complete().await;

        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(navigator.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn anonymous_completion_neither_persists_nor_navigates() {
        let course = build_course();
        let repo = Arc::new(InMemoryRepository::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let mut session = LessonViewSession::open(
            &course,
            LessonId::from_u128(1),
            None,
            fixed_clock(),
            repo.clone(),
            navigator.clone(),
        )
        .unwrap();

        session.handle_complete().await;
        assert!(!session.is_completed());
        assert!(!session.has_pending_advance());

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert!(navigator.calls().is_empty());
        assert!(
            repo.get_progress(UserId::from_u128(7), LessonId::from_u128(1))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn progress_events_flow_to_storage() {
        let course = build_course();
        let repo = Arc::new(InMemoryRepository::new());
        let mut session = open_session(
            &course,
            LessonId::from_u128(1),
            repo.clone(),
            Arc::new(RecordingNavigator::new()),
        );

        session.handle_event(PlaybackEvent::Progress(3.0)).await;
        assert!(
            repo.get_progress(UserId::from_u128(7), LessonId::from_u128(1))
                .await
                .unwrap()
                .is_none()
        );

        session.handle_event(PlaybackEvent::Progress(25.4)).await;
        let record = repo
            .get_progress(UserId::from_u128(7), LessonId::from_u128(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.percent(), 25.4);
        assert!(!record.completed());
    }
}
