use std::sync::Arc;

use aula_core::Clock;
use aula_core::model::{LessonId, UserId};
use storage::repository::{ProgressRepository, ProgressUpdate};
use tracing::{error, warn};

/// Lifecycle of one mounted lesson view.
///
/// `Completed` is terminal for the view; a fresh view always starts
/// `Unstarted`, regardless of what the store says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Unstarted,
    InProgress,
    Completed,
}

/// Outcome of a completion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// First completion for this view, persisted successfully.
    Completed,
    /// This view already completed; the repeated signal is a no-op.
    AlreadyCompleted,
    /// No authenticated user; nothing was persisted.
    Anonymous,
    /// The completion write failed; local state is unchanged.
    NotPersisted,
}

/// True when a progress percentage is a persistence checkpoint.
///
/// `floor(percent)` on an exact multiple of 5. This throttles write volume;
/// it is a rate-limiting heuristic, not an exact trigger — events land at
/// arbitrary granularity, so multiples can be skipped entirely and a burst
/// inside one 5%-band (e.g. 5.0 then 5.1) can write more than once.
#[must_use]
pub fn is_checkpoint(percent: f64) -> bool {
    if !percent.is_finite() {
        return false;
    }
    #[allow(clippy::cast_possible_truncation)]
    let whole = percent.floor() as i64;
    whole.rem_euclid(5) == 0
}

/// Reconciles playback events into persisted progress for one lesson view.
///
/// All writes are fire-and-forget from the player's perspective: failures are
/// logged and dropped, never retried, never surfaced, and playback continues
/// regardless.
pub struct ProgressTracker {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
    user_id: Option<UserId>,
    lesson_id: LessonId,
    state: ViewState,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(
        clock: Clock,
        progress: Arc<dyn ProgressRepository>,
        user_id: Option<UserId>,
        lesson_id: LessonId,
    ) -> Self {
        Self {
            clock,
            progress,
            user_id,
            lesson_id,
            state: ViewState::Unstarted,
        }
    }

    #[must_use]
    pub fn state(&self) -> ViewState {
        self.state
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state == ViewState::Completed
    }

    /// Consume one playback progress event.
    ///
    /// Persists percent + timestamp when the event lands on a checkpoint,
    /// leaving any stored completion flag untouched. Anonymous viewers never
    /// persist.
    pub async fn record_progress(&mut self, percent: f64) {
        if !is_checkpoint(percent) {
            return;
        }

        if self.state == ViewState::Unstarted {
            self.state = ViewState::InProgress;
        }

        let Some(user_id) = self.user_id else {
            return;
        };

        let update = ProgressUpdate::watched(percent.clamp(0.0, 100.0), self.clock.now());
        if let Err(err) = self
            .progress
            .upsert_progress(user_id, self.lesson_id, update)
            .await
        {
            warn!(lesson = %self.lesson_id, error = %err, "progress upsert failed");
        }
    }

    /// Consume a completion signal from the playback source.
    ///
    /// At most one completion is persisted per view; the guard is this
    /// tracker's in-memory state only, so a remounted view may repeat the
    /// write — tolerated because the store upsert is idempotent per key. A
    /// failed write leaves the guard unset and reports `NotPersisted` so the
    /// caller suppresses auto-advance.
    pub async fn record_completion(&mut self) -> CompletionOutcome {
        if self.state == ViewState::Completed {
            return CompletionOutcome::AlreadyCompleted;
        }

        let Some(user_id) = self.user_id else {
            return CompletionOutcome::Anonymous;
        };

        let update = ProgressUpdate::completed(self.clock.now());
        match self
            .progress
            .upsert_progress(user_id, self.lesson_id, update)
            .await
        {
            Ok(()) => {
                self.state = ViewState::Completed;
                CompletionOutcome::Completed
            }
            Err(err) => {
                error!(lesson = %self.lesson_id, error = %err, "completion upsert failed");
                CompletionOutcome::NotPersisted
            }
        }
    }
}
