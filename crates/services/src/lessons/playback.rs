/// Events emitted by a playback source.
///
/// `Progress` carries the played percentage (0–100). It is usually
/// non-decreasing but seeking can move it backwards; consumers must not
/// assume monotonicity. `Complete` fires when playback has effectively
/// finished.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackEvent {
    Progress(f64),
    Complete,
}

/// Threshold at which a paused/ended playback counts as finished.
pub const COMPLETION_THRESHOLD_PERCENT: f64 = 95.0;

/// Adapter from a host player's native time updates to `PlaybackEvent`s.
///
/// The host reports (position, duration) at its own cadence plus play/pause
/// transitions; no polling loop is involved. `Complete` is re-emitted on
/// every qualifying update — deduplication is the tracker's job.
#[derive(Debug, Clone, Default)]
pub struct PlaybackMonitor {
    playing: bool,
}

impl PlaybackMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self { playing: false }
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Translate one native time update into playback events.
    ///
    /// Updates with an unknown or zero duration produce no events (media
    /// metadata not loaded yet).
    pub fn time_update(&mut self, position_secs: f64, duration_secs: f64) -> Vec<PlaybackEvent> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 || !position_secs.is_finite() {
            return Vec::new();
        }

        let percent = position_secs / duration_secs * 100.0;
        let mut events = vec![PlaybackEvent::Progress(percent)];

        if percent >= COMPLETION_THRESHOLD_PERCENT && !self.playing {
            events.push(PlaybackEvent::Complete);
        }

        events
    }
}
