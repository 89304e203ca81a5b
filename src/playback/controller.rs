use std::time::Duration;

use crate::foundation::core::clamp_time;
use crate::foundation::error::{ReviewError, ReviewResult};
use crate::model::session::VideoSession;

/// Playback rates the media element supports; requested rates snap to the nearest one.
pub const SUPPORTED_RATES: [f64; 7] = [0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

/// Coalesced tick spacing while playing (20 Hz).
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Where a seek returns once it resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeekResume {
    /// Resume playback.
    Playing,
    /// Stay paused.
    Paused,
}

/// Playback state machine.
///
/// `Idle -> Ready (load) -> Playing <-> Paused`; `Seeking` is transient and returns to the state
/// recorded in `resume`; `Ended` is entered at the end of media and left through a restart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PlaybackMode {
    /// No session loaded.
    Idle,
    /// Session loaded, not yet started.
    Ready,
    /// Media clock running.
    Playing,
    /// Media clock stopped mid-session.
    Paused,
    /// A seek is in flight; ticks are suppressed.
    Seeking {
        /// State to settle into once the seek completes.
        resume: SeekResume,
    },
    /// Reached the end of media.
    Ended,
}

/// What produced a [`Tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TickCause {
    /// Session loaded; position 0.
    Load,
    /// Regular coalesced update while playing.
    Cadence,
    /// A seek resolved.
    Seek,
    /// Playback paused; carries the exact paused position.
    Pause,
    /// Playback started or resumed.
    Play,
    /// End of media reached.
    Ended,
}

/// A coalesced playback-time update.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Tick {
    /// Session epoch; bumped on every load so stale ticks can be recognised.
    pub epoch: u64,
    /// Monotonic sequence number within the controller.
    pub seq: u64,
    /// Playback position in seconds.
    pub time: f64,
    /// What produced the tick.
    pub cause: TickCause,
}

/// Snapshot exposed to the host application.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    /// Playback position in seconds.
    pub current_time: f64,
    /// Session duration in seconds; `0` when idle.
    pub duration: f64,
    /// The media clock is running.
    pub is_playing: bool,
    /// Applied playback rate.
    pub rate: f64,
    /// State machine mode.
    pub mode: PlaybackMode,
}

/// Snap a requested rate to the nearest supported value. Non-finite input maps to `1.0`;
/// ties resolve to the slower rate.
pub fn nearest_supported_rate(rate: f64) -> f64 {
    if !rate.is_finite() {
        return 1.0;
    }
    SUPPORTED_RATES
        .iter()
        .copied()
        .min_by(|a, b| (a - rate).abs().total_cmp(&(b - rate).abs()))
        .unwrap_or(1.0)
}

/// Media clock state machine driven by the host's render/timer loop.
///
/// The host calls [`PlaybackController::advance`] with the wall-clock time elapsed since its
/// previous frame. Ticks are emitted at most once per `tick_interval` while playing, never per
/// media frame, and not at all while a seek is in flight.
#[derive(Clone, Debug)]
pub struct PlaybackController {
    mode: PlaybackMode,
    current_time: f64,
    duration: f64,
    rate: f64,
    tick_interval: Duration,
    since_tick: Duration,
    epoch: u64,
    seq: u64,
}

impl PlaybackController {
    /// Idle controller emitting at most one cadence tick per `tick_interval`.
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            mode: PlaybackMode::Idle,
            current_time: 0.0,
            duration: 0.0,
            rate: 1.0,
            tick_interval: tick_interval.max(Duration::from_millis(1)),
            since_tick: Duration::ZERO,
            epoch: 0,
            seq: 0,
        }
    }

    fn tick(&mut self, cause: TickCause) -> Tick {
        self.seq += 1;
        self.since_tick = Duration::ZERO;
        Tick {
            epoch: self.epoch,
            seq: self.seq,
            time: self.current_time,
            cause,
        }
    }

    fn set_mode(&mut self, mode: PlaybackMode) {
        if self.mode != mode {
            tracing::debug!(from = ?self.mode, to = ?mode, t = self.current_time, "playback mode");
            self.mode = mode;
        }
    }

    fn require_loaded(&self, op: &str) -> ReviewResult<()> {
        if self.mode == PlaybackMode::Idle {
            return Err(ReviewError::state(format!("{op}: no session loaded")));
        }
        Ok(())
    }

    /// Load a session: enters `Ready` at position 0 under a fresh epoch.
    pub fn load(&mut self, session: &VideoSession) -> Tick {
        self.epoch += 1;
        self.duration = session.duration();
        self.current_time = 0.0;
        self.set_mode(PlaybackMode::Ready);
        self.tick(TickCause::Load)
    }

    /// Drop the loaded session and return to `Idle`.
    pub fn unload(&mut self) {
        self.epoch += 1;
        self.duration = 0.0;
        self.current_time = 0.0;
        self.set_mode(PlaybackMode::Idle);
    }

    /// Start or resume playback. Playing from `Ended` restarts at 0.
    pub fn play(&mut self) -> ReviewResult<Option<Tick>> {
        self.require_loaded("play")?;
        match self.mode {
            PlaybackMode::Playing => Ok(None),
            PlaybackMode::Seeking { .. } => {
                self.set_mode(PlaybackMode::Seeking {
                    resume: SeekResume::Playing,
                });
                Ok(None)
            }
            PlaybackMode::Ended => {
                self.restart()?;
                self.set_mode(PlaybackMode::Playing);
                Ok(Some(self.tick(TickCause::Play)))
            }
            PlaybackMode::Ready | PlaybackMode::Paused => {
                self.set_mode(PlaybackMode::Playing);
                Ok(Some(self.tick(TickCause::Play)))
            }
            PlaybackMode::Idle => Ok(None),
        }
    }

    /// Stop the clock at the current position.
    pub fn pause(&mut self) -> ReviewResult<Option<Tick>> {
        self.require_loaded("pause")?;
        match self.mode {
            PlaybackMode::Playing => {
                self.set_mode(PlaybackMode::Paused);
                Ok(Some(self.tick(TickCause::Pause)))
            }
            PlaybackMode::Seeking { .. } => {
                self.set_mode(PlaybackMode::Seeking {
                    resume: SeekResume::Paused,
                });
                Ok(None)
            }
            PlaybackMode::Ready => {
                self.set_mode(PlaybackMode::Paused);
                Ok(Some(self.tick(TickCause::Pause)))
            }
            _ => Ok(None),
        }
    }

    /// Begin a seek. The target is clamped into `[0, duration]`; ticks are suppressed until
    /// [`PlaybackController::complete_seek`].
    ///
    /// Seeking from `Ready` or `Ended` resolves into `Paused`.
    pub fn seek(&mut self, t: f64) -> ReviewResult<()> {
        self.require_loaded("seek")?;
        let target = clamp_time(t, self.duration);
        if target != t {
            tracing::trace!(requested = t, clamped = target, "seek target clamped");
        }
        let resume = match self.mode {
            PlaybackMode::Playing => SeekResume::Playing,
            PlaybackMode::Seeking { resume } => resume,
            _ => SeekResume::Paused,
        };
        self.current_time = target;
        self.set_mode(PlaybackMode::Seeking { resume });
        Ok(())
    }

    /// The media element finished seeking. Returns the tick for the new position.
    pub fn complete_seek(&mut self) -> Option<Tick> {
        let PlaybackMode::Seeking { resume } = self.mode else {
            return None;
        };
        match resume {
            SeekResume::Playing if self.current_time >= self.duration => {
                self.set_mode(PlaybackMode::Ended);
                Some(self.tick(TickCause::Ended))
            }
            SeekResume::Playing => {
                self.set_mode(PlaybackMode::Playing);
                Some(self.tick(TickCause::Seek))
            }
            SeekResume::Paused => {
                self.set_mode(PlaybackMode::Paused);
                Some(self.tick(TickCause::Seek))
            }
        }
    }

    /// Set the playback rate, snapped to [`SUPPORTED_RATES`]. Returns the applied rate.
    pub fn set_rate(&mut self, rate: f64) -> f64 {
        let applied = nearest_supported_rate(rate);
        if applied != rate {
            tracing::trace!(requested = rate, applied, "rate snapped");
        }
        self.rate = applied;
        applied
    }

    /// Return to `Ready` at position 0.
    pub fn restart(&mut self) -> ReviewResult<Tick> {
        self.require_loaded("restart")?;
        self.current_time = 0.0;
        self.set_mode(PlaybackMode::Ready);
        Ok(self.tick(TickCause::Seek))
    }

    /// Advance the media clock by `wall` of host time.
    pub fn advance(&mut self, wall: Duration) -> Option<Tick> {
        if self.mode != PlaybackMode::Playing {
            return None;
        }
        self.current_time =
            (self.current_time + wall.as_secs_f64() * self.rate).min(self.duration);
        self.since_tick += wall;

        if self.current_time >= self.duration {
            self.set_mode(PlaybackMode::Ended);
            return Some(self.tick(TickCause::Ended));
        }
        if self.since_tick >= self.tick_interval {
            return Some(self.tick(TickCause::Cadence));
        }
        None
    }

    /// Current mode.
    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Playback position in seconds.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Session duration; `0` when idle.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Applied playback rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Current session epoch.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The clock is running.
    pub fn is_playing(&self) -> bool {
        self.mode == PlaybackMode::Playing
    }

    /// Playback state snapshot. A pending seek counts as playing when it resumes into `Playing`.
    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            current_time: self.current_time,
            duration: self.duration,
            is_playing: matches!(
                self.mode,
                PlaybackMode::Playing
                    | PlaybackMode::Seeking {
                        resume: SeekResume::Playing
                    }
            ),
            rate: self.rate,
            mode: self.mode,
        }
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/controller.rs"]
mod tests;
