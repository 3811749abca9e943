//! Playback transport: the audio clock the sync engine reads from.
//!
//! The engine never decodes audio. It only needs to read the current playback
//! position and issue play, pause, seek and rate requests. [`PlaybackClock`]
//! is a software implementation that interpolates position from wall-clock
//! time, which is what the CLI uses in place of a real audio element.

use crate::time::SecondsExt;
use std::time::Instant;

/// Control surface of a single audio source.
pub trait Transport {
    /// Current playback position in seconds, or `None` when no audio is loaded.
    fn current_time(&self) -> Option<f64>;

    /// Whether the position is currently advancing.
    fn is_playing(&self) -> bool;

    fn play(&mut self);

    fn pause(&mut self);

    /// Request a seek. Fire-and-forget: callers do not wait for it to settle.
    fn seek(&mut self, seconds: f64);

    fn playback_rate(&self) -> f64;

    fn set_playback_rate(&mut self, rate: f64);

    /// Seek backwards from the current position, clamped to the track start.
    ///
    /// Does nothing when no audio is loaded.
    fn seek_back(&mut self, seconds: f64) {
        if let Some(now) = self.current_time() {
            self.seek((now - seconds).clamp_to_track());
        }
    }
}

/// Software playback clock.
///
/// Position is interpolated from the last reference point and the wall-clock
/// time elapsed since, scaled by the playback rate and clamped to the track
/// duration when one is known.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    /// Whether a source is loaded at all
    loaded: bool,
    /// Whether the clock is currently running
    is_playing: bool,
    /// Position at `updated_at`
    position: f64,
    /// Total duration, if known
    duration: Option<f64>,
    rate: f64,
    /// When `position` was last rebased (for interpolation)
    updated_at: Instant,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self {
            loaded: false,
            is_playing: false,
            position: 0.0,
            duration: None,
            rate: 1.0,
            updated_at: Instant::now(),
        }
    }
}

impl PlaybackClock {
    /// Create a clock for a loaded source, paused at position 0.
    #[must_use]
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            loaded: true,
            duration,
            ..Self::default()
        }
    }

    /// Create a clock with nothing loaded; `current_time` reports `None`.
    #[must_use]
    pub fn unloaded() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Get interpolated position based on time elapsed since last update
    fn interpolated_position(&self) -> f64 {
        if !self.is_playing {
            return self.position;
        }

        let elapsed = self.updated_at.elapsed().as_secs_f64() * self.rate;
        self.clamp(self.position + elapsed)
    }

    fn clamp(&self, position: f64) -> f64 {
        let position = position.clamp_to_track();
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }

    /// Freeze the interpolated position as the new reference point
    fn rebase(&mut self) {
        self.position = self.interpolated_position();
        self.updated_at = Instant::now();
    }
}

impl Transport for PlaybackClock {
    fn current_time(&self) -> Option<f64> {
        self.loaded.then(|| self.interpolated_position())
    }

    fn is_playing(&self) -> bool {
        self.is_playing
    }

    fn play(&mut self) {
        if !self.loaded || self.is_playing {
            return;
        }
        self.rebase();
        self.is_playing = true;
    }

    fn pause(&mut self) {
        if !self.is_playing {
            return;
        }
        self.rebase();
        self.is_playing = false;
    }

    fn seek(&mut self, seconds: f64) {
        self.position = self.clamp(seconds);
        self.updated_at = Instant::now();
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn set_playback_rate(&mut self, rate: f64) {
        if !rate.is_finite() || rate <= 0.0 {
            return;
        }
        self.rebase();
        self.rate = rate;
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_playback_clock_default_is_unloaded() {
        let clock = PlaybackClock::unloaded();
        assert_eq!(clock.current_time(), None);
        assert!(!clock.is_playing());
    }

    #[test]
    fn test_unloaded_clock_does_not_play() {
        let mut clock = PlaybackClock::unloaded();
        clock.play();
        assert!(!clock.is_playing());
    }

    #[test]
    fn test_paused_position_does_not_advance() {
        let clock = PlaybackClock {
            loaded: true,
            is_playing: false,
            position: 30.0,
            duration: Some(180.0),
            rate: 1.0,
            updated_at: Instant::now() - Duration::from_secs(5),
        };
        assert_eq!(clock.current_time(), Some(30.0));
    }

    #[test]
    fn test_playing_position_interpolates_with_rate() {
        let clock = PlaybackClock {
            loaded: true,
            is_playing: true,
            position: 10.0,
            duration: None,
            rate: 0.5,
            updated_at: Instant::now() - Duration::from_secs(4),
        };
        let now = clock.current_time().unwrap();
        // 4s of wall time at half speed
        assert!(now >= 12.0 && now < 12.5);
    }

    #[test]
    fn test_interpolated_position_clamped() {
        let clock = PlaybackClock {
            loaded: true,
            is_playing: true,
            position: 178.0,
            duration: Some(180.0),
            rate: 1.0,
            updated_at: Instant::now() - Duration::from_secs(10),
        };
        assert_eq!(clock.current_time(), Some(180.0));
    }

    #[test]
    fn test_seek_clamps_to_track() {
        let mut clock = PlaybackClock::new(Some(60.0));
        clock.seek(-5.0);
        assert_eq!(clock.current_time(), Some(0.0));
        clock.seek(75.0);
        assert_eq!(clock.current_time(), Some(60.0));
    }

    #[test]
    fn test_seek_back_clamps_to_zero() {
        let mut clock = PlaybackClock::new(None);
        clock.seek(2.0);
        clock.seek_back(3.0);
        assert_eq!(clock.current_time(), Some(0.0));
    }

    #[test]
    fn test_set_playback_rate_rejects_invalid() {
        let mut clock = PlaybackClock::new(None);
        clock.set_playback_rate(0.0);
        clock.set_playback_rate(-1.0);
        clock.set_playback_rate(f64::NAN);
        assert_eq!(clock.playback_rate(), 1.0);
        clock.set_playback_rate(0.75);
        assert_eq!(clock.playback_rate(), 0.75);
    }
}
