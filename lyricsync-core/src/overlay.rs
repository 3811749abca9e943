//! Subtitle overlay engine.
//!
//! Holds the active track with its display settings and turns playback time
//! updates into [`OverlayEvent`]s. Events are only emitted when the visible
//! line or its word highlight changes, so a render loop can poll time as
//! often as it likes.

use crate::config::DisplayConfig;
use crate::index::{SubtitleIndex, VisibleSubtitle, WordState};
use crate::recorder::FinishedTrack;
use crate::track::Track;
use tokio::sync::broadcast;
use tracing::debug;

const LOG_TARGET: &str = "lyricsync::overlay";

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Events emitted by the overlay
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    /// A track was loaded for display
    TrackLoaded { line_count: usize },
    /// The track was removed
    TrackCleared,
    /// A different line became visible
    LineShown {
        index: usize,
        subtitle: VisibleSubtitle,
    },
    /// The visible line stayed but its active or current word moved
    WordsChanged {
        index: usize,
        subtitle: VisibleSubtitle,
    },
    /// No line is visible any more
    LineHidden,
    /// Offset or duration cap changed
    SettingsChanged { offset: f64, duration_cap: f64 },
}

/// Overlay state plus its event channel
pub struct Overlay {
    index: Option<SubtitleIndex>,
    /// Index of the line last announced with `LineShown`
    visible: Option<usize>,
    /// `(active, current)` per word of the visible line
    highlight: Vec<(bool, bool)>,
    offset_step: f64,
    cap_presets: Vec<f64>,
    event_tx: broadcast::Sender<OverlayEvent>,
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new(&DisplayConfig::default())
    }
}

impl Overlay {
    #[must_use]
    pub fn new(display: &DisplayConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            index: None,
            visible: None,
            highlight: Vec::new(),
            offset_step: display.offset_step,
            cap_presets: display.cap_presets.clone(),
            event_tx,
        }
    }

    /// Subscribe to overlay events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<OverlayEvent> {
        self.event_tx.subscribe()
    }

    #[must_use]
    pub const fn index(&self) -> Option<&SubtitleIndex> {
        self.index.as_ref()
    }

    /// Load a track with explicit display settings
    pub fn set_track(&mut self, track: Track, offset: f64, duration_cap: f64) {
        let line_count = track.len();
        self.index = Some(SubtitleIndex::new(track, offset, duration_cap));
        self.visible = None;
        debug!(target: LOG_TARGET, "Loaded track with {line_count} lines");
        self.emit(OverlayEvent::TrackLoaded { line_count });
    }

    /// Load the result of a finished recording session
    pub fn load_finished(&mut self, finished: FinishedTrack) {
        self.set_track(finished.track, finished.offset, finished.duration_cap);
    }

    pub fn clear_track(&mut self) {
        if self.index.take().is_some() {
            self.visible = None;
            self.emit(OverlayEvent::TrackCleared);
        }
    }

    /// Resolve the line at `current_time`, emitting an event if it changed.
    ///
    /// Returns the visible subtitle whether or not an event was sent.
    pub fn update_time(&mut self, current_time: f64) -> Option<VisibleSubtitle> {
        let subtitle = self.index.as_ref()?.resolve(current_time);

        match (&subtitle, self.visible) {
            (Some(shown), Some(previous)) if shown.index == previous => {
                let highlight = highlight_of(&shown.words);
                if highlight != self.highlight {
                    self.highlight = highlight;
                    self.emit(OverlayEvent::WordsChanged {
                        index: shown.index,
                        subtitle: shown.clone(),
                    });
                }
            }
            (Some(shown), _) => {
                self.visible = Some(shown.index);
                self.highlight = highlight_of(&shown.words);
                self.emit(OverlayEvent::LineShown {
                    index: shown.index,
                    subtitle: shown.clone(),
                });
            }
            (None, Some(_)) => {
                self.visible = None;
                self.emit(OverlayEvent::LineHidden);
            }
            (None, None) => {}
        }

        subtitle
    }

    /// Shift the offset by `steps` configured steps (negative moves it back).
    ///
    /// The result is rounded to 0.1 s. Returns the new offset.
    pub fn nudge_offset(&mut self, steps: i32) -> Option<f64> {
        let step = self.offset_step;
        let index = self.index.as_mut()?;
        let offset = round_tenths(f64::from(steps).mul_add(step, index.offset()));
        index.set_offset(offset);
        self.settings_changed();
        Some(offset)
    }

    pub fn set_offset(&mut self, offset: f64) {
        if let Some(index) = self.index.as_mut() {
            index.set_offset(offset);
            self.settings_changed();
        }
    }

    pub fn set_duration_cap(&mut self, duration_cap: f64) {
        if let Some(index) = self.index.as_mut() {
            index.set_duration_cap(duration_cap);
            self.settings_changed();
        }
    }

    /// Switch to the cap preset after the current one, wrapping around.
    pub fn cycle_duration_cap(&mut self) -> Option<f64> {
        let current = self.index.as_ref()?.duration_cap();
        let next = next_preset(&self.cap_presets, current)?;
        self.set_duration_cap(next);
        Some(next)
    }

    fn settings_changed(&mut self) {
        if let Some(index) = &self.index {
            let event = OverlayEvent::SettingsChanged {
                offset: index.offset(),
                duration_cap: index.duration_cap(),
            };
            // Force the next update to re-announce the visible line
            self.visible = None;
            self.emit(event);
        }
    }

    fn emit(&self, event: OverlayEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

fn highlight_of(words: &[WordState]) -> Vec<(bool, bool)> {
    words.iter().map(|w| (w.active, w.current)).collect()
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn next_preset(presets: &[f64], current: f64) -> Option<f64> {
    let position = presets
        .iter()
        .position(|preset| (preset - current).abs() < f64::EPSILON);
    match position {
        Some(i) => presets.get((i + 1) % presets.len()).copied(),
        None => presets.first().copied(),
    }
}
