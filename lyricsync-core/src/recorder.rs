//! Tap-along sync recorder.
//!
//! A [`RecordingSession`] turns a tokenized lyric sheet and a stream of taps,
//! each stamped with the transport's current time, into a timed [`Track`].
//! [`SyncTool`] owns at most one session at a time and is the single entry
//! point for input devices: keyboard, pointer or stdin all feed it
//! [`SyncCommand`]s.

use crate::config::LyricSyncConfig;
use crate::error::{CoreError, Result};
use crate::lyrics::LyricSheet;
use crate::track::{Line, Track, Word};
use crate::transport::Transport;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "lyricsync::recorder";

/// Recording granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// One timestamp pair per lyric line
    #[default]
    Line,
    /// One timestamp pair per word, nested under its line
    Word,
}

impl SyncMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Word => "word",
        }
    }
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fallback durations and undo rewinds used while recording, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncTimings {
    /// Provisional length of a new line when no duration cap is set
    pub line_placeholder_secs: f64,
    /// Provisional length of the last word of a line
    pub word_tail_secs: f64,
    /// Provisional length of a line after its last word is tapped
    pub line_tail_secs: f64,
    /// Length given to a started but never closed line at finish
    pub unclosed_line_secs: f64,
    /// Rewind after undoing a line
    pub undo_line_rewind_secs: f64,
    /// Rewind after undoing a word within the same line
    pub undo_word_rewind_secs: f64,
    /// Rewind after undoing back into the previous line
    pub undo_word_line_rewind_secs: f64,
}

impl Default for SyncTimings {
    fn default() -> Self {
        Self {
            line_placeholder_secs: 5.0,
            word_tail_secs: 0.5,
            line_tail_secs: 1.0,
            unclosed_line_secs: 1.0,
            undo_line_rewind_secs: 3.0,
            undo_word_rewind_secs: 1.0,
            undo_word_line_rewind_secs: 2.0,
        }
    }
}

/// A line under construction. Timing is `None` until a tap assigns it.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftLine {
    pub text: String,
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub words: Option<Vec<Word>>,
}

impl DraftLine {
    /// Start of the last word that has been tapped, if any
    fn last_started_word(&self) -> Option<f64> {
        self.words
            .as_ref()?
            .iter()
            .rev()
            .find_map(|word| word.start)
    }

    /// Freeze into a track line; lines that were never started are dropped
    fn freeze(self, unclosed_line_secs: f64) -> Option<Line> {
        let start = self.start?;
        let end = self.end.unwrap_or_else(|| {
            self.last_started_word().unwrap_or(start) + unclosed_line_secs
        });
        Some(Line {
            start,
            end,
            text: self.text,
            words: self.words,
        })
    }
}

/// Result of a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// The tap stamped a line (and a word in word mode)
    Recorded {
        line: usize,
        word: Option<usize>,
        /// Whether this tap stamped the final position of the sheet
        completed: bool,
    },
    /// Nothing left to stamp, or no playback time available
    Ignored,
}

/// Result of an undo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UndoOutcome {
    /// The cursor moved back; the transport should rewind by this many seconds
    Rewound { rewind_secs: f64 },
    /// Already at the first position
    Ignored,
}

/// A single tap-along recording over a fixed lyric sheet.
#[derive(Debug, Clone)]
pub struct RecordingSession {
    sheet: LyricSheet,
    mode: SyncMode,
    duration_cap: f64,
    timings: SyncTimings,
    line_index: usize,
    word_index: usize,
    lines: Vec<DraftLine>,
}

impl RecordingSession {
    /// Create a session over tokenized lyrics without touching any transport.
    ///
    /// In word mode the draft is pre-populated with one unset placeholder per
    /// line and word; in line mode it starts empty.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyLyrics`] if the sheet has no lines.
    pub fn new(
        sheet: LyricSheet,
        mode: SyncMode,
        duration_cap: f64,
        timings: SyncTimings,
    ) -> Result<Self> {
        if sheet.is_empty() {
            return Err(CoreError::EmptyLyrics);
        }

        let lines = match mode {
            SyncMode::Line => Vec::with_capacity(sheet.len()),
            SyncMode::Word => sheet
                .lines()
                .iter()
                .map(|line| DraftLine {
                    // Re-join so the word list always reconstructs the text
                    text: line.joined_words(),
                    start: None,
                    end: None,
                    words: Some(line.words.iter().map(Word::unset).collect()),
                })
                .collect(),
        };

        Ok(Self {
            sheet,
            mode,
            duration_cap: duration_cap.max(0.0),
            timings,
            line_index: 0,
            word_index: 0,
            lines,
        })
    }

    /// Tokenize `lyrics`, then rewind the transport to 0 at normal rate and play.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyLyrics`] if `lyrics` has no non-empty line; the
    /// transport is left untouched in that case.
    pub fn start<T: Transport + ?Sized>(
        transport: &mut T,
        lyrics: &str,
        mode: SyncMode,
        duration_cap: f64,
        timings: SyncTimings,
    ) -> Result<Self> {
        let session = Self::new(LyricSheet::tokenize(lyrics), mode, duration_cap, timings)?;

        transport.seek(0.0);
        transport.set_playback_rate(1.0);
        transport.play();

        info!(
            target: LOG_TARGET,
            "Started {} sync over {} line(s), {} word(s), cap {}s",
            mode,
            session.sheet.len(),
            session.sheet.word_count(),
            session.duration_cap
        );
        Ok(session)
    }

    #[must_use]
    pub const fn mode(&self) -> SyncMode {
        self.mode
    }

    #[must_use]
    pub const fn duration_cap(&self) -> f64 {
        self.duration_cap
    }

    #[must_use]
    pub const fn sheet(&self) -> &LyricSheet {
        &self.sheet
    }

    #[must_use]
    pub const fn line_index(&self) -> usize {
        self.line_index
    }

    #[must_use]
    pub const fn word_index(&self) -> usize {
        self.word_index
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.sheet.len()
    }

    /// Whether every line has been stamped; further taps are ignored.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.line_index >= self.line_count()
    }

    /// Snapshot of the track under construction.
    #[must_use]
    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    /// Stamp the current position with the transport's time.
    ///
    /// Ignored when the transport has no active audio.
    pub fn tap<T: Transport + ?Sized>(&mut self, transport: &T) -> TapOutcome {
        match transport.current_time() {
            Some(time) => self.tap_at(time),
            None => {
                debug!(target: LOG_TARGET, "Tap ignored: no playback time available");
                TapOutcome::Ignored
            }
        }
    }

    /// Stamp the current position at `time` seconds.
    pub fn tap_at(&mut self, time: f64) -> TapOutcome {
        if self.is_complete() {
            return TapOutcome::Ignored;
        }

        let outcome = match self.mode {
            SyncMode::Line => self.tap_line(time),
            SyncMode::Word => self.tap_word(time),
        };

        debug!(target: LOG_TARGET, "Tap at {time:.3}s: {outcome:?}");
        outcome
    }

    fn tap_line(&mut self, time: f64) -> TapOutcome {
        let Some(text) = self.sheet.line(self.line_index).map(|l| l.text.clone()) else {
            return TapOutcome::Ignored;
        };

        if let Some(previous) = self.lines.last_mut() {
            previous.end = Some(time);
        }

        let effective = if self.duration_cap > 0.0 {
            self.duration_cap
        } else {
            self.timings.line_placeholder_secs
        };

        self.lines.push(DraftLine {
            text,
            start: Some(time),
            end: Some(time + effective),
            words: None,
        });

        let line = self.line_index;
        self.line_index += 1;

        TapOutcome::Recorded {
            line,
            word: None,
            completed: self.is_complete(),
        }
    }

    fn tap_word(&mut self, time: f64) -> TapOutcome {
        let line_index = self.line_index;
        let word_index = self.word_index;
        let timings = self.timings;

        if word_index == 0 && line_index > 0 {
            if let Some(previous) = self.lines.get_mut(line_index - 1) {
                // Keep an earlier close, e.g. the provisional tail
                if previous.end.map_or(true, |end| end > time) {
                    previous.end = Some(time);
                }
                if let Some(last) = previous.words.as_mut().and_then(|w| w.last_mut()) {
                    if last.end.is_none() {
                        last.end = Some(time);
                    }
                }
            }
        }

        let Some(line) = self.lines.get_mut(line_index) else {
            return TapOutcome::Ignored;
        };
        let Some(words) = line.words.as_mut() else {
            return TapOutcome::Ignored;
        };
        let word_count = words.len();
        if word_index >= word_count {
            return TapOutcome::Ignored;
        }

        words[word_index].start = Some(time);
        if word_index > 0 {
            words[word_index - 1].end = Some(time);
        } else {
            line.start = Some(time);
        }

        self.word_index += 1;
        if self.word_index < word_count {
            return TapOutcome::Recorded {
                line: line_index,
                word: Some(word_index),
                completed: false,
            };
        }

        // Last word of the line: provisional close values, overwritten by
        // the next line's first tap
        words[word_index].end = Some(time + timings.word_tail_secs);
        line.end = Some(time + timings.line_tail_secs);
        self.word_index = 0;
        self.line_index += 1;

        TapOutcome::Recorded {
            line: line_index,
            word: Some(word_index),
            completed: self.is_complete(),
        }
    }

    /// Step the cursor back one tap and rewind the transport.
    pub fn undo<T: Transport + ?Sized>(&mut self, transport: &mut T) -> UndoOutcome {
        let outcome = self.rewind();
        if let UndoOutcome::Rewound { rewind_secs } = outcome {
            transport.seek_back(rewind_secs);
        }
        outcome
    }

    /// Step the cursor back one tap without touching any transport.
    ///
    /// Line mode drops the last stamped line. Word mode only moves the cursor:
    /// placeholders stay and stale timing is overwritten by the next tap.
    pub fn rewind(&mut self) -> UndoOutcome {
        let outcome = match self.mode {
            SyncMode::Line => {
                if self.line_index == 0 {
                    return UndoOutcome::Ignored;
                }
                self.lines.pop();
                self.line_index -= 1;
                UndoOutcome::Rewound {
                    rewind_secs: self.timings.undo_line_rewind_secs,
                }
            }
            SyncMode::Word => {
                if self.word_index > 0 {
                    self.word_index -= 1;
                    UndoOutcome::Rewound {
                        rewind_secs: self.timings.undo_word_rewind_secs,
                    }
                } else if self.line_index > 0 {
                    self.line_index -= 1;
                    self.word_index = self
                        .sheet
                        .line(self.line_index)
                        .map_or(0, |line| line.words.len().saturating_sub(1));
                    UndoOutcome::Rewound {
                        rewind_secs: self.timings.undo_word_line_rewind_secs,
                    }
                } else {
                    return UndoOutcome::Ignored;
                }
            }
        };

        debug!(
            target: LOG_TARGET,
            "Undo to line {} word {}",
            self.line_index,
            self.word_index
        );
        outcome
    }

    /// Close out the recording and reset the playback rate.
    ///
    /// Without a duration cap in line mode, the last line ends at the
    /// transport's current time. If no time is available that correction is
    /// skipped and the placeholder end stands.
    pub fn finish<T: Transport + ?Sized>(self, transport: &mut T) -> Track {
        let stop_time = transport.current_time();
        transport.set_playback_rate(1.0);
        self.finish_at(stop_time)
    }

    /// Close out the recording as if playback stopped at `stop_time`.
    #[must_use]
    pub fn finish_at(self, stop_time: Option<f64>) -> Track {
        let mode = self.mode;
        let unclosed = self.timings.unclosed_line_secs;
        let mut drafts = self.lines;

        if mode == SyncMode::Line && self.duration_cap <= 0.0 {
            if let Some(last) = drafts.last_mut() {
                match stop_time {
                    Some(time) => {
                        let start = last.start.unwrap_or(time);
                        last.end = Some(time.max(start));
                    }
                    None => warn!(
                        target: LOG_TARGET,
                        "No playback time at finish, keeping placeholder end for last line"
                    ),
                }
            }
        }

        let lines: Vec<Line> = drafts
            .into_iter()
            .filter_map(|draft| draft.freeze(unclosed))
            .collect();

        info!(target: LOG_TARGET, "Finished {} sync with {} line(s)", mode, lines.len());
        Track::new(lines)
    }

    /// Discard the session and reset the playback rate.
    pub fn cancel<T: Transport + ?Sized>(self, transport: &mut T) {
        transport.set_playback_rate(1.0);
        info!(
            target: LOG_TARGET,
            "Cancelled {} sync at line {}/{}",
            self.mode,
            self.line_index,
            self.line_count()
        );
    }
}

/// A finished recording handed to the subtitle display.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedTrack {
    pub track: Track,
    pub offset: f64,
    pub duration_cap: f64,
}

/// Abstract input for the sync tool, independent of the input device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncCommand {
    Tap,
    Undo,
    Finish,
    Cancel,
    SetSpeed(f64),
}

/// What a [`SyncCommand`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncResponse {
    Tapped(TapOutcome),
    Undone(UndoOutcome),
    Finished(FinishedTrack),
    Cancelled,
    SpeedChanged(f64),
    /// The command does not apply in the current phase
    Ignored,
}

/// Phase of the sync tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// No session; waiting for lyric text
    AwaitingInput,
    /// A session is accepting taps
    Recording,
}

/// Lines around the cursor, for a tapping prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPrompt {
    pub previous: Option<String>,
    /// `None` once every line is stamped
    pub current: Option<String>,
    pub next: Option<String>,
    pub line_index: usize,
    pub line_count: usize,
    /// Word the next tap stamps, in word mode
    pub word: Option<String>,
}

/// Owner of the single active recording session.
#[derive(Debug, Clone)]
pub struct SyncTool {
    timings: SyncTimings,
    offset: f64,
    duration_cap: f64,
    speed_presets: Vec<f64>,
    session: Option<RecordingSession>,
}

impl Default for SyncTool {
    fn default() -> Self {
        Self::new(SyncTimings::default())
    }
}

impl SyncTool {
    #[must_use]
    pub fn new(timings: SyncTimings) -> Self {
        Self {
            timings,
            offset: 0.0,
            duration_cap: 0.0,
            speed_presets: vec![0.5, 0.75, 1.0],
            session: None,
        }
    }

    /// Build a tool from the `[sync]` and `[display]` config sections.
    #[must_use]
    pub fn from_config(config: &LyricSyncConfig) -> Self {
        Self {
            timings: config.sync.timings,
            offset: config.display.offset,
            duration_cap: config.sync.duration_cap,
            speed_presets: config.sync.speed_presets.clone(),
            session: None,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> SyncPhase {
        if self.session.is_some() {
            SyncPhase::Recording
        } else {
            SyncPhase::AwaitingInput
        }
    }

    #[must_use]
    pub const fn session(&self) -> Option<&RecordingSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub const fn offset(&self) -> f64 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
    }

    #[must_use]
    pub const fn duration_cap(&self) -> f64 {
        self.duration_cap
    }

    /// Set the cap used by the next session (0 = auto).
    pub fn set_duration_cap(&mut self, duration_cap: f64) {
        self.duration_cap = duration_cap.max(0.0);
    }

    #[must_use]
    pub fn speed_presets(&self) -> &[f64] {
        &self.speed_presets
    }

    /// Snapshot of the draft track, while recording.
    #[must_use]
    pub fn draft(&self) -> Option<&[DraftLine]> {
        self.session.as_ref().map(RecordingSession::lines)
    }

    /// Start recording over `lyrics`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SessionActive`] if a session is already recording,
    /// or [`CoreError::EmptyLyrics`] if `lyrics` has no non-empty line.
    pub fn start<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        lyrics: &str,
        mode: SyncMode,
    ) -> Result<()> {
        if self.session.is_some() {
            return Err(CoreError::SessionActive);
        }
        let session =
            RecordingSession::start(transport, lyrics, mode, self.duration_cap, self.timings)?;
        self.session = Some(session);
        Ok(())
    }

    pub fn tap<T: Transport + ?Sized>(&mut self, transport: &T) -> TapOutcome {
        self.session
            .as_mut()
            .map_or(TapOutcome::Ignored, |session| session.tap(transport))
    }

    pub fn undo<T: Transport + ?Sized>(&mut self, transport: &mut T) -> UndoOutcome {
        self.session
            .as_mut()
            .map_or(UndoOutcome::Ignored, |session| session.undo(transport))
    }

    /// Change the playback rate while recording.
    ///
    /// Returns `false` (and leaves the rate alone) when idle or for a
    /// non-positive rate.
    pub fn set_speed<T: Transport + ?Sized>(&mut self, transport: &mut T, rate: f64) -> bool {
        if self.session.is_none() || !rate.is_finite() || rate <= 0.0 {
            return false;
        }
        transport.set_playback_rate(rate);
        debug!(target: LOG_TARGET, "Playback rate set to {rate}x");
        true
    }

    /// Freeze the track and return to [`SyncPhase::AwaitingInput`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoActiveSession`] if nothing is recording.
    pub fn finish<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<FinishedTrack> {
        let session = self.session.take().ok_or(CoreError::NoActiveSession)?;
        let duration_cap = session.duration_cap();
        let track = session.finish(transport);
        Ok(FinishedTrack {
            track,
            offset: self.offset,
            duration_cap,
        })
    }

    /// Discard the active session, if any.
    pub fn cancel<T: Transport + ?Sized>(&mut self, transport: &mut T) {
        if let Some(session) = self.session.take() {
            session.cancel(transport);
        }
    }

    /// Canonical handler for every input device.
    pub fn handle<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        command: SyncCommand,
    ) -> SyncResponse {
        if self.session.is_none() {
            return SyncResponse::Ignored;
        }

        match command {
            SyncCommand::Tap => SyncResponse::Tapped(self.tap(transport)),
            SyncCommand::Undo => SyncResponse::Undone(self.undo(transport)),
            SyncCommand::Finish => self
                .finish(transport)
                .map_or(SyncResponse::Ignored, SyncResponse::Finished),
            SyncCommand::Cancel => {
                self.cancel(transport);
                SyncResponse::Cancelled
            }
            SyncCommand::SetSpeed(rate) => {
                if self.set_speed(transport, rate) {
                    SyncResponse::SpeedChanged(rate)
                } else {
                    SyncResponse::Ignored
                }
            }
        }
    }

    /// Previous, current and next line around the cursor.
    #[must_use]
    pub fn prompt(&self) -> Option<SyncPrompt> {
        let session = self.session.as_ref()?;
        let sheet = session.sheet();
        let index = session.line_index();
        let text_at = |i: usize| sheet.line(i).map(|l| l.text.clone());

        let word = match session.mode() {
            SyncMode::Line => None,
            SyncMode::Word => sheet
                .line(index)
                .and_then(|l| l.words.get(session.word_index()).cloned()),
        };

        Some(SyncPrompt {
            previous: index.checked_sub(1).and_then(text_at),
            current: text_at(index),
            next: text_at(index + 1),
            line_index: index,
            line_count: sheet.len(),
            word,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::ScriptedTransport;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn session(lyrics: &str, mode: SyncMode, cap: f64) -> RecordingSession {
        RecordingSession::new(LyricSheet::tokenize(lyrics), mode, cap, SyncTimings::default())
            .unwrap()
    }

    #[test]
    fn test_start_rejects_empty_lyrics() {
        let mut transport = ScriptedTransport::at(12.0);
        let result = RecordingSession::start(
            &mut transport,
            " \n\n ",
            SyncMode::Line,
            0.0,
            SyncTimings::default(),
        );
        assert!(matches!(result, Err(CoreError::EmptyLyrics)));
        assert!(transport.seeks.is_empty());
        assert!(!transport.playing);
    }

    #[test]
    fn test_start_rewinds_and_plays_at_normal_rate() {
        let mut transport = ScriptedTransport::at(42.0);
        transport.rate = 0.5;
        let session = RecordingSession::start(
            &mut transport,
            "Hello",
            SyncMode::Line,
            0.0,
            SyncTimings::default(),
        )
        .unwrap();
        assert_eq!(transport.seeks, vec![0.0]);
        assert_eq!(transport.rate, 1.0);
        assert!(transport.playing);
        assert_eq!(session.line_index(), 0);
        assert!(session.lines().is_empty());
    }

    #[test]
    fn test_line_mode_scenario_auto_cap() {
        let mut transport = ScriptedTransport::at(1.0);
        let mut rec = session("Hello\nWorld", SyncMode::Line, 0.0);
        rec.tap(&transport);
        transport.set_time(3.0);
        rec.tap(&transport);
        transport.set_time(6.0);
        let track = rec.finish(&mut transport);

        assert_eq!(
            track.lines,
            vec![Line::new(1.0, 3.0, "Hello"), Line::new(3.0, 6.0, "World")]
        );
    }

    #[test]
    fn test_line_mode_scenario_fixed_cap_skips_finish_correction() {
        let mut transport = ScriptedTransport::at(1.0);
        let mut rec = session("Hello\nWorld", SyncMode::Line, 2.0);
        rec.tap(&transport);
        transport.set_time(3.0);
        rec.tap(&transport);
        transport.set_time(6.0);
        let track = rec.finish(&mut transport);

        assert_eq!(track.lines[0].end, 3.0);
        assert_eq!(track.lines[1].start, 3.0);
        assert_eq!(track.lines[1].end, 5.0);
    }

    #[test]
    fn test_line_mode_placeholder_end() {
        let mut rec = session("Hello\nWorld", SyncMode::Line, 0.0);
        rec.tap_at(1.0);
        assert_eq!(rec.lines()[0].end, Some(6.0));
    }

    #[test]
    fn test_line_mode_ends_chain_to_next_start() {
        let lyrics = "a\nb\nc\nd\ne";
        let mut rec = session(lyrics, SyncMode::Line, 0.0);
        let taps = [0.5, 1.0, 1.0, 2.75, 9.0];
        for t in taps {
            rec.tap_at(t);
        }
        let track = rec.finish_at(Some(12.0));

        assert_eq!(track.len(), taps.len());
        for pair in track.lines.windows(2) {
            assert!(pair[0].start <= pair[1].start);
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(track.lines[4].end, 12.0);
    }

    #[test]
    fn test_tap_after_completion_is_ignored() {
        let mut rec = session("only", SyncMode::Line, 0.0);
        assert!(matches!(
            rec.tap_at(1.0),
            TapOutcome::Recorded { line: 0, completed: true, .. }
        ));
        assert!(rec.is_complete());
        assert_eq!(rec.tap_at(2.0), TapOutcome::Ignored);
        assert_eq!(rec.lines().len(), 1);
    }

    #[test]
    fn test_tap_without_playback_time_is_ignored() {
        let mut transport = ScriptedTransport::at(0.0);
        transport.time = None;
        let mut rec = session("Hello", SyncMode::Line, 0.0);
        assert_eq!(rec.tap(&transport), TapOutcome::Ignored);
        assert_eq!(rec.line_index(), 0);
    }

    #[test]
    fn test_line_undo_inverts_tap() {
        let mut transport = ScriptedTransport::at(10.0);
        let mut rec = session("a\nb\nc", SyncMode::Line, 0.0);
        rec.tap(&transport);
        transport.set_time(12.0);
        let before = rec.line_index();
        rec.tap(&transport);
        transport.set_time(13.0);

        let outcome = rec.undo(&mut transport);
        assert_eq!(outcome, UndoOutcome::Rewound { rewind_secs: 3.0 });
        assert_eq!(rec.line_index(), before);
        assert_eq!(rec.lines().len(), 1);
        assert_eq!(transport.seeks, vec![10.0]);
    }

    #[test]
    fn test_line_undo_rewind_clamps_to_zero() {
        let mut transport = ScriptedTransport::at(1.0);
        let mut rec = session("a", SyncMode::Line, 0.0);
        rec.tap(&transport);
        rec.undo(&mut transport);
        assert_eq!(transport.seeks, vec![0.0]);
    }

    #[test]
    fn test_repeated_undo_stops_at_origin() {
        let mut transport = ScriptedTransport::at(5.0);
        let mut rec = session("a\nb", SyncMode::Line, 0.0);
        rec.tap(&transport);
        assert!(matches!(rec.undo(&mut transport), UndoOutcome::Rewound { .. }));
        assert_eq!(rec.undo(&mut transport), UndoOutcome::Ignored);
        assert_eq!(rec.undo(&mut transport), UndoOutcome::Ignored);
        assert_eq!(rec.line_index(), 0);
        assert_eq!(transport.seeks.len(), 1);
    }

    #[test]
    fn test_word_mode_prepopulates_placeholders() {
        let rec = session("Hi  there\nyou", SyncMode::Word, 0.0);
        assert_eq!(rec.lines().len(), 2);
        let first = &rec.lines()[0];
        assert_eq!(first.text, "Hi there");
        assert_eq!(first.start, None);
        let words = first.words.as_ref().unwrap();
        assert_eq!(words.len(), 2);
        assert!(words.iter().all(|w| w.start.is_none() && w.end.is_none()));
    }

    #[test]
    fn test_word_mode_scenario() {
        let mut transport = ScriptedTransport::at(0.5);
        let mut rec = session("Hi there", SyncMode::Word, 0.0);
        rec.tap(&transport);
        transport.set_time(1.2);
        rec.tap(&transport);
        transport.set_time(4.0);
        let track = rec.finish(&mut transport);

        let line = &track.lines[0];
        let words = line.words.as_ref().unwrap();
        assert_eq!(words[0].text, "Hi");
        assert_eq!(words[0].start, Some(0.5));
        assert_eq!(words[0].end, Some(1.2));
        assert_eq!(words[1].text, "there");
        assert_eq!(words[1].start, Some(1.2));
        assert!(approx(words[1].end.unwrap(), 1.7));
        assert_eq!(line.start, 0.5);
        assert!(approx(line.end, 2.2));
        assert!(line.words_match_text());
    }

    #[test]
    fn test_word_mode_closes_previous_line() {
        let mut rec = session("a b\nc", SyncMode::Word, 0.0);
        rec.tap_at(1.0);
        rec.tap_at(2.0);
        // Provisional line end is 3.0; a tap before it clamps the line
        rec.tap_at(2.4);

        let first = &rec.lines()[0];
        assert_eq!(first.end, Some(2.4));
        assert_eq!(first.words.as_ref().unwrap()[1].end, Some(2.5));
        assert_eq!(rec.lines()[1].start, Some(2.4));
    }

    #[test]
    fn test_word_mode_keeps_earlier_provisional_close() {
        let mut rec = session("a\nb", SyncMode::Word, 0.0);
        rec.tap_at(1.0);
        rec.tap_at(5.0);
        assert_eq!(rec.lines()[0].end, Some(2.0));
    }

    #[test]
    fn test_word_mode_invariant_holds_after_recording() {
        let mut rec = session("one two three\nfour five", SyncMode::Word, 0.0);
        for (i, t) in [0.1, 0.4, 0.9, 1.5, 1.8].into_iter().enumerate() {
            assert!(matches!(rec.tap_at(t), TapOutcome::Recorded { .. }), "tap {i}");
        }
        assert!(rec.is_complete());
        let track = rec.finish_at(Some(10.0));
        assert_eq!(track.len(), 2);
        for line in &track.lines {
            assert!(line.words_match_text());
        }
    }

    #[test]
    fn test_word_undo_within_line_rewinds_one_second() {
        let mut transport = ScriptedTransport::at(3.0);
        let mut rec = session("a b c", SyncMode::Word, 0.0);
        rec.tap(&transport);
        transport.set_time(4.0);
        rec.tap(&transport);

        let outcome = rec.undo(&mut transport);
        assert_eq!(outcome, UndoOutcome::Rewound { rewind_secs: 1.0 });
        assert_eq!(rec.word_index(), 1);
        assert_eq!(rec.line_index(), 0);
        assert_eq!(transport.seeks, vec![3.0]);
        // Stale timing stays until overwritten
        assert_eq!(rec.lines()[0].words.as_ref().unwrap()[1].start, Some(4.0));
    }

    #[test]
    fn test_word_undo_across_lines_rewinds_two_seconds() {
        let mut transport = ScriptedTransport::at(1.0);
        let mut rec = session("a b\nc", SyncMode::Word, 0.0);
        rec.tap(&transport);
        transport.set_time(2.0);
        rec.tap(&transport);
        assert_eq!(rec.line_index(), 1);
        assert_eq!(rec.word_index(), 0);

        transport.set_time(2.5);
        let outcome = rec.undo(&mut transport);
        assert_eq!(outcome, UndoOutcome::Rewound { rewind_secs: 2.0 });
        assert_eq!(rec.line_index(), 0);
        assert_eq!(rec.word_index(), 1);
        assert_eq!(transport.seeks, vec![0.5]);
        // Placeholders are never removed
        assert_eq!(rec.lines().len(), 2);
    }

    #[test]
    fn test_word_retap_after_undo_within_line_overwrites() {
        let mut rec = session("a b c", SyncMode::Word, 0.0);
        rec.tap_at(3.0);
        rec.tap_at(4.0);
        rec.rewind();
        rec.tap_at(3.6);

        let words = rec.lines()[0].words.clone().unwrap();
        assert_eq!(words[0].end, Some(3.6));
        assert_eq!(words[1].start, Some(3.6));
        assert_eq!(rec.word_index(), 2);

        // Last word, then undo back onto it and re-tap earlier
        rec.tap_at(5.0);
        assert_eq!(rec.lines()[0].end, Some(6.0));
        assert_eq!(rec.rewind(), UndoOutcome::Rewound { rewind_secs: 2.0 });
        assert_eq!((rec.line_index(), rec.word_index()), (0, 2));
        rec.tap_at(4.5);

        let line = &rec.lines()[0];
        let words = line.words.as_ref().unwrap();
        assert_eq!(words[1].end, Some(4.5));
        assert_eq!(words[2].start, Some(4.5));
        assert_eq!(words[2].end, Some(5.0));
        assert_eq!(line.end, Some(5.5));
        assert!(rec.is_complete());
    }

    #[test]
    fn test_word_retap_after_undo_into_previous_line_overwrites() {
        let mut rec = session("a b\nc", SyncMode::Word, 0.0);
        rec.tap_at(1.0);
        rec.tap_at(2.0);
        rec.tap_at(2.4);
        assert_eq!(rec.lines()[0].end, Some(2.4));

        // Back onto "c", then re-tap later
        rec.rewind();
        assert_eq!((rec.line_index(), rec.word_index()), (1, 0));
        rec.tap_at(2.8);
        let second = &rec.lines()[1];
        assert_eq!(second.start, Some(2.8));
        assert_eq!(second.words.as_ref().unwrap()[0].start, Some(2.8));
        assert!(approx(second.end.unwrap(), 3.8));
        // The earlier close of the first line stands
        assert_eq!(rec.lines()[0].end, Some(2.4));

        // Back into the first line's last word
        rec.rewind();
        rec.rewind();
        assert_eq!((rec.line_index(), rec.word_index()), (0, 1));
        rec.tap_at(1.8);
        let first = &rec.lines()[0];
        let words = first.words.as_ref().unwrap();
        assert_eq!(words[0].end, Some(1.8));
        assert_eq!(words[1].start, Some(1.8));
        assert!(approx(words[1].end.unwrap(), 2.3));
        assert!(approx(first.end.unwrap(), 2.8));
        assert_eq!((rec.line_index(), rec.word_index()), (1, 0));
    }

    #[test]
    fn test_word_undo_at_origin_is_ignored() {
        let mut transport = ScriptedTransport::at(1.0);
        let mut rec = session("a b", SyncMode::Word, 0.0);
        assert_eq!(rec.undo(&mut transport), UndoOutcome::Ignored);
        assert!(transport.seeks.is_empty());
    }

    #[test]
    fn test_word_finish_patches_unclosed_line_and_drops_unreached() {
        let mut rec = session("a b c\nd e", SyncMode::Word, 0.0);
        rec.tap_at(1.0);
        rec.tap_at(1.5);
        let track = rec.finish_at(Some(9.0));

        assert_eq!(track.len(), 1);
        let line = &track.lines[0];
        assert_eq!(line.start, 1.0);
        assert_eq!(line.end, 2.5);
        let words = line.words.as_ref().unwrap();
        assert_eq!(words[2].start, None);
        assert!(line.words_match_text());
    }

    #[test]
    fn test_finish_without_time_keeps_placeholder() {
        let mut transport = ScriptedTransport::at(2.0);
        let mut rec = session("a", SyncMode::Line, 0.0);
        rec.tap(&transport);
        transport.time = None;
        transport.rate = 0.5;
        let track = rec.finish(&mut transport);
        assert_eq!(track.lines[0].end, 7.0);
        assert_eq!(transport.rate, 1.0);
    }

    #[test]
    fn test_finish_with_no_taps_is_empty() {
        let track = session("a\nb", SyncMode::Line, 0.0).finish_at(Some(3.0));
        assert!(track.is_empty());
        let track = session("a\nb", SyncMode::Word, 0.0).finish_at(Some(3.0));
        assert!(track.is_empty());
    }

    #[test]
    fn test_sync_tool_single_session() {
        let mut transport = ScriptedTransport::at(0.0);
        let mut tool = SyncTool::default();
        assert_eq!(tool.phase(), SyncPhase::AwaitingInput);

        tool.start(&mut transport, "a\nb", SyncMode::Line).unwrap();
        assert_eq!(tool.phase(), SyncPhase::Recording);
        assert!(matches!(
            tool.start(&mut transport, "c", SyncMode::Line),
            Err(CoreError::SessionActive)
        ));
    }

    #[test]
    fn test_sync_tool_empty_lyrics_stays_idle() {
        let mut transport = ScriptedTransport::at(0.0);
        let mut tool = SyncTool::default();
        assert!(matches!(
            tool.start(&mut transport, "", SyncMode::Word),
            Err(CoreError::EmptyLyrics)
        ));
        assert_eq!(tool.phase(), SyncPhase::AwaitingInput);
    }

    #[test]
    fn test_sync_tool_finish_hands_over_settings() {
        let mut transport = ScriptedTransport::at(0.0);
        let mut tool = SyncTool::default();
        tool.set_offset(-0.5);
        tool.set_duration_cap(3.0);
        tool.start(&mut transport, "Hello", SyncMode::Line).unwrap();
        transport.set_time(1.0);
        tool.tap(&transport);

        let finished = tool.finish(&mut transport).unwrap();
        assert_eq!(finished.offset, -0.5);
        assert_eq!(finished.duration_cap, 3.0);
        assert_eq!(finished.track.lines, vec![Line::new(1.0, 4.0, "Hello")]);
        assert_eq!(tool.phase(), SyncPhase::AwaitingInput);
        assert!(matches!(tool.finish(&mut transport), Err(CoreError::NoActiveSession)));
    }

    #[test]
    fn test_sync_tool_cancel_discards_and_resets_rate() {
        let mut transport = ScriptedTransport::at(0.0);
        let mut tool = SyncTool::default();
        tool.start(&mut transport, "a\nb", SyncMode::Line).unwrap();
        assert!(tool.set_speed(&mut transport, 0.5));
        transport.set_time(1.0);
        tool.tap(&transport);

        tool.cancel(&mut transport);
        assert_eq!(tool.phase(), SyncPhase::AwaitingInput);
        assert!(tool.draft().is_none());
        assert_eq!(transport.rate, 1.0);

        // A fresh session never sees the cancelled draft
        tool.start(&mut transport, "x", SyncMode::Line).unwrap();
        assert_eq!(tool.draft().map(<[DraftLine]>::len), Some(0));
    }

    #[test]
    fn test_sync_tool_handle_commands() {
        let mut transport = ScriptedTransport::at(0.0);
        let mut tool = SyncTool::default();
        assert_eq!(tool.handle(&mut transport, SyncCommand::Tap), SyncResponse::Ignored);

        tool.start(&mut transport, "a\nb", SyncMode::Line).unwrap();
        transport.set_time(1.0);
        assert!(matches!(
            tool.handle(&mut transport, SyncCommand::Tap),
            SyncResponse::Tapped(TapOutcome::Recorded { line: 0, .. })
        ));
        assert_eq!(
            tool.handle(&mut transport, SyncCommand::SetSpeed(0.75)),
            SyncResponse::SpeedChanged(0.75)
        );
        assert_eq!(transport.rate, 0.75);
        assert_eq!(
            tool.handle(&mut transport, SyncCommand::SetSpeed(0.0)),
            SyncResponse::Ignored
        );

        transport.set_time(2.0);
        let SyncResponse::Finished(finished) = tool.handle(&mut transport, SyncCommand::Finish)
        else {
            panic!("expected finished track");
        };
        assert_eq!(finished.track.lines, vec![Line::new(1.0, 2.0, "a")]);
        assert_eq!(transport.rate, 1.0);
    }

    #[test]
    fn test_sync_tool_prompt() {
        let mut transport = ScriptedTransport::at(0.0);
        let mut tool = SyncTool::default();
        assert!(tool.prompt().is_none());

        tool.start(&mut transport, "one\ntwo words\nthree", SyncMode::Word)
            .unwrap();
        tool.tap(&transport);

        let prompt = tool.prompt().unwrap();
        assert_eq!(prompt.previous.as_deref(), Some("one"));
        assert_eq!(prompt.current.as_deref(), Some("two words"));
        assert_eq!(prompt.next.as_deref(), Some("three"));
        assert_eq!(prompt.word.as_deref(), Some("two"));
        assert_eq!(prompt.line_index, 1);
        assert_eq!(prompt.line_count, 3);
    }

    #[test]
    fn test_sync_tool_prompt_when_complete() {
        let mut transport = ScriptedTransport::at(0.0);
        let mut tool = SyncTool::default();
        tool.start(&mut transport, "only", SyncMode::Line).unwrap();
        tool.tap(&transport);

        let prompt = tool.prompt().unwrap();
        assert_eq!(prompt.previous.as_deref(), Some("only"));
        assert_eq!(prompt.current, None);
        assert_eq!(prompt.next, None);
    }
}
