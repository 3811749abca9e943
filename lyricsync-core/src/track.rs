//! Subtitle track data model.

use serde::{Deserialize, Serialize};

/// A finished, ordered sequence of timed lyric lines.
///
/// Lines are kept in lyric order. A track is immutable once it is handed to
/// the subtitle index; recording again produces a new track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub lines: Vec<Line>,
}

/// A single subtitle entry with timing in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: f64,
    pub end: f64,
    pub text: String,
    /// Word-level timing, present only for word-granularity recordings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<Word>>,
}

/// Word-level timing within a line.
///
/// `None` means the word was never reached (no start) or never closed (no end).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
}

impl Track {
    #[must_use]
    pub const fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether any line carries word-level timing.
    #[must_use]
    pub fn has_word_timing(&self) -> bool {
        self.lines
            .iter()
            .any(|line| line.words.as_ref().is_some_and(|w| !w.is_empty()))
    }

    /// Plain lyric text, one line per entry.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Line {
    /// Create a line without word timing
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            words: None,
        }
    }

    /// Attach word-level timing
    #[must_use]
    pub fn with_words(mut self, words: Vec<Word>) -> Self {
        self.words = Some(words);
        self
    }

    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `time` falls within `[start, end]`, inclusive on both ends.
    #[must_use]
    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }

    /// Check that the word texts joined by single spaces reconstruct `text`.
    ///
    /// Lines without words (or with an empty word list) are trivially consistent.
    #[must_use]
    pub fn words_match_text(&self) -> bool {
        match self.words.as_deref() {
            None | Some([]) => true,
            Some(words) => join_words(words) == self.text,
        }
    }
}

impl Word {
    /// Create a word with no timing assigned yet
    pub fn unset(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start: None,
            end: None,
        }
    }

    /// Create a fully timed word
    pub fn timed(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start: Some(start),
            end: Some(end),
        }
    }
}

/// Join word texts with single spaces.
#[must_use]
pub fn join_words(words: &[Word]) -> String {
    words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
