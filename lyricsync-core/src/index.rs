//! Subtitle lookup by playback time.

use crate::track::{Line, Track};

/// Highlight state of one word in the visible line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordState {
    pub text: String,
    /// Already reached (sung or being sung)
    pub active: bool,
    /// Being sung right now
    pub current: bool,
}

/// The line visible at a given playback time.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleSubtitle {
    /// Index of the line in the track
    pub index: usize,
    pub text: String,
    pub start: f64,
    pub end: f64,
    /// Playback time with the offset removed
    pub lookup_time: f64,
    pub words: Vec<WordState>,
}

/// Resolve the subtitle visible at `current_time`.
///
/// The offset is subtracted from `current_time` before lookup. The first line
/// whose `[start, end]` contains the lookup time wins. A positive
/// `duration_cap` hides a line once more than `duration_cap` seconds have
/// passed since its start, even if its stored end is later.
///
/// Pure: the track is not modified and identical inputs give identical output.
#[must_use]
pub fn resolve(
    track: &Track,
    current_time: f64,
    offset: f64,
    duration_cap: f64,
) -> Option<VisibleSubtitle> {
    let lookup_time = current_time - offset;

    let (index, line) = track
        .lines
        .iter()
        .enumerate()
        .find(|(_, line)| line.contains(lookup_time))?;

    if duration_cap > 0.0 && lookup_time - line.start > duration_cap {
        return None;
    }

    Some(VisibleSubtitle {
        index,
        text: line.text.clone(),
        start: line.start,
        end: line.end,
        lookup_time,
        words: word_states(line, lookup_time),
    })
}

/// Per-word highlight state from word timing, or estimated when absent.
#[must_use]
pub fn word_states(line: &Line, lookup_time: f64) -> Vec<WordState> {
    match line.words.as_deref() {
        Some(words) if !words.is_empty() => words
            .iter()
            .map(|word| {
                let active = word.start.is_some_and(|start| lookup_time >= start);
                let current = active && word.end.map_or(true, |end| lookup_time < end);
                WordState {
                    text: word.text.clone(),
                    active,
                    current,
                }
            })
            .collect(),
        _ => estimated_word_states(line, lookup_time),
    }
}

/// Estimate the sung word by linear interpolation across the line.
///
/// An approximation for lines imported without word timing.
fn estimated_word_states(line: &Line, lookup_time: f64) -> Vec<WordState> {
    let words: Vec<&str> = line.text.split(' ').collect();
    let active_index = estimated_active_index(line, lookup_time, words.len());

    words
        .into_iter()
        .enumerate()
        .map(|(i, text)| WordState {
            text: text.to_string(),
            active: i <= active_index,
            current: i == active_index,
        })
        .collect()
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn estimated_active_index(line: &Line, lookup_time: f64, word_count: usize) -> usize {
    let duration = line.duration();
    let progress = if duration > 0.0 {
        ((lookup_time - line.start) / duration).clamp(0.0, 1.0)
    } else {
        1.0
    };
    // progress is within [0, 1], so the product fits the word count
    (progress * word_count as f64).floor() as usize
}

/// A frozen track together with its display settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubtitleIndex {
    track: Track,
    offset: f64,
    duration_cap: f64,
}

impl SubtitleIndex {
    #[must_use]
    pub fn new(track: Track, offset: f64, duration_cap: f64) -> Self {
        Self {
            track,
            offset,
            duration_cap: duration_cap.max(0.0),
        }
    }

    #[must_use]
    pub const fn track(&self) -> &Track {
        &self.track
    }

    #[must_use]
    pub const fn offset(&self) -> f64 {
        self.offset
    }

    #[must_use]
    pub const fn duration_cap(&self) -> f64 {
        self.duration_cap
    }

    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
    }

    pub fn set_duration_cap(&mut self, duration_cap: f64) {
        self.duration_cap = duration_cap.max(0.0);
    }

    #[must_use]
    pub fn resolve(&self, current_time: f64) -> Option<VisibleSubtitle> {
        resolve(&self.track, current_time, self.offset, self.duration_cap)
    }
}
