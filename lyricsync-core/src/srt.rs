//! SRT text codec for subtitle tracks.
//!
//! Word timing has no representation in SRT, so a round trip keeps line
//! timing (to the millisecond) and text only.

use crate::time::{format_srt_timestamp, parse_srt_timestamp};
use crate::track::{Line, Track};
use std::fmt::Write;
use tracing::debug;

/// Marker that joins the text lines of a multi-line cue.
pub const LINE_BREAK_MARKER: &str = "<br>";

const LOG_TARGET: &str = "lyricsync::srt";

const TIMING_DELIMITER: &str = "-->";

/// Encode a track as SRT: index, timing line, text, blank separator.
#[must_use]
pub fn encode(track: &Track) -> String {
    let mut out = String::new();
    for (i, line) in track.lines.iter().enumerate() {
        let _ = write!(
            out,
            "{}\n{} {TIMING_DELIMITER} {}\n{}\n\n",
            i + 1,
            format_srt_timestamp(line.start),
            format_srt_timestamp(line.end),
            line.text.replace(LINE_BREAK_MARKER, "\n")
        );
    }
    out
}

/// Decode SRT text into a track.
///
/// Blocks are separated by blank lines. Within a block the first line
/// containing `-->` carries the timing and every following line is text.
/// Blocks without timing, with unparseable timestamps or without text are
/// skipped; decoding never fails as a whole.
#[must_use]
pub fn decode(input: &str) -> Track {
    let normalized = input.replace("\r\n", "\n");
    let mut lines = Vec::new();

    for block in split_blocks(&normalized) {
        match parse_block(&block) {
            Some(line) => lines.push(line),
            None => debug!(
                target: LOG_TARGET,
                "Skipping malformed SRT block: {:?}",
                block.join("\n")
            ),
        }
    }

    Track::new(lines)
}

/// Split on runs of blank (or whitespace-only) lines
fn split_blocks(input: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in input.split('\n') {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn parse_block(block: &[&str]) -> Option<Line> {
    let timing_index = block.iter().position(|l| l.contains(TIMING_DELIMITER))?;

    let mut times = block[timing_index].split(TIMING_DELIMITER);
    let start = parse_srt_timestamp(times.next()?)?;
    let end = parse_srt_timestamp(times.next()?)?;
    if times.next().is_some() {
        return None;
    }

    let text = block[timing_index + 1..].join(LINE_BREAK_MARKER);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    Some(Line::new(start, end, text))
}
