//! LRC lyric files, including enhanced LRC with per-word `<mm:ss.xx>` stamps.
//!
//! LRC only stores start times. When parsing, each line ends where the next
//! one starts (the last line gets [`LAST_LINE_SECS`]) and each word ends where
//! the next word starts.

use crate::time::{millis_to_seconds, SecondsExt};
use crate::track::{Line, Track, Word};
use std::fmt::Write;

/// Display length given to the last line of a parsed file.
pub const LAST_LINE_SECS: f64 = 5.0;

/// Parsed LRC file: metadata tags plus the timed track
#[derive(Debug, Clone, Default)]
pub struct LrcFile {
    pub metadata: LrcMetadata,
    pub track: Track,
}

/// LRC metadata from ID tags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LrcMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub author: Option<String>,
    pub length: Option<f64>,
    pub offset: i64, // milliseconds, can be negative
}

/// A lyric line as written in the file, before end times are known
struct RawLine {
    start: f64,
    text: String,
    words: Option<Vec<RawWord>>,
}

struct RawWord {
    start: f64,
    text: String,
}

impl LrcFile {
    /// Parse an LRC string.
    ///
    /// Unknown tags and lines without a leading timestamp are ignored.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let mut metadata = LrcMetadata::default();
        let mut raw_lines = Vec::new();

        for line in input.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            // Try to parse as ID tag first
            if let Some((tag, value)) = parse_id_tag(line) {
                match tag.to_lowercase().as_str() {
                    "ti" => metadata.title = Some(value),
                    "ar" => metadata.artist = Some(value),
                    "al" => metadata.album = Some(value),
                    "au" => metadata.author = Some(value),
                    "length" => metadata.length = parse_timestamp(&value),
                    "offset" => {
                        if let Ok(offset) = value.parse::<i64>() {
                            metadata.offset = offset;
                        }
                    }
                    _ => {} // Ignore unknown tags
                }
                continue;
            }

            if let Some(parsed) = parse_lyric_line(line) {
                raw_lines.extend(parsed);
            }
        }

        let shift = offset_seconds(metadata.offset);
        if shift != 0.0 {
            for line in &mut raw_lines {
                line.start = (line.start + shift).clamp_to_track();
                for word in line.words.iter_mut().flatten() {
                    word.start = (word.start + shift).clamp_to_track();
                }
            }
        }

        raw_lines.sort_by(|a, b| a.start.total_cmp(&b.start));

        Self {
            metadata,
            track: close_lines(raw_lines),
        }
    }
}

/// Encode a track as LRC.
///
/// Lines whose words are all timed are written in enhanced form.
#[must_use]
pub fn encode(track: &Track, metadata: &LrcMetadata) -> String {
    let mut out = String::new();

    let tags = [
        ("ti", metadata.title.as_deref()),
        ("ar", metadata.artist.as_deref()),
        ("al", metadata.album.as_deref()),
        ("au", metadata.author.as_deref()),
    ];
    for (tag, value) in tags {
        if let Some(value) = value {
            let _ = writeln!(out, "[{tag}:{value}]");
        }
    }
    if metadata.offset != 0 {
        let _ = writeln!(out, "[offset:{}]", metadata.offset);
    }

    for line in &track.lines {
        let _ = write!(out, "[{}]", format_timestamp(line.start));

        let timed_words: Option<Vec<(f64, &str)>> = line.words.as_ref().and_then(|words| {
            words
                .iter()
                .map(|w| w.start.map(|start| (start, w.text.as_str())))
                .collect()
        });

        match timed_words {
            Some(words) if !words.is_empty() => {
                for (start, text) in words {
                    let _ = write!(out, " <{}> {text}", format_timestamp(start));
                }
                out.push('\n');
            }
            _ => {
                let _ = writeln!(out, "{}", line.text);
            }
        }
    }

    out
}

/// Format seconds as `mm:ss.xx` (hundredths, truncated).
#[must_use]
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = seconds.as_millis_u64();
    let hundredths = (total_ms % 1000) / 10;
    let total_secs = total_ms / 1000;
    format!("{:02}:{:02}.{hundredths:02}", total_secs / 60, total_secs % 60)
}

#[allow(clippy::cast_precision_loss)]
fn offset_seconds(offset_ms: i64) -> f64 {
    offset_ms as f64 / 1000.0
}

/// Assign end times: each line ends at the next line's start
fn close_lines(raw_lines: Vec<RawLine>) -> Track {
    let starts: Vec<f64> = raw_lines.iter().map(|l| l.start).collect();

    let lines = raw_lines
        .into_iter()
        .enumerate()
        .map(|(i, raw)| {
            let end = starts
                .get(i + 1)
                .copied()
                .unwrap_or(raw.start + LAST_LINE_SECS);

            let mut line = Line::new(raw.start, end, raw.text);
            if let Some(raw_words) = raw.words {
                let word_starts: Vec<f64> = raw_words.iter().map(|w| w.start).collect();
                let words = raw_words
                    .into_iter()
                    .enumerate()
                    .map(|(j, w)| Word {
                        text: w.text,
                        start: Some(w.start),
                        end: word_starts.get(j + 1).copied(),
                    })
                    .collect();
                line = line.with_words(words);
            }
            line
        })
        .collect();

    Track::new(lines)
}

/// Parse an ID tag like [ti:Title] or [ar:Artist]
fn parse_id_tag(line: &str) -> Option<(String, String)> {
    if !line.starts_with('[') || !line.contains(':') {
        return None;
    }

    let end = line.find(']')?;
    let content = &line[1..end];

    let first_colon = content.find(':')?;
    let tag = &content[..first_colon];

    // If the tag part looks like a number, it's a timestamp, not an ID tag
    if tag.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let value = content[first_colon + 1..].trim().to_string();
    Some((tag.to_string(), value))
}

/// Parse a lyric line like [00:12.34]Hello world or [00:12.34][00:15.67]Same lyrics
fn parse_lyric_line(line: &str) -> Option<Vec<RawLine>> {
    let mut remaining = line;
    let mut timestamps = Vec::new();

    // Extract all timestamps at the beginning
    while remaining.starts_with('[') {
        let Some(end) = remaining.find(']') else {
            break;
        };
        let Some(time) = parse_timestamp(&remaining[1..end]) else {
            break;
        };
        timestamps.push(time);
        remaining = &remaining[end + 1..];
    }

    if timestamps.is_empty() {
        return None;
    }

    let text = remaining.trim();
    let words = parse_enhanced_words(text);

    // Reconstruct text from words for enhanced format
    let text = words.as_ref().map_or_else(
        || text.to_string(),
        |w| {
            w.iter()
                .map(|word| word.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        },
    );

    // One line per timestamp (handles multi-timestamp lines)
    Some(
        timestamps
            .into_iter()
            .map(|start| RawLine {
                start,
                text: text.clone(),
                words: words.as_ref().map(|w| {
                    w.iter()
                        .map(|word| RawWord {
                            start: word.start,
                            text: word.text.clone(),
                        })
                        .collect()
                }),
            })
            .collect(),
    )
}

/// Parse a timestamp string like "00:12.34", "00:12:34" or "00:12"
fn parse_timestamp(s: &str) -> Option<f64> {
    let parts: Vec<&str> = s.trim().split(':').collect();

    match parts.len() {
        2 => {
            // mm:ss.xx or mm:ss
            let minutes: u64 = parts[0].parse().ok()?;
            let seconds: f64 = parts[1].parse().ok()?;
            if !seconds.is_finite() || seconds < 0.0 {
                return None;
            }
            Some(millis_to_seconds(minutes.saturating_mul(60_000)) + seconds)
        }
        3 => {
            // mm:ss:xx (hundredths)
            let minutes: u64 = parts[0].parse().ok()?;
            let seconds: u64 = parts[1].parse().ok()?;
            let hundredths: u64 = parts[2].parse().ok()?;
            let millis = minutes
                .checked_mul(60_000)?
                .checked_add(seconds.checked_mul(1000)?)?
                .checked_add(hundredths.checked_mul(10)?)?;
            Some(millis_to_seconds(millis))
        }
        _ => None,
    }
}

/// Parse enhanced LRC format with word timing
/// Format: <mm:ss.xx> word1 <mm:ss.xx> word2 ...
fn parse_enhanced_words(text: &str) -> Option<Vec<RawWord>> {
    if !text.contains('<') {
        return None;
    }

    let mut words = Vec::new();
    let mut remaining = text.trim();

    while !remaining.is_empty() {
        if !remaining.starts_with('<') {
            // Skip non-timestamp content
            let next_timestamp = remaining.find('<').unwrap_or(remaining.len());
            remaining = &remaining[next_timestamp..];
            continue;
        }

        let Some(end) = remaining.find('>') else {
            break;
        };
        let stamp = parse_timestamp(&remaining[1..end]);
        remaining = &remaining[end + 1..];

        if let Some(start) = stamp {
            // The word runs until the next < or the end
            let word_end = remaining.find('<').unwrap_or(remaining.len());
            let word_text = remaining[..word_end].trim();
            if !word_text.is_empty() {
                words.push(RawWord {
                    start,
                    text: word_text.to_string(),
                });
            }
            remaining = &remaining[word_end..];
        }
    }

    if words.is_empty() {
        None
    } else {
        Some(words)
    }
}
