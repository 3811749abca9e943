//! Track file formats, chosen by file extension.

use crate::error::{CoreError, Result};
use crate::lrc::{self, LrcFile, LrcMetadata};
use crate::srt;
use crate::track::Track;
use std::fs;
use std::path::Path;
use tracing::info;

const LOG_TARGET: &str = "lyricsync::format";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackFormat {
    /// SubRip; line timing only
    Srt,
    /// LRC, enhanced with word stamps when available
    Lrc,
    /// Full track model, word timing included
    Json,
}

impl TrackFormat {
    /// Pick a format from a path's extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` for unknown or missing extensions.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match extension.as_str() {
            "srt" => Ok(Self::Srt),
            "lrc" => Ok(Self::Lrc),
            "json" => Ok(Self::Json),
            _ => Err(CoreError::UnsupportedFormat { extension }),
        }
    }

    /// # Errors
    ///
    /// Returns `Json` if JSON serialization fails.
    pub fn encode(self, track: &Track) -> Result<String> {
        Ok(match self {
            Self::Srt => srt::encode(track),
            Self::Lrc => lrc::encode(track, &LrcMetadata::default()),
            Self::Json => serde_json::to_string_pretty(track)?,
        })
    }

    /// # Errors
    ///
    /// Returns `Json` for malformed JSON. SRT and LRC skip what they cannot read.
    pub fn decode(self, input: &str) -> Result<Track> {
        Ok(match self {
            Self::Srt => srt::decode(input),
            Self::Lrc => LrcFile::parse(input).track,
            Self::Json => serde_json::from_str(input)?,
        })
    }
}

/// Read a track file in the format given by its extension.
///
/// # Errors
///
/// Returns an error for unsupported extensions, IO failures or malformed JSON.
pub fn load_track(path: &Path) -> Result<Track> {
    let format = TrackFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    let track = format.decode(&content)?;
    info!(target: LOG_TARGET, "Loaded {} lines from {}", track.len(), path.display());
    Ok(track)
}

/// Write a track file in the format given by its extension.
///
/// # Errors
///
/// Returns an error for unsupported extensions or IO failures.
pub fn save_track(path: &Path, track: &Track) -> Result<()> {
    let format = TrackFormat::from_path(path)?;
    fs::write(path, format.encode(track)?)?;
    info!(target: LOG_TARGET, "Saved {} lines to {}", track.len(), path.display());
    Ok(())
}
