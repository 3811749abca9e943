pub mod config;
pub mod error;
pub mod format;
pub mod index;
pub mod lrc;
pub mod lyrics;
pub mod overlay;
pub mod paths;
pub mod recorder;
pub mod srt;
pub mod time;
pub mod track;
pub mod transport;

pub use config::{DisplayConfig, LoggingConfig, LyricSyncConfig, SyncConfig, CONFIG_TEMPLATE};
pub use error::{CoreError, Result};
pub use format::{load_track, save_track, TrackFormat};
pub use index::{resolve, SubtitleIndex, VisibleSubtitle, WordState};
pub use lrc::{LrcFile, LrcMetadata};
pub use lyrics::{LyricLine, LyricSheet};
pub use overlay::{Overlay, OverlayEvent};
pub use paths::{config_dir, config_path, log_file_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME};
pub use recorder::{
    DraftLine, FinishedTrack, RecordingSession, SyncCommand, SyncMode, SyncPhase, SyncPrompt,
    SyncResponse, SyncTimings, SyncTool, TapOutcome, UndoOutcome,
};
pub use time::{format_clock, SecondsExt};
pub use track::{Line, Track, Word};
pub use transport::{PlaybackClock, Transport};
