use crate::error::{CoreError, Result};
use crate::recorder::{SyncMode, SyncTimings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const LOG_TARGET: &str = "lyricsync::config";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LyricSyncConfig {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Recording settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub mode: SyncMode,
    /// Fixed line length in line mode; 0 means "until the next tap"
    #[serde(default)]
    pub duration_cap: f64,
    #[serde(default = "default_speed_presets")]
    pub speed_presets: Vec<f64>,
    #[serde(default)]
    pub timings: SyncTimings,
}

fn default_speed_presets() -> Vec<f64> {
    vec![0.5, 0.75, 1.0]
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            mode: SyncMode::default(),
            duration_cap: 0.0,
            speed_presets: default_speed_presets(),
            timings: SyncTimings::default(),
        }
    }
}

/// Playback display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Seconds subtracted from playback time before lookup
    #[serde(default)]
    pub offset: f64,
    /// Maximum time a line stays visible; 0 shows it until its end
    #[serde(default)]
    pub duration_cap: f64,
    #[serde(default = "default_offset_step")]
    pub offset_step: f64,
    #[serde(default = "default_cap_presets")]
    pub cap_presets: Vec<f64>,
}

const fn default_offset_step() -> f64 {
    0.5
}

fn default_cap_presets() -> Vec<f64> {
    vec![0.0, 3.0, 5.0]
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            offset: 0.0,
            duration_cap: 0.0,
            offset_step: default_offset_step(),
            cap_presets: default_cap_presets(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to `~/.config/lyricsync/lyricsync.log`
    #[serde(default)]
    pub enabled: bool,
}

impl LyricSyncConfig {
    /// Get the configuration directory path (~/.config/lyricsync/)
    #[must_use]
    pub fn config_dir() -> PathBuf {
        crate::paths::config_dir()
    }

    /// Get the config file path (~/.config/lyricsync/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from file or create template on first run
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` after writing the template on first run, or an
    /// error if the file cannot be read, parsed or validated.
    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&config_path, CONFIG_TEMPLATE)?;
            info!(target: LOG_TARGET, "Wrote config template to {}", config_path.display());

            return Err(CoreError::ConfigNotFound { path: config_path });
        }

        Self::load_from(&config_path)
    }

    /// Load and validate a config file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate config text
    ///
    /// # Errors
    ///
    /// Returns `ConfigParseError` for malformed TOML and `ConfigInvalid` for
    /// out-of-range values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        fn invalid(message: impl Into<String>) -> Result<()> {
            Err(CoreError::ConfigInvalid {
                message: message.into(),
            })
        }

        if !is_non_negative(self.sync.duration_cap) {
            return invalid("sync.duration_cap must be >= 0");
        }
        if self.sync.speed_presets.is_empty() {
            return invalid("sync.speed_presets must not be empty");
        }
        if self
            .sync
            .speed_presets
            .iter()
            .any(|speed| !speed.is_finite() || *speed <= 0.0)
        {
            return invalid("sync.speed_presets must all be > 0");
        }

        let t = &self.sync.timings;
        let timings = [
            ("line_placeholder_secs", t.line_placeholder_secs),
            ("word_tail_secs", t.word_tail_secs),
            ("line_tail_secs", t.line_tail_secs),
            ("unclosed_line_secs", t.unclosed_line_secs),
            ("undo_line_rewind_secs", t.undo_line_rewind_secs),
            ("undo_word_rewind_secs", t.undo_word_rewind_secs),
            ("undo_word_line_rewind_secs", t.undo_word_line_rewind_secs),
        ];
        if let Some((name, _)) = timings.iter().find(|(_, v)| !is_non_negative(*v)) {
            return invalid(format!("sync.timings.{name} must be >= 0"));
        }

        if !self.display.offset.is_finite() {
            return invalid("display.offset must be a finite number");
        }
        if !is_non_negative(self.display.duration_cap) {
            return invalid("display.duration_cap must be >= 0");
        }
        if !self.display.offset_step.is_finite() || self.display.offset_step <= 0.0 {
            return invalid("display.offset_step must be > 0");
        }
        if !self.display.cap_presets.iter().copied().all(is_non_negative) {
            return invalid("display.cap_presets must all be >= 0");
        }

        Ok(())
    }
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

pub const CONFIG_TEMPLATE: &str = r#"# LyricSync Configuration
# ~/.config/lyricsync/config.toml

[sync]
# Recording granularity: "line" or "word"
mode = "line"
# Fixed line length in seconds for line mode; 0 = until the next tap
duration_cap = 0.0
# Playback speeds selectable while recording
speed_presets = [0.5, 0.75, 1.0]

[sync.timings]
line_placeholder_secs = 5.0
word_tail_secs = 0.5
line_tail_secs = 1.0
unclosed_line_secs = 1.0
undo_line_rewind_secs = 3.0
undo_word_rewind_secs = 1.0
undo_word_line_rewind_secs = 2.0

[display]
# Seconds subtracted from playback time before lookup (negative shows lines later)
offset = 0.0
# Maximum seconds a line stays visible; 0 = until its end
duration_cap = 0.0
offset_step = 0.5
cap_presets = [0.0, 3.0, 5.0]

[logging]
# Also write logs to ~/.config/lyricsync/lyricsync.log
enabled = false
"#;
