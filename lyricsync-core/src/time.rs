//! Time conversion and formatting utilities.
//!
//! Playback positions are plain `f64` seconds. These helpers convert them to
//! whole milliseconds with explicit truncation and saturation, and format or
//! parse the clock strings used by the text codecs.

/// Tolerance added before truncating to milliseconds, so values such as
/// `4.35` (stored as `4.3499999...`) still land on the intended millisecond.
const MILLIS_EPSILON: f64 = 1e-6;

/// Extension trait for safe seconds conversions.
pub trait SecondsExt {
    /// Convert seconds to whole milliseconds, truncating the fraction.
    ///
    /// Negative and non-finite values become 0; values too large for `u64`
    /// saturate at `u64::MAX`.
    fn as_millis_u64(self) -> u64;

    /// Clamp a time to the start of the track (negative becomes 0).
    fn clamp_to_track(self) -> f64;
}

impl SecondsExt for f64 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn as_millis_u64(self) -> u64 {
        if !self.is_finite() || self <= 0.0 {
            return 0;
        }
        // Float to int `as` casts saturate
        (self * 1000.0 + MILLIS_EPSILON).floor() as u64
    }

    fn clamp_to_track(self) -> f64 {
        if self.is_finite() {
            self.max(0.0)
        } else {
            0.0
        }
    }
}

/// Convert whole milliseconds back to seconds.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn millis_to_seconds(millis: u64) -> f64 {
    millis as f64 / 1000.0
}

/// Format seconds as `HH:MM:SS,mmm` (zero-padded, milliseconds truncated).
#[must_use]
pub fn format_srt_timestamp(seconds: f64) -> String {
    let total_ms = seconds.as_millis_u64();
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    format!("{hours:02}:{mins:02}:{secs:02},{ms:03}")
}

/// Parse `HH:MM:SS,mmm` or `HH:MM:SS.mmm` into seconds.
///
/// The fractional part is read as an integer count of milliseconds, so
/// `00:00:01,5` is 1.005 seconds. Returns `None` for anything that is not
/// three colon-separated numeric fields.
#[must_use]
pub fn parse_srt_timestamp(timestamp: &str) -> Option<f64> {
    let parts: Vec<&str> = timestamp.trim().split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let hours: u64 = parts[0].trim().parse().ok()?;
    let minutes: u64 = parts[1].trim().parse().ok()?;

    let mut seconds_parts = parts[2].trim().splitn(2, [',', '.']);
    let seconds: u64 = seconds_parts.next()?.parse().ok()?;
    let millis: u64 = match seconds_parts.next() {
        Some("") | None => 0,
        Some(ms) => ms.parse().ok()?,
    };

    let whole = hours
        .saturating_mul(3600)
        .saturating_add(minutes.saturating_mul(60))
        .saturating_add(seconds);
    Some(millis_to_seconds(whole.saturating_mul(1000)) + millis_to_seconds(millis))
}

/// Format seconds as a short `m:ss` player clock (`00:00` when nothing is known).
#[must_use]
pub fn format_clock(seconds: f64) -> String {
    let total_secs = seconds.as_millis_u64() / 1000;
    if total_secs == 0 {
        return "00:00".to_string();
    }
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}
