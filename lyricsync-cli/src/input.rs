//! Stdin line to sync command mapping.

use lyricsync_core::SyncCommand;

/// Action requested by one line of terminal input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    Command(SyncCommand),
    /// Print the key reference
    Help,
    /// Reprint the prompt with the current clock
    Status,
}

/// Map a line of input to an action.
///
/// An empty line (just Enter) taps. A bare number or `s <rate>` sets the
/// playback speed. Unknown input returns `None`.
pub fn parse_line(line: &str) -> Option<InputAction> {
    let line = line.trim();

    let action = match line.to_ascii_lowercase().as_str() {
        "" | "t" | "tap" => InputAction::Command(SyncCommand::Tap),
        "u" | "undo" => InputAction::Command(SyncCommand::Undo),
        "f" | "finish" => InputAction::Command(SyncCommand::Finish),
        "c" | "q" | "cancel" | "quit" => InputAction::Command(SyncCommand::Cancel),
        "?" | "h" | "help" => InputAction::Help,
        "p" | "status" => InputAction::Status,
        other => {
            let rate = other.strip_prefix("s ").unwrap_or(other).trim();
            let rate: f64 = rate.trim_end_matches('x').parse().ok()?;
            InputAction::Command(SyncCommand::SetSpeed(rate))
        }
    };

    Some(action)
}

pub const HELP: &str = "\
Enter / t   tap (stamp the next line or word)
u           undo the last stamp and rewind
f           finish and save
c / q       cancel without saving
0.5 / s 0.75x  set playback speed
p           show position
?           this help";
