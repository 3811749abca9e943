//! Plain-text rendering for the terminal.

use lyricsync_core::{format_clock, SyncPrompt, VisibleSubtitle, WordState};

/// Render a subtitle with the word being sung in brackets.
pub fn karaoke_line(subtitle: &VisibleSubtitle) -> String {
    if subtitle.words.is_empty() {
        return subtitle.text.clone();
    }
    subtitle
        .words
        .iter()
        .map(render_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_word(word: &WordState) -> String {
    if word.current {
        format!("[{}]", word.text)
    } else {
        word.text.clone()
    }
}

/// Timestamp with hundredths, e.g. `1:05.40`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn position(seconds: f64) -> String {
    let hundredths = ((seconds.max(0.0).fract() * 100.0).floor() as u64).min(99);
    format!("{}.{hundredths:02}", format_clock(seconds))
}

/// Three-line view of the recording cursor.
pub fn prompt(prompt: &SyncPrompt, now: Option<f64>) -> String {
    let clock = now.map_or_else(|| "--:--".to_string(), position);
    let mut out = format!(
        "[{clock}] line {}/{}\n",
        (prompt.line_index + 1).min(prompt.line_count),
        prompt.line_count
    );

    if let Some(previous) = &prompt.previous {
        out.push_str(&format!("    {previous}\n"));
    }
    match &prompt.current {
        Some(current) => {
            out.push_str(&format!("  > {current}"));
            if let Some(word) = &prompt.word {
                out.push_str(&format!("   (next word: {word})"));
            }
            out.push('\n');
        }
        None => out.push_str("  (all lines stamped; f to finish, u to undo)\n"),
    }
    if let Some(next) = &prompt.next {
        out.push_str(&format!("    {next}\n"));
    }

    out
}
