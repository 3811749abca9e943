use clap::Args;
use lyricsync_core::{load_track, save_track, Result};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Source track (.srt, .lrc, .json)
    pub input: PathBuf,
    /// Destination track; format from extension
    pub output: PathBuf,
}

/// Convert a track between formats. Word timing survives LRC and JSON only.
pub fn run(args: &ConvertArgs) -> Result<()> {
    let track = load_track(&args.input)?;
    if track.has_word_timing() && args.output.extension().is_some_and(|ext| ext == "srt") {
        tracing::warn!("SRT has no word timing; only line timing is kept");
    }
    save_track(&args.output, &track)?;
    println!(
        "Converted {} line(s): {} -> {}",
        track.len(),
        args.input.display(),
        args.output.display()
    );
    Ok(())
}
