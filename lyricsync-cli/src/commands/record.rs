use crate::input::{self, InputAction};
use crate::render;
use clap::{Args, ValueEnum};
use lyricsync_core::{
    save_track, FinishedTrack, LyricSyncConfig, PlaybackClock, Result, SyncMode, SyncResponse,
    SyncTool, TapOutcome, TrackFormat, Transport, UndoOutcome,
};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Line,
    Word,
}

impl From<ModeArg> for SyncMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Line => Self::Line,
            ModeArg::Word => Self::Word,
        }
    }
}

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Plain-text lyrics, one line per row
    #[arg(long, short)]
    pub lyrics: PathBuf,

    /// Output file; format from extension (.srt, .lrc, .json)
    #[arg(long, short)]
    pub out: PathBuf,

    /// Recording granularity (defaults to `sync.mode`)
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Fixed line length in seconds for line mode; 0 = until the next tap
    #[arg(long)]
    pub cap: Option<f64>,

    /// Song length in seconds; the clock stops there
    #[arg(long)]
    pub duration: Option<f64>,
}

/// Tap along on stdin against a software playback clock.
pub async fn run(args: RecordArgs, config: &LyricSyncConfig) -> Result<()> {
    // Reject an unusable output path before any tapping happens
    TrackFormat::from_path(&args.out)?;
    let lyrics = std::fs::read_to_string(&args.lyrics)?;
    let mode = args.mode.map_or(config.sync.mode, SyncMode::from);

    let mut clock = PlaybackClock::new(args.duration);
    let mut tool = SyncTool::from_config(config);
    if let Some(cap) = args.cap {
        tool.set_duration_cap(cap);
    }
    tool.start(&mut clock, &lyrics, mode)?;

    println!("{}\n", input::HELP);
    print_prompt(&tool, &clock);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(action) = input::parse_line(&line) else {
            println!("Unknown input {line:?}, ? for help");
            continue;
        };

        let command = match action {
            InputAction::Command(command) => command,
            InputAction::Help => {
                println!("{}", input::HELP);
                continue;
            }
            InputAction::Status => {
                print_prompt(&tool, &clock);
                continue;
            }
        };

        match tool.handle(&mut clock, command) {
            SyncResponse::Finished(finished) => {
                save_finished(&args.out, &finished)?;
                return Ok(());
            }
            SyncResponse::Cancelled => {
                info!("Recording cancelled, nothing saved");
                return Ok(());
            }
            SyncResponse::Tapped(TapOutcome::Ignored) => {
                println!("Nothing left to stamp");
            }
            SyncResponse::Undone(UndoOutcome::Rewound { rewind_secs }) => {
                println!("Undone, rewound {rewind_secs}s");
            }
            SyncResponse::Undone(UndoOutcome::Ignored) => {
                println!("Nothing to undo");
            }
            SyncResponse::SpeedChanged(rate) => {
                if !tool.speed_presets().contains(&rate) {
                    warn!("Speed {rate}x is not one of the configured presets");
                }
                println!("Speed {rate}x");
            }
            SyncResponse::Tapped(TapOutcome::Recorded { .. }) | SyncResponse::Ignored => {}
        }

        print_prompt(&tool, &clock);
    }

    // Stdin closed: keep what was recorded
    println!("Input closed");
    let finished = tool.finish(&mut clock)?;
    save_finished(&args.out, &finished)
}

fn save_finished(out: &Path, finished: &FinishedTrack) -> Result<()> {
    save_track(out, &finished.track)?;
    println!(
        "Saved {} line(s) to {}",
        finished.track.len(),
        out.display()
    );
    println!("{}", display_settings(finished));
    Ok(())
}

/// Display settings to pass to `show` for this recording.
fn display_settings(finished: &FinishedTrack) -> String {
    let cap = if finished.duration_cap > 0.0 {
        format!("{}s", finished.duration_cap)
    } else {
        "auto".to_string()
    };
    format!(
        "Display: offset {}s, cap {cap} (show --offset {} --cap {})",
        finished.offset, finished.offset, finished.duration_cap
    )
}

fn print_prompt<T: Transport>(tool: &SyncTool, transport: &T) {
    if let Some(prompt) = tool.prompt() {
        print!("{}", render::prompt(&prompt, transport.current_time()));
    }
}
