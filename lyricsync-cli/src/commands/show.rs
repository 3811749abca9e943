use crate::render;
use clap::Args;
use lyricsync_core::{
    load_track, LyricSyncConfig, Overlay, OverlayEvent, PlaybackClock, Result, Track, Transport,
};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};

const LIVE_TICK: Duration = Duration::from_millis(50);
const MIN_STEP: f64 = 0.001;
const MAX_SAMPLES: u64 = 1_000_000;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Track file (.srt, .lrc, .json)
    pub track: PathBuf,

    /// Seconds subtracted from playback time (defaults to `display.offset`)
    #[arg(long, allow_hyphen_values = true, value_parser = finite_seconds)]
    pub offset: Option<f64>,

    /// Maximum seconds a line stays visible (defaults to `display.duration_cap`)
    #[arg(long)]
    pub cap: Option<f64>,

    /// Print the line visible at one time and exit
    #[arg(long, conflicts_with = "live", value_parser = finite_seconds)]
    pub at: Option<f64>,

    /// Start of the preview
    #[arg(long, default_value_t = 0.0, value_parser = finite_seconds)]
    pub from: f64,

    /// End of the preview (defaults to the end of the track)
    #[arg(long, value_parser = finite_seconds)]
    pub to: Option<f64>,

    /// Step between sampled times when not live
    #[arg(long, default_value_t = 0.1, value_parser = sample_step)]
    pub step: f64,

    /// Play back in real time instead of sampling
    #[arg(long)]
    pub live: bool,
}

/// Preview a track through the overlay engine.
pub async fn run(args: ShowArgs, config: &LyricSyncConfig) -> Result<()> {
    let track = load_track(&args.track)?;
    let offset = args.offset.unwrap_or(config.display.offset);
    let cap = args.cap.unwrap_or(config.display.duration_cap);
    let end = args.to.unwrap_or_else(|| track_end(&track) + offset.max(0.0));

    let mut overlay = Overlay::new(&config.display);
    let mut events = overlay.subscribe();
    overlay.set_track(track, offset, cap);

    if let Some(at) = args.at {
        match overlay.update_time(at) {
            Some(subtitle) => println!("{}", render::karaoke_line(&subtitle)),
            None => println!("(nothing visible at {})", render::position(at)),
        }
        return Ok(());
    }

    if args.live {
        play_live(&mut overlay, &mut events, args.from, end).await;
    } else {
        sample(&mut overlay, &mut events, args.from, end, args.step);
    }
    Ok(())
}

/// Step through `[from, end]` and print every change of the visible line.
fn sample(
    overlay: &mut Overlay,
    events: &mut broadcast::Receiver<OverlayEvent>,
    from: f64,
    end: f64,
    step: f64,
) {
    for tick in 0..MAX_SAMPLES {
        #[allow(clippy::cast_precision_loss)]
        let time = (tick as f64).mul_add(step, from);
        if time > end {
            return;
        }
        overlay.update_time(time);
        print_events(events, time);
    }
    warn!("Stopped after {MAX_SAMPLES} samples; narrow --from/--to or raise --step");
}

async fn play_live(
    overlay: &mut Overlay,
    events: &mut broadcast::Receiver<OverlayEvent>,
    from: f64,
    end: f64,
) {
    let mut clock = PlaybackClock::new(Some(end));
    clock.seek(from);
    clock.play();
    info!("Playing from {} to {}", render::position(from), render::position(end));

    let mut interval = tokio::time::interval(LIVE_TICK);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let Some(now) = clock.current_time() else { break };
                overlay.update_time(now);
                print_events(events, now);
                if now >= end {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted");
                break;
            }
        }
    }
}

fn print_events(events: &mut broadcast::Receiver<OverlayEvent>, time: f64) {
    loop {
        match events.try_recv() {
            Ok(
                OverlayEvent::LineShown { index, subtitle }
                | OverlayEvent::WordsChanged { index, subtitle },
            ) => println!(
                "[{}] #{} {}",
                render::position(time),
                index + 1,
                render::karaoke_line(&subtitle)
            ),
            Ok(OverlayEvent::LineHidden) => println!("[{}] -", render::position(time)),
            Ok(_) => {}
            Err(TryRecvError::Lagged(skipped)) => debug!("Skipped {skipped} overlay events"),
            Err(TryRecvError::Empty | TryRecvError::Closed) => return,
        }
    }
}

fn track_end(track: &Track) -> f64 {
    track
        .lines
        .iter()
        .map(|line| line.end)
        .fold(0.0, f64::max)
}

fn finite_seconds(value: &str) -> std::result::Result<f64, String> {
    let seconds: f64 = value.parse().map_err(|e| format!("{e}"))?;
    if seconds.is_finite() {
        Ok(seconds)
    } else {
        Err(format!("{value} is not a finite number of seconds"))
    }
}

fn sample_step(value: &str) -> std::result::Result<f64, String> {
    let step = finite_seconds(value)?;
    if step >= MIN_STEP {
        Ok(step)
    } else {
        Err(format!("step must be at least {MIN_STEP}s"))
    }
}
