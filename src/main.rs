//! Replays a recorded pose trace through a head-tilt tracking session.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use nodturn::{
    config::{Config, EXAMPLE_CONFIG},
    navigation::PageNavigator,
    session::{SessionHandle, TrackingSession},
    trace::PoseTrace,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Recorded pose trace (CSV) to replay
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Number of pages in the simulated document
    #[arg(short, long, default_value = "10")]
    pages: usize,

    /// Page to start on
    #[arg(long, default_value = "1")]
    start_page: usize,

    /// Override the angle threshold (degrees)
    #[arg(long)]
    threshold: Option<f64>,

    /// Override the dead zone (degrees)
    #[arg(long)]
    dead_zone: Option<f64>,

    /// Override the hold duration (milliseconds)
    #[arg(long)]
    hold: Option<u64>,

    /// Override the cooldown (milliseconds)
    #[arg(long)]
    cooldown: Option<u64>,

    /// Override the replay rate (frames per second)
    #[arg(long)]
    fps: Option<u32>,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    if let Some(threshold) = args.threshold {
        config.gesture.angle_threshold = threshold;
    }
    if let Some(dead_zone) = args.dead_zone {
        config.gesture.dead_zone = dead_zone;
    }
    if let Some(hold) = args.hold {
        config.gesture.hold_duration_ms = hold;
    }
    if let Some(cooldown) = args.cooldown {
        config.gesture.cooldown_ms = cooldown;
    }
    if let Some(fps) = args.fps {
        config.detection.target_fps = fps;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    let config = load_config(&args)?;
    let trace_path = args
        .trace
        .as_ref()
        .context("A pose trace is required (--trace FILE), or use --print-config")?;
    let trace = PoseTrace::from_path(
        trace_path,
        &config.detection.left_keypoint,
        &config.detection.right_keypoint,
    )
    .with_context(|| format!("Failed to load trace {}", trace_path.display()))?;

    let mut document = PageNavigator::new(args.pages);
    document.set_current_page(args.start_page);
    let navigator = Arc::new(Mutex::new(document));

    let handle = SessionHandle::new();
    let (frames, poses, clock) = trace.into_replay(&handle);
    let session = TrackingSession::with_clock(&config, frames, poses, Arc::clone(&navigator), clock, &handle)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start runtime")?;
    let summary = runtime.block_on(session.run());

    let status = handle.status();
    let document = *navigator.lock().unwrap_or_else(PoisonError::into_inner);
    println!("Frames replayed:    {}", summary.estimations);
    println!("Page turns:         {}", summary.triggers);
    println!("Final page:         {}/{}", document.current_page(), document.total_pages());
    match status.neutral_angle {
        Some(neutral) => println!("Neutral angle:      {neutral:.2}°"),
        None => println!("Neutral angle:      not calibrated"),
    }
    println!("Indicator:          {:?}", status.indicator);

    Ok(())
}
