#![forbid(unsafe_code)]

mod animation;
mod color;
mod config;
mod constants;
mod ipc;
mod preview;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, warn, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use config::{AnimationConfig, ConfigGate};
use constants::app;
use preview::PreviewWorker;

/// Animated window borders for Hyprland
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Animation config (JSON). Defaults to $XDG_CONFIG_HOME/hyprborder/animation.json
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Compositor control socket. Defaults to the running instance's socket
    #[arg(short, long)]
    socket: Option<PathBuf>,

    /// How often to log preview status, in milliseconds
    #[arg(long, default_value_t = app::DEFAULT_STATUS_INTERVAL_MS)]
    status_interval_ms: u64,
}

fn init_logging() -> Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install log subscriber")
}

fn log_status(worker: &PreviewWorker) {
    let status = worker.status();
    let stats = worker.stats();
    let since_last_frame_ms = stats
        .last_frame_time
        .map(|t| t.elapsed().as_millis() as u64);
    info!(
        status = status.label(),
        frames = stats.frames_rendered,
        fps = stats.actual_fps,
        connection_ok = stats.connection_ok,
        frame_errors = stats.frame_errors,
        since_last_frame_ms = ?since_last_frame_ms,
        "Preview status"
    );
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging()?;

    let config_path = args.config.unwrap_or_else(AnimationConfig::default_path);
    let initial = AnimationConfig::load_or_default(&config_path)?;
    info!(config = ?initial, "Using animation config");

    let gate = Arc::new(ConfigGate::new(&initial).context("Initial animation config is invalid")?);
    let mut worker = match args.socket {
        Some(path) => PreviewWorker::with_socket_path(Arc::clone(&gate), path),
        None => PreviewWorker::new(Arc::clone(&gate)),
    };

    let terminate = Arc::new(AtomicBool::new(false));
    let reload = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&terminate))
            .context("Failed to register termination handler")?;
    }
    signal_hook::flag::register(signal_hook::consts::SIGHUP, Arc::clone(&reload))
        .context("Failed to register reload handler")?;

    worker.start()?;
    info!(path = %config_path.display(), "Running; send SIGHUP to reload the config, SIGINT to stop");

    let status_interval = Duration::from_millis(args.status_interval_ms.max(app::POLL_INTERVAL_MS));
    let mut last_status = Instant::now();

    while !terminate.load(Ordering::Acquire) {
        if reload.swap(false, Ordering::AcqRel) {
            match AnimationConfig::load(&config_path).and_then(|config| worker.update_config(&config)) {
                Ok(()) => info!(path = %config_path.display(), "Reloaded animation config"),
                Err(e) => warn!(error = ?e, "Config reload rejected, keeping the active animation"),
            }
        }

        if last_status.elapsed() >= status_interval {
            last_status = Instant::now();
            log_status(&worker);
        }

        let status = worker.status();
        if !status.is_active() {
            error!(status = status.label(), "Preview worker is no longer active");
            break;
        }

        thread::sleep(Duration::from_millis(app::POLL_INTERVAL_MS));
    }

    worker.stop();
    log_status(&worker);
    Ok(())
}
