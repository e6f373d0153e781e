//! Live preview worker - drives the border animation from a background thread
//!
//! The UI owns a [`PreviewWorker`] and a shared [`ConfigGate`]. `start()`
//! returns as soon as the thread is spawned; the UI then polls `status()` and
//! `stats()` and pushes new configs through the gate at any time.

mod snapshot;
mod status;

pub use snapshot::BorderSnapshot;
pub use status::{PreviewStats, PreviewStatus, StatusCell};

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::animation::AnimationProvider;
use crate::config::{AnimationConfig, ConfigGate};
use crate::constants::worker::*;
use crate::ipc::IpcChannel;

/// State shared between the UI side and the worker thread
#[derive(Debug, Default)]
struct Shared {
    status: StatusCell,
    stats: Mutex<PreviewStats>,
    stop: AtomicBool,
}

impl Shared {
    fn with_stats<R>(&self, f: impl FnOnce(&mut PreviewStats) -> R) -> R {
        f(&mut self.stats.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// What the thread hands back when it exits, so `stop()` can clean up on the caller's side
struct LoopExit {
    provider: Option<AnimationProvider>,
    channel: IpcChannel,
    snapshot: BorderSnapshot,
}

pub struct PreviewWorker {
    gate: Arc<ConfigGate>,
    shared: Arc<Shared>,
    /// Fixed socket path; `None` resolves it from the environment on every start
    socket_path: Option<PathBuf>,
    active_path: Option<PathBuf>,
    handle: Option<JoinHandle<LoopExit>>,
}

impl PreviewWorker {
    /// Worker that talks to the compositor named by the environment
    pub fn new(gate: Arc<ConfigGate>) -> Self {
        Self {
            gate,
            shared: Arc::new(Shared::default()),
            socket_path: None,
            active_path: None,
            handle: None,
        }
    }

    /// Worker bound to an explicit control socket
    pub fn with_socket_path(gate: Arc<ConfigGate>, socket_path: PathBuf) -> Self {
        let mut worker = Self::new(gate);
        worker.socket_path = Some(socket_path);
        worker
    }

    #[cfg(test)]
    pub fn gate(&self) -> &Arc<ConfigGate> {
        &self.gate
    }

    pub fn status(&self) -> PreviewStatus {
        self.shared.status.load()
    }

    pub fn stats(&self) -> PreviewStats {
        self.shared.with_stats(|stats| *stats)
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Validate and install a new config; the worker picks it up on its next tick
    pub fn update_config(&self, config: &AnimationConfig) -> Result<()> {
        self.gate
            .update_config(config)
            .context("Rejected animation config")
    }

    /// Check the compositor is reachable and spawn the animation thread.
    /// The thread saves the current border before its first frame.
    /// Does nothing if the worker is already running.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            debug!(status = ?self.status(), "Preview worker already running, ignoring start");
            return Ok(());
        }
        self.shared.status.store(PreviewStatus::Starting);

        let channel = match &self.socket_path {
            Some(path) => Ok(IpcChannel::new(path.clone())),
            None => IpcChannel::from_env(),
        };
        let mut channel = match channel {
            Ok(channel) => channel,
            Err(e) => {
                self.shared.status.store(PreviewStatus::Error);
                return Err(e).context("Cannot start preview without a compositor instance");
            }
        };

        let path = channel.path().to_path_buf();
        if let Err(e) = channel.test_connection() {
            self.shared.status.store(PreviewStatus::Error);
            error!(path = %path.display(), error = %e, "Compositor socket not reachable");
            return Err(e).context("Failed to start preview");
        }

        self.shared.with_stats(|stats| *stats = PreviewStats::default());
        self.shared.stop.store(false, Ordering::Release);
        self.gate.mark_changed();

        let gate = Arc::clone(&self.gate);
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || run_loop(channel, &gate, &shared));

        match spawned {
            Ok(handle) => {
                info!(path = %path.display(), "Preview worker started");
                self.handle = Some(handle);
                self.active_path = Some(path);
                Ok(())
            }
            Err(e) => {
                self.shared.status.store(PreviewStatus::Error);
                Err(e).context("Failed to spawn preview thread")
            }
        }
    }

    /// Stop the thread, release the animation and put the old border back.
    /// Blocks for at most about one frame interval, or until an in-flight
    /// snapshot read times out. No-op if not running.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            debug!("Preview worker not running, ignoring stop");
            return;
        };

        info!("Stopping preview worker");
        self.shared.stop.store(true, Ordering::Release);

        match handle.join() {
            Ok(LoopExit {
                provider,
                mut channel,
                snapshot,
            }) => {
                if let Some(mut provider) = provider {
                    provider.cleanup();
                }
                if let Err(e) = snapshot.restore(&mut channel) {
                    warn!(error = ?e, "Failed to restore border after preview");
                }
                channel.disconnect();
            }
            Err(_) => {
                let path = self.active_path.clone().unwrap_or_default();
                error!(path = %path.display(), "Preview thread panicked, border not restored");
            }
        }

        self.active_path = None;
        self.shared.status.store(PreviewStatus::Stopped);
        info!(frames = self.stats().frames_rendered, "Preview worker stopped");
    }
}

impl Drop for PreviewWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(mut channel: IpcChannel, gate: &ConfigGate, shared: &Shared) -> LoopExit {
    let snapshot = BorderSnapshot::capture(&mut channel);
    if snapshot.is_empty() {
        debug!("No border values captured, nothing will be restored on stop");
    }

    shared.status.transition(PreviewStatus::Starting, PreviewStatus::Running);
    info!("Preview loop running");

    let mut provider: Option<AnimationProvider> = None;
    let mut fps = gate.current().fps;
    let mut last_tick = Instant::now();

    while !shared.stop.load(Ordering::Acquire) {
        let tick = Instant::now();

        if let Some(config) = gate.take_if_changed() {
            provider = Some(rebuild_provider(provider, &config));
            fps = config.fps;
        }

        let elapsed = tick.saturating_duration_since(last_tick);
        last_tick = tick;

        let result = match provider.as_mut() {
            Some(p) => p.update(&mut channel, elapsed),
            None => Ok(false),
        };

        match result {
            Ok(true) => shared.with_stats(|stats| stats.record_frame(Instant::now())),
            // Nothing went out, so there is nothing to say about the connection
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, "Frame failed");
                if let Err(e) = channel.test_connection() {
                    debug!(error = %e, "Compositor still unreachable");
                }
                shared.with_stats(PreviewStats::record_failure);
                sleep_unless_stopped(Duration::from_millis(RECONNECT_BACKOFF_MS), &shared.stop);
                continue;
            }
        }

        let budget = Duration::from_secs_f64(1.0 / fps.max(1) as f64);
        sleep_unless_stopped(budget.saturating_sub(tick.elapsed()), &shared.stop);
    }

    debug!("Preview loop exiting");
    LoopExit {
        provider,
        channel,
        snapshot,
    }
}

/// Reconfigure in place when the kind is unchanged, otherwise replace the provider
fn rebuild_provider(current: Option<AnimationProvider>, config: &AnimationConfig) -> AnimationProvider {
    match current {
        Some(mut provider) if provider.kind() == config.kind => {
            provider.configure(config);
            provider
        }
        previous => {
            if let Some(mut old) = previous {
                info!(from = ?old.kind(), to = ?config.kind, "Switching animation");
                old.cleanup();
            }
            AnimationProvider::from_config(config)
        }
    }
}

/// Sleep in short slices so a stop request is noticed promptly
fn sleep_unless_stopped(duration: Duration, stop: &AtomicBool) {
    let deadline = Instant::now() + duration;
    let slice = Duration::from_millis(MAX_SLEEP_SLICE_MS);
    loop {
        if stop.load(Ordering::Acquire) {
            return;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return;
        }
        thread::sleep(remaining.min(slice));
    }
}
