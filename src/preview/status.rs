//! Worker status and frame statistics polled by the UI

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;

use crate::constants::worker::FPS_SMOOTHING;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PreviewStatus {
    Stopped = 0,
    Starting = 1,
    Running = 2,
    Error = 3,
}

impl PreviewStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => PreviewStatus::Starting,
            2 => PreviewStatus::Running,
            3 => PreviewStatus::Error,
            _ => PreviewStatus::Stopped,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PreviewStatus::Stopped => "Stopped",
            PreviewStatus::Starting => "Starting...",
            PreviewStatus::Running => "Running",
            PreviewStatus::Error => "Error",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, PreviewStatus::Starting | PreviewStatus::Running)
    }
}

/// Lock-free holder for [`PreviewStatus`]
#[derive(Debug)]
pub struct StatusCell(AtomicU8);

impl StatusCell {
    pub const fn new(status: PreviewStatus) -> Self {
        Self(AtomicU8::new(status as u8))
    }

    pub fn load(&self) -> PreviewStatus {
        PreviewStatus::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, status: PreviewStatus) {
        self.0.store(status as u8, Ordering::Release);
    }

    /// Move `from -> to`; false if the current status was something else
    pub fn transition(&self, from: PreviewStatus, to: PreviewStatus) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new(PreviewStatus::Stopped)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PreviewStats {
    pub frames_rendered: u64,
    /// When the last frame was successfully sent
    pub last_frame_time: Option<Instant>,
    /// Smoothed rate derived from the measured gap between frames
    pub actual_fps: f64,
    pub connection_ok: bool,
    pub frame_errors: u64,
}

impl PreviewStats {
    pub fn record_frame(&mut self, now: Instant) {
        if let Some(previous) = self.last_frame_time {
            let delta = now.saturating_duration_since(previous).as_secs_f64();
            if delta > 0.0 {
                let sample = 1.0 / delta;
                self.actual_fps = if self.actual_fps == 0.0 {
                    sample
                } else {
                    self.actual_fps + (sample - self.actual_fps) * FPS_SMOOTHING
                };
            }
        }
        self.frames_rendered += 1;
        self.last_frame_time = Some(now);
        self.connection_ok = true;
    }

    /// Failed frame: counters keep their last good values
    pub fn record_failure(&mut self) {
        self.connection_ok = false;
        self.frame_errors += 1;
    }
}
