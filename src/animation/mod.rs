//! Border animations
//!
//! Every animation owns its own phase state and turns one tick into exactly
//! one `keyword` command on a [`BorderSink`]. The worker holds a single
//! [`AnimationProvider`] and swaps it when the configured kind changes.

mod gradient;
mod pulse;
mod rainbow;
#[cfg(test)]
pub mod recording;
mod solid;

pub use gradient::Gradient;
pub use pulse::Pulse;
pub use rainbow::Rainbow;
pub use solid::Solid;

use std::time::Duration;
use tracing::{debug, trace};

use crate::config::{AnimationConfig, AnimationKind};
use crate::constants::hyprland;
use crate::ipc::{BorderSink, IpcError};

/// Where frames are written; owned so `configure` can replace it without per-frame allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Target {
    pub variable: String,
}

impl Default for Target {
    fn default() -> Self {
        Self {
            variable: hyprland::ACTIVE_BORDER_VAR.to_string(),
        }
    }
}

impl Target {
    pub fn configure(&mut self, config: &AnimationConfig) {
        self.variable.clear();
        self.variable.push_str(&config.variable);
    }
}

#[derive(Debug)]
pub enum AnimationProvider {
    Rainbow(Rainbow),
    Pulse(Pulse),
    Gradient(Gradient),
    Solid(Solid),
    None,
}

impl AnimationProvider {
    /// Fresh, unconfigured provider for `kind`
    pub fn new(kind: AnimationKind) -> Self {
        match kind {
            AnimationKind::Rainbow => Self::Rainbow(Rainbow::default()),
            AnimationKind::Pulse => Self::Pulse(Pulse::default()),
            AnimationKind::Gradient => Self::Gradient(Gradient::default()),
            AnimationKind::Solid => Self::Solid(Solid::default()),
            AnimationKind::None => Self::None,
        }
    }

    /// Build and configure in one step
    pub fn from_config(config: &AnimationConfig) -> Self {
        let mut provider = Self::new(config.kind);
        provider.configure(config);
        provider
    }

    pub fn kind(&self) -> AnimationKind {
        match self {
            Self::Rainbow(_) => AnimationKind::Rainbow,
            Self::Pulse(_) => AnimationKind::Pulse,
            Self::Gradient(_) => AnimationKind::Gradient,
            Self::Solid(_) => AnimationKind::Solid,
            Self::None => AnimationKind::None,
        }
    }

    /// Replace speed, direction, colors and target with those of `config`
    pub fn configure(&mut self, config: &AnimationConfig) {
        debug!(kind = ?self.kind(), speed = config.speed, colors = config.colors.len(), "Configuring animation");
        match self {
            Self::Rainbow(a) => a.configure(config),
            Self::Pulse(a) => a.configure(config),
            Self::Gradient(a) => a.configure(config),
            Self::Solid(a) => a.configure(config),
            Self::None => {}
        }
    }

    /// Compute one frame and transmit it if needed.
    /// `Ok(false)` means the tick produced nothing to send.
    pub fn update(&mut self, sink: &mut dyn BorderSink, elapsed: Duration) -> Result<bool, IpcError> {
        trace!(kind = ?self.kind(), elapsed_us = elapsed.as_micros() as u64, "Animation tick");
        match self {
            Self::Rainbow(a) => a.update(sink).map(|()| true),
            Self::Pulse(a) => a.update(sink).map(|()| true),
            Self::Gradient(a) => a.update(sink).map(|()| true),
            Self::Solid(a) => a.update(sink),
            Self::None => Ok(false),
        }
    }

    /// Drop animation state; the provider must be configured again before reuse
    pub fn cleanup(&mut self) {
        debug!(kind = ?self.kind(), "Cleaning up animation");
        match self {
            Self::Rainbow(a) => a.cleanup(),
            Self::Pulse(a) => a.cleanup(),
            Self::Gradient(a) => a.cleanup(),
            Self::Solid(a) => a.cleanup(),
            Self::None => {}
        }
    }
}
