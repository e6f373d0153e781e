use tracing::trace;

use crate::color::Rgb;
use crate::config::AnimationConfig;
use crate::ipc::{BorderSink, BorderValue, IpcError};

use super::Target;

/// Static color. Only writes when the color, target, or connection changed.
#[derive(Debug, Default)]
pub struct Solid {
    color: Rgb,
    /// Color and connection generation of the last successful write
    last_sent: Option<(Rgb, u64)>,
    target: Target,
}

impl Solid {
    pub fn configure(&mut self, config: &AnimationConfig) {
        let colors = config.colors.len();
        self.color = config
            .colors
            .get(config.solid_index.min(colors.saturating_sub(1)))
            .and_then(|c| c.to_rgb().ok())
            .unwrap_or_default();

        if self.target.variable != config.variable {
            self.last_sent = None;
        }
        self.target.configure(config);
    }

    /// Returns false when the write was skipped as a repeat
    pub fn update(&mut self, sink: &mut dyn BorderSink) -> Result<bool, IpcError> {
        let generation = sink.generation();
        if self.last_sent == Some((self.color, generation)) {
            trace!(color = %self.color, "Solid color unchanged, skipping write");
            return Ok(false);
        }

        sink.send_keyword(&self.target.variable, &BorderValue::Solid(self.color))?;
        // The sink may have (re)connected while sending
        self.last_sent = Some((self.color, sink.generation()));
        Ok(true)
    }

    pub fn cleanup(&mut self) {
        self.last_sent = None;
    }
}
