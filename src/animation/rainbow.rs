use crate::color::hsv_to_rgb;
use crate::config::AnimationConfig;
use crate::constants::animation::{RAINBOW_STOP_OFFSET, RAINBOW_SWEEP_DEG};
use crate::ipc::{BorderSink, BorderValue, IpcError};

use super::Target;

/// Hue cycling two-stop gradient; the stops sit on opposite sides of the wheel
#[derive(Debug, Default)]
pub struct Rainbow {
    hue: f32,
    /// Signed per-frame hue step
    step: f32,
    target: Target,
}

impl Rainbow {
    pub fn configure(&mut self, config: &AnimationConfig) {
        self.step = config.speed * config.direction.sign();
        self.target.configure(config);
    }

    pub fn update(&mut self, sink: &mut dyn BorderSink) -> Result<(), IpcError> {
        self.hue = (self.hue + self.step).rem_euclid(1.0);
        sink.send_keyword(&self.target.variable, &self.frame())
    }

    pub fn cleanup(&mut self) {
        self.hue = 0.0;
        self.step = 0.0;
    }

    #[cfg(test)]
    pub fn hue(&self) -> f32 {
        self.hue
    }

    fn frame(&self) -> BorderValue {
        BorderValue::Gradient {
            stops: [
                hsv_to_rgb(self.hue, 1.0, 1.0),
                hsv_to_rgb(self.hue + RAINBOW_STOP_OFFSET, 1.0, 1.0),
            ],
            angle: RAINBOW_SWEEP_DEG,
        }
    }
}
