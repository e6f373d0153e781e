use std::f32::consts::TAU;

use crate::color::Rgb;
use crate::config::AnimationConfig;
use crate::constants::animation::PULSE_FALLBACK;
use crate::ipc::{BorderSink, BorderValue, IpcError};

use super::Target;

/// Brightness of the pulse at `phase`, in 0.0..=1.0
pub fn pulse_intensity(phase: f32) -> f32 {
    (phase.sin() + 1.0) / 2.0
}

/// Single color breathing between black and full brightness
#[derive(Debug, Default)]
pub struct Pulse {
    phase: f32,
    speed: f32,
    base: Option<Rgb>,
    target: Target,
}

impl Pulse {
    pub fn configure(&mut self, config: &AnimationConfig) {
        self.speed = config.speed;
        self.base = config.palette().next();
        self.target.configure(config);
    }

    pub fn update(&mut self, sink: &mut dyn BorderSink) -> Result<(), IpcError> {
        let color = self.current_color();
        self.phase = (self.phase + self.speed).rem_euclid(TAU);
        sink.send_keyword(&self.target.variable, &BorderValue::Solid(color))
    }

    pub fn cleanup(&mut self) {
        self.phase = 0.0;
        self.speed = 0.0;
        self.base = None;
    }

    #[cfg(test)]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    fn current_color(&self) -> Rgb {
        self.base
            .unwrap_or(Rgb::from_tuple(PULSE_FALLBACK))
            .scale(pulse_intensity(self.phase))
    }
}
