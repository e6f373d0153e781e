use crate::color::{lerp, Rgb};
use crate::config::AnimationConfig;
use crate::constants::animation::GRADIENT_FALLBACK;
use crate::ipc::{BorderSink, BorderValue, IpcError};

use super::Target;

/// Pair of palette slots blended at `phase`: `(floor(phase) mod n, next)`
pub fn gradient_indices(phase: f32, n: usize) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let from = (phase.max(0.0).floor() as usize) % n;
    (from, (from + 1) % n)
}

/// Walks the palette, blending each color into the next
#[derive(Debug, Default)]
pub struct Gradient {
    phase: f32,
    speed: f32,
    colors: Vec<Rgb>,
    target: Target,
}

impl Gradient {
    pub fn configure(&mut self, config: &AnimationConfig) {
        self.speed = config.speed;
        self.colors.clear();
        self.colors.extend(config.palette());
        if self.colors.len() < 2 {
            self.colors.clear();
            self.colors.extend(GRADIENT_FALLBACK.iter().copied().map(Rgb::from_tuple));
        }
        if self.phase >= self.colors.len() as f32 {
            self.phase = 0.0;
        }
        self.target.configure(config);
    }

    pub fn update(&mut self, sink: &mut dyn BorderSink) -> Result<(), IpcError> {
        let color = self.current_color();
        self.phase += self.speed;
        if self.phase >= self.colors.len() as f32 {
            self.phase = 0.0;
        }
        sink.send_keyword(&self.target.variable, &BorderValue::Solid(color))
    }

    pub fn cleanup(&mut self) {
        self.phase = 0.0;
        self.speed = 0.0;
        self.colors.clear();
    }

    #[cfg(test)]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    fn current_color(&self) -> Rgb {
        let Some(&first) = self.colors.first() else {
            return Rgb::from_tuple(GRADIENT_FALLBACK[0]);
        };
        let (from, to) = gradient_indices(self.phase, self.colors.len());
        let to = self.colors.get(to).copied().unwrap_or(first);
        lerp(self.colors[from], to, self.phase.fract())
    }
}
