//! Animation configuration value handed to the preview worker
//!
//! The value arrives from the external preset layer (as JSON) or from the UI,
//! and must pass [`AnimationConfig::validate`] before the worker ever sees it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::color::{ColorError, ColorValue, Rgb};
use crate::constants::{self, validation::*};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{kind:?} animation needs at least {required} color(s), got {found}")]
    InsufficientColors {
        kind: AnimationKind,
        required: usize,
        found: usize,
    },

    #[error("fps {0} out of range (1..=120)")]
    FpsOutOfRange(u32),

    #[error("speed {0} out of range (0.001..=1.0)")]
    SpeedOutOfRange(f32),

    #[error("solid_index {index} out of range for {len} color(s)")]
    SolidIndexOutOfRange { index: usize, len: usize },

    #[error("color #{index}: {source}")]
    InvalidColor {
        index: usize,
        #[source]
        source: ColorError,
    },

    #[error("border variable must not be empty or contain whitespace: '{0}'")]
    InvalidVariable(String),

    #[error("border variable is {len} bytes long, the limit is {max}")]
    VariableTooLong { len: usize, max: usize },

    #[error("not enough memory to copy {0} color(s)")]
    OutOfMemory(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AnimationKind {
    #[default]
    Rainbow,
    Pulse,
    Gradient,
    Solid,
    None,
}

impl AnimationKind {
    /// Minimum number of colors the animation needs to be accepted
    pub fn min_colors(self) -> usize {
        match self {
            AnimationKind::Pulse | AnimationKind::Solid => MIN_COLORS_SINGLE,
            AnimationKind::Gradient => MIN_COLORS_GRADIENT,
            AnimationKind::Rainbow | AnimationKind::None => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Direction {
    #[default]
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Clockwise => 1.0,
            Direction::CounterClockwise => -1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(rename = "type")]
    pub kind: AnimationKind,

    #[serde(default = "default_fps")]
    pub fps: u32,

    #[serde(default = "default_speed")]
    pub speed: f32,

    #[serde(default)]
    pub colors: Vec<ColorValue>,

    #[serde(default)]
    pub direction: Direction,

    /// Which entry of `colors` the Solid animation shows
    #[serde(default)]
    pub solid_index: usize,

    /// Compositor variable receiving the frames
    #[serde(default = "default_variable")]
    pub variable: String,
}

fn default_fps() -> u32 {
    30
}

fn default_speed() -> f32 {
    0.01
}

fn default_variable() -> String {
    constants::hyprland::ACTIVE_BORDER_VAR.to_string()
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            kind: AnimationKind::default(),
            fps: default_fps(),
            speed: default_speed(),
            colors: Vec::new(),
            direction: Direction::default(),
            solid_index: 0,
            variable: default_variable(),
        }
    }
}

impl AnimationConfig {
    #[cfg(test)]
    pub fn new(kind: AnimationKind, fps: u32, speed: f32, colors: Vec<ColorValue>) -> Self {
        Self {
            kind,
            fps,
            speed,
            colors,
            ..Self::default()
        }
    }

    /// Check every constraint; nothing is clamped
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_FPS..=MAX_FPS).contains(&self.fps) {
            return Err(ConfigError::FpsOutOfRange(self.fps));
        }
        if !(MIN_SPEED..=MAX_SPEED).contains(&self.speed) {
            return Err(ConfigError::SpeedOutOfRange(self.speed));
        }

        let required = self.kind.min_colors();
        if self.colors.len() < required {
            return Err(ConfigError::InsufficientColors {
                kind: self.kind,
                required,
                found: self.colors.len(),
            });
        }

        for (index, color) in self.colors.iter().enumerate() {
            color
                .check()
                .map_err(|source| ConfigError::InvalidColor { index, source })?;
        }

        if self.kind == AnimationKind::Solid && self.solid_index >= self.colors.len() {
            return Err(ConfigError::SolidIndexOutOfRange {
                index: self.solid_index,
                len: self.colors.len(),
            });
        }

        if self.variable.is_empty() || self.variable.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidVariable(self.variable.clone()));
        }
        if self.variable.len() > MAX_VARIABLE_LEN {
            return Err(ConfigError::VariableTooLong {
                len: self.variable.len(),
                max: MAX_VARIABLE_LEN,
            });
        }

        Ok(())
    }

    /// Resolved RGB palette. Only meaningful after `validate()` succeeded.
    pub fn palette(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.colors.iter().filter_map(|c| c.to_rgb().ok())
    }

    /// Independent copy of this config. Allocation failure is reported instead of aborting.
    pub fn try_deep_copy(&self) -> Result<Self, ConfigError> {
        let mut colors = Vec::new();
        colors
            .try_reserve_exact(self.colors.len())
            .map_err(|_| ConfigError::OutOfMemory(self.colors.len()))?;
        colors.extend(self.colors.iter().cloned());

        Ok(Self {
            kind: self.kind,
            fps: self.fps,
            speed: self.speed,
            colors,
            direction: self.direction,
            solid_index: self.solid_index,
            variable: self.variable.clone(),
        })
    }

    /// Default location: `$XDG_CONFIG_HOME/hyprborder/animation.json`
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(constants::app::APP_DIR);
        path.push(constants::app::CONFIG_FILENAME);
        path
    }

    /// Read and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read animation config from {:?}", path))?;
        let config: AnimationConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse animation config JSON from {:?}", path))?;
        config
            .validate()
            .with_context(|| format!("Invalid animation config in {:?}", path))?;
        info!(path = %path.display(), kind = ?config.kind, fps = config.fps, "Loaded animation config");
        Ok(config)
    }

    /// Like [`load`](Self::load) but falls back to the default config when the file is absent
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "No animation config file, using built-in default");
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> ColorValue {
        ColorValue::hex(s).unwrap()
    }

    fn config_with(kind: AnimationKind, colors: Vec<ColorValue>) -> AnimationConfig {
        AnimationConfig::new(kind, 30, 0.05, colors)
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(AnimationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_fps_bounds() {
        let mut config = AnimationConfig::default();
        for fps in [0, 121, 1000] {
            config.fps = fps;
            assert_eq!(config.validate(), Err(ConfigError::FpsOutOfRange(fps)));
        }
        for fps in 1..=120 {
            config.fps = fps;
            assert_eq!(config.validate(), Ok(()), "fps {fps} rejected");
        }
    }

    #[test]
    fn test_speed_bounds() {
        let mut config = AnimationConfig::default();
        for speed in [0.0, 0.0009, 1.01, -0.5, f32::NAN] {
            config.speed = speed;
            assert!(matches!(config.validate(), Err(ConfigError::SpeedOutOfRange(_))));
        }
        for speed in [0.001, 0.5, 1.0] {
            config.speed = speed;
            assert_eq!(config.validate(), Ok(()));
        }
    }

    #[test]
    fn test_color_count_requirements() {
        assert!(matches!(
            config_with(AnimationKind::Pulse, vec![]).validate(),
            Err(ConfigError::InsufficientColors { required: 1, found: 0, .. })
        ));
        assert!(matches!(
            config_with(AnimationKind::Solid, vec![]).validate(),
            Err(ConfigError::InsufficientColors { required: 1, .. })
        ));
        assert!(matches!(
            config_with(AnimationKind::Gradient, vec![hex("#FF0000")]).validate(),
            Err(ConfigError::InsufficientColors { required: 2, found: 1, .. })
        ));
        assert_eq!(config_with(AnimationKind::Rainbow, vec![]).validate(), Ok(()));
        assert_eq!(config_with(AnimationKind::None, vec![]).validate(), Ok(()));
        assert_eq!(
            config_with(AnimationKind::Gradient, vec![hex("#FF0000"), hex("#0000FF")]).validate(),
            Ok(())
        );
    }

    #[test]
    fn test_malformed_color_rejected() {
        let config = config_with(
            AnimationKind::Pulse,
            vec![hex("#FF0000"), ColorValue::Hex("#XYZ123".to_string())],
        );
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidColor { index: 1, .. })
        ));

        let config = config_with(AnimationKind::Pulse, vec![ColorValue::Hsv(0.2, 2.0, 0.5)]);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidColor { index: 0, .. })));
    }

    #[test]
    fn test_solid_index_must_exist() {
        let mut config = config_with(AnimationKind::Solid, vec![hex("#FFFFFF")]);
        config.solid_index = 1;
        assert_eq!(
            config.validate(),
            Err(ConfigError::SolidIndexOutOfRange { index: 1, len: 1 })
        );
    }

    #[test]
    fn test_variable_must_be_single_token() {
        let mut config = AnimationConfig::default();
        config.variable = "general:col.active_border extra".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidVariable(_))));
        config.variable.clear();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidVariable(_))));
    }

    #[test]
    fn test_variable_length_bound() {
        let mut config = AnimationConfig::default();
        config.variable = format!("general:{}", "x".repeat(300));
        assert_eq!(
            config.validate(),
            Err(ConfigError::VariableTooLong {
                len: 308,
                max: MAX_VARIABLE_LEN
            })
        );

        config.variable = "x".repeat(MAX_VARIABLE_LEN);
        assert_eq!(config.validate(), Ok(()));
        config.variable.push('x');
        assert!(matches!(config.validate(), Err(ConfigError::VariableTooLong { .. })));
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let original = config_with(AnimationKind::Gradient, vec![hex("#FF0000"), hex("#00FF00")]);
        let mut copy = original.try_deep_copy().unwrap();
        assert_eq!(copy, original);
        copy.colors[0] = hex("#000000");
        assert_eq!(original.colors[0], hex("#FF0000"));
    }

    #[test]
    fn test_json_shape() {
        let json = r##"{
            "type": "Gradient",
            "fps": 60,
            "speed": 0.02,
            "colors": [{"hex": "#FF0000"}, {"rgb": [0, 0, 255]}],
            "direction": "CounterClockwise"
        }"##;
        let config: AnimationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.kind, AnimationKind::Gradient);
        assert_eq!(config.fps, 60);
        assert_eq!(config.direction, Direction::CounterClockwise);
        assert_eq!(config.variable, constants::hyprland::ACTIVE_BORDER_VAR);
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(
            config.palette().collect::<Vec<_>>(),
            vec![Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)]
        );
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let path = std::env::temp_dir().join("hyprborder-test-missing/animation.json");
        let config = AnimationConfig::load_or_default(&path).unwrap();
        assert_eq!(config, AnimationConfig::default());
    }
}
