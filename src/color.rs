//! Color math: HSV/RGB conversion, `#RRGGBB` parsing and interpolation

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColorError {
    #[error("invalid hex color '{0}' (expected #RRGGBB)")]
    InvalidHex(String),

    #[error("HSV component out of range: h={h}, s={s}, v={v} (each must be within 0.0..=1.0)")]
    HsvOutOfRange { h: f32, s: f32, v: f32 },
}

/// 8-bit RGB triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_tuple((r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB`. Anything else (other length, no '#', non-hex digit) is rejected.
    pub fn parse_hex(s: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidHex(s.to_string());
        let digits = s.strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Format as `#RRGGBB` (uppercase)
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Packed `0xAARRGGBB` with alpha forced opaque
    pub fn to_argb(self) -> u32 {
        0xFF00_0000 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Multiply every channel by `factor` (clamped to 0..=1), truncating toward zero
    pub fn scale(self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        let ch = |c: u8| (c as f32 * factor) as u8;
        Self::new(ch(self.r), ch(self.g), ch(self.b))
    }
}

/// Wire encoding used by the compositor: `0xffRRGGBB`
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.to_argb())
    }
}

/// HSV -> RGB. `h` is a fraction of the wheel and wraps; `s`/`v` are clamped.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);

    let sector = h * 6.0;
    let i = sector.floor();
    let f = sector - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    let (r, g, b) = match i as u32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    let to_byte = |x: f32| (x * 255.0).round() as u8;
    Rgb::new(to_byte(r), to_byte(g), to_byte(b))
}

/// RGB -> HSV, all components in 0.0..=1.0 (hue in 0.0..1.0)
#[cfg(test)]
pub fn rgb_to_hsv(rgb: Rgb) -> (f32, f32, f32) {
    let r = rgb.r as f32 / 255.0;
    let g = rgb.g as f32 / 255.0;
    let b = rgb.b as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        ((g - b) / delta).rem_euclid(6.0) / 6.0
    } else if max == g {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };
    let s = if max == 0.0 { 0.0 } else { delta / max };

    (h.rem_euclid(1.0), s, max)
}

/// Linear RGB interpolation, `t` clamped to 0..=1
pub fn lerp(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let ch = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Rgb::new(ch(a.r, b.r), ch(a.g, b.g), ch(a.b, b.b))
}

/// A user supplied color in one of three notations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorValue {
    Hex(String),
    Rgb(u8, u8, u8),
    Hsv(f32, f32, f32),
}

impl ColorValue {
    /// Checked `#RRGGBB`, stored in uppercase
    pub fn hex(s: &str) -> Result<Self, ColorError> {
        Ok(Self::Hex(Rgb::parse_hex(s)?.to_hex()))
    }

    pub fn hsv(h: f32, s: f32, v: f32) -> Result<Self, ColorError> {
        let in_range = |x: f32| (0.0..=1.0).contains(&x);
        if !(in_range(h) && in_range(s) && in_range(v)) {
            return Err(ColorError::HsvOutOfRange { h, s, v });
        }
        Ok(Self::Hsv(h, s, v))
    }

    /// Re-check the range constraints (values built through serde skip the constructors)
    pub fn check(&self) -> Result<(), ColorError> {
        match *self {
            Self::Hex(ref s) => Self::hex(s).map(|_| ()),
            Self::Rgb(..) => Ok(()),
            Self::Hsv(h, s, v) => Self::hsv(h, s, v).map(|_| ()),
        }
    }

    pub fn to_rgb(&self) -> Result<Rgb, ColorError> {
        match *self {
            Self::Hex(ref s) => Rgb::parse_hex(s),
            Self::Rgb(r, g, b) => Ok(Rgb::new(r, g, b)),
            Self::Hsv(h, s, v) => {
                self.check()?;
                Ok(hsv_to_rgb(h, s, v))
            }
        }
    }
}
