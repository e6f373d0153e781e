//! Allocation-free formatting of compositor commands

use std::fmt::{self, Write};

use crate::color::Rgb;
use crate::constants::{hyprland, ipc::COMMAND_BUFFER_SIZE};

use super::IpcError;

/// Fixed-capacity byte buffer that a command line is formatted into
pub struct CommandBuffer {
    buf: [u8; COMMAND_BUFFER_SIZE],
    len: usize,
}

impl CommandBuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0; COMMAND_BUFFER_SIZE],
            len: 0,
        }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        // Only ever filled through `write_str`, so always valid UTF-8
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    #[cfg(test)]
    pub const fn capacity(&self) -> usize {
        COMMAND_BUFFER_SIZE
    }

    /// Format `keyword {variable} {value}\n`, replacing the previous content
    pub fn format_keyword(&mut self, variable: &str, value: &dyn fmt::Display) -> Result<&[u8], IpcError> {
        self.clear();
        writeln!(self, "{} {} {}", hyprland::KEYWORD_COMMAND, variable, value).map_err(|_| {
            self.clear();
            IpcError::BufferOverflow {
                capacity: COMMAND_BUFFER_SIZE,
            }
        })?;
        Ok(self.as_bytes())
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Write for CommandBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.len + s.len();
        if end > COMMAND_BUFFER_SIZE {
            return Err(fmt::Error);
        }
        self.buf[self.len..end].copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

/// One border color value as the compositor expects it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderValue {
    /// `0xffRRGGBB`
    Solid(Rgb),
    /// `0xffRRGGBB 0xffRRGGBB <angle>deg`
    Gradient { stops: [Rgb; 2], angle: u16 },
}

impl fmt::Display for BorderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BorderValue::Solid(color) => write!(f, "{color}"),
            BorderValue::Gradient { stops, angle } => {
                for stop in stops {
                    write!(f, "{stop} ")?;
                }
                write!(f, "{angle}deg")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_solid_keyword() {
        let mut buf = CommandBuffer::new();
        let value = BorderValue::Solid(Rgb::new(0xFF, 0x80, 0x00));
        let bytes = buf.format_keyword("general:col.active_border", &value).unwrap();
        assert_eq!(bytes, b"keyword general:col.active_border 0xffff8000\n");
    }

    #[test]
    fn test_format_gradient_keyword() {
        let mut buf = CommandBuffer::new();
        let value = BorderValue::Gradient {
            stops: [Rgb::new(255, 0, 0), Rgb::new(0, 255, 255)],
            angle: 45,
        };
        buf.format_keyword("general:col.active_border", &value).unwrap();
        assert_eq!(
            buf.as_str(),
            "keyword general:col.active_border 0xffff0000 0xff00ffff 45deg\n"
        );
    }

    #[test]
    fn test_format_replaces_previous_content() {
        let mut buf = CommandBuffer::new();
        buf.format_keyword("a", &"first").unwrap();
        buf.format_keyword("b", &"2").unwrap();
        assert_eq!(buf.as_str(), "keyword b 2\n");
    }

    #[test]
    fn test_overflow_is_reported_and_buffer_left_empty() {
        let mut buf = CommandBuffer::new();
        let long = "x".repeat(COMMAND_BUFFER_SIZE);
        let err = buf.format_keyword(&long, &"0xffffffff").unwrap_err();
        assert!(matches!(err, IpcError::BufferOverflow { capacity: COMMAND_BUFFER_SIZE }));
        assert!(buf.as_bytes().is_empty());
    }

    #[test]
    fn test_exact_fit_is_accepted() {
        let mut buf = CommandBuffer::new();
        // "keyword " + var + " " + "v" + "\n"
        let var = "y".repeat(COMMAND_BUFFER_SIZE - "keyword ".len() - " v\n".len());
        buf.format_keyword(&var, &"v").unwrap();
        assert_eq!(buf.as_bytes().len(), buf.capacity());
    }

    #[test]
    fn test_longest_accepted_variable_fits_widest_frame() {
        use crate::constants::{ipc::MAX_BORDER_VALUE_LEN, validation::MAX_VARIABLE_LEN};

        let widest = BorderValue::Gradient {
            stops: [Rgb::new(255, 255, 255); 2],
            angle: u16::MAX,
        };
        assert!(widest.to_string().len() <= MAX_BORDER_VALUE_LEN);

        let mut buf = CommandBuffer::new();
        let var = "z".repeat(MAX_VARIABLE_LEN);
        buf.format_keyword(&var, &widest).unwrap();
        assert!(buf.as_bytes().len() <= buf.capacity());
    }
}
