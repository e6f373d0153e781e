//! Test sink that keeps every frame as text

use std::fmt;
use std::io;

use crate::ipc::{BorderSink, IpcError};

#[derive(Debug, Default)]
pub struct RecordingSink {
    /// `"{variable} {value}"` per transmitted command
    pub sent: Vec<String>,
    pub generation: u64,
    pub fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn last(&self) -> Option<&str> {
        self.sent.last().map(String::as_str)
    }

    /// Value part of the last command
    pub fn last_value(&self) -> Option<&str> {
        self.last().and_then(|line| line.split_once(' ')).map(|(_, value)| value)
    }
}

impl BorderSink for RecordingSink {
    fn send_keyword(&mut self, variable: &str, value: &dyn fmt::Display) -> Result<(), IpcError> {
        if self.fail {
            return Err(IpcError::ConnectionLost(io::Error::from(io::ErrorKind::BrokenPipe)));
        }
        self.sent.push(format!("{variable} {value}"));
        Ok(())
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}
