//! IPC with the compositor's control socket
//!
//! Commands are newline-terminated text lines (`keyword <var> <value>\n`)
//! written to `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`.
//! `IpcChannel` keeps one connection open across frames and reconnects lazily
//! after the compositor hangs up or a write fails.

use std::ffi::OsString;
use std::fmt;
use std::io::{self, ErrorKind, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

mod command;
#[cfg(test)]
pub mod fake;

pub use command::{BorderValue, CommandBuffer};

use crate::constants::{hyprland, ipc::*};

#[derive(Debug, Error)]
pub enum IpcError {
    #[error("cannot locate compositor socket: ${0} is not set")]
    InvalidSocketPath(&'static str),

    #[error("failed to connect to compositor at {}", path.display())]
    ConnectionFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("lost connection to compositor")]
    ConnectionLost(#[source] io::Error),

    #[error("command does not fit the {capacity}-byte command buffer")]
    BufferOverflow { capacity: usize },
}

/// Destination for border frames. Implemented by [`IpcChannel`].
pub trait BorderSink {
    /// Send `keyword {variable} {value}`
    fn send_keyword(&mut self, variable: &str, value: &dyn fmt::Display) -> Result<(), IpcError>;

    /// Identifier of the current connection; changes every time a new one is opened
    fn generation(&self) -> u64;
}

/// Resolve the control socket path from the process environment
pub fn socket_path_from_env() -> Result<PathBuf, IpcError> {
    socket_path_from(
        std::env::var_os(hyprland::RUNTIME_DIR_VAR),
        std::env::var_os(hyprland::INSTANCE_SIGNATURE_VAR),
    )
}

fn socket_path_from(runtime_dir: Option<OsString>, signature: Option<OsString>) -> Result<PathBuf, IpcError> {
    let runtime_dir = runtime_dir
        .filter(|v| !v.is_empty())
        .ok_or(IpcError::InvalidSocketPath(hyprland::RUNTIME_DIR_VAR))?;
    let signature = signature
        .filter(|v| !v.is_empty())
        .ok_or(IpcError::InvalidSocketPath(hyprland::INSTANCE_SIGNATURE_VAR))?;

    Ok(PathBuf::from(runtime_dir)
        .join(hyprland::SOCKET_DIR)
        .join(signature)
        .join(hyprland::SOCKET_NAME))
}

/// Persistent connection to the compositor
pub struct IpcChannel {
    stream: Option<UnixStream>,
    socket_path: PathBuf,
    command: CommandBuffer,
    generation: u64,
}

impl IpcChannel {
    /// Channel for a specific socket path. Does not connect yet.
    pub fn new(socket_path: PathBuf) -> Self {
        Self {
            stream: None,
            socket_path,
            command: CommandBuffer::new(),
            generation: 0,
        }
    }

    /// Channel for the socket of the running compositor instance
    pub fn from_env() -> Result<Self, IpcError> {
        Ok(Self::new(socket_path_from_env()?))
    }

    pub fn path(&self) -> &Path {
        &self.socket_path
    }

    #[cfg(test)]
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Open the connection if there is none. Idempotent.
    pub fn connect(&mut self) -> Result<(), IpcError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let stream = UnixStream::connect(&self.socket_path).map_err(|source| IpcError::ConnectionFailed {
            path: self.socket_path.clone(),
            source,
        })?;
        let timeout = Some(Duration::from_millis(SOCKET_TIMEOUT_MS));
        if let Err(e) = stream.set_write_timeout(timeout) {
            debug!(error = %e, "Failed to set socket write timeout");
        }

        self.generation = self.generation.wrapping_add(1);
        self.stream = Some(stream);
        info!(path = %self.socket_path.display(), generation = self.generation, "Connected to compositor socket");
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(std::net::Shutdown::Both);
            debug!(generation = self.generation, "Disconnected from compositor socket");
        }
    }

    #[cfg(test)]
    pub fn reconnect(&mut self) -> Result<(), IpcError> {
        self.disconnect();
        self.connect()
    }

    /// Drop a connection the compositor already closed, then make sure one is open
    pub fn test_connection(&mut self) -> Result<(), IpcError> {
        drain_replies(&mut self.stream);
        self.connect()
    }

    /// Write one raw, already terminated command line. Unlike
    /// [`send_keyword`](Self::send_keyword) the line may be of any length.
    pub fn send(&mut self, cmd: &str) -> Result<(), IpcError> {
        drain_replies(&mut self.stream);
        self.connect()?;
        write_command(&mut self.stream, cmd.as_bytes())
    }

    /// Format `keyword {variable} {value}\n` into the fixed buffer and send it
    pub fn send_keyword(&mut self, variable: &str, value: &dyn fmt::Display) -> Result<(), IpcError> {
        self.command.format_keyword(variable, value)?;
        drain_replies(&mut self.stream);
        self.connect()?;
        write_command(&mut self.stream, self.command.as_bytes())
    }

    /// One-shot request on a fresh connection, returning the whole reply
    ///
    /// The compositor answers queries such as `getoption` and closes the
    /// connection. The persistent stream is closed first so the channel never
    /// holds two connections; the next send reconnects.
    pub fn request(&mut self, cmd: &str) -> Result<String, IpcError> {
        self.disconnect();
        let mut stream = UnixStream::connect(&self.socket_path).map_err(|source| IpcError::ConnectionFailed {
            path: self.socket_path.clone(),
            source,
        })?;
        let timeout = Some(Duration::from_millis(SOCKET_TIMEOUT_MS));
        stream
            .set_read_timeout(timeout)
            .and_then(|_| stream.set_write_timeout(timeout))
            .map_err(IpcError::ConnectionLost)?;

        stream.write_all(cmd.as_bytes()).map_err(IpcError::ConnectionLost)?;
        stream
            .shutdown(std::net::Shutdown::Write)
            .map_err(IpcError::ConnectionLost)?;

        let mut reply = Vec::new();
        (&mut stream)
            .take(MAX_REPLY_SIZE as u64)
            .read_to_end(&mut reply)
            .map_err(IpcError::ConnectionLost)?;
        Ok(String::from_utf8_lossy(&reply).into_owned())
    }
}

impl BorderSink for IpcChannel {
    fn send_keyword(&mut self, variable: &str, value: &dyn fmt::Display) -> Result<(), IpcError> {
        IpcChannel::send_keyword(self, variable, value)
    }

    /// Bumped on every successful connect
    fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for IpcChannel {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn write_command(slot: &mut Option<UnixStream>, bytes: &[u8]) -> Result<(), IpcError> {
    let Some(stream) = slot.as_mut() else {
        return Err(IpcError::ConnectionLost(io::Error::from(ErrorKind::NotConnected)));
    };

    if let Err(e) = stream.write_all(bytes).and_then(|_| stream.flush()) {
        warn!(error = %e, "Write to compositor socket failed, marking disconnected");
        *slot = None;
        return Err(IpcError::ConnectionLost(e));
    }
    Ok(())
}

/// Discard replies already waiting on the socket without blocking.
/// A hang-up from the compositor clears the slot so the next send reconnects.
fn drain_replies(slot: &mut Option<UnixStream>) {
    let Some(stream) = slot.as_mut() else {
        return;
    };
    if stream.set_nonblocking(true).is_err() {
        *slot = None;
        return;
    }

    let mut scratch = [0u8; REPLY_DRAIN_SIZE];
    let keep = loop {
        match stream.read(&mut scratch) {
            Ok(0) => {
                debug!("Compositor closed the control connection");
                break false;
            }
            Ok(_) => continue,
            Err(e) if e.kind() == ErrorKind::WouldBlock => break true,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!(error = %e, "Control connection read failed");
                break false;
            }
        }
    };

    if !keep || stream.set_nonblocking(false).is_err() {
        *slot = None;
    }
}
