//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Hyprland environment and control-socket constants
pub mod hyprland {
    /// Runtime directory holding the compositor's sockets
    pub const RUNTIME_DIR_VAR: &str = "XDG_RUNTIME_DIR";

    /// Per-instance signature set by the compositor in every client's environment
    pub const INSTANCE_SIGNATURE_VAR: &str = "HYPRLAND_INSTANCE_SIGNATURE";

    /// Directory under the runtime dir that contains instance directories
    pub const SOCKET_DIR: &str = "hypr";

    /// Control socket filename inside the instance directory
    pub const SOCKET_NAME: &str = ".socket.sock";

    /// Border color of the focused window
    pub const ACTIVE_BORDER_VAR: &str = "general:col.active_border";

    /// Border color of unfocused windows
    pub const INACTIVE_BORDER_VAR: &str = "general:col.inactive_border";

    /// Command used to set a configuration variable
    pub const KEYWORD_COMMAND: &str = "keyword";

    /// Command used to read a configuration variable
    pub const GETOPTION_COMMAND: &str = "getoption";

    /// Reply prefix for gradient/custom valued options
    pub const REPLY_CUSTOM_PREFIX: &str = "custom type:";

    /// Reply prefix for integer valued options (legacy single colors)
    pub const REPLY_INT_PREFIX: &str = "int:";
}

/// IPC transport constants
pub mod ipc {
    /// Capacity of the stack buffer used to format one command line
    pub const COMMAND_BUFFER_SIZE: usize = 256;

    /// Scratch buffer for draining compositor replies
    pub const REPLY_DRAIN_SIZE: usize = 64;

    /// Upper bound for one-shot request replies
    pub const MAX_REPLY_SIZE: usize = 64 * 1024;

    /// Write/read timeout on the control socket
    pub const SOCKET_TIMEOUT_MS: u64 = 1000;

    /// Longest value an animation frame formats: two stops and a `u16` angle
    pub const MAX_BORDER_VALUE_LEN: usize = 32;
}

/// Animation constants
pub mod animation {
    /// Sweep angle of the two-stop rainbow gradient, in degrees
    pub const RAINBOW_SWEEP_DEG: u16 = 45;

    /// Hue distance between the two rainbow stops (half the wheel)
    pub const RAINBOW_STOP_OFFSET: f32 = 0.5;

    /// Pulse fallback when no color is configured
    pub const PULSE_FALLBACK: (u8, u8, u8) = (0xFF, 0x00, 0x00);

    /// Gradient fallback endpoints when fewer than two colors are configured
    pub const GRADIENT_FALLBACK: [(u8, u8, u8); 2] = [(0xFF, 0x00, 0x00), (0x00, 0x00, 0xFF)];
}

/// Validation bounds for animation configuration
pub mod validation {
    use super::{hyprland, ipc};

    pub const MIN_FPS: u32 = 1;
    pub const MAX_FPS: u32 = 120;
    pub const MIN_SPEED: f32 = 0.001;
    pub const MAX_SPEED: f32 = 1.0;

    /// Minimum colors required by Pulse and Solid
    pub const MIN_COLORS_SINGLE: usize = 1;

    /// Minimum colors required by Gradient
    pub const MIN_COLORS_GRADIENT: usize = 2;

    /// Longest border variable that still leaves room in the command buffer
    /// for `keyword `, the separators, the longest frame value and the newline
    pub const MAX_VARIABLE_LEN: usize =
        ipc::COMMAND_BUFFER_SIZE - hyprland::KEYWORD_COMMAND.len() - ipc::MAX_BORDER_VALUE_LEN - 3;
}

/// Preview worker timing
pub mod worker {
    /// Sleep after a failed frame before the next attempt
    pub const RECONNECT_BACKOFF_MS: u64 = 100;

    /// Longest single sleep slice, bounds stop() latency
    pub const MAX_SLEEP_SLICE_MS: u64 = 50;

    /// Weight of the newest sample in the smoothed fps figure
    pub const FPS_SMOOTHING: f64 = 0.2;

    /// Name given to the background thread
    pub const THREAD_NAME: &str = "hyprborder-preview";
}

/// Foreground (binary) constants
pub mod app {
    /// Config directory under the user's config dir
    pub const APP_DIR: &str = "hyprborder";

    /// Default animation config filename
    pub const CONFIG_FILENAME: &str = "animation.json";

    /// How often the foreground loop logs status and stats
    pub const DEFAULT_STATUS_INTERVAL_MS: u64 = 5000;

    /// Poll interval of the foreground loop
    pub const POLL_INTERVAL_MS: u64 = 100;
}
