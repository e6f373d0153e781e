//! Border colors captured before a preview and put back afterwards

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info, warn};

use crate::constants::hyprland;
use crate::ipc::IpcChannel;

const SNAPSHOT_VARIABLES: [&str; 2] = [hyprland::ACTIVE_BORDER_VAR, hyprland::INACTIVE_BORDER_VAR];

/// Raw `keyword` values of the border variables, as they were before the preview
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BorderSnapshot {
    entries: Vec<(String, String)>,
}

impl BorderSnapshot {
    /// Query every border variable. Variables that cannot be read are skipped.
    pub fn capture(channel: &mut IpcChannel) -> Self {
        let mut entries = Vec::new();
        for variable in SNAPSHOT_VARIABLES {
            let cmd = format!("{} {}", hyprland::GETOPTION_COMMAND, variable);
            match channel.request(&cmd) {
                Ok(reply) => match parse_option_reply(&reply) {
                    Some(value) => {
                        debug!(variable, value = %value, "Captured border value");
                        entries.push((variable.to_string(), value));
                    }
                    None => warn!(variable, reply = %reply.trim(), "Unrecognized getoption reply, not restoring"),
                },
                Err(e) => warn!(variable, error = %e, "Failed to read border value"),
            }
        }
        info!(captured = entries.len(), "Saved border snapshot");
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Write every captured value back. Tries all of them and reports the failures together.
    ///
    /// Saved gradients can have any number of stops, so each line is built on
    /// the heap instead of in the per-frame command buffer.
    pub fn restore(&self, channel: &mut IpcChannel) -> Result<()> {
        let mut failed = Vec::new();
        for (variable, value) in &self.entries {
            let line = format!("{} {} {}\n", hyprland::KEYWORD_COMMAND, variable, value);
            if let Err(e) = channel.send(&line) {
                warn!(variable = %variable, error = %e, "Failed to restore border value");
                failed.push(variable.as_str());
            }
        }

        if failed.is_empty() {
            info!(restored = self.entries.len(), "Restored border snapshot");
            Ok(())
        } else {
            Err(anyhow!("could not restore {}", failed.join(", ")))
                .context(format!("Border restore incomplete for {}", channel.path().display()))
        }
    }
}

/// Turn a `getoption` reply into a value `keyword` accepts
///
/// Gradients come back as `custom type: ffRRGGBB ... 45deg`, plain colors as
/// `int: <decimal argb>`.
fn parse_option_reply(reply: &str) -> Option<String> {
    for line in reply.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix(hyprland::REPLY_CUSTOM_PREFIX) {
            let tokens: Vec<String> = rest
                .split_whitespace()
                .map(|token| {
                    if token.ends_with("deg") || token.starts_with("0x") {
                        token.to_string()
                    } else {
                        format!("0x{token}")
                    }
                })
                .collect();
            return (!tokens.is_empty()).then(|| tokens.join(" "));
        }
        if let Some(rest) = line.strip_prefix(hyprland::REPLY_INT_PREFIX) {
            let argb = rest.trim().parse::<i64>().ok()?;
            return Some(format!("0x{:08x}", argb as u32));
        }
    }
    None
}
