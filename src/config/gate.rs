//! Single-slot exchange of the active animation config between UI and worker
//!
//! The slot holds an `Arc` to an immutable config. Updates build a fresh copy,
//! swap it in under the lock and drop the previous value after the lock is
//! released, so readers only ever see a complete value.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

use super::animation::{AnimationConfig, ConfigError};

#[derive(Debug)]
pub struct ConfigGate {
    current: Mutex<Arc<AnimationConfig>>,
    changed: AtomicBool,
}

impl ConfigGate {
    /// Create a gate holding a validated copy of `initial`
    pub fn new(initial: &AnimationConfig) -> Result<Self, ConfigError> {
        initial.validate()?;
        Ok(Self {
            current: Mutex::new(Arc::new(initial.try_deep_copy()?)),
            changed: AtomicBool::new(true),
        })
    }

    /// Validate, deep-copy and install `new`. On error the previous config stays active.
    pub fn update_config(&self, new: &AnimationConfig) -> Result<(), ConfigError> {
        new.validate()?;
        let fresh = Arc::new(new.try_deep_copy()?);

        let previous = {
            let mut slot = self.current.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *slot, fresh)
        };
        self.changed.store(true, Ordering::Release);

        info!(kind = ?new.kind, fps = new.fps, speed = new.speed, colors = new.colors.len(), "Animation config updated");
        drop(previous);
        Ok(())
    }

    /// Currently installed config
    pub fn current(&self) -> Arc<AnimationConfig> {
        Arc::clone(&self.current.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Returns the current config if it changed since the last call, clearing the flag
    pub fn take_if_changed(&self) -> Option<Arc<AnimationConfig>> {
        if self.changed.swap(false, Ordering::AcqRel) {
            debug!("Worker picked up config change");
            Some(self.current())
        } else {
            None
        }
    }

    /// Force the next `take_if_changed` to report a change
    pub fn mark_changed(&self) {
        self.changed.store(true, Ordering::Release);
    }

    #[cfg(test)]
    pub fn is_changed(&self) -> bool {
        self.changed.load(Ordering::Acquire)
    }
}
