//! Configuration for the border animation
//!
//! This module provides two pieces:
//! - **animation**: the `AnimationConfig` value and its validation
//! - **gate**: `ConfigGate`, the slot the UI writes and the preview worker reads

pub mod animation;
pub mod gate;

// Re-export commonly used types
pub use animation::{AnimationConfig, AnimationKind};
pub use gate::ConfigGate;
