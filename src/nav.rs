//! Playback navigation: which row plays, what comes next, and how the
//! playing view is held.

mod loop_mode;
mod navigator;

pub use loop_mode::LoopMode;
pub use navigator::{Navigator, Notification};
