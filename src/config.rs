//! Configuration loader, schema types and persisted playback state.
//!
//! This module exposes the configuration schema used to drive runtime
//! behavior, helpers to load configuration from disk and the store the
//! navigator saves its loop mode to.

mod load;
mod schema;
mod state;

pub use load::{default_config_path, default_state_path, resolve_config_path};
pub use schema::*;
pub use state::{MemoryStore, StateFile, StateStore};
