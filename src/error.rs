//! Crate-wide error type.

use std::path::PathBuf;

use thiserror::Error;

use crate::view::ViewId;

#[derive(Debug, Error)]
pub enum Error {
    /// Settings could not be loaded or deserialized.
    #[error("failed to load settings: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted state file is not valid TOML.
    #[error("failed to read state file: {0}")]
    StateDecode(#[from] toml::de::Error),

    #[error("failed to write state file: {0}")]
    StateEncode(#[from] toml::ser::Error),

    /// Track metadata could not be parsed from the file.
    #[error("metadata unavailable for '{path}': {reason}")]
    Metadata { path: PathBuf, reason: String },

    #[error("no audio output available: {0}")]
    AudioOutput(String),

    #[error("cannot decode '{path}': {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("row {row} is out of range for a view of {len} rows")]
    RowOutOfRange { row: usize, len: usize },

    #[error("no playing view is set")]
    NoActiveView,

    /// A view that is not a member of the pool was handed to an API
    /// that takes a pool reference.
    #[error("view {0:?} is not a member of the view pool")]
    ViewNotPooled(ViewId),
}

pub type Result<T> = std::result::Result<T, Error>;
