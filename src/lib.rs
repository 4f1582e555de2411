//! Playback navigation for a music player: collections with durable row
//! handles, pooled filtered views, and a navigator that walks them under a
//! loop mode while a backend plays the files.

pub mod audio;
pub mod config;
pub mod error;
pub mod library;
pub mod nav;
pub mod runtime;
pub mod view;

pub use error::{Error, Result};

#[cfg(test)]
pub(crate) mod test_support;
