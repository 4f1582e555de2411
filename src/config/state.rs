//! Durable playback state owned by the navigator: the loop mode, stored as
//! a single integer.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Load/save access to the persisted loop state.
pub trait StateStore {
    /// `Ok(None)` when nothing was stored yet.
    fn load_loop_state(&self) -> Result<Option<i64>>;
    fn save_loop_state(&mut self, state: i64) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateDoc {
    loop_state: Option<i64>,
}

/// TOML file holding `loop_state = <int>`.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for StateFile {
    fn load_loop_state(&self) -> Result<Option<i64>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let doc: StateDoc = toml::from_str(&text)?;
        Ok(doc.loop_state)
    }

    fn save_loop_state(&mut self, state: i64) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let doc = StateDoc {
            loop_state: Some(state),
        };
        fs::write(&self.path, toml::to_string(&doc)?)?;
        log::debug!("saved loop state {state} to {}", self.path.display());
        Ok(())
    }
}

/// In-memory store, for embedding without a filesystem.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub loop_state: Option<i64>,
}

impl StateStore for MemoryStore {
    fn load_loop_state(&self) -> Result<Option<i64>> {
        Ok(self.loop_state)
    }

    fn save_loop_state(&mut self, state: i64) -> Result<()> {
        self.loop_state = Some(state);
        Ok(())
    }
}
