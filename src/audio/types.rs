//! The playback backend boundary.
//!
//! The navigator drives a [`Backend`] with fire-and-forget requests. Each
//! request carries a [`Ticket`]; the backend later reports the outcome as a
//! [`BackendEvent`] holding the same ticket.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Identifies one play request.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub u64);

impl Ticket {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Something that can play files. Requests must not block.
pub trait Backend {
    /// Play the whole file.
    fn play_file(&mut self, ticket: Ticket, path: &Path);
    /// Play `duration` of the file starting at `start`; `None` plays to the end.
    fn play_section(
        &mut self,
        ticket: Ticket,
        path: &Path,
        start: Duration,
        duration: Option<Duration>,
    );
    /// Restart the most recent request from the beginning.
    fn play(&mut self, ticket: Ticket);
}

/// Outcome of a play request, posted back to the control thread.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// Playback reached the end of the file or section.
    Finished(Ticket),
    /// The file could not be opened or decoded.
    CannotLoadFile(Ticket),
}

impl BackendEvent {
    pub fn ticket(&self) -> Ticket {
        match self {
            BackendEvent::Finished(t) | BackendEvent::CannotLoadFile(t) => *t,
        }
    }
}

/// Commands understood by the audio thread.
#[derive(Debug)]
pub enum AudioCmd {
    /// Start playing a whole file.
    PlayFile { ticket: Ticket, path: PathBuf },
    /// Start playing part of a file.
    PlaySection {
        ticket: Ticket,
        path: PathBuf,
        start: Duration,
        duration: Option<Duration>,
    },
    /// Replay the last request.
    Replay(Ticket),
    /// Stop playback immediately.
    Stop,
    /// Toggle pause/resume.
    TogglePause,
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}
