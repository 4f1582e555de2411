//! Fakes shared by unit tests.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use crate::audio::{Backend, Ticket};
use crate::error::{Error, Result};
use crate::library::{Collection, SharedCollection, TagInfo, Track, TrackAnalyzer};

/// Succeeds for every file except those whose stem contains "broken";
/// reports the upper-cased stem as title.
pub struct StubAnalyzer;

impl StubAnalyzer {
    pub const DURATION: Duration = Duration::from_secs(180);
}

impl TrackAnalyzer for StubAnalyzer {
    fn analyse(&self, path: &Path) -> Result<TagInfo> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        if stem.contains("broken") {
            return Err(Error::Metadata {
                path: path.to_path_buf(),
                reason: "unreadable".into(),
            });
        }
        Ok(TagInfo {
            title: Some(stem.to_uppercase()),
            artist: None,
            album: None,
            duration: Some(Self::DURATION),
        })
    }
}

/// A shared collection of `/music/<name>.mp3` tracks using [`StubAnalyzer`].
pub fn collection_of(names: &[&str]) -> SharedCollection {
    let mut c = Collection::with_analyzer("test", Box::new(StubAnalyzer));
    for name in names {
        c.push(Track::from_path(format!("/music/{name}.mp3")));
    }
    c.into_shared()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    File(Ticket, PathBuf),
    Section(Ticket, PathBuf, Duration, Option<Duration>),
    Replay(Ticket),
}

impl Call {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Call::File(_, p) | Call::Section(_, p, _, _) => Some(p),
            Call::Replay(_) => None,
        }
    }
}

/// Backend that only records what it was asked to do.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    pub calls: Rc<RefCell<Vec<Call>>>,
}

impl RecordingBackend {
    pub fn last(&self) -> Option<Call> {
        self.calls.borrow().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Backend for RecordingBackend {
    fn play_file(&mut self, ticket: Ticket, path: &Path) {
        self.calls
            .borrow_mut()
            .push(Call::File(ticket, path.to_path_buf()));
    }

    fn play_section(
        &mut self,
        ticket: Ticket,
        path: &Path,
        start: Duration,
        duration: Option<Duration>,
    ) {
        self.calls
            .borrow_mut()
            .push(Call::Section(ticket, path.to_path_buf(), start, duration));
    }

    fn play(&mut self, ticket: Ticket) {
        self.calls.borrow_mut().push(Call::Replay(ticket));
    }
}
