use std::path::PathBuf;
use std::time::Duration;

/// One entry of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
    /// Start of the section inside `path`, `None` for the whole file.
    pub start: Option<Duration>,
    pub display: String,
}

impl Track {
    /// Build a whole-file track titled after the file stem.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        Self {
            display: title.clone(),
            path,
            title,
            artist: None,
            album: None,
            duration: None,
            start: None,
        }
    }

    /// Build a track that only covers `[start, start + duration)` of `path`.
    pub fn section(path: impl Into<PathBuf>, start: Duration, duration: Duration) -> Self {
        Self {
            start: Some(start),
            duration: Some(duration),
            ..Self::from_path(path)
        }
    }
}

/// Per-row marker shown next to a track.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Decoration {
    #[default]
    None,
    NowPlaying,
    CannotPlay,
}

/// Metadata re-computed from a row each time it becomes current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub start: Option<Duration>,
    pub duration: Option<Duration>,
    pub play_count: u32,
}

impl TrackInfo {
    /// True when the backend should play a section rather than the whole file.
    pub fn is_section(&self) -> bool {
        self.start.is_some()
    }
}

/// Tags and properties read from a media file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagInfo {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
}
