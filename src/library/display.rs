use crate::config::{LibrarySettings, TrackDisplayField};

use super::model::Track;

/// How a track's display string is composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFormat {
    pub fields: Vec<TrackDisplayField>,
    pub separator: String,
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self {
            fields: vec![TrackDisplayField::Artist, TrackDisplayField::Title],
            separator: " - ".to_string(),
        }
    }
}

impl From<&LibrarySettings> for DisplayFormat {
    fn from(settings: &LibrarySettings) -> Self {
        Self {
            fields: settings.display_fields.clone(),
            separator: settings.display_separator.clone(),
        }
    }
}

fn trimmed(v: Option<&str>) -> Option<String> {
    v.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl DisplayFormat {
    /// Join the configured fields of `track`, skipping empty ones.
    ///
    /// Falls back to the title when nothing was produced.
    pub fn render(&self, track: &Track) -> String {
        let title = trimmed(Some(track.title.as_str()));
        let artist = trimmed(track.artist.as_deref());

        let mut parts: Vec<String> = Vec::new();
        for f in &self.fields {
            match f {
                TrackDisplayField::Display => {
                    parts.extend(artist.clone());
                    parts.extend(title.clone());
                }
                TrackDisplayField::Title => parts.extend(title.clone()),
                TrackDisplayField::Artist => parts.extend(artist.clone()),
                TrackDisplayField::Album => parts.extend(trimmed(track.album.as_deref())),
                TrackDisplayField::Filename => {
                    parts.extend(trimmed(track.path.file_stem().and_then(|s| s.to_str())))
                }
                TrackDisplayField::Path => parts.push(track.path.display().to_string()),
            }
        }

        if parts.is_empty() {
            track.title.clone()
        } else {
            parts.join(&self.separator)
        }
    }
}
