//! Metadata readers used when a row is (re)parsed.

use std::path::Path;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::prelude::Accessor;

use crate::error::{Error, Result};

use super::model::TagInfo;

/// Reads tags and properties for a file.
pub trait TrackAnalyzer {
    fn analyse(&self, path: &Path) -> Result<TagInfo>;
}

/// Reads tags with `lofty`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyAnalyzer;

fn non_empty(v: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl TrackAnalyzer for LoftyAnalyzer {
    fn analyse(&self, path: &Path) -> Result<TagInfo> {
        let tagged = lofty::read_from_path(path).map_err(|e| Error::Metadata {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut info = TagInfo {
            duration: Some(tagged.properties().duration()),
            ..TagInfo::default()
        };

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            info.title = non_empty(tag.title());
            info.artist = non_empty(tag.artist());
            info.album = non_empty(tag.album());
        }

        Ok(info)
    }
}
