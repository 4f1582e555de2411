use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::analyze::TrackAnalyzer;
use super::display::DisplayFormat;
use super::model::Track;

pub(crate) fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Build a track for `path`, filling tags when the analyzer can read them.
pub fn load_track(path: &Path, format: &DisplayFormat, analyzer: &dyn TrackAnalyzer) -> Track {
    let mut track = Track::from_path(path);

    match analyzer.analyse(path) {
        Ok(tags) => {
            if let Some(title) = tags.title {
                track.title = title;
            }
            track.artist = tags.artist;
            track.album = tags.album;
            track.duration = tags.duration;
        }
        Err(e) => log::debug!("keeping file name for {}: {e}", path.display()),
    }

    track.display = format.render(&track);
    track
}

/// Walk `dir` and return every audio file as a track, ordered by display
/// text (case-insensitive).
pub fn scan(dir: &Path, settings: &LibrarySettings, analyzer: &dyn TrackAnalyzer) -> Vec<Track> {
    let format = DisplayFormat::from(settings);
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            tracks.push(load_track(path, &format, analyzer));
        }
    }

    tracks.sort_by(|a, b| a.display.to_lowercase().cmp(&b.display.to_lowercase()));
    log::info!("scanned {} tracks under {}", tracks.len(), dir.display());
    tracks
}

/// Keep the given paths that are existing audio files, in the given order.
pub fn audio_files(
    paths: &[PathBuf],
    settings: &LibrarySettings,
    analyzer: &dyn TrackAnalyzer,
) -> Vec<Track> {
    let format = DisplayFormat::from(settings);
    paths
        .iter()
        .filter(|p| p.is_file() && is_audio_file(p, settings))
        .map(|p| load_track(p, &format, analyzer))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackDisplayField;
    use crate::library::LoftyAnalyzer;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = LibrarySettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.ogg"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn is_audio_file_tolerates_dotted_extension_settings() {
        let settings = LibrarySettings {
            extensions: vec![".Opus".into(), "  ".into()],
            ..LibrarySettings::default()
        };
        assert!(is_audio_file(Path::new("/tmp/a.opus"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.mp3"), &settings));
    }

    #[test]
    fn scan_filters_non_audio_and_sorts_by_display_case_insensitive() {
        let dir = tempdir().unwrap();

        fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

        let settings = LibrarySettings {
            display_fields: vec![TrackDisplayField::Title],
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings, &LoftyAnalyzer);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].title, "A");
        assert_eq!(tracks[0].display, "A");
        assert_eq!(tracks[1].title, "b");
        assert!(tracks.iter().all(|t| t.start.is_none()));
    }

    #[test]
    fn scan_respects_include_hidden_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            include_hidden: false,
            display_fields: vec![TrackDisplayField::Filename],
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings, &LoftyAnalyzer);

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].display, "visible");
    }

    #[test]
    fn scan_respects_recursive_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            recursive: false,
            display_fields: vec![TrackDisplayField::Filename],
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings, &LoftyAnalyzer);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].display, "root");
    }

    #[test]
    fn audio_files_keeps_order_and_drops_missing_or_foreign_files() {
        let dir = tempdir().unwrap();
        let z = dir.path().join("z.mp3");
        let a = dir.path().join("a.flac");
        let txt = dir.path().join("notes.txt");
        fs::write(&z, b"not real").unwrap();
        fs::write(&a, b"not real").unwrap();
        fs::write(&txt, b"not audio").unwrap();

        let paths = vec![z.clone(), dir.path().join("gone.mp3"), txt, a.clone()];
        let tracks = audio_files(&paths, &LibrarySettings::default(), &LoftyAnalyzer);

        let got: Vec<PathBuf> = tracks.into_iter().map(|t| t.path).collect();
        assert_eq!(got, vec![z, a]);
    }
}
