use std::env;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::Receiver;

use crate::audio::{AudioPlayer, BackendEvent};
use crate::config::{MemoryStore, Settings, StateFile, StateStore};
use crate::error::Result;
use crate::library::{Collection, DisplayFormat, LoftyAnalyzer, scan};
use crate::nav::{Navigator, Notification};
use crate::view::{PooledView, ViewPool, ViewRef};

/// Everything the event loop drives.
pub struct Session {
    pub navigator: Navigator,
    pub player: AudioPlayer,
    pub events: Receiver<BackendEvent>,
    pub notes: Receiver<Notification>,
    /// The view shown to the user.
    pub view: ViewRef,
    /// Our own pool reference when browsing a scanned directory; keeps the
    /// view alive independent of what the navigator plays.
    _library: Option<PooledView>,
}

/// Open the audio output, restore the loop mode and load what `args` names.
///
/// No arguments or a single directory scans that directory; anything else is
/// played as a temporary list of files.
pub fn open_session(settings: &Settings, args: &[PathBuf]) -> Result<Session> {
    let pool = ViewPool::new();
    let (player, events) = AudioPlayer::new(settings.audio.clone())?;

    let store: Box<dyn StateStore> = match settings.state_path() {
        Some(path) => Box::new(StateFile::new(path)),
        None => {
            log::warn!("no state directory, loop mode will not be saved");
            Box::new(MemoryStore::default())
        }
    };

    let mut navigator = Navigator::new(pool.clone(), Box::new(player.clone()), store);
    navigator.set_library_settings(settings.library.clone());
    let notes = navigator.subscribe();
    navigator.restore_state();

    let dir = match args {
        [] => Some(env::current_dir()?),
        [one] if one.is_dir() => Some(one.clone()),
        _ => None,
    };

    let (view, library) = match dir {
        Some(dir) => {
            let guard = open_library(&pool, settings, &dir);
            guard.set_sort(settings.view.sort, settings.view.descending);
            navigator.set_playing_view(Some(&*guard))?;
            (Rc::clone(guard.view_ref()), Some(guard))
        }
        None => {
            navigator.play_temporary_files(args);
            (Rc::clone(navigator.temporary_view()), None)
        }
    };

    Ok(Session {
        navigator,
        player,
        events,
        notes,
        view,
        _library: library,
    })
}

fn open_library(pool: &ViewPool, settings: &Settings, dir: &Path) -> PooledView {
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("Library")
        .to_string();

    let mut collection = Collection::new(name);
    collection.set_display_format(DisplayFormat::from(&settings.library));
    collection.extend(scan(dir, &settings.library, &LoftyAnalyzer));
    log::info!("loaded {} tracks from {}", collection.len(), dir.display());

    pool.acquire(&collection.into_shared())
}
