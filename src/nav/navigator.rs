use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::audio::{Backend, BackendEvent, Ticket};
use crate::config::{LibrarySettings, StateStore};
use crate::error::{Error, Result};
use crate::library::{
    Collection, CollectionId, Decoration, RowId, SharedCollection, TrackInfo, audio_files,
};
use crate::view::{FilteredView, PooledView, ViewId, ViewPool, ViewRef};

use super::loop_mode::LoopMode;

/// Broadcast to subscribers; nobody acknowledges them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A row started playing with this metadata.
    NowPlaying(TrackInfo),
    /// The playing entry was cleared.
    Reset,
    LoopModeChanged(LoopMode),
}

enum Playing {
    Pooled(PooledView),
    /// The navigator's own view over its temporary collection.
    Transient,
}

/// Decides what plays next and keeps track of what is playing.
///
/// The navigator holds one playing view (a pool reference, or its private
/// view over ad hoc files) and a [`RowId`] for the playing entry. The row
/// handle is resolved against the view on every call, so re-sorting,
/// re-filtering or editing the collection never loses the position.
///
/// All methods run on the control thread. Backend outcomes arrive through
/// [`Navigator::handle_backend_event`].
pub struct Navigator {
    pool: ViewPool,
    backend: Box<dyn Backend>,
    store: Box<dyn StateStore>,
    listeners: Vec<Sender<Notification>>,
    library: LibrarySettings,

    playing: Option<Playing>,
    /// Collection behind `playing`; set and cleared together with it.
    collection: Option<SharedCollection>,
    current: Option<RowId>,
    loop_mode: LoopMode,

    last_ticket: Ticket,
    /// Request whose outcome we are waiting for.
    pending: Option<Ticket>,

    temporary: SharedCollection,
    temporary_view: ViewRef,
}

impl Navigator {
    pub fn new(pool: ViewPool, backend: Box<dyn Backend>, store: Box<dyn StateStore>) -> Self {
        Self::with_temporary(pool, backend, store, Collection::new("Temporary"))
    }

    /// Like [`Navigator::new`], with the collection used for ad hoc file lists.
    pub fn with_temporary(
        pool: ViewPool,
        backend: Box<dyn Backend>,
        store: Box<dyn StateStore>,
        temporary: Collection,
    ) -> Self {
        let temporary = temporary.into_shared();
        // Never registered in the pool; lives as long as the navigator.
        let temporary_view = Rc::new(FilteredView::new(&temporary));
        Self {
            pool,
            backend,
            store,
            listeners: Vec::new(),
            library: LibrarySettings::default(),
            playing: None,
            collection: None,
            current: None,
            loop_mode: LoopMode::default(),
            last_ticket: Ticket::default(),
            pending: None,
            temporary,
            temporary_view,
        }
    }

    /// Settings used to pick playable files in [`Navigator::play_temporary_files`].
    pub fn set_library_settings(&mut self, settings: LibrarySettings) {
        self.library = settings;
    }

    pub fn subscribe(&mut self) -> Receiver<Notification> {
        let (tx, rx) = mpsc::channel();
        self.listeners.push(tx);
        rx
    }

    pub fn pool(&self) -> &ViewPool {
        &self.pool
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn playing_view(&self) -> Option<ViewRef> {
        match self.playing.as_ref()? {
            Playing::Pooled(view) => Some(Rc::clone(view.view_ref())),
            Playing::Transient => Some(Rc::clone(&self.temporary_view)),
        }
    }

    pub fn playing_collection(&self) -> Option<SharedCollection> {
        self.collection.clone()
    }

    pub fn temporary_view(&self) -> &ViewRef {
        &self.temporary_view
    }

    pub fn is_temporary_playing(&self) -> bool {
        matches!(self.playing, Some(Playing::Transient))
    }

    /// Handle of the playing entry, if it still exists.
    pub fn current_row_id(&self) -> Option<RowId> {
        self.current_source_row().and(self.current)
    }

    /// Row of the playing entry in the playing view.
    pub fn current_row(&self) -> Option<usize> {
        let view = self.playing_view()?;
        self.current_row_in(&view)
    }

    pub fn pending_ticket(&self) -> Option<Ticket> {
        self.pending
    }

    /// Load the persisted loop mode; anything unreadable means `NoRepeat`.
    pub fn restore_state(&mut self) {
        let state = match self.store.load_loop_state() {
            Ok(v) => v.unwrap_or(LoopMode::NoRepeat.index()),
            Err(e) => {
                log::warn!("cannot read loop state, using default: {e}");
                LoopMode::NoRepeat.index()
            }
        };
        self.set_loop_state(state);
    }

    pub fn save_state(&mut self) -> Result<()> {
        self.store.save_loop_state(self.loop_mode.index())
    }

    /// Make `view` the playing view.
    ///
    /// Passing the view that is already playing does nothing. Otherwise the
    /// playing entry is reset and the previous view released. Apart from the
    /// navigator's temporary view, `view` must be a pool member: the navigator
    /// takes its own reference on it.
    pub fn set_playing_view(&mut self, view: Option<&FilteredView>) -> Result<()> {
        if view.map(FilteredView::id) == self.playing_view_id() {
            return Ok(());
        }

        let next = match view {
            None => None,
            Some(v) if v.id() == self.temporary_view.id() => Some(Playing::Transient),
            Some(v) => Some(Playing::Pooled(self.pool.reference(v)?)),
        };

        self.reset_all();
        self.collection = view.map(|v| Rc::clone(v.collection()));
        self.playing = next;
        Ok(())
    }

    /// Start playing row `row` of the playing view.
    pub fn play_row(&mut self, row: usize) -> Result<()> {
        let view = self.playing_view().ok_or(Error::NoActiveView)?;
        let len = view.row_count();
        if row >= len {
            return Err(Error::RowOutOfRange { row, len });
        }
        self.start_row(&view, row);
        Ok(())
    }

    pub fn play_next(&mut self) {
        self.play_next_song(false);
    }

    pub fn play_previous(&mut self) {
        let Some(view) = self.playing_view() else {
            self.reset_all();
            return;
        };
        let count = view.row_count();

        let Some(current) = self.current_row_in(&view) else {
            if count > 0 {
                self.start_row(&view, count - 1);
            }
            return;
        };

        if current > 0 {
            self.start_row(&view, current - 1);
        } else if self.loop_mode == LoopMode::RepeatAll {
            self.start_row(&view, count - 1);
        } else {
            log::info!("reached the start of the playing list");
            self.reset_current();
        }
    }

    /// The backend finished the playing entry.
    pub fn on_playback_finished(&mut self) {
        if let (Some(row), Some(c)) = (self.current_source_row(), &self.collection) {
            c.borrow_mut().add_play_count(row);
        }

        if self.loop_mode == LoopMode::RepeatTrack && self.current_source_row().is_some() {
            let ticket = self.pending.unwrap_or(self.last_ticket);
            self.pending = Some(ticket);
            self.backend.play(ticket);
            return;
        }

        self.play_next();
    }

    /// The backend could not play the playing entry: skip it without
    /// wrapping and mark it as unplayable.
    pub fn on_playback_failed(&mut self) {
        let failed = self.current_row_id();
        if let Some(row) = self.current_row() {
            log::warn!("cannot play row {row}, skipping");
        }

        self.play_next_song(true);

        if let (Some(id), Some(c)) = (failed, &self.collection) {
            let mut c = c.borrow_mut();
            if let Some(row) = c.row_of(id) {
                c.set_decoration(row, Decoration::CannotPlay);
            }
        }
    }

    /// Dispatch a backend outcome, dropping it when it does not belong to
    /// the request we are waiting for or the row it played is gone.
    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        if self.pending != Some(event.ticket()) {
            log::debug!("ignoring stale {event:?}, waiting for {:?}", self.pending);
            return;
        }
        if self.current_row_id().is_none() {
            log::debug!("ignoring {event:?}, its row was removed");
            self.pending = None;
            return;
        }
        match event {
            BackendEvent::Finished(_) => self.on_playback_finished(),
            BackendEvent::CannotLoadFile(_) => self.on_playback_failed(),
        }
    }

    /// Set the loop mode from a stored integer, taken modulo the number of modes.
    pub fn set_loop_state(&mut self, state: i64) {
        self.set_loop_mode(LoopMode::from_index(state));
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
        self.notify(Notification::LoopModeChanged(mode));
    }

    pub fn cycle_loop_mode(&mut self) {
        self.set_loop_state(self.loop_mode.index() + 1);
    }

    /// Replace the temporary list with the playable files among `paths` and
    /// play its first entry. Bypasses the pool.
    pub fn play_temporary_files(&mut self, paths: &[PathBuf]) {
        let tracks = {
            let c = self.temporary.borrow();
            audio_files(paths, &self.library, c.analyzer())
        };
        {
            let mut c = self.temporary.borrow_mut();
            c.clear();
            c.extend(tracks);
        }

        if self.temporary_view.is_empty() {
            log::info!("none of the {} given files is playable", paths.len());
            return;
        }

        let view = Rc::clone(&self.temporary_view);
        if let Err(e) = self.set_playing_view(Some(&view)) {
            log::error!("cannot switch to the temporary list: {e}");
            return;
        }
        self.start_row(&view, 0);
    }

    /// Drop everything that points into `collection` before it goes away.
    pub fn on_collection_about_to_be_removed(&mut self, collection: CollectionId) {
        let affected = self
            .collection
            .as_ref()
            .is_some_and(|c| c.borrow().id() == collection);
        if affected {
            log::debug!("playing collection {collection:?} is being removed");
            self.reset_all();
        }
    }

    /// Clear the playing entry but keep the playing view.
    pub fn reset_current_playing(&mut self) {
        self.reset_current();
    }

    fn playing_view_id(&self) -> Option<ViewId> {
        match self.playing.as_ref()? {
            Playing::Pooled(view) => Some(view.id()),
            Playing::Transient => Some(self.temporary_view.id()),
        }
    }

    fn current_source_row(&self) -> Option<usize> {
        let id = self.current?;
        self.collection.as_ref()?.borrow().row_of(id)
    }

    fn current_row_in(&self, view: &FilteredView) -> Option<usize> {
        view.row_of(self.current?)
    }

    /// Shared by `play_next` and the failure path; `cannot_load` disables the
    /// wrap at the end so a list of unplayable files terminates.
    fn play_next_song(&mut self, cannot_load: bool) {
        let Some(view) = self.playing_view() else {
            self.reset_all();
            return;
        };
        let count = view.row_count();

        let Some(current) = self.current_row_in(&view) else {
            if count > 0 {
                self.start_row(&view, 0);
            }
            return;
        };

        if current + 1 < count {
            self.start_row(&view, current + 1);
        } else if self.loop_mode == LoopMode::RepeatAll && !cannot_load {
            self.start_row(&view, 0);
        } else {
            log::info!("reached the end of the playing list");
            self.reset_current();
        }
    }

    /// `row` must be in range for `view`.
    fn start_row(&mut self, view: &FilteredView, row: usize) {
        self.reset_current();
        let Some(collection) = self.collection.clone() else {
            return;
        };
        let Some(id) = view.row_id(row) else {
            log::error!("view row {row} has no backing row");
            return;
        };
        self.current = Some(id);

        let parsed = {
            let mut c = collection.borrow_mut();
            let Some(source) = c.row_of(id) else {
                return;
            };
            c.set_decoration(source, Decoration::NowPlaying);
            c.reanalyse(source).map(|info| (source, info))
        };

        let (source, info) = match parsed {
            Ok(v) => v,
            Err(e) => {
                log::warn!("not playing row {row}: {e}");
                return;
            }
        };

        log::debug!("playing row {row}: {}", info.path.display());
        self.notify(Notification::NowPlaying(info.clone()));
        collection.borrow_mut().update_row(source, &info);

        let ticket = self.last_ticket.next();
        self.last_ticket = ticket;
        self.pending = Some(ticket);
        match info.start {
            None => self.backend.play_file(ticket, &info.path),
            Some(start) => self
                .backend
                .play_section(ticket, &info.path, start, info.duration),
        }
    }

    fn reset_current(&mut self) {
        self.notify(Notification::Reset);
        self.pending = None;
        let Some(id) = self.current.take() else {
            return;
        };
        if let Some(c) = &self.collection {
            let mut c = c.borrow_mut();
            if let Some(row) = c.row_of(id) {
                c.set_decoration(row, Decoration::None);
            }
        }
    }

    fn release_playing(&mut self) {
        if let Some(Playing::Pooled(mut view)) = self.playing.take() {
            view.release();
        }
        self.collection = None;
    }

    fn reset_all(&mut self) {
        self.reset_current();
        self.release_playing();
    }

    fn notify(&mut self, notification: Notification) {
        self.listeners
            .retain(|tx| tx.send(notification.clone()).is_ok());
    }
}

impl Drop for Navigator {
    fn drop(&mut self) {
        if let Err(e) = self.save_state() {
            log::warn!("failed to save loop state: {e}");
        }
    }
}
