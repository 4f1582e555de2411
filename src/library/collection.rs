//! The authoritative, mutable list of tracks.
//!
//! Rows are addressed by position, which shifts whenever rows are inserted,
//! removed or moved. Each row also owns a [`RowId`] issued from a slot table
//! with generation counters: the id keeps resolving to the same row across
//! edits and stops resolving once that row is removed.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};

use super::analyze::{LoftyAnalyzer, TrackAnalyzer};
use super::display::DisplayFormat;
use super::model::{Decoration, Track, TrackInfo};

/// Collections are shared between views and the navigator on the control thread.
pub type SharedCollection = Rc<RefCell<Collection>>;

/// Process-unique identity of a collection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionId(u64);

static NEXT_COLLECTION_ID: AtomicU64 = AtomicU64::new(1);

impl CollectionId {
    fn next() -> Self {
        Self(NEXT_COLLECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Durable handle to one row of a [`Collection`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RowId {
    slot: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    row: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Row {
    id: RowId,
    track: Track,
    play_count: u32,
    decoration: Decoration,
}

impl Row {
    pub fn id(&self) -> RowId {
        self.id
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn play_count(&self) -> u32 {
        self.play_count
    }

    pub fn decoration(&self) -> Decoration {
        self.decoration
    }
}

pub struct Collection {
    id: CollectionId,
    name: String,
    rows: Vec<Row>,
    slots: Vec<Slot>,
    free: Vec<u32>,
    /// Bumped on every change that can affect row order or filtering.
    revision: u64,
    display: DisplayFormat,
    analyzer: Box<dyn TrackAnalyzer>,
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("rows", &self.rows.len())
            .field("revision", &self.revision)
            .finish()
    }
}

impl Collection {
    /// Create an empty collection that parses metadata with `lofty`.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_analyzer(name, Box::new(LoftyAnalyzer))
    }

    pub fn with_analyzer(name: impl Into<String>, analyzer: Box<dyn TrackAnalyzer>) -> Self {
        Self {
            id: CollectionId::next(),
            name: name.into(),
            rows: Vec::new(),
            slots: Vec::new(),
            free: Vec::new(),
            revision: 0,
            display: DisplayFormat::default(),
            analyzer,
        }
    }

    pub fn into_shared(self) -> SharedCollection {
        Rc::new(RefCell::new(self))
    }

    pub fn id(&self) -> CollectionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> Option<&Row> {
        self.rows.get(row)
    }

    pub fn track(&self, row: usize) -> Option<&Track> {
        self.rows.get(row).map(|r| &r.track)
    }

    pub fn analyzer(&self) -> &dyn TrackAnalyzer {
        self.analyzer.as_ref()
    }

    /// Format used to rebuild `Track::display` when a row is updated.
    pub fn set_display_format(&mut self, display: DisplayFormat) {
        self.display = display;
    }

    pub fn push(&mut self, track: Track) -> RowId {
        let at = self.rows.len();
        self.insert(at, track)
    }

    pub fn extend(&mut self, tracks: impl IntoIterator<Item = Track>) {
        for t in tracks {
            self.push(t);
        }
    }

    /// Insert `track` before position `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row > len`.
    pub fn insert(&mut self, row: usize, track: Track) -> RowId {
        let id = self.alloc_slot();
        self.rows.insert(
            row,
            Row {
                id,
                track,
                play_count: 0,
                decoration: Decoration::None,
            },
        );
        self.reindex_from(row);
        self.touch();
        id
    }

    /// Remove the row at `row`; its [`RowId`] stops resolving.
    pub fn remove(&mut self, row: usize) -> Option<Track> {
        if row >= self.rows.len() {
            return None;
        }
        let removed = self.rows.remove(row);
        self.free_slot(removed.id);
        self.reindex_from(row);
        self.touch();
        Some(removed.track)
    }

    /// Move the row at `from` so that it ends up at position `to`.
    pub fn move_row(&mut self, from: usize, to: usize) -> bool {
        let len = self.rows.len();
        if from >= len || to >= len {
            return false;
        }
        if from != to {
            let r = self.rows.remove(from);
            self.rows.insert(to, r);
            self.reindex_from(from.min(to));
            self.touch();
        }
        true
    }

    pub fn clear(&mut self) {
        let ids: Vec<RowId> = self.rows.iter().map(|r| r.id).collect();
        for id in ids {
            self.free_slot(id);
        }
        self.rows.clear();
        self.touch();
    }

    pub fn row_id(&self, row: usize) -> Option<RowId> {
        self.rows.get(row).map(|r| r.id)
    }

    /// Current position of the row `id` refers to, `None` once it was removed.
    pub fn row_of(&self, id: RowId) -> Option<usize> {
        let slot = self.slots.get(id.slot as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.row
    }

    pub fn contains(&self, id: RowId) -> bool {
        self.row_of(id).is_some()
    }

    pub fn decoration(&self, row: usize) -> Option<Decoration> {
        self.rows.get(row).map(|r| r.decoration)
    }

    pub fn set_decoration(&mut self, row: usize, decoration: Decoration) -> bool {
        match self.rows.get_mut(row) {
            Some(r) => {
                r.decoration = decoration;
                true
            }
            None => false,
        }
    }

    /// Increment the play count of `row` and return the new value.
    pub fn add_play_count(&mut self, row: usize) -> Option<u32> {
        let r = self.rows.get_mut(row)?;
        r.play_count = r.play_count.saturating_add(1);
        let count = r.play_count;
        self.touch();
        Some(count)
    }

    /// Re-parse the metadata of `row` from its file.
    ///
    /// Section rows keep their start offset and duration; whole-file rows
    /// take the duration reported by the analyzer.
    pub fn reanalyse(&self, row: usize) -> Result<TrackInfo> {
        let r = self.rows.get(row).ok_or(Error::RowOutOfRange {
            row,
            len: self.rows.len(),
        })?;
        let track = &r.track;
        let tags = self.analyzer.analyse(&track.path)?;

        let duration = if track.start.is_some() {
            track.duration
        } else {
            tags.duration.or(track.duration)
        };

        Ok(TrackInfo {
            path: track.path.clone(),
            title: tags.title.unwrap_or_else(|| track.title.clone()),
            artist: tags.artist.or_else(|| track.artist.clone()),
            album: tags.album.or_else(|| track.album.clone()),
            start: track.start,
            duration,
            play_count: r.play_count,
        })
    }

    /// Write freshly parsed metadata back into `row`.
    pub fn update_row(&mut self, row: usize, info: &TrackInfo) -> bool {
        let Some(r) = self.rows.get_mut(row) else {
            return false;
        };
        let track = &mut r.track;
        track.title = info.title.clone();
        track.artist = info.artist.clone();
        track.album = info.album.clone();
        track.duration = info.duration;
        track.display = self.display.render(track);
        self.touch();
        true
    }

    fn alloc_slot(&mut self) -> RowId {
        if let Some(slot) = self.free.pop() {
            let generation = self.slots[slot as usize].generation;
            return RowId { slot, generation };
        }
        let slot = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            row: None,
        });
        RowId {
            slot,
            generation: 0,
        }
    }

    fn free_slot(&mut self, id: RowId) {
        if let Some(slot) = self.slots.get_mut(id.slot as usize) {
            slot.generation = slot.generation.wrapping_add(1);
            slot.row = None;
            self.free.push(id.slot);
        }
    }

    fn reindex_from(&mut self, from: usize) {
        for (i, r) in self.rows.iter().enumerate().skip(from) {
            self.slots[r.id.slot as usize].row = Some(i);
        }
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
