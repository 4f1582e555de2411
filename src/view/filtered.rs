use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use serde::Deserialize;

use crate::library::{Collection, CollectionId, Row, RowId, SharedCollection, Track};

use super::filter::fuzzy_matches;

/// Views are shared between the pool and its holders on the control thread.
pub type ViewRef = Rc<FilteredView>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u64);

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

/// Column a view is ordered by.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Collection order.
    #[default]
    Insertion,
    Title,
    Artist,
    Album,
    Path,
    Duration,
    PlayCount,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Insertion,
        SortKey::Title,
        SortKey::Artist,
        SortKey::Album,
        SortKey::Path,
        SortKey::Duration,
        SortKey::PlayCount,
    ];

    /// The key after this one, wrapping around.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Insertion => "order",
            SortKey::Title => "title",
            SortKey::Artist => "artist",
            SortKey::Album => "album",
            SortKey::Path => "path",
            SortKey::Duration => "duration",
            SortKey::PlayCount => "plays",
        }
    }

    fn compare(self, a: &Row, b: &Row) -> Ordering {
        fn lower(v: Option<&str>) -> Option<String> {
            v.map(str::to_lowercase)
        }
        let (ta, tb) = (a.track(), b.track());
        match self {
            SortKey::Insertion => Ordering::Equal,
            SortKey::Title => ta.title.to_lowercase().cmp(&tb.title.to_lowercase()),
            SortKey::Artist => lower(ta.artist.as_deref()).cmp(&lower(tb.artist.as_deref())),
            SortKey::Album => lower(ta.album.as_deref()).cmp(&lower(tb.album.as_deref())),
            SortKey::Path => ta.path.cmp(&tb.path),
            SortKey::Duration => ta.duration.cmp(&tb.duration),
            SortKey::PlayCount => a.play_count().cmp(&b.play_count()),
        }
    }
}

#[derive(Debug, Default)]
struct ViewState {
    query: String,
    sort: SortKey,
    descending: bool,
    /// Collection revision the order was computed for, and the order itself
    /// (view row -> collection row).
    order: Option<(u64, Vec<usize>)>,
}

/// A filtered, sorted projection over a collection.
///
/// The row order is recomputed lazily whenever the collection's revision or
/// the view's own filter/sort changes.
#[derive(Debug)]
pub struct FilteredView {
    id: ViewId,
    collection_id: CollectionId,
    collection: SharedCollection,
    state: RefCell<ViewState>,
}

impl FilteredView {
    pub fn new(collection: &SharedCollection) -> Self {
        let collection_id = collection.borrow().id();
        Self {
            id: ViewId(NEXT_VIEW_ID.fetch_add(1, AtomicOrdering::Relaxed)),
            collection_id,
            collection: Rc::clone(collection),
            state: RefCell::new(ViewState::default()),
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn collection_id(&self) -> CollectionId {
        self.collection_id
    }

    pub fn collection(&self) -> &SharedCollection {
        &self.collection
    }

    pub fn filter(&self) -> String {
        self.state.borrow().query.clone()
    }

    pub fn set_filter(&self, query: &str) {
        let mut state = self.state.borrow_mut();
        if state.query != query {
            state.query = query.to_string();
            state.order = None;
        }
    }

    pub fn sort_key(&self) -> SortKey {
        self.state.borrow().sort
    }

    pub fn is_descending(&self) -> bool {
        self.state.borrow().descending
    }

    pub fn set_sort(&self, key: SortKey, descending: bool) {
        let mut state = self.state.borrow_mut();
        if state.sort != key || state.descending != descending {
            state.sort = key;
            state.descending = descending;
            state.order = None;
        }
    }

    pub fn row_count(&self) -> usize {
        self.with_order(|rows| rows.len())
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Collection row shown at view row `row`.
    pub fn map_to_source(&self, row: usize) -> Option<usize> {
        self.with_order(|rows| rows.get(row).copied())
    }

    /// View row showing collection row `source_row`, `None` if filtered out.
    pub fn map_from_source(&self, source_row: usize) -> Option<usize> {
        self.with_order(|rows| rows.iter().position(|&r| r == source_row))
    }

    /// Durable handle for the entry at view row `row`.
    pub fn row_id(&self, row: usize) -> Option<RowId> {
        let source = self.map_to_source(row)?;
        self.collection.borrow().row_id(source)
    }

    /// Current view row of the entry `id` refers to.
    pub fn row_of(&self, id: RowId) -> Option<usize> {
        let source = self.collection.borrow().row_of(id)?;
        self.map_from_source(source)
    }

    pub fn track(&self, row: usize) -> Option<Track> {
        let source = self.map_to_source(row)?;
        self.collection.borrow().track(source).cloned()
    }

    /// Snapshot of the current order (view row -> collection row).
    pub fn rows(&self) -> Vec<usize> {
        self.with_order(|rows| rows.to_vec())
    }

    fn with_order<R>(&self, f: impl FnOnce(&[usize]) -> R) -> R {
        let collection = self.collection.borrow();
        let mut state = self.state.borrow_mut();
        let revision = collection.revision();

        let fresh = matches!(&state.order, Some((rev, _)) if *rev == revision);
        if !fresh {
            let order = compute_order(&collection, &state.query, state.sort, state.descending);
            state.order = Some((revision, order));
        }

        match &state.order {
            Some((_, rows)) => f(rows),
            None => f(&[]),
        }
    }
}

fn compute_order(collection: &Collection, query: &str, sort: SortKey, descending: bool) -> Vec<usize> {
    let query = query.trim();
    let all = collection.rows();

    let mut rows: Vec<usize> = all
        .iter()
        .enumerate()
        .filter(|(_, r)| query.is_empty() || fuzzy_matches(&r.track().display, query))
        .map(|(i, _)| i)
        .collect();

    rows.sort_by(|&a, &b| {
        let ord = match sort {
            SortKey::Insertion => a.cmp(&b),
            key => key.compare(&all[a], &all[b]),
        };
        let ord = if descending { ord.reverse() } else { ord };
        // Ties keep collection order.
        ord.then(a.cmp(&b))
    });
    rows
}
