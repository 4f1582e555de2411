//! Reference-counted cache of views keyed by the collection they project.
//!
//! Every holder of a pooled view owns a [`PooledView`]. Cloning the guard takes
//! another reference; releasing or dropping it gives the reference back. When
//! the count reaches zero the entry is removed, so the next [`ViewPool::acquire`]
//! for that collection builds a fresh view. The collection itself is never
//! touched by disposal.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use crate::error::{Error, Result};
use crate::library::{CollectionId, SharedCollection};

use super::filtered::{FilteredView, ViewId, ViewRef};

#[derive(Debug)]
struct Entry {
    view: ViewRef,
    refcount: usize,
}

#[derive(Debug, Default)]
struct PoolState {
    entries: HashMap<CollectionId, Entry>,
}

impl PoolState {
    fn entry_for(&mut self, view: &FilteredView) -> Option<&mut Entry> {
        self.entries
            .get_mut(&view.collection_id())
            .filter(|e| e.view.id() == view.id())
    }

    fn add_ref(&mut self, view: &FilteredView) -> bool {
        match self.entry_for(view) {
            Some(entry) => {
                entry.refcount += 1;
                true
            }
            None => false,
        }
    }

    /// Returns the disposed view, if this was the last reference.
    fn release(&mut self, view: &FilteredView) -> Option<ViewRef> {
        let entry = self.entry_for(view)?;
        entry.refcount = entry.refcount.saturating_sub(1);
        if entry.refcount > 0 {
            return None;
        }
        self.entries
            .remove(&view.collection_id())
            .map(|e| e.view)
    }
}

/// Shared registry handle; clones refer to the same pool.
#[derive(Debug, Clone, Default)]
pub struct ViewPool {
    state: Rc<RefCell<PoolState>>,
}

impl ViewPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the view for `collection`, creating it on first use.
    pub fn acquire(&self, collection: &SharedCollection) -> PooledView {
        let id = collection.borrow().id();
        let mut state = self.state.borrow_mut();
        let entry = state.entries.entry(id).or_insert_with(|| {
            let view = Rc::new(FilteredView::new(collection));
            log::debug!("view pool: created {:?} for {:?}", view.id(), id);
            Entry { view, refcount: 0 }
        });
        entry.refcount += 1;
        PooledView {
            pool: Rc::downgrade(&self.state),
            view: Rc::clone(&entry.view),
            released: false,
        }
    }

    /// Take another reference on a view that is already in the pool.
    ///
    /// Views built outside the pool, and views already disposed, are
    /// rejected with [`Error::ViewNotPooled`].
    pub fn reference(&self, view: &FilteredView) -> Result<PooledView> {
        let mut state = self.state.borrow_mut();
        let Some(entry) = state.entry_for(view) else {
            return Err(Error::ViewNotPooled(view.id()));
        };
        entry.refcount += 1;
        Ok(PooledView {
            pool: Rc::downgrade(&self.state),
            view: Rc::clone(&entry.view),
            released: false,
        })
    }

    /// Give a reference back; `None` is accepted and ignored.
    pub fn release(&self, view: Option<PooledView>) {
        if let Some(mut v) = view {
            v.release();
        }
    }

    /// Current reference count of `view`, zero when it is not pooled.
    pub fn refcount(&self, view: ViewId) -> usize {
        self.state
            .borrow()
            .entries
            .values()
            .find(|e| e.view.id() == view)
            .map_or(0, |e| e.refcount)
    }

    pub fn contains(&self, view: ViewId) -> bool {
        self.refcount(view) > 0
    }

    /// The live view for `collection`, without taking a reference.
    pub fn get(&self, collection: CollectionId) -> Option<ViewRef> {
        self.state
            .borrow()
            .entries
            .get(&collection)
            .map(|e| Rc::clone(&e.view))
    }

    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One counted reference to a pooled view.
pub struct PooledView {
    pool: Weak<RefCell<PoolState>>,
    view: ViewRef,
    released: bool,
}

impl PooledView {
    pub fn view_ref(&self) -> &ViewRef {
        &self.view
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Give this reference back to the pool. Calling it again is a no-op.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let Some(pool) = self.pool.upgrade() else {
            return;
        };
        let disposed = pool.borrow_mut().release(&self.view);
        if let Some(view) = disposed {
            log::debug!(
                "view pool: disposed {:?} of {:?}",
                view.id(),
                view.collection_id()
            );
        }
    }
}

impl Clone for PooledView {
    /// Takes a new reference; cloning a released guard yields a released guard.
    fn clone(&self) -> Self {
        let counted = !self.released
            && self
                .pool
                .upgrade()
                .is_some_and(|pool| pool.borrow_mut().add_ref(&self.view));
        Self {
            pool: self.pool.clone(),
            view: Rc::clone(&self.view),
            released: !counted,
        }
    }
}

impl Deref for PooledView {
    type Target = FilteredView;

    fn deref(&self) -> &FilteredView {
        &self.view
    }
}

impl Drop for PooledView {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for PooledView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledView")
            .field("view", &self.view.id())
            .field("released", &self.released)
            .finish()
    }
}
