use super::*;
use crate::library::{Collection, Track};
use crate::test_support::collection_of;
use std::rc::Rc;
use std::time::Duration;

#[test]
fn acquire_twice_shares_one_view_and_release_disposes_it() {
    let pool = ViewPool::new();
    let c = collection_of(&["a", "b"]);

    let mut first = pool.acquire(&c);
    let mut second = pool.acquire(&c);
    assert!(Rc::ptr_eq(first.view_ref(), second.view_ref()));
    assert_eq!(pool.refcount(first.id()), 2);

    let id = first.id();
    let weak = Rc::downgrade(first.view_ref());

    first.release();
    assert_eq!(pool.refcount(id), 1);
    second.release();
    assert_eq!(pool.refcount(id), 0);
    assert!(pool.is_empty());

    // A third release is a no-op.
    second.release();
    assert_eq!(pool.refcount(id), 0);
    pool.release(None);

    drop(first);
    drop(second);
    assert!(weak.upgrade().is_none());
    // The collection outlives its projection.
    assert_eq!(c.borrow().len(), 2);
}

#[test]
fn disposed_view_is_rebuilt_on_next_acquire() {
    let pool = ViewPool::new();
    let c = collection_of(&["a"]);

    let old_id = pool.acquire(&c).id();
    assert!(!pool.contains(old_id));

    let fresh = pool.acquire(&c);
    assert_ne!(fresh.id(), old_id);
    assert_eq!(pool.refcount(fresh.id()), 1);
}

#[test]
fn views_are_keyed_by_collection() {
    let pool = ViewPool::new();
    let a = collection_of(&["a"]);
    let b = collection_of(&["b"]);

    let va = pool.acquire(&a);
    let vb = pool.acquire(&b);
    assert_ne!(va.id(), vb.id());
    assert_eq!(pool.len(), 2);
    assert_eq!(pool.get(a.borrow().id()).map(|v| v.id()), Some(va.id()));
}

#[test]
fn clone_and_reference_count_as_holders() {
    let pool = ViewPool::new();
    let c = collection_of(&["a"]);
    let held = pool.acquire(&c);

    let cloned = held.clone();
    let referenced = pool.reference(&held).unwrap();
    assert_eq!(pool.refcount(held.id()), 3);

    drop(cloned);
    drop(referenced);
    assert_eq!(pool.refcount(held.id()), 1);
}

#[test]
fn reference_rejects_views_outside_the_pool() {
    let pool = ViewPool::new();
    let c = collection_of(&["a"]);
    let loose = FilteredView::new(&c);

    assert!(matches!(
        pool.reference(&loose),
        Err(crate::Error::ViewNotPooled(id)) if id == loose.id()
    ));
    assert!(pool.is_empty());
}

#[test]
fn reference_rejects_a_disposed_view() {
    let pool = ViewPool::new();
    let c = collection_of(&["a"]);
    let mut held = pool.acquire(&c);
    let view = Rc::clone(held.view_ref());
    held.release();

    assert!(pool.reference(&view).is_err());
    assert!(held.clone().is_released());
}

#[test]
fn guards_outliving_the_pool_release_quietly() {
    let pool = ViewPool::new();
    let c = collection_of(&["a"]);
    let held = pool.acquire(&c);
    drop(pool);
    drop(held);
}

#[test]
fn view_filters_fuzzily_on_display_text() {
    let c = collection_of(&["alpha", "beta", "gamma", "delta"]);
    let view = FilteredView::new(&c);
    assert_eq!(view.row_count(), 4);

    view.set_filter("et");
    assert_eq!(view.rows(), vec![1, 3]);
    assert_eq!(view.map_to_source(1), Some(3));
    assert_eq!(view.map_from_source(3), Some(1));
    assert_eq!(view.map_from_source(0), None);

    view.set_filter("   ");
    assert_eq!(view.row_count(), 4);
}

#[test]
fn view_sorts_stably_and_follows_collection_edits() {
    let c = collection_of(&["b", "a", "c"]);
    let view = FilteredView::new(&c);
    view.set_sort(SortKey::Title, false);
    assert_eq!(view.rows(), vec![1, 0, 2]);

    view.set_sort(SortKey::Title, true);
    assert_eq!(view.rows(), vec![2, 0, 1]);

    view.set_sort(SortKey::Insertion, true);
    assert_eq!(view.rows(), vec![2, 1, 0]);

    view.set_sort(SortKey::PlayCount, true);
    assert_eq!(view.rows(), vec![0, 1, 2]);
    c.borrow_mut().add_play_count(2);
    assert_eq!(view.rows(), vec![2, 0, 1]);

    c.borrow_mut().push(Track::section(
        "/music/d.mp3",
        Duration::ZERO,
        Duration::from_secs(1),
    ));
    assert_eq!(view.row_count(), 4);
}

#[test]
fn row_handles_resolve_through_resorting() {
    let c = collection_of(&["b", "a", "c"]);
    let view = FilteredView::new(&c);
    let handle = view.row_id(0).unwrap();
    assert_eq!(view.track(0).unwrap().title, "b");

    view.set_sort(SortKey::Title, false);
    assert_eq!(view.row_of(handle), Some(1));

    c.borrow_mut().remove(0);
    assert_eq!(view.row_of(handle), None);
}

#[test]
fn sort_key_cycles_through_all_keys() {
    let mut k = SortKey::Insertion;
    for _ in 0..SortKey::ALL.len() {
        k = k.next();
    }
    assert_eq!(k, SortKey::Insertion);
    assert_eq!(SortKey::PlayCount.label(), "plays");
}

#[test]
fn empty_collection_yields_empty_view() {
    let c = Collection::new("empty").into_shared();
    let view = FilteredView::new(&c);
    assert!(view.is_empty());
    assert_eq!(view.map_to_source(0), None);
    assert_eq!(view.row_id(0), None);
}
