use super::*;
use crate::config::TrackDisplayField;
use crate::test_support::{StubAnalyzer, collection_of};
use std::path::Path;
use std::time::Duration;

fn t(name: &str) -> Track {
    Track::from_path(format!("/music/{name}.mp3"))
}

#[test]
fn row_ids_survive_inserts_and_moves() {
    let mut c = Collection::with_analyzer("lib", Box::new(StubAnalyzer));
    let a = c.push(t("a"));
    let b = c.push(t("b"));
    let cc = c.push(t("c"));

    c.insert(0, t("z"));
    assert_eq!(c.row_of(a), Some(1));
    assert_eq!(c.row_of(b), Some(2));
    assert_eq!(c.row_of(cc), Some(3));

    assert!(c.move_row(3, 0));
    assert_eq!(c.row_of(cc), Some(0));
    assert_eq!(c.row_of(a), Some(2));
    assert_eq!(c.track(0).unwrap().title, "c");
}

#[test]
fn removed_row_handle_becomes_null_even_when_slot_is_reused() {
    let mut c = Collection::with_analyzer("lib", Box::new(StubAnalyzer));
    let a = c.push(t("a"));
    let b = c.push(t("b"));

    assert_eq!(c.remove(0).map(|t| t.title), Some("a".to_string()));
    assert!(!c.contains(a));
    assert_eq!(c.row_of(b), Some(0));

    // The freed slot is recycled with a new generation.
    let d = c.push(t("d"));
    assert_ne!(d, a);
    assert_eq!(c.row_of(a), None);
    assert_eq!(c.row_of(d), Some(1));
}

#[test]
fn clear_invalidates_every_handle() {
    let mut c = Collection::with_analyzer("lib", Box::new(StubAnalyzer));
    let ids: Vec<RowId> = (0..3).map(|i| c.push(t(&i.to_string()))).collect();
    c.clear();
    assert!(c.is_empty());
    assert!(ids.iter().all(|id| c.row_of(*id).is_none()));
}

#[test]
fn out_of_range_edits_are_rejected() {
    let mut c = Collection::with_analyzer("lib", Box::new(StubAnalyzer));
    c.push(t("a"));
    assert_eq!(c.remove(5), None);
    assert!(!c.move_row(0, 1));
    assert!(!c.set_decoration(1, Decoration::NowPlaying));
    assert_eq!(c.add_play_count(1), None);
}

#[test]
fn revision_tracks_order_relevant_changes_only() {
    let mut c = Collection::with_analyzer("lib", Box::new(StubAnalyzer));
    c.push(t("a"));
    let r0 = c.revision();

    c.set_decoration(0, Decoration::NowPlaying);
    assert_eq!(c.revision(), r0);

    c.add_play_count(0);
    assert!(c.revision() > r0);
}

#[test]
fn reanalyse_keeps_sections_and_refreshes_whole_files() {
    let c = collection_of(&[]);
    let mut c = c.borrow_mut();
    c.push(t("whole"));
    c.push(Track::section(
        "/music/live.flac",
        Duration::from_secs(60),
        Duration::from_secs(30),
    ));
    c.add_play_count(1);

    let whole = c.reanalyse(0).unwrap();
    assert_eq!(whole.start, None);
    assert_eq!(whole.duration, Some(StubAnalyzer::DURATION));
    assert_eq!(whole.title, "WHOLE");

    let live = c.reanalyse(1).unwrap();
    assert_eq!(live.start, Some(Duration::from_secs(60)));
    assert_eq!(live.duration, Some(Duration::from_secs(30)));
    assert_eq!(live.play_count, 1);
    assert!(live.is_section());
}

#[test]
fn reanalyse_reports_unreadable_files() {
    let c = collection_of(&["broken"]);
    assert!(c.borrow().reanalyse(0).is_err());
    assert!(matches!(
        c.borrow().reanalyse(9),
        Err(crate::Error::RowOutOfRange { row: 9, len: 1 })
    ));
}

#[test]
fn update_row_rewrites_display_with_collection_format() {
    let mut c = Collection::with_analyzer("lib", Box::new(StubAnalyzer));
    c.set_display_format(DisplayFormat {
        fields: vec![TrackDisplayField::Artist, TrackDisplayField::Title],
        separator: " / ".into(),
    });
    c.push(t("song"));

    let mut info = c.reanalyse(0).unwrap();
    info.artist = Some("Band".into());
    assert!(c.update_row(0, &info));
    assert_eq!(c.track(0).unwrap().display, "Band / SONG");
}

#[test]
fn display_format_skips_blank_fields_and_falls_back_to_title() {
    let mut track = Track::from_path("/tmp/Song.mp3");
    track.artist = Some("  Artist  ".into());

    let fmt = DisplayFormat::default();
    assert_eq!(fmt.render(&track), "Artist - Song");

    track.artist = Some("   ".into());
    assert_eq!(fmt.render(&track), "Song");

    let album_only = DisplayFormat {
        fields: vec![TrackDisplayField::Album],
        separator: " - ".into(),
    };
    assert_eq!(album_only.render(&track), "Song");

    let file = DisplayFormat {
        fields: vec![TrackDisplayField::Filename, TrackDisplayField::Path],
        separator: "|".into(),
    };
    assert_eq!(
        file.render(&track),
        format!("Song|{}", Path::new("/tmp/Song.mp3").display())
    );
}

#[test]
fn collections_get_distinct_ids_and_keep_their_names() {
    let a = Collection::new("a");
    let b = Collection::new("b");
    assert_ne!(a.id(), b.id());
    assert_eq!(a.name(), "a");
    assert_eq!(b.name(), "b");
}
