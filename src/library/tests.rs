use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::tempdir;

use super::*;
use super::model::{UNKNOWN_ALBUM, UNKNOWN_ARTIST};
use crate::config::{LibraryConfig, TrackDisplayField};

fn t(path: &str, title: &str, artist: &str, album: &str, secs: u64) -> Track {
    Track {
        path: PathBuf::from(path),
        title: title.into(),
        artist: artist.into(),
        album: album.into(),
        duration: Duration::from_secs(secs),
        created: 0.0,
    }
}

fn lib_with(dir: &Path, tracks: Vec<Track>) -> Library {
    let mut lib = Library::open(dir.join("library.json"), LibraryConfig::default());
    for track in tracks {
        lib.insert_for_test(track);
    }
    lib
}

#[test]
fn display_from_fields_can_format_artist_title() {
    let track = t("/m/Song.mp3", "Song", "Artist", UNKNOWN_ALBUM, 0);
    let fields = [TrackDisplayField::Artist, TrackDisplayField::Title];
    assert_eq!(display_from_fields(&track, &fields, " - "), "Artist - Song");

    let unknown = t("/m/Song.mp3", "Song", UNKNOWN_ARTIST, UNKNOWN_ALBUM, 0);
    assert_eq!(display_from_fields(&unknown, &fields, " - "), "Song");

    let timed = t("/m/Song.mp3", "Song", "A", "B", 125);
    assert_eq!(
        display_from_fields(
            &timed,
            &[TrackDisplayField::Filename, TrackDisplayField::Duration],
            " | "
        ),
        "Song | 2:05"
    );
}

#[test]
fn format_mmss_pads_seconds() {
    assert_eq!(format_mmss(Duration::from_secs(0)), "0:00");
    assert_eq!(format_mmss(Duration::from_secs(61)), "1:01");
    assert_eq!(format_mmss(Duration::from_millis(3_599_900)), "59:59");
}

#[test]
fn add_folder_skips_known_paths_and_persists() {
    let data = tempdir().unwrap();
    let music = tempdir().unwrap();
    fs::write(music.path().join("one.mp3"), b"x").unwrap();
    fs::write(music.path().join("two.flac"), b"x").unwrap();

    let mut lib = Library::open(data.path().join("library.json"), LibraryConfig::default());
    assert_eq!(lib.add_folder(music.path()).unwrap(), 2);
    assert_eq!(lib.add_folder(music.path()).unwrap(), 0);
    assert_eq!(lib.folders().len(), 1);

    fs::write(music.path().join("three.ogg"), b"x").unwrap();
    assert_eq!(lib.add_folder(music.path()).unwrap(), 1);

    let reopened = Library::open(data.path().join("library.json"), LibraryConfig::default());
    assert_eq!(reopened.len(), 3);
    assert_eq!(reopened.folders(), lib.folders());
}

#[test]
fn remove_folder_drops_its_tracks() {
    let data = tempdir().unwrap();
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    fs::write(a.path().join("a.mp3"), b"x").unwrap();
    fs::write(b.path().join("b.mp3"), b"x").unwrap();

    let mut lib = Library::open(data.path().join("library.json"), LibraryConfig::default());
    lib.add_folder(a.path()).unwrap();
    lib.add_folder(b.path()).unwrap();
    assert_eq!(lib.len(), 2);

    assert!(lib.remove_folder(a.path()).unwrap());
    assert_eq!(lib.len(), 1);
    assert_eq!(lib.tracks()[0].title, "b");
    assert!(!lib.remove_folder(a.path()).unwrap());
}

#[test]
fn refresh_rescans_and_forgets_deleted_files() {
    let data = tempdir().unwrap();
    let music = tempdir().unwrap();
    fs::write(music.path().join("keep.mp3"), b"x").unwrap();
    fs::write(music.path().join("gone.mp3"), b"x").unwrap();

    let mut lib = Library::open(data.path().join("library.json"), LibraryConfig::default());
    lib.add_folder(music.path()).unwrap();
    fs::remove_file(music.path().join("gone.mp3")).unwrap();

    assert_eq!(lib.refresh().unwrap(), 1);
    assert_eq!(lib.tracks()[0].title, "keep");
}

#[test]
fn add_missing_folder_adds_nothing() {
    let data = tempdir().unwrap();
    let mut lib = Library::open(data.path().join("library.json"), LibraryConfig::default());
    assert_eq!(lib.add_folder(&data.path().join("does-not-exist")).unwrap(), 0);
    assert!(lib.folders().is_empty());
}

#[test]
fn corrupt_library_file_opens_empty() {
    let data = tempdir().unwrap();
    let path = data.path().join("library.json");
    fs::write(&path, "[[[").unwrap();
    let lib = Library::open(&path, LibraryConfig::default());
    assert!(lib.is_empty());
}

#[test]
fn old_records_without_created_still_load() {
    let data = tempdir().unwrap();
    let path = data.path().join("library.json");
    fs::write(
        &path,
        r#"{"folders": ["/m"], "tracks": [
            {"path": "/m/a.mp3", "title": "A", "artist": "X", "album": "Y", "duration": 12.5}
        ]}"#,
    )
    .unwrap();

    let lib = Library::open(&path, LibraryConfig::default());
    assert_eq!(lib.len(), 1);
    assert_eq!(lib.tracks()[0].duration, Duration::from_millis(12_500));
    assert_eq!(lib.tracks()[0].created, 0.0);
}

#[test]
fn search_matches_title_artist_album_case_insensitively() {
    let dir = tempdir().unwrap();
    let lib = lib_with(
        dir.path(),
        vec![
            t("/m/1.mp3", "Paranoid", "Black Sabbath", "Paranoid", 0),
            t("/m/2.mp3", "Blackened", "Metallica", "...And Justice", 0),
            t("/m/3.mp3", "Hurt", "Johnny Cash", "American IV", 0),
        ],
    );

    assert_eq!(lib.search("black").len(), 2);
    assert_eq!(lib.search("JUSTICE").len(), 1);
    assert_eq!(lib.search("zzz").len(), 0);
}

#[test]
fn lookups_by_path_artist_album_and_folder() {
    let dir = tempdir().unwrap();
    let lib = lib_with(
        dir.path(),
        vec![
            t("/m/a/1.mp3", "One", "Band", "First", 0),
            t("/m/a/2.mp3", "Two", "band", "First", 0),
            t("/m/b/3.mp3", "Three", UNKNOWN_ARTIST, UNKNOWN_ALBUM, 0),
        ],
    );

    assert_eq!(lib.track_by_path(Path::new("/m/a/2.mp3")).unwrap().title, "Two");
    assert!(lib.track_by_path(Path::new("/m/zz.mp3")).is_none());

    let by_paths = lib.tracks_by_paths(&[PathBuf::from("/m/b/3.mp3"), PathBuf::from("/m/a/1.mp3")]);
    let titles: Vec<&str> = by_paths.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["One", "Three"]);

    assert_eq!(lib.tracks_by_artist("BAND").len(), 2);
    assert_eq!(lib.tracks_by_album("first").len(), 2);
    assert_eq!(lib.tracks_by_folder(Path::new("/m/a")).len(), 2);

    assert_eq!(lib.artists(), vec!["Band".to_string(), "band".to_string()]);
    assert_eq!(lib.albums(), vec!["First".to_string()]);

    let structure = lib.folder_structure();
    assert_eq!(structure.len(), 2);
    assert_eq!(structure[Path::new("/m/a")].len(), 2);
}

#[test]
fn find_duplicates_groups_by_normalized_title_and_artist() {
    let dir = tempdir().unwrap();
    let lib = lib_with(
        dir.path(),
        vec![
            t("/m/1.mp3", "Song", "Artist", "A", 0),
            t("/m/2.mp3", "Other", "Artist", "A", 0),
            t("/m/3.mp3", " song ", "ARTIST", "B", 0),
            t("/m/4.mp3", "Other", "Someone", "A", 0),
        ],
    );

    let groups = lib.find_duplicates();
    assert_eq!(groups.len(), 1);
    let paths: Vec<&Path> = groups[0].iter().map(|t| t.path.as_path()).collect();
    assert_eq!(paths, vec![Path::new("/m/1.mp3"), Path::new("/m/3.mp3")]);
}

#[test]
fn remove_missing_drops_records_without_files() {
    let data = tempdir().unwrap();
    let present = data.path().join("here.mp3");
    fs::write(&present, b"x").unwrap();

    let mut lib = lib_with(
        data.path(),
        vec![
            t(present.to_str().unwrap(), "Here", "A", "B", 0),
            t("/definitely/not/here.mp3", "Gone", "A", "B", 0),
        ],
    );

    assert_eq!(lib.find_missing().len(), 1);
    assert_eq!(lib.remove_missing().unwrap(), 1);
    assert_eq!(lib.len(), 1);
    assert_eq!(lib.remove_missing().unwrap(), 0);
    assert!(data.path().join("library.json").exists());
}

#[test]
fn sorted_indices_by_column_reverse_and_folder() {
    let dir = tempdir().unwrap();
    let lib = lib_with(
        dir.path(),
        vec![
            t("/m/b/1.mp3", "Charlie", "Zed", "A", 30),
            t("/m/a/2.mp3", "alpha", "Yan", "B", 10),
            t("/m/b/3.mp3", "Bravo", "Xu", "C", 20),
        ],
    );

    assert_eq!(
        lib.sorted_indices(SortColumn::Title, false, ViewMode::List),
        vec![1, 2, 0]
    );
    assert_eq!(
        lib.sorted_indices(SortColumn::Title, true, ViewMode::List),
        vec![0, 2, 1]
    );
    assert_eq!(
        lib.sorted_indices(SortColumn::Duration, false, ViewMode::List),
        vec![1, 2, 0]
    );
    assert_eq!(
        lib.sorted_indices(SortColumn::Artist, false, ViewMode::Folder),
        vec![1, 2, 0]
    );
}

#[test]
fn update_tags_for_unknown_track_is_rejected() {
    let dir = tempdir().unwrap();
    let mut lib = lib_with(dir.path(), vec![]);
    assert!(lib
        .update_tags(Path::new("/nowhere.mp3"), "t", "a", "b")
        .is_err());
}
