use std::fs;
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use super::*;
use crate::error::Error;

fn manager(dir: &Path) -> PlaylistManager {
    PlaylistManager::open(dir.join("playlists.json"))
}

#[test]
fn playlist_add_ignores_duplicates_and_move_checks_bounds() {
    let mut p = Playlist::new("mix");
    assert!(p.add_track(Path::new("/a.mp3")));
    assert!(p.add_track(Path::new("/b.mp3")));
    assert!(!p.add_track(Path::new("/a.mp3")));
    assert_eq!(p.len(), 2);

    assert!(p.move_track(0, 1));
    assert_eq!(p.tracks, vec![PathBuf::from("/b.mp3"), PathBuf::from("/a.mp3")]);
    assert!(!p.move_track(0, 5));

    assert!(p.remove_track(Path::new("/b.mp3")));
    assert!(!p.remove_track(Path::new("/b.mp3")));
    p.clear();
    assert!(p.is_empty());
}

#[test]
fn create_suffixes_colliding_names() {
    let dir = tempdir().unwrap();
    let mut m = manager(dir.path());
    assert_eq!(m.create("Road Trip").unwrap(), "Road Trip");
    assert_eq!(m.create("Road Trip").unwrap(), "Road Trip (1)");
    assert_eq!(m.create("Road Trip").unwrap(), "Road Trip (2)");
    assert!(matches!(m.create("   "), Err(Error::EmptyPlaylistName)));
    assert_eq!(m.all().len(), 3);
}

#[test]
fn saved_and_reloaded_playlist_keeps_track_order() {
    let dir = tempdir().unwrap();
    let order = vec![
        PathBuf::from("/m/c.mp3"),
        PathBuf::from("/m/a.mp3"),
        PathBuf::from("/m/b.mp3"),
    ];
    {
        let mut m = manager(dir.path());
        m.create_with_tracks("ordered", order.clone()).unwrap();
    }
    let m = manager(dir.path());
    assert_eq!(m.get("ordered").unwrap().tracks, order);
}

#[test]
fn rename_rejects_taken_and_unknown_names() {
    let dir = tempdir().unwrap();
    let mut m = manager(dir.path());
    m.create("a").unwrap();
    m.create("b").unwrap();

    assert!(matches!(m.rename("a", "b"), Err(Error::PlaylistExists(_))));
    assert!(matches!(m.rename("zz", "c"), Err(Error::PlaylistNotFound(_))));
    m.rename("a", "c").unwrap();
    assert!(m.get("a").is_none());
    assert!(m.get("c").is_some());
}

#[test]
fn delete_and_track_edits_persist() {
    let dir = tempdir().unwrap();
    let mut m = manager(dir.path());
    m.create("keep").unwrap();
    m.create("drop").unwrap();

    assert!(m.add_track_to("keep", Path::new("/1.mp3")).unwrap());
    assert!(m.add_track_to("keep", Path::new("/2.mp3")).unwrap());
    assert!(!m.add_track_to("keep", Path::new("/1.mp3")).unwrap());
    assert!(m.move_track_in("keep", 1, 0).unwrap());
    assert!(m.remove_track_from("keep", Path::new("/1.mp3")).unwrap());
    assert!(m.delete("drop").unwrap());
    assert!(!m.delete("drop").unwrap());
    assert!(m.add_track_to("nope", Path::new("/1.mp3")).is_err());

    let reloaded = manager(dir.path());
    assert_eq!(reloaded.all().len(), 1);
    assert_eq!(reloaded.get("keep").unwrap().tracks, vec![PathBuf::from("/2.mp3")]);
}

#[test]
fn export_then_import_m3u_keeps_existing_entries() {
    let dir = tempdir().unwrap();
    let song_a = dir.path().join("a.mp3");
    let song_b = dir.path().join("b.mp3");
    fs::write(&song_a, b"x").unwrap();
    fs::write(&song_b, b"x").unwrap();

    let mut m = manager(dir.path());
    m.create_with_tracks(
        "mix",
        vec![song_b.clone(), PathBuf::from("/gone/forever.mp3"), song_a.clone()],
    )
    .unwrap();

    let target = dir.path().join("mix.m3u");
    assert_eq!(m.export("mix", &target).unwrap(), PlaylistFormat::M3u);
    assert!(fs::read_to_string(&target).unwrap().starts_with("#EXTM3U\n"));

    let name = m.import(&target, None).unwrap();
    assert_eq!(name, "mix (1)");
    assert_eq!(m.get(&name).unwrap().tracks, vec![song_b, song_a]);
}

#[test]
fn import_pls_resolves_relative_paths_and_honours_name() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("sub")).unwrap();
    let song = dir.path().join("sub").join("song.ogg");
    fs::write(&song, b"x").unwrap();

    let pls = dir.path().join("list.pls");
    fs::write(
        &pls,
        "[playlist]\nFile1=sub/song.ogg\nFile2=missing.ogg\nNumberOfEntries=2\nVersion=2\n",
    )
    .unwrap();

    let mut m = manager(dir.path());
    let name = m.import(&pls, Some("Evening")).unwrap();
    assert_eq!(name, "Evening");
    assert_eq!(m.get("Evening").unwrap().tracks, vec![song]);
}

#[test]
fn export_unknown_playlist_fails() {
    let dir = tempdir().unwrap();
    let m = manager(dir.path());
    assert!(matches!(
        m.export("nope", &dir.path().join("x.m3u")),
        Err(Error::PlaylistNotFound(_))
    ));
}

#[test]
fn backup_restore_merge_and_replace() {
    let dir = tempdir().unwrap();
    let backup_dir = dir.path().join("backup");

    let mut source = PlaylistManager::open(dir.path().join("one.json"));
    source.create("shared").unwrap();
    source.create("only-in-backup").unwrap();
    let backup = source.export_all(&backup_dir).unwrap();
    assert!(backup.ends_with("playlists_backup.json"));

    let mut target = PlaylistManager::open(dir.path().join("two.json"));
    target.create("shared").unwrap();
    target.create("local").unwrap();

    assert_eq!(target.import_all(&backup, true).unwrap(), 1);
    let names: Vec<&str> = target.all().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["shared", "local", "only-in-backup"]);

    assert_eq!(target.import_all(&backup, false).unwrap(), 2);
    let names: Vec<&str> = target.all().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["shared", "only-in-backup"]);

    assert!(target.import_all(&dir.path().join("absent.json"), true).is_err());
}

#[test]
fn replace_restore_keeps_names_unique() {
    let dir = tempdir().unwrap();
    let backup = dir.path().join("hand_edited.json");
    fs::write(
        &backup,
        r#"{"playlists": [
            {"name": "road", "tracks": ["/a.mp3"]},
            {"name": "road", "tracks": ["/b.mp3"]},
            {"name": "road (1)"}
        ]}"#,
    )
    .unwrap();

    let mut m = manager(dir.path());
    m.create("old").unwrap();
    assert_eq!(m.import_all(&backup, false).unwrap(), 3);

    let names: Vec<&str> = m.all().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["road", "road (1)", "road (1) (1)"]);
    assert_eq!(m.get("road (1)").unwrap().tracks, vec![PathBuf::from("/b.mp3")]);
}
