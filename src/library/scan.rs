use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use lofty::config::WriteOptions;
use lofty::prelude::{Accessor, AudioFile, TagExt, TaggedFileExt};
use lofty::tag::Tag;
use walkdir::WalkDir;

use crate::config::LibraryConfig;
use crate::error::{Error, Result};

use super::model::Track;

fn is_audio_file(path: &Path, settings: &LibraryConfig) -> bool {
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

/// Every audio file under `dir`, in path order.
fn audio_files(dir: &Path, settings: &LibraryConfig) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();

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
        .filter_map(|e| match e {
            Ok(e) => Some(e),
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable entry");
                None
            }
        })
    {
        let path = entry.path();
        if path.is_file() && is_audio_file(path, settings) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    files
}

/// Read tags and properties of one file. Anything unreadable keeps the
/// placeholder value.
pub fn read_track(path: &Path) -> Track {
    let mut track = Track::placeholder(path);
    track.created = created_secs(path);

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            track.duration = tagged.properties().duration();

            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = tag.title() {
                    let v = v.trim();
                    if !v.is_empty() {
                        track.title = v.to_string();
                    }
                }
                if let Some(v) = tag.artist() {
                    let v = v.trim();
                    if !v.is_empty() {
                        track.artist = v.to_string();
                    }
                }
                if let Some(v) = tag.album() {
                    let v = v.trim();
                    if !v.is_empty() {
                        track.album = v.to_string();
                    }
                }
            }
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "no readable tags");
        }
    }

    track
}

/// Scan `dir` and read every audio file found, skipping paths in `known`.
pub fn scan(dir: &Path, settings: &LibraryConfig, known: &HashSet<PathBuf>) -> Vec<Track> {
    audio_files(dir, settings)
        .iter()
        .filter(|p| !known.contains(*p))
        .map(|p| read_track(p))
        .collect()
}

/// Write title/artist/album into the file's primary tag, creating the tag
/// when the file has none.
pub fn write_tags(path: &Path, title: &str, artist: &str, album: &str) -> Result<()> {
    let tag_err = |source| Error::Tag {
        path: path.to_path_buf(),
        source,
    };

    let mut tagged = lofty::read_from_path(path).map_err(tag_err)?;
    if tagged.primary_tag().is_none() {
        let tag_type = tagged.primary_tag_type();
        tagged.insert_tag(Tag::new(tag_type));
    }
    let Some(tag) = tagged.primary_tag_mut() else {
        return Err(Error::TrackNotFound(path.to_path_buf()));
    };

    tag.set_title(title.to_string());
    tag.set_artist(artist.to_string());
    tag.set_album(album.to_string());
    tag.save_to_path(path, WriteOptions::default())
        .map_err(tag_err)?;
    Ok(())
}

fn created_secs(path: &Path) -> f64 {
    fs::metadata(path)
        .and_then(|m| m.created().or_else(|_| m.modified()))
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = LibraryConfig::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.m4a"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.WMA"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn unreadable_files_get_placeholder_metadata() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("Some Song.mp3");
        fs::write(&p, b"not a real mp3").unwrap();

        let t = read_track(&p);
        assert_eq!(t.title, "Some Song");
        assert_eq!(t.artist, super::super::model::UNKNOWN_ARTIST);
        assert_eq!(t.album, super::super::model::UNKNOWN_ALBUM);
        assert!(t.duration.is_zero());
        assert!(t.created > 0.0);
    }

    #[test]
    fn scan_skips_known_paths() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.mp3"), b"x").unwrap();
        fs::write(dir.path().join("b.mp3"), b"x").unwrap();

        let known: HashSet<PathBuf> = [dir.path().join("a.mp3")].into_iter().collect();
        let tracks = scan(dir.path(), &LibraryConfig::default(), &known);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title, "b");
    }

    #[test]
    fn scan_filters_non_audio_and_orders_by_path() {
        let dir = tempdir().unwrap();

        fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("a.ogg"), b"not a real ogg").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

        let tracks = scan(dir.path(), &LibraryConfig::default(), &HashSet::new());
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].title, "a");
        assert_eq!(tracks[1].title, "b");
    }

    #[test]
    fn scan_skips_hidden_by_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();
        let hidden_dir = dir.path().join(".cache");
        fs::create_dir_all(&hidden_dir).unwrap();
        fs::write(hidden_dir.join("inside.mp3"), b"not real").unwrap();

        let tracks = scan(dir.path(), &LibraryConfig::default(), &HashSet::new());
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title, "visible");

        let settings = LibraryConfig {
            include_hidden: true,
            ..LibraryConfig::default()
        };
        assert_eq!(scan(dir.path(), &settings, &HashSet::new()).len(), 3);
    }

    #[test]
    fn scan_respects_recursive_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"not real").unwrap();

        let settings = LibraryConfig {
            recursive: false,
            ..LibraryConfig::default()
        };
        let tracks = scan(dir.path(), &settings, &HashSet::new());
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title, "root");
    }

    #[test]
    fn scan_respects_max_depth() {
        let dir = tempdir().unwrap();
        let d1 = dir.path().join("d1");
        let d2 = d1.join("d2");
        fs::create_dir_all(&d2).unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        fs::write(d1.join("one.mp3"), b"not real").unwrap();
        fs::write(d2.join("two.mp3"), b"not real").unwrap();

        // WalkDir depth counts root as 0, children as 1, grandchildren as 2.
        let settings = LibraryConfig {
            max_depth: Some(2),
            ..LibraryConfig::default()
        };
        let names: Vec<String> = scan(dir.path(), &settings, &HashSet::new())
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert!(names.contains(&"root".to_string()));
        assert!(names.contains(&"one".to_string()));
        assert!(!names.contains(&"two".to_string()));
    }
}
