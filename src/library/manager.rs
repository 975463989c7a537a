use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::LibraryConfig;
use crate::error::{Error, Result};
use crate::store::{load_json, save_json};

use super::model::{SortColumn, Track, ViewMode};
use super::scan::{scan, write_tags};

#[derive(Debug, Default, Serialize, Deserialize)]
struct LibraryFile {
    #[serde(default)]
    folders: Vec<PathBuf>,
    #[serde(default)]
    tracks: Vec<Track>,
}

/// The indexed music collection: watched folders plus their tracks,
/// persisted to `library.json`.
pub struct Library {
    data_path: PathBuf,
    scan_config: LibraryConfig,
    folders: Vec<PathBuf>,
    tracks: Vec<Track>,
}

impl Library {
    /// Open the library stored at `data_path`. A missing or corrupt file
    /// yields an empty library.
    pub fn open(data_path: impl Into<PathBuf>, scan_config: LibraryConfig) -> Self {
        let data_path = data_path.into();
        let file = match load_json::<LibraryFile>(&data_path) {
            Ok(f) => f.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load library, starting empty");
                LibraryFile::default()
            }
        };

        Self {
            data_path,
            scan_config,
            folders: file.folders,
            tracks: file.tracks,
        }
    }

    pub fn save(&self) -> Result<()> {
        #[derive(Serialize)]
        struct LibraryFileRef<'a> {
            folders: &'a [PathBuf],
            tracks: &'a [Track],
        }

        save_json(
            &self.data_path,
            &LibraryFileRef {
                folders: &self.folders,
                tracks: &self.tracks,
            },
        )
    }

    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Remember `folder` and scan it. Returns the number of new tracks.
    pub fn add_folder(&mut self, folder: &Path) -> Result<usize> {
        if !folder.is_dir() {
            tracing::warn!(folder = %folder.display(), "not a folder, nothing added");
            return Ok(0);
        }
        let folder = folder.canonicalize().map_err(|e| Error::io(folder, e))?;
        if !self.folders.contains(&folder) {
            self.folders.push(folder.clone());
        }

        let added = self.scan_folder(&folder);
        self.save()?;
        tracing::info!(folder = %folder.display(), added, "folder added");
        Ok(added)
    }

    /// Forget `folder` and every track under it. Returns `false` when the
    /// folder was not part of the library.
    pub fn remove_folder(&mut self, folder: &Path) -> Result<bool> {
        let folder = folder.canonicalize().unwrap_or_else(|_| folder.to_path_buf());
        let Some(pos) = self.folders.iter().position(|f| f == &folder) else {
            return Ok(false);
        };
        self.folders.remove(pos);
        self.tracks.retain(|t| !t.path.starts_with(&folder));
        self.save()?;
        Ok(true)
    }

    fn scan_folder(&mut self, folder: &Path) -> usize {
        if !folder.exists() {
            return 0;
        }

        let existing: HashSet<PathBuf> = self.tracks.iter().map(|t| t.path.clone()).collect();
        let found = scan(folder, &self.scan_config, &existing);
        let added = found.len();
        self.tracks.extend(found);
        added
    }

    /// Drop all tracks and rescan every folder.
    pub fn refresh(&mut self) -> Result<usize> {
        self.tracks.clear();
        let folders = self.folders.clone();
        let total: usize = folders.iter().map(|f| self.scan_folder(f)).sum();
        self.save()?;
        tracing::info!(tracks = total, "library refreshed");
        Ok(total)
    }

    /// Case-insensitive substring search over title, artist and album.
    pub fn search(&self, query: &str) -> Vec<&Track> {
        let q = query.to_lowercase();
        self.tracks
            .iter()
            .filter(|t| {
                t.title.to_lowercase().contains(&q)
                    || t.artist.to_lowercase().contains(&q)
                    || t.album.to_lowercase().contains(&q)
            })
            .collect()
    }

    pub fn track_by_path(&self, path: &Path) -> Option<&Track> {
        self.tracks.iter().find(|t| t.path == path)
    }

    /// Tracks whose path is in `paths`, in library order.
    pub fn tracks_by_paths(&self, paths: &[PathBuf]) -> Vec<&Track> {
        let wanted: HashSet<&PathBuf> = paths.iter().collect();
        self.tracks
            .iter()
            .filter(|t| wanted.contains(&t.path))
            .collect()
    }

    pub fn tracks_by_folder(&self, folder: &Path) -> Vec<&Track> {
        let folder = folder.canonicalize().unwrap_or_else(|_| folder.to_path_buf());
        self.tracks
            .iter()
            .filter(|t| t.path.starts_with(&folder))
            .collect()
    }

    /// Tracks grouped by their containing directory.
    pub fn folder_structure(&self) -> BTreeMap<PathBuf, Vec<&Track>> {
        let mut structure: BTreeMap<PathBuf, Vec<&Track>> = BTreeMap::new();
        for t in &self.tracks {
            let parent = t.path.parent().map(Path::to_path_buf).unwrap_or_default();
            structure.entry(parent).or_default().push(t);
        }
        structure
    }

    pub fn artists(&self) -> Vec<String> {
        let set: HashSet<&str> = self
            .tracks
            .iter()
            .filter(|t| t.has_known_artist())
            .map(|t| t.artist.as_str())
            .collect();
        let mut v: Vec<String> = set.into_iter().map(str::to_string).collect();
        v.sort();
        v
    }

    pub fn albums(&self) -> Vec<String> {
        let set: HashSet<&str> = self
            .tracks
            .iter()
            .filter(|t| t.has_known_album())
            .map(|t| t.album.as_str())
            .collect();
        let mut v: Vec<String> = set.into_iter().map(str::to_string).collect();
        v.sort();
        v
    }

    pub fn tracks_by_artist(&self, artist: &str) -> Vec<&Track> {
        let a = artist.to_lowercase();
        self.tracks
            .iter()
            .filter(|t| t.artist.to_lowercase() == a)
            .collect()
    }

    pub fn tracks_by_album(&self, album: &str) -> Vec<&Track> {
        let a = album.to_lowercase();
        self.tracks
            .iter()
            .filter(|t| t.album.to_lowercase() == a)
            .collect()
    }

    /// Groups of tracks sharing title and artist (case and surrounding
    /// whitespace ignored), in the order each group was first seen.
    pub fn find_duplicates(&self) -> Vec<Vec<&Track>> {
        let mut index: HashMap<(String, String), usize> = HashMap::new();
        let mut groups: Vec<Vec<&Track>> = Vec::new();

        for t in &self.tracks {
            let key = (
                t.title.trim().to_lowercase(),
                t.artist.trim().to_lowercase(),
            );
            match index.get(&key) {
                Some(&g) => groups[g].push(t),
                None => {
                    index.insert(key, groups.len());
                    groups.push(vec![t]);
                }
            }
        }

        groups.retain(|g| g.len() > 1);
        groups
    }

    pub fn find_missing(&self) -> Vec<&Track> {
        self.tracks.iter().filter(|t| !t.path.exists()).collect()
    }

    /// Drop records whose file is gone. Saves only when something changed.
    pub fn remove_missing(&mut self) -> Result<usize> {
        let before = self.tracks.len();
        self.tracks.retain(|t| t.path.exists());
        let removed = before - self.tracks.len();
        if removed > 0 {
            self.save()?;
        }
        Ok(removed)
    }

    /// Indices into `tracks()` in listing order.
    pub fn sorted_indices(&self, column: SortColumn, reverse: bool, mode: ViewMode) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..self.tracks.len()).collect();
        let tracks = &self.tracks;

        idx.sort_by(|&a, &b| {
            let (ta, tb) = (&tracks[a], &tracks[b]);
            let by_column = match column {
                SortColumn::Title => ta.title.to_lowercase().cmp(&tb.title.to_lowercase()),
                SortColumn::Artist => ta.artist.to_lowercase().cmp(&tb.artist.to_lowercase()),
                SortColumn::Album => ta.album.to_lowercase().cmp(&tb.album.to_lowercase()),
                SortColumn::Duration => ta.duration.cmp(&tb.duration),
                SortColumn::Created => ta.created.total_cmp(&tb.created),
            };
            let by_column = if reverse { by_column.reverse() } else { by_column };
            let by_column = by_column.then_with(|| ta.path.cmp(&tb.path));

            match mode {
                ViewMode::List => by_column,
                ViewMode::Folder => ta.path.parent().cmp(&tb.path.parent()).then(by_column),
            }
        });
        idx
    }

    /// Write new tags into the file and update its record.
    pub fn update_tags(&mut self, path: &Path, title: &str, artist: &str, album: &str) -> Result<()> {
        let Some(track) = self.tracks.iter_mut().find(|t| t.path == path) else {
            return Err(Error::TrackNotFound(path.to_path_buf()));
        };

        write_tags(path, title, artist, album)?;
        track.title = title.to_string();
        track.artist = artist.to_string();
        track.album = album.to_string();
        self.save()
    }

    #[cfg(test)]
    pub(crate) fn insert_for_test(&mut self, track: Track) {
        self.tracks.push(track);
    }
}
