use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::{load_json, save_json};

use super::format::PlaylistFormat;
use super::model::Playlist;

pub const BACKUP_FILE_NAME: &str = "playlists_backup.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct PlaylistsFile {
    #[serde(default)]
    playlists: Vec<Playlist>,
}

/// All playlists, persisted to `playlists.json` after every mutation.
pub struct PlaylistManager {
    data_path: PathBuf,
    playlists: Vec<Playlist>,
}

impl PlaylistManager {
    pub fn open(data_path: impl Into<PathBuf>) -> Self {
        let data_path = data_path.into();
        let playlists = match load_json::<PlaylistsFile>(&data_path) {
            Ok(f) => f.unwrap_or_default().playlists,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load playlists, starting empty");
                Vec::new()
            }
        };
        Self {
            data_path,
            playlists,
        }
    }

    pub fn save(&self) -> Result<()> {
        save_json(
            &self.data_path,
            &PlaylistsFileRef {
                playlists: &self.playlists,
            },
        )
    }

    pub fn all(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn get(&self, name: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.name == name)
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Playlist> {
        self.playlists
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::PlaylistNotFound(name.to_string()))
    }

    fn unique_name(&self, name: &str) -> String {
        let mut candidate = name.to_string();
        let mut counter = 1;
        while self.get(&candidate).is_some() {
            candidate = format!("{name} ({counter})");
            counter += 1;
        }
        candidate
    }

    /// Create an empty playlist. Name collisions get a ` (n)` suffix; the
    /// final name is returned.
    pub fn create(&mut self, name: &str) -> Result<String> {
        self.create_with_tracks(name, Vec::new())
    }

    pub fn create_with_tracks(&mut self, name: &str, tracks: Vec<PathBuf>) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyPlaylistName);
        }

        let mut playlist = Playlist::new(self.unique_name(name));
        for p in &tracks {
            playlist.add_track(p);
        }
        let final_name = playlist.name.clone();
        self.playlists.push(playlist);
        self.save()?;
        Ok(final_name)
    }

    pub fn delete(&mut self, name: &str) -> Result<bool> {
        let Some(pos) = self.playlists.iter().position(|p| p.name == name) else {
            return Ok(false);
        };
        self.playlists.remove(pos);
        self.save()?;
        Ok(true)
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        let new = new.trim();
        if new.is_empty() {
            return Err(Error::EmptyPlaylistName);
        }
        if self.get(new).is_some() {
            return Err(Error::PlaylistExists(new.to_string()));
        }
        self.get_mut(old)?.name = new.to_string();
        self.save()
    }

    /// Returns `false` when the track was already in the playlist.
    pub fn add_track_to(&mut self, name: &str, path: &Path) -> Result<bool> {
        let added = self.get_mut(name)?.add_track(path);
        if added {
            self.save()?;
        }
        Ok(added)
    }

    pub fn remove_track_from(&mut self, name: &str, path: &Path) -> Result<bool> {
        let removed = self.get_mut(name)?.remove_track(path);
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    pub fn move_track_in(&mut self, name: &str, from: usize, to: usize) -> Result<bool> {
        let moved = self.get_mut(name)?.move_track(from, to);
        if moved {
            self.save()?;
        }
        Ok(moved)
    }

    /// Write playlist `name` to `target`, as PLS for `.pls` targets and M3U otherwise.
    pub fn export(&self, name: &str, target: &Path) -> Result<PlaylistFormat> {
        let playlist = self
            .get(name)
            .ok_or_else(|| Error::PlaylistNotFound(name.to_string()))?;
        let format = PlaylistFormat::from_path(target);
        fs::write(target, format.render(&playlist.tracks)).map_err(|e| Error::io(target, e))?;
        tracing::info!(playlist = name, target = %target.display(), ?format, "playlist exported");
        Ok(format)
    }

    /// Create a playlist from an M3U or PLS file, keeping only entries that
    /// exist on disk. Named after the file stem unless `name` is given.
    pub fn import(&mut self, source: &Path, name: Option<&str>) -> Result<String> {
        let content = fs::read_to_string(source).map_err(|e| Error::io(source, e))?;
        let base_dir = source.parent().unwrap_or_else(|| Path::new("."));
        let format = PlaylistFormat::from_path(source);

        let entries = format.parse(&content, base_dir);
        let total = entries.len();
        let tracks: Vec<PathBuf> = entries.into_iter().filter(|p| p.exists()).collect();
        if tracks.len() < total {
            tracing::warn!(
                source = %source.display(),
                skipped = total - tracks.len(),
                "playlist entries missing on disk"
            );
        }

        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Imported");
        let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or(stem);
        self.create_with_tracks(name, tracks)
    }

    /// Write every playlist to `dir/playlists_backup.json`.
    pub fn export_all(&self, dir: &Path) -> Result<PathBuf> {
        let target = dir.join(BACKUP_FILE_NAME);
        save_json(
            &target,
            &PlaylistsFileRef {
                playlists: &self.playlists,
            },
        )?;
        Ok(target)
    }

    /// Restore from a backup file. With `merge`, playlists whose name is
    /// already taken are skipped; otherwise the whole set is replaced, with
    /// repeated names in the backup suffixed like `create` does.
    /// Returns how many playlists were taken from the backup.
    pub fn import_all(&mut self, source: &Path, merge: bool) -> Result<usize> {
        let file = load_json::<PlaylistsFile>(source)?.ok_or_else(|| {
            Error::io(
                source,
                std::io::Error::new(std::io::ErrorKind::NotFound, "backup file not found"),
            )
        })?;

        let imported = if merge {
            let mut n = 0;
            for p in file.playlists {
                if self.get(&p.name).is_none() {
                    self.playlists.push(p);
                    n += 1;
                }
            }
            n
        } else {
            self.playlists.clear();
            let n = file.playlists.len();
            for mut p in file.playlists {
                p.name = self.unique_name(&p.name);
                self.playlists.push(p);
            }
            n
        };

        self.save()?;
        Ok(imported)
    }
}

#[derive(Serialize)]
struct PlaylistsFileRef<'a> {
    playlists: &'a [Playlist],
}
