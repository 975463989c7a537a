//! Editing actions behind the keyboard shortcuts and prompts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::audio::AudioCmd;
use crate::library::{SortColumn, ViewMode};
use crate::playlist::BACKUP_FILE_NAME;

use super::model::{App, PlaybackState, PromptKind, RowKind, View};

const SORT_ORDER: [SortColumn; 5] = [
    SortColumn::Title,
    SortColumn::Artist,
    SortColumn::Album,
    SortColumn::Duration,
    SortColumn::Created,
];

/// `~/x` -> `$HOME/x`; anything else unchanged.
pub(crate) fn expand_path(input: &str) -> PathBuf {
    let input = input.trim();
    if let Some(rest) = input.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(rest);
    }
    PathBuf::from(input)
}

impl App {
    fn selected_track_or_status(&mut self) -> Option<PathBuf> {
        let path = self.selected_path();
        if path.is_none() {
            self.set_status("No track selected");
        }
        path
    }

    fn selected_playlist_name(&self) -> Option<String> {
        if self.view != View::Playlists {
            return None;
        }
        if let Some(open) = &self.open_playlist {
            return Some(open.clone());
        }
        match self.selected_row()?.kind {
            RowKind::Playlist(name) => Some(name),
            RowKind::Track(_) => None,
        }
    }

    // queue

    pub fn add_selected_to_queue(&mut self) {
        if let Some(RowKind::Playlist(name)) = self.selected_row().map(|r| r.kind) {
            let tracks = self
                .playlists
                .get(&name)
                .map(|p| p.tracks.clone())
                .unwrap_or_default();
            let n = tracks.len();
            self.queue.add_multiple(tracks);
            self.set_status(format!("Queued {n} tracks from '{name}'"));
            return;
        }
        let Some(path) = self.selected_track_or_status() else {
            return;
        };
        let label = self.label_for(&path);
        self.queue.add(path);
        self.set_status(format!("Queued: {label}"));
    }

    pub fn play_selected_next(&mut self) {
        let Some(path) = self.selected_track_or_status() else {
            return;
        };
        let label = self.label_for(&path);
        self.queue.add_next(path);
        self.set_status(format!("Playing next: {label}"));
    }

    /// `d`: remove from whatever list the row belongs to.
    pub fn remove_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        match (self.view, &row.kind) {
            (View::Queue, _) => {
                let was_current = self.queue.current_index() == Some(row.source);
                self.queue.remove(row.source);
                if was_current && self.playback != PlaybackState::Stopped {
                    self.stop();
                }
            }
            (View::Playlists, RowKind::Playlist(name)) => {
                let name = name.clone();
                let result = self.playlists.delete(&name);
                if let Some(true) = self.report("Deleting playlist", result) {
                    self.set_status(format!("Deleted playlist '{name}'"));
                }
            }
            (View::Playlists, RowKind::Track(path)) => {
                let Some(name) = self.open_playlist.clone() else {
                    return;
                };
                let result = self.playlists.remove_track_from(&name, path);
                self.report("Removing from playlist", result);
            }
            (View::Favorites, RowKind::Track(path)) => {
                let result = self.settings.remove_favorite(path);
                self.report("Removing favorite", result);
            }
            (View::Recent, RowKind::Track(path)) => {
                let path = path.clone();
                let result = self.settings.update(|s| s.recently_played.retain(|p| p != &path));
                self.report("Updating recently played", result);
            }
            _ => self.set_status("Nothing to remove here"),
        }
        self.clamp_selection();
    }

    /// `J`/`K`: move the selected queue or playlist entry.
    pub fn move_selected(&mut self, down: bool) {
        if !self.filter_query.trim().is_empty() {
            self.set_status("Clear the filter to reorder");
            return;
        }
        let Some(row) = self.selected_row() else {
            return;
        };
        let from = row.source;
        let Some(to) = (if down { from.checked_add(1) } else { from.checked_sub(1) }) else {
            return;
        };

        let moved = match self.view {
            View::Queue => self.queue.move_track(from, to),
            View::Playlists => match self.open_playlist.clone() {
                Some(name) => {
                    let result = self.playlists.move_track_in(&name, from, to);
                    self.report("Moving playlist entry", result).unwrap_or(false)
                }
                None => false,
            },
            _ => false,
        };
        if moved {
            self.selected = to;
        }
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.stop();
        self.clamp_selection();
        self.set_status("Queue cleared");
    }

    pub fn clear_upcoming(&mut self) {
        self.queue.clear_upcoming();
        self.clamp_selection();
        self.set_status("Upcoming tracks cleared");
    }

    pub fn shuffle_remaining(&mut self) {
        self.queue.shuffle_remaining();
        self.set_status("Remaining tracks shuffled");
    }

    pub fn clear_recently_played(&mut self) {
        let result = self.settings.clear_recently_played();
        if self.report("Clearing recently played", result).is_some() {
            self.set_status("Recently played cleared");
        }
        self.clamp_selection();
    }

    // favorites

    pub fn toggle_favorite(&mut self) {
        let Some(path) = self.selected_track_or_status() else {
            return;
        };
        let result = self.settings.toggle_favorite(&path);
        if let Some(on) = self.report("Updating favorites", result) {
            let label = self.label_for(&path);
            self.set_status(if on {
                format!("Added to favorites: {label}")
            } else {
                format!("Removed from favorites: {label}")
            });
        }
        if self.view == View::Favorites {
            self.clamp_selection();
        }
    }

    // playlists

    pub fn create_playlist(&mut self, name: &str) {
        let result = self.playlists.create(name);
        if let Some(name) = self.report("Creating playlist", result) {
            self.set_status(format!("Created playlist '{name}'"));
        }
    }

    pub fn add_to_playlist(&mut self, name: &str, path: &Path) {
        let result = self.playlists.add_track_to(name.trim(), path);
        match self.report("Adding to playlist", result) {
            Some(true) => self.set_status(format!("Added to '{}'", name.trim())),
            Some(false) => self.set_status(format!("Already in '{}'", name.trim())),
            None => {}
        }
    }

    pub fn save_queue_as_playlist(&mut self, name: &str) {
        if self.queue.is_empty() {
            self.set_status("Queue is empty");
            return;
        }
        let tracks = self.queue.items().to_vec();
        let result = self.playlists.create_with_tracks(name, tracks);
        if let Some(name) = self.report("Saving queue", result) {
            self.set_status(format!("Queue saved as '{name}'"));
        }
    }

    pub fn rename_playlist(&mut self, old: &str, new: &str) {
        let result = self.playlists.rename(old, new);
        if self.report("Renaming playlist", result).is_some() {
            if self.open_playlist.as_deref() == Some(old) {
                self.open_playlist = Some(new.trim().to_string());
            }
            self.set_status(format!("Renamed '{old}' to '{}'", new.trim()));
        }
    }

    pub fn export_playlist(&mut self, name: &str, target: &Path) {
        let result = self.playlists.export(name, target);
        if let Some(format) = self.report("Exporting playlist", result) {
            self.set_status(format!("Exported '{name}' as {format:?} to {}", target.display()));
        }
    }

    pub fn import_playlist(&mut self, source: &Path) {
        let result = self.playlists.import(source, None);
        if let Some(name) = self.report("Importing playlist", result) {
            let n = self.playlists.get(&name).map_or(0, |p| p.len());
            self.set_status(format!("Imported '{name}' ({n} tracks)"));
        }
    }

    pub fn backup_playlists(&mut self, dir: &Path) {
        let result = self.playlists.export_all(dir);
        if let Some(path) = self.report("Backing up playlists", result) {
            self.set_status(format!("Playlists backed up to {}", path.display()));
        }
    }

    pub fn restore_playlists(&mut self, source: &Path) {
        let result = self.playlists.import_all(source, true);
        if let Some(n) = self.report("Restoring playlists", result) {
            self.set_status(format!("Restored {n} playlists"));
        }
        self.clamp_selection();
    }

    // library

    pub fn add_folder(&mut self, folder: &Path) {
        let result = self.library.add_folder(folder);
        match self.report("Adding folder", result) {
            Some(_) if !folder.is_dir() => {
                self.set_status(format!("{} is not a folder", folder.display()))
            }
            Some(n) => self.set_status(format!("Added {n} tracks from {}", folder.display())),
            None => {}
        }
    }

    pub fn remove_folder(&mut self, folder: &Path) {
        let result = self.library.remove_folder(folder);
        match self.report("Removing folder", result) {
            Some(true) => self.set_status(format!("Removed {}", folder.display())),
            Some(false) => self.set_status(format!("{} is not a library folder", folder.display())),
            None => {}
        }
        self.clamp_selection();
    }

    pub fn rescan_library(&mut self) {
        let result = self.library.refresh();
        if let Some(n) = self.report("Rescanning library", result) {
            self.set_status(format!("Library rescanned: {n} tracks"));
        }
        self.clamp_selection();
    }

    pub fn remove_missing(&mut self) {
        let result = self.library.remove_missing();
        if let Some(n) = self.report("Removing missing tracks", result) {
            self.set_status(format!("Removed {n} missing tracks"));
        }
        self.clamp_selection();
    }

    /// Parse `Title | Artist | Album` and write it to the file.
    pub fn edit_tags(&mut self, path: &Path, input: &str) {
        let mut parts = input.splitn(3, '|').map(str::trim);
        let title = parts.next().unwrap_or_default();
        let artist = parts.next().unwrap_or_default();
        let album = parts.next().unwrap_or_default();
        if title.is_empty() {
            self.set_status("Title must not be empty");
            return;
        }
        let result = self.library.update_tags(path, title, artist, album);
        if self.report("Editing tags", result).is_some() {
            self.set_status(format!("Tags saved for {title}"));
        }
    }

    pub fn cycle_sort(&mut self) {
        let s = self.settings.settings();
        let pos = SORT_ORDER
            .iter()
            .position(|c| *c == s.library_sort_column)
            .unwrap_or(0);
        // title asc, title desc, artist asc, ...
        let (column, reverse) = if s.library_sort_reverse {
            (SORT_ORDER[(pos + 1) % SORT_ORDER.len()], false)
        } else {
            (s.library_sort_column, true)
        };
        let result = self.settings.update(|s| {
            s.library_sort_column = column;
            s.library_sort_reverse = reverse;
        });
        self.report("Saving sort order", result);
        let dir = if reverse { "descending" } else { "ascending" };
        self.set_status(format!("Sorted by {column:?}, {dir}"));
    }

    pub fn toggle_view_mode(&mut self) {
        let mode = match self.settings.settings().library_view_mode {
            ViewMode::List => ViewMode::Folder,
            ViewMode::Folder => ViewMode::List,
        };
        let result = self.settings.update(|s| s.library_view_mode = mode);
        self.report("Saving view mode", result);
        self.set_status(format!("Library view: {mode:?}"));
    }

    pub fn toggle_auto_rescan(&mut self) {
        let on = !self.settings.settings().auto_rescan;
        let result = self.settings.update(|s| s.auto_rescan = on);
        self.report("Saving auto rescan", result);
        let every = self.settings.settings().auto_rescan_interval;
        self.set_status(if on {
            format!("Auto rescan every {every} min")
        } else {
            "Auto rescan off".to_string()
        });
    }

    // appearance and settings

    pub fn cycle_theme(&mut self) {
        let theme = self.settings.settings().theme.next();
        let result = self.settings.update(|s| s.theme = theme);
        self.report("Saving theme", result);
        self.set_status(format!("Theme: {}", theme.label()));
    }

    pub fn export_settings(&mut self, target: &Path) {
        let result = self.settings.export(target);
        if self.report("Exporting settings", result).is_some() {
            self.set_status(format!("Settings exported to {}", target.display()));
        }
    }

    pub fn import_settings(&mut self, source: &Path) {
        let result = self.settings.import(source);
        if self.report("Importing settings", result).is_some() {
            let s = self.settings.settings().clone();
            self.queue.set_repeat(s.repeat);
            self.queue.set_shuffle(s.shuffle);
            self.muted_from = None;
            self.send(AudioCmd::SetVolume(s.volume));
            self.send(AudioCmd::SetSpeed(s.playback_speed));
            self.send(AudioCmd::SetCrossfade(Duration::from_secs_f32(
                s.crossfade_seconds,
            )));
            self.set_status(format!("Settings imported from {}", source.display()));
        }
    }

    // prompts

    /// Open the prompt for a key, filling in sensible defaults.
    pub fn begin(&mut self, kind: PromptKind) {
        let initial = match &kind {
            PromptKind::RenamePlaylist(old) => old.clone(),
            PromptKind::ExportPlaylist(name) => self
                .data_dir
                .join(format!("{name}.m3u"))
                .display()
                .to_string(),
            PromptKind::BackupPlaylists => self.data_dir.display().to_string(),
            PromptKind::RestorePlaylists => self
                .data_dir
                .join(BACKUP_FILE_NAME)
                .display()
                .to_string(),
            PromptKind::EditTags(path) => {
                let t = self.track_for(path);
                format!("{} | {} | {}", t.title, t.artist, t.album)
            }
            PromptKind::RemoveFolder => self
                .library
                .folders()
                .first()
                .map(|f| f.display().to_string())
                .unwrap_or_default(),
            _ => String::new(),
        };
        self.open_prompt(kind, initial);
    }

    /// Prompt shortcuts that need a selected playlist.
    pub fn begin_for_playlist(&mut self, make: fn(String) -> PromptKind) {
        match self.selected_playlist_name() {
            Some(name) => self.begin(make(name)),
            None => self.set_status("Select a playlist first"),
        }
    }

    /// Prompt shortcuts that need a selected track.
    pub fn begin_for_track(&mut self, make: fn(PathBuf) -> PromptKind) {
        if let Some(path) = self.selected_track_or_status() {
            self.begin(make(path));
        }
    }

    /// `L`: change, set or remove the password.
    pub fn begin_password_change(&mut self) {
        if self.auth.is_password_set() {
            self.begin(PromptKind::CurrentPassword);
        } else {
            self.begin(PromptKind::NewPassword);
        }
    }

    pub fn submit_prompt(&mut self) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        let input = prompt.input;
        let text = input.trim();

        match prompt.kind {
            PromptKind::CurrentPassword => {
                if self.auth.verify_password(&input) {
                    self.begin(PromptKind::NewPassword);
                } else {
                    tracing::warn!("wrong password on password change");
                    self.set_status("Wrong password");
                }
                return;
            }
            PromptKind::NewPassword => {
                if input.is_empty() {
                    let result = self.auth.remove_password();
                    if self.report("Removing password", result).is_some() {
                        self.set_status("Password removed");
                    }
                } else {
                    let result = self.auth.set_password(&input);
                    if self.report("Setting password", result).is_some() {
                        self.set_status("Password set");
                    }
                }
                return;
            }
            _ => {}
        }

        if text.is_empty() {
            self.set_status("Cancelled");
            return;
        }

        match prompt.kind {
            PromptKind::NewPlaylist => self.create_playlist(text),
            PromptKind::AddToPlaylist(path) => self.add_to_playlist(text, &path),
            PromptKind::SaveQueueAs => self.save_queue_as_playlist(text),
            PromptKind::RenamePlaylist(old) => self.rename_playlist(&old, text),
            PromptKind::ExportPlaylist(name) => self.export_playlist(&name, &expand_path(text)),
            PromptKind::ImportPlaylist => self.import_playlist(&expand_path(text)),
            PromptKind::BackupPlaylists => self.backup_playlists(&expand_path(text)),
            PromptKind::RestorePlaylists => self.restore_playlists(&expand_path(text)),
            PromptKind::AddFolder => self.add_folder(&expand_path(text)),
            PromptKind::RemoveFolder => self.remove_folder(&expand_path(text)),
            PromptKind::EditTags(path) => self.edit_tags(&path, text),
            PromptKind::ExportSettings => self.export_settings(&expand_path(text)),
            PromptKind::ImportSettings => self.import_settings(&expand_path(text)),
            PromptKind::CurrentPassword | PromptKind::NewPassword => {}
        }
    }
}
