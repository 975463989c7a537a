//! Application model: stores, views, selection and transient UI state.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::audio::{AudioCmd, PlaybackHandle, SleepTimer};
use crate::auth::Auth;
use crate::config::{ControlsConfig, LibraryConfig, UiConfig};
use crate::error::Result;
use crate::library::{Library, Track, display_from_fields};
use crate::playlist::PlaylistManager;
use crate::queue::PlayQueue;
use crate::settings::SettingsManager;

use super::filter;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// The tab shown in the main list.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Library,
    Queue,
    Playlists,
    Favorites,
    Recent,
    Duplicates,
    Missing,
}

impl View {
    pub const ALL: [View; 7] = [
        View::Library,
        View::Queue,
        View::Playlists,
        View::Favorites,
        View::Recent,
        View::Duplicates,
        View::Missing,
    ];

    pub fn title(self) -> &'static str {
        match self {
            View::Library => "Library",
            View::Queue => "Queue",
            View::Playlists => "Playlists",
            View::Favorites => "Favorites",
            View::Recent => "Recent",
            View::Duplicates => "Duplicates",
            View::Missing => "Missing",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowKind {
    Track(PathBuf),
    Playlist(String),
}

/// One line of the main list. `source` indexes the list the row came from
/// (queue position, playlist position, ...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub kind: RowKind,
    pub label: String,
    pub source: usize,
}

impl Row {
    pub fn path(&self) -> Option<&Path> {
        match &self.kind {
            RowKind::Track(p) => Some(p),
            RowKind::Playlist(_) => None,
        }
    }
}

/// What a text prompt is collecting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptKind {
    NewPlaylist,
    AddToPlaylist(PathBuf),
    SaveQueueAs,
    RenamePlaylist(String),
    ExportPlaylist(String),
    ImportPlaylist,
    BackupPlaylists,
    RestorePlaylists,
    AddFolder,
    RemoveFolder,
    EditTags(PathBuf),
    ExportSettings,
    ImportSettings,
    CurrentPassword,
    NewPassword,
}

impl PromptKind {
    pub fn title(&self) -> String {
        match self {
            PromptKind::NewPlaylist => "New playlist name".into(),
            PromptKind::AddToPlaylist(_) => "Add to playlist (name)".into(),
            PromptKind::SaveQueueAs => "Save queue as playlist".into(),
            PromptKind::RenamePlaylist(old) => format!("Rename '{old}' to"),
            PromptKind::ExportPlaylist(name) => format!("Export '{name}' to (.m3u / .pls)"),
            PromptKind::ImportPlaylist => "Import playlist file".into(),
            PromptKind::BackupPlaylists => "Back up playlists into directory".into(),
            PromptKind::RestorePlaylists => "Restore playlists from backup file".into(),
            PromptKind::AddFolder => "Add music folder".into(),
            PromptKind::RemoveFolder => "Remove music folder".into(),
            PromptKind::EditTags(_) => "Title | Artist | Album".into(),
            PromptKind::ExportSettings => "Export settings to".into(),
            PromptKind::ImportSettings => "Import settings from".into(),
            PromptKind::CurrentPassword => "Current password".into(),
            PromptKind::NewPassword => "New password (empty removes it)".into(),
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, PromptKind::CurrentPassword | PromptKind::NewPassword)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

/// The stores the controller works on.
pub struct Stores {
    pub library: Library,
    pub playlists: PlaylistManager,
    pub settings: SettingsManager,
    pub auth: Auth,
}

impl Stores {
    pub const LIBRARY_FILE: &'static str = "library.json";
    pub const PLAYLISTS_FILE: &'static str = "playlists.json";
    pub const SETTINGS_FILE: &'static str = "settings.json";
    pub const AUTH_FILE: &'static str = "auth.json";

    pub fn open(data_dir: &Path, scan_config: LibraryConfig) -> Self {
        Self {
            library: Library::open(data_dir.join(Self::LIBRARY_FILE), scan_config),
            playlists: PlaylistManager::open(data_dir.join(Self::PLAYLISTS_FILE)),
            settings: SettingsManager::open(data_dir.join(Self::SETTINGS_FILE)),
            auth: Auth::open(data_dir.join(Self::AUTH_FILE)),
        }
    }
}

/// The main application model.
pub struct App {
    pub library: Library,
    pub playlists: PlaylistManager,
    pub settings: SettingsManager,
    pub auth: Auth,
    pub queue: PlayQueue,

    pub ui: UiConfig,
    pub controls: ControlsConfig,
    pub data_dir: PathBuf,

    pub view: View,
    /// Position within the visible (filtered) rows.
    pub selected: usize,
    /// Playlist drilled into from the Playlists view.
    pub open_playlist: Option<String>,

    pub filter_mode: bool,
    pub filter_query: String,
    pub prompt: Option<Prompt>,
    pub status: Option<String>,
    pub help_window: bool,
    pub metadata_window: bool,

    pub playback: PlaybackState,
    pub playback_handle: Option<PlaybackHandle>,
    /// Volume to restore when unmuting.
    pub muted_from: Option<f32>,
    pub sleep_timer: SleepTimer,
    pub last_rescan: Instant,
    pub quit_requested: bool,

    audio_out: Vec<AudioCmd>,
}

impl App {
    pub fn new(stores: Stores, ui: UiConfig, controls: ControlsConfig, data_dir: PathBuf) -> Self {
        let mut queue = PlayQueue::new();
        let s = stores.settings.settings();
        queue.set_repeat(s.repeat);
        queue.set_shuffle(s.shuffle);

        Self {
            library: stores.library,
            playlists: stores.playlists,
            settings: stores.settings,
            auth: stores.auth,
            queue,
            ui,
            controls,
            data_dir,
            view: View::Library,
            selected: 0,
            open_playlist: None,
            filter_mode: false,
            filter_query: String::new(),
            prompt: None,
            status: None,
            help_window: false,
            metadata_window: false,
            playback: PlaybackState::Stopped,
            playback_handle: None,
            muted_from: None,
            sleep_timer: SleepTimer::default(),
            last_rescan: Instant::now(),
            quit_requested: false,
            audio_out: Vec::new(),
        }
    }

    /// Attach a `PlaybackHandle` used to observe playback progress.
    pub fn set_playback_handle(&mut self, h: PlaybackHandle) {
        self.playback_handle = Some(h);
    }

    pub(crate) fn send(&mut self, cmd: AudioCmd) {
        self.audio_out.push(cmd);
    }

    /// Drain the audio commands produced since the last call.
    pub fn take_audio_commands(&mut self) -> Vec<AudioCmd> {
        std::mem::take(&mut self.audio_out)
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    /// Log a failed operation and show it on the status line.
    pub(crate) fn report<T>(&mut self, what: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::error!(error = %e, "{what} failed");
                self.set_status(format!("{what} failed: {e}"));
                None
            }
        }
    }

    /// Position reported by the audio thread.
    pub fn elapsed(&self) -> Duration {
        self.playback_handle
            .as_ref()
            .and_then(|h| h.lock().ok().map(|info| info.elapsed))
            .unwrap_or_default()
    }

    /// Length of the loaded track: decoder's value, else the library record's.
    pub fn current_duration(&self) -> Option<Duration> {
        let from_decoder = self
            .playback_handle
            .as_ref()
            .and_then(|h| h.lock().ok().and_then(|info| info.duration));
        from_decoder.or_else(|| {
            self.queue
                .current()
                .and_then(|p| self.library.track_by_path(p))
                .map(|t| t.duration)
                .filter(|d| !d.is_zero())
        })
    }

    /// Library record for `path`, or a placeholder built from the file name.
    pub fn track_for(&self, path: &Path) -> Track {
        self.library
            .track_by_path(path)
            .cloned()
            .unwrap_or_else(|| Track::placeholder(path))
    }

    pub fn label_for(&self, path: &Path) -> String {
        let track = self.track_for(path);
        display_from_fields(&track, &self.ui.list_fields, &self.ui.list_separator)
    }

    fn track_rows<'a, I>(&self, paths: I) -> Vec<Row>
    where
        I: IntoIterator<Item = &'a Path>,
    {
        paths
            .into_iter()
            .enumerate()
            .map(|(source, p)| Row {
                kind: RowKind::Track(p.to_path_buf()),
                label: self.label_for(p),
                source,
            })
            .collect()
    }

    /// All rows of the current view before filtering.
    pub fn rows(&self) -> Vec<Row> {
        match self.view {
            View::Library => {
                let s = self.settings.settings();
                let tracks = self.library.tracks();
                self.library
                    .sorted_indices(s.library_sort_column, s.library_sort_reverse, s.library_view_mode)
                    .into_iter()
                    .map(|i| Row {
                        kind: RowKind::Track(tracks[i].path.clone()),
                        label: display_from_fields(
                            &tracks[i],
                            &self.ui.list_fields,
                            &self.ui.list_separator,
                        ),
                        source: i,
                    })
                    .collect()
            }
            View::Queue => self.track_rows(self.queue.items().iter().map(PathBuf::as_path)),
            View::Playlists => match self.open_playlist.as_deref().and_then(|n| self.playlists.get(n)) {
                Some(p) => self.track_rows(p.tracks.iter().map(PathBuf::as_path)),
                None => self
                    .playlists
                    .all()
                    .iter()
                    .enumerate()
                    .map(|(source, p)| Row {
                        kind: RowKind::Playlist(p.name.clone()),
                        label: format!("{} ({})", p.name, p.len()),
                        source,
                    })
                    .collect(),
            },
            View::Favorites => {
                self.track_rows(self.settings.favorites().iter().map(PathBuf::as_path))
            }
            View::Recent => {
                self.track_rows(self.settings.recently_played().iter().map(PathBuf::as_path))
            }
            View::Duplicates => {
                let groups = self.library.find_duplicates();
                self.track_rows(groups.iter().flatten().map(|t| t.path.as_path()))
            }
            View::Missing => {
                let missing = self.library.find_missing();
                self.track_rows(missing.iter().map(|t| t.path.as_path()))
            }
        }
    }

    /// Rows of the current view that pass the filter.
    pub fn visible_rows(&self) -> Vec<Row> {
        let rows = self.rows();
        if self.filter_query.trim().is_empty() {
            return rows;
        }
        rows.into_iter()
            .filter(|r| filter::matches(&r.label, &self.filter_query))
            .collect()
    }

    pub fn selected_row(&self) -> Option<Row> {
        self.visible_rows().into_iter().nth(self.selected)
    }

    pub fn selected_path(&self) -> Option<PathBuf> {
        self.selected_row()
            .and_then(|r| r.path().map(Path::to_path_buf))
    }

    /// Keep `selected` inside the visible rows.
    pub fn clamp_selection(&mut self) {
        let len = self.visible_rows().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    /// Move selection to the next visible row, wrapping to the first.
    pub fn next(&mut self) {
        let len = self.visible_rows().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Move selection to the previous visible row, wrapping to the last.
    pub fn prev(&mut self) {
        let len = self.visible_rows().len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.visible_rows().len().saturating_sub(1);
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
        self.open_playlist = None;
        self.filter_query.clear();
        self.filter_mode = false;
        self.selected = 0;
    }

    pub fn next_view(&mut self) {
        self.set_view(self.view.next());
    }

    pub fn prev_view(&mut self) {
        self.set_view(self.view.prev());
    }

    /// Leave an opened playlist back to the playlist list.
    pub fn leave_playlist(&mut self) {
        if self.view == View::Playlists
            && let Some(name) = self.open_playlist.take()
        {
            self.filter_query.clear();
            let pos = self
                .playlists
                .all()
                .iter()
                .position(|p| p.name == name)
                .unwrap_or(0);
            self.selected = pos;
        }
    }

    pub fn toggle_help_window(&mut self) {
        self.help_window = !self.help_window;
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    /// Enter filter mode: keystrokes go to the filter query.
    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
        self.clamp_selection();
    }

    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }

    /// Clear the active filter and leave filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.clamp_selection();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.selected = 0;
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.clamp_selection();
    }

    pub fn open_prompt(&mut self, kind: PromptKind, initial: impl Into<String>) {
        self.prompt = Some(Prompt {
            kind,
            input: initial.into(),
        });
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
    }

    pub fn prompt_push(&mut self, c: char) {
        if let Some(p) = self.prompt.as_mut() {
            p.input.push(c);
        }
    }

    pub fn prompt_pop(&mut self) {
        if let Some(p) = self.prompt.as_mut() {
            p.input.pop();
        }
    }
}
