use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, PromptKind, View};
use crate::audio::{AudioEvent, AudioPlayer};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal event loop: forwards audio events, runs periodic work,
/// draws, and handles input. Returns `Ok(())` when quit is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    audio_player: &AudioPlayer,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Some(ev) = audio_player.try_event() {
            handle_audio_event(app, ev);
        }

        app.tick(Instant::now());
        flush_audio(app, audio_player);

        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            handle_key(app, state, key);
            flush_audio(app, audio_player);
        }

        if app.quit_requested {
            return Ok(());
        }
    }
}

/// Send everything the controller queued up to the audio thread.
pub fn flush_audio(app: &mut App, audio_player: &AudioPlayer) {
    for cmd in app.take_audio_commands() {
        if audio_player.send(cmd).is_err() {
            tracing::warn!("audio thread is gone, dropping command");
        }
    }
}

pub fn handle_audio_event(app: &mut App, ev: AudioEvent) {
    match ev {
        AudioEvent::TrackEnded(path) => app.on_track_ended(&path),
        AudioEvent::LoadFailed { path, reason } => {
            tracing::warn!(path = %path.display(), %reason, "could not load track");
            app.on_load_failed(&path, &reason);
        }
        AudioEvent::OutputUnavailable(reason) => app.on_output_unavailable(&reason),
    }
}

/// Apply one key press to `app`.
pub fn handle_key(app: &mut App, state: &mut EventLoopState, key: KeyEvent) {
    if app.prompt.is_some() {
        state.pending_gg = false;
        handle_prompt_key(app, key);
        return;
    }
    if app.filter_mode {
        state.pending_gg = false;
        handle_filter_key(app, key);
        return;
    }
    if app.help_window {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q')
        ) {
            app.toggle_help_window();
        }
        return;
    }

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    let step = app.controls.volume_step as i32;
    let seek = app.controls.seek_seconds.min(i64::MAX as u64) as i64;

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => app.quit_requested = true,
            KeyCode::Char('q') => app.clear_queue(),
            KeyCode::Char('s') => app.shuffle_remaining(),
            KeyCode::Char('e') => app.begin(PromptKind::ExportSettings),
            KeyCode::Char('r') => app.begin(PromptKind::ImportSettings),
            KeyCode::Left => app.previous(),
            KeyCode::Right => app.next_track(),
            KeyCode::Up => app.change_volume(step),
            KeyCode::Down => app.change_volume(-step),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit_requested = true,
        KeyCode::Char(' ') | KeyCode::Char('p') => app.toggle_play(),
        KeyCode::Char('x') => app.stop(),
        KeyCode::Left => app.seek_relative(-seek),
        KeyCode::Right => app.seek_relative(seek),
        KeyCode::Char('h') => app.previous(),
        KeyCode::Char('l') => app.next_track(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.change_volume(step),
        KeyCode::Char('-') => app.change_volume(-step),
        KeyCode::Char('m') => app.toggle_mute(),
        KeyCode::F(1) | KeyCode::Char('?') => app.toggle_help_window(),
        KeyCode::Char('s') => app.toggle_shuffle(),
        KeyCode::Char('r') => app.cycle_repeat(),

        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => app.select_last(),
        KeyCode::Tab => app.next_view(),
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Enter => app.activate_selected(),
        KeyCode::Esc | KeyCode::Backspace => {
            if app.metadata_window {
                app.toggle_metadata_window();
            } else if !app.filter_query.is_empty() {
                app.clear_filter();
            } else {
                app.leave_playlist();
            }
        }
        KeyCode::Char('/') => app.enter_filter_mode(),

        KeyCode::Char('a') => app.add_selected_to_queue(),
        KeyCode::Char('n') => app.play_selected_next(),
        KeyCode::Char('d') => app.remove_selected(),
        KeyCode::Char('J') => app.move_selected(true),
        KeyCode::Char('K') => app.move_selected(false),
        KeyCode::Char('c') if app.view == View::Recent => app.clear_recently_played(),
        KeyCode::Char('c') => app.clear_upcoming(),
        KeyCode::Char('f') => app.toggle_favorite(),
        KeyCode::Char('i') => app.toggle_metadata_window(),

        KeyCode::Char('N') => app.begin(PromptKind::NewPlaylist),
        KeyCode::Char('P') => app.begin_for_track(PromptKind::AddToPlaylist),
        KeyCode::Char('w') => app.begin(PromptKind::SaveQueueAs),
        KeyCode::Char('R') => app.begin_for_playlist(PromptKind::RenamePlaylist),
        KeyCode::Char('e') => app.begin_for_playlist(PromptKind::ExportPlaylist),
        KeyCode::Char('I') => app.begin(PromptKind::ImportPlaylist),
        KeyCode::Char('b') => app.begin(PromptKind::BackupPlaylists),
        KeyCode::Char('B') => app.begin(PromptKind::RestorePlaylists),

        KeyCode::Char('o') => app.begin(PromptKind::AddFolder),
        KeyCode::Char('O') => app.begin(PromptKind::RemoveFolder),
        KeyCode::Char('u') => app.rescan_library(),
        KeyCode::Char('M') => app.remove_missing(),
        KeyCode::Char('E') => app.begin_for_track(PromptKind::EditTags),
        KeyCode::Char('S') => app.cycle_sort(),
        KeyCode::Char('v') => app.toggle_view_mode(),
        KeyCode::Char('A') => app.toggle_auto_rescan(),

        KeyCode::Char('t') => app.cycle_theme(),
        KeyCode::Char('z') => app.cycle_sleep_timer(),
        KeyCode::Char('L') => app.begin_password_change(),
        _ => {}
    }
}

fn handle_prompt_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_prompt(),
        KeyCode::Enter => app.submit_prompt(),
        KeyCode::Backspace => app.prompt_pop(),
        KeyCode::Char(c) if !c.is_control() && !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.prompt_push(c)
        }
        _ => {}
    }
}

fn handle_filter_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.clear_filter(),
        KeyCode::Backspace => app.pop_filter_char(),
        KeyCode::Char('j') | KeyCode::Char('n') if ctrl => app.next(),
        KeyCode::Char('k') | KeyCode::Char('p') if ctrl => app.prev(),
        KeyCode::Down => app.next(),
        KeyCode::Up => app.prev(),
        KeyCode::Enter => {
            if app.visible_rows().is_empty() {
                return;
            }
            app.exit_filter_mode();
            app.activate_selected();
        }
        KeyCode::Char(c) if !c.is_control() && !ctrl => app.push_filter_char(c),
        _ => {}
    }
}
