//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

mod theme;

use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Tabs, Wrap},
};

use crate::app::{App, PlaybackState, View, fuzzy_match_positions};
use crate::config::{ControlsConfig, TimeField, UiConfig};
use crate::library::format_mmss;

pub use theme::Palette;

/// Footer keys, in display order. `None` entries are filled from config.
const FOOTER_KEYS: [(&str, Option<&str>); 11] = [
    ("j/k", Some("up/down")),
    ("enter", Some("play/open")),
    ("space", Some("play/pause")),
    ("h/l", Some("prev/next")),
    ("←/→", None),
    ("+/-", None),
    ("tab", Some("view")),
    ("/", Some("filter")),
    ("a", Some("queue")),
    ("?", Some("help")),
    ("q", Some("quit")),
];

/// Every binding, shown in the help popup.
const HELP: &[(&str, &str)] = &[
    ("space / p", "play / pause"),
    ("x", "stop"),
    ("← / →", "seek backward / forward"),
    ("h / l, ctrl-← / ctrl-→", "previous / next track"),
    ("+ / -, ctrl-↑ / ctrl-↓", "volume up / down"),
    ("m", "mute"),
    ("j / k, ↑ / ↓", "move selection"),
    ("gg / G", "top / bottom"),
    ("tab / shift-tab", "next / previous view"),
    ("enter", "play track / open playlist"),
    ("esc / backspace", "leave playlist"),
    ("/", "filter"),
    ("a", "add to queue"),
    ("n", "play next"),
    ("d", "remove (queue, playlist, favorites, recent)"),
    ("J / K", "move entry down / up"),
    ("c", "clear upcoming (recent view: clear history)"),
    ("ctrl-q", "clear queue"),
    ("s / ctrl-s", "shuffle / shuffle remaining"),
    ("r", "repeat mode"),
    ("f", "toggle favorite"),
    ("i", "track details"),
    ("N / P / w", "new playlist / add to playlist / save queue"),
    ("R / e / I", "rename / export / import playlist"),
    ("b / B", "back up / restore playlists"),
    ("o / O / u / M", "add folder / remove folder / rescan / prune missing"),
    ("E", "edit tags"),
    ("S / v / A", "sort / folder view / auto rescan"),
    ("t", "theme"),
    ("z", "sleep timer"),
    ("ctrl-e / ctrl-r", "export / import settings"),
    ("L", "password"),
    ("F1 / ?", "this help"),
    ("q", "quit"),
];

/// Render the controls help text, incorporating seek and volume steps.
fn controls_text(controls: &ControlsConfig) -> String {
    FOOTER_KEYS
        .iter()
        .map(|(key, desc)| match (*key, desc) {
            (_, Some(desc)) => format!("[{key}] {desc}"),
            ("←/→", None) => format!("[{key}] seek -/+{}s", controls.seek_seconds),
            _ => format!("[{key}] volume -/+{}%", controls.volume_step),
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiConfig`.
fn now_playing_time_text(elapsed: Duration, total: Option<Duration>, ui: &UiConfig) -> Option<String> {
    let parts: Vec<String> = ui
        .now_playing_time_fields
        .iter()
        .filter_map(|f| match f {
            TimeField::Elapsed => Some(format_mmss(elapsed)),
            TimeField::Total => total.map(format_mmss),
            TimeField::Remaining => total.map(|t| format!("-{}", format_mmss(t.saturating_sub(elapsed)))),
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Format a duration rounding up partial seconds, showing total seconds.
fn format_duration_mmss_ceil(d: Duration) -> String {
    if d.is_zero() {
        return "-".to_string();
    }
    let mut total_secs = d.as_secs();
    if d.subsec_nanos() > 0 {
        total_secs = total_secs.saturating_add(1);
    }
    format!("{}:{:02} ({}s)", total_secs / 60, total_secs % 60, total_secs)
}

/// First visible row and the selection's offset inside the window,
/// keeping the selection centred when the list is taller than the area.
fn visible_window(total: usize, selected: usize, height: usize) -> (usize, usize, usize) {
    if total <= height || height == 0 {
        return (0, total, selected.min(total.saturating_sub(1)));
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, selected - start)
}

/// Split `label` into spans, styling the characters the filter matched.
fn highlighted<'a>(label: &'a str, query: &str, palette: &Palette) -> Line<'a> {
    let Some(positions) = fuzzy_match_positions(label, query.trim()).filter(|p| !p.is_empty()) else {
        return Line::from(label);
    };
    let mut spans = Vec::new();
    let mut next = positions.into_iter().peekable();
    for (i, ch) in label.chars().enumerate() {
        if next.peek() == Some(&i) {
            next.next();
            spans.push(Span::styled(ch.to_string(), palette.matched()));
        } else {
            spans.push(Span::raw(ch.to_string()));
        }
    }
    Line::from(spans)
}

fn block<'a>(title: impl Into<Line<'a>>, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
        .style(palette.base())
        .border_style(palette.accent())
}

/// Render the entire UI into the provided `frame` using `app` state.
pub fn draw(frame: &mut Frame, app: &App) {
    let palette = Palette::for_theme(app.settings.settings().theme);
    frame.render_widget(Block::default().style(palette.base()), frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_tabs(frame, app, &palette, chunks[0]);
    draw_now_playing(frame, app, &palette, chunks[1]);
    draw_list(frame, app, &palette, chunks[2]);

    let status = status_line(app);
    frame.render_widget(Paragraph::new(status).style(palette.accent()), chunks[3]);

    let footer = Paragraph::new(controls_text(&app.controls))
        .block(block(" controls ", &palette))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);

    if app.metadata_window {
        draw_metadata(frame, app, &palette, chunks[2]);
    }
    if app.help_window {
        draw_help(frame, &palette, frame.area());
    }
    if let Some(prompt) = &app.prompt {
        let input = if prompt.kind.is_secret() {
            "*".repeat(prompt.input.chars().count())
        } else {
            prompt.input.clone()
        };
        draw_input_popup(frame, &palette, &prompt.kind.title(), &input, None);
    }
}

fn draw_tabs(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let mut titles: Vec<String> = View::ALL.iter().map(|v| v.title().to_string()).collect();
    if let (View::Playlists, Some(name)) = (app.view, &app.open_playlist) {
        titles[2] = format!("Playlists › {name}");
    }
    let selected = View::ALL.iter().position(|v| *v == app.view).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .block(
            block(app.ui.header_text.as_str(), palette).title_alignment(Alignment::Center),
        )
        .highlight_style(palette.highlight());
    frame.render_widget(tabs, area);
}

fn draw_now_playing(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(area);

    let elapsed = app.elapsed();
    let total = app.current_duration();
    let (title, ratio) = match app.queue.current() {
        Some(path) if app.playback != PlaybackState::Stopped => {
            let track = app.track_for(path);
            let state = if app.playback == PlaybackState::Paused { "⏸" } else { "▶" };
            let mut text = format!("{state} {} - {}", track.artist, track.title);
            if let Some(time) = now_playing_time_text(elapsed, total, &app.ui) {
                text = format!("{text} [{time}]");
            }
            let ratio = total
                .filter(|t| !t.is_zero())
                .map(|t| (elapsed.as_secs_f64() / t.as_secs_f64()).clamp(0.0, 1.0))
                .unwrap_or(0.0);
            (text, ratio)
        }
        _ => ("■ Stopped".to_string(), 0.0),
    };

    let gauge = Gauge::default()
        .block(block(" now playing ", palette))
        .gauge_style(palette.accent())
        .ratio(ratio)
        .label(title);
    frame.render_widget(gauge, rows[0]);

    let mut flags = vec![
        format!("Vol {}%", (app.volume() * 100.0).round() as u32),
        format!("Shuffle {}", if app.queue.is_shuffle() { "on" } else { "off" }),
        format!("Repeat {}", app.queue.repeat().label()),
    ];
    if app.muted_from.is_some() {
        flags.push("Muted".to_string());
    }
    if let Some(rem) = app.sleep_timer.remaining() {
        flags.push(format!("Sleep {}", format_mmss(rem)));
    }
    let speed = app.settings.settings().playback_speed;
    if (speed - 1.0).abs() > f32::EPSILON {
        flags.push(format!("{speed:.2}x"));
    }
    flags.push(format!("Queue {}", app.queue.len()));
    frame.render_widget(
        Paragraph::new(format!(" {}", flags.join(" • "))).style(palette.base()),
        rows[1],
    );
}

fn draw_list(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let rows = app.visible_rows();
    let total = rows.len();
    let height = area.height.saturating_sub(2) as usize;
    let (start, end, offset) = visible_window(total, app.selected, height);

    let current = app.queue.current_index();
    let items: Vec<ListItem> = rows[start..end]
        .iter()
        .map(|row| {
            let mut line = highlighted(&row.label, &app.filter_query, palette);
            if app.view == View::Queue && Some(row.source) == current {
                line = line.patch_style(palette.accent().add_modifier(Modifier::BOLD));
            }
            if let Some(path) = row.path()
                && app.settings.is_favorite(path)
            {
                line.spans.push(Span::styled(" ♥", palette.accent()));
            }
            ListItem::new(line)
        })
        .collect();

    let mut title = format!(" {} ({total}) ", app.view.title().to_lowercase());
    let q = app.filter_query.trim();
    if app.filter_mode || !q.is_empty() {
        title = format!("{title}/{q} ");
    }

    let list = List::new(items)
        .block(block(title, palette))
        .highlight_style(palette.highlight())
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(offset));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn status_line(app: &App) -> String {
    if app.filter_mode {
        return format!(" filter: {}_  (enter plays, esc clears)", app.filter_query);
    }
    match &app.status {
        Some(msg) => format!(" {msg}"),
        None => format!(
            " {} tracks • {} artists • {} albums • {} folders",
            app.library.len(),
            app.library.artists().len(),
            app.library.albums().len(),
            app.library.folder_structure().len()
        ),
    }
}

fn draw_metadata(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let popup_area = centered_rect_sized(72, 10, area);
    frame.render_widget(Clear, popup_area);

    let meta = match app.selected_path() {
        Some(path) => {
            let track = app.track_for(&path);
            let by_artist = app.library.tracks_by_artist(&track.artist).len();
            let on_album = app.library.tracks_by_album(&track.album).len();
            format!(
                "Title: {}\nArtist: {} ({by_artist} in library)\nAlbum: {} ({on_album} in library)\nDuration: {}\nFavorite: {}\nPath: {}",
                track.title,
                track.artist,
                track.album,
                format_duration_mmss_ceil(track.duration),
                if app.settings.is_favorite(&path) { "yes" } else { "no" },
                track.path.display()
            )
        }
        None => "No track selected".to_string(),
    };
    let paragraph = Paragraph::new(meta)
        .block(block(" details (i closes) ", palette))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

fn draw_help(frame: &mut Frame, palette: &Palette, area: Rect) {
    let height = HELP.len() as u16 + 2;
    let popup_area = centered_rect_sized(70, height, area);
    frame.render_widget(Clear, popup_area);

    let lines: Vec<Line> = HELP
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!("{keys:<24}"), palette.accent()),
                Span::raw(*what),
            ])
        })
        .collect();
    let paragraph = Paragraph::new(lines).block(block(" help (? closes) ", palette));
    frame.render_widget(paragraph, popup_area);
}

fn draw_input_popup(frame: &mut Frame, palette: &Palette, title: &str, input: &str, note: Option<&str>) {
    let popup_area = centered_rect_sized(60, 5, frame.area());
    frame.render_widget(Clear, popup_area);

    let mut lines = vec![Line::from(format!("{input}_"))];
    if let Some(note) = note {
        lines.push(Line::from(Span::styled(note.to_string(), palette.accent())));
    }
    let paragraph = Paragraph::new(lines).block(block(format!(" {title} "), palette));
    frame.render_widget(paragraph, popup_area);
}

/// Password screen shown before the player starts.
pub fn draw_login(frame: &mut Frame, palette: &Palette, typed: usize, message: Option<&str>) {
    frame.render_widget(Block::default().style(palette.base()), frame.area());
    let masked = "*".repeat(typed);
    draw_input_popup(frame, palette, "groove is locked: password (esc quits)", &masked, message);
}
