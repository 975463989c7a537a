use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Stores};
use crate::audio::AudioPlayer;
use crate::logging;
use crate::ui::Palette;

mod config;
mod event_loop;
mod login;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config();
    let data_dir = config.data_dir();

    match logging::init(&data_dir, &config.logging.level) {
        Ok(path) => tracing::info!(log = %path.display(), "groove starting"),
        Err(e) => eprintln!("groove: logging disabled: {e}"),
    }

    let mut stores = Stores::open(&data_dir, config.library.clone());
    tracing::info!(
        data_dir = %data_dir.display(),
        tracks = stores.library.len(),
        playlists = stores.playlists.all().len(),
        "stores loaded"
    );

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        if stores.auth.is_password_set() {
            let palette = Palette::for_theme(stores.settings.settings().theme);
            if !login::run(&mut terminal, &mut stores.auth, &palette)? {
                tracing::info!("login abandoned");
                return Ok(());
            }
        }

        let audio_player = AudioPlayer::new(startup::audio_options(stores.settings.settings(), &config));
        let mut app = App::new(stores, config.ui.clone(), config.controls.clone(), data_dir.clone());
        app.set_playback_handle(audio_player.playback_handle());
        startup::restore_session(&mut app);

        let mut state = event_loop::EventLoopState::default();
        let result = event_loop::run(&mut terminal, &mut app, &audio_player, &mut state);

        let size = terminal.size().ok().map(|s| (s.width, s.height));
        app.save_session(size);
        event_loop::flush_audio(&mut app, &audio_player);
        audio_player.quit_softly(Duration::from_millis(config.audio.quit_fade_out_ms));
        tracing::info!("groove stopped");
        result
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
