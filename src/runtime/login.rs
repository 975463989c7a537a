use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::auth::Auth;
use crate::ui::{self, Palette};

pub const MAX_ATTEMPTS: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Pending,
    Unlocked,
    /// Cancelled, or out of attempts.
    Quit,
}

#[derive(Debug, Clone)]
pub struct LoginState {
    input: String,
    attempts_left: u8,
    message: Option<String>,
}

impl Default for LoginState {
    fn default() -> Self {
        Self {
            input: String::new(),
            attempts_left: MAX_ATTEMPTS,
            message: None,
        }
    }
}

impl LoginState {
    pub fn handle_key(&mut self, key: KeyEvent, auth: &mut Auth) -> LoginOutcome {
        match key.code {
            KeyCode::Esc => LoginOutcome::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => LoginOutcome::Quit,
            KeyCode::Backspace => {
                self.input.pop();
                LoginOutcome::Pending
            }
            KeyCode::Enter => {
                if auth.verify_password(&self.input) {
                    tracing::info!("unlocked");
                    return LoginOutcome::Unlocked;
                }
                self.input.clear();
                self.attempts_left = self.attempts_left.saturating_sub(1);
                tracing::warn!(attempts_left = self.attempts_left, "wrong password at login");
                if self.attempts_left == 0 {
                    return LoginOutcome::Quit;
                }
                self.message = Some(format!("Wrong password, {} attempts left", self.attempts_left));
                LoginOutcome::Pending
            }
            KeyCode::Char(c) if !c.is_control() => {
                self.input.push(c);
                LoginOutcome::Pending
            }
            _ => LoginOutcome::Pending,
        }
    }
}

/// Ask for the password until it matches, the user gives up, or the
/// attempts run out. Returns `true` when unlocked.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    auth: &mut Auth,
    palette: &Palette,
) -> std::io::Result<bool> {
    let mut state = LoginState::default();
    loop {
        terminal.draw(|f| {
            ui::draw_login(f, palette, state.input.chars().count(), state.message.as_deref())
        })?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match state.handle_key(key, auth) {
                LoginOutcome::Pending => {}
                LoginOutcome::Unlocked => return Ok(true),
                LoginOutcome::Quit => return Ok(false),
            }
        }
    }
}
