use ratatui::style::{Color, Modifier, Style};

use crate::settings::Theme;

/// Colours used by the renderer for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub selection: Color,
    pub accent: Color,
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        let (bg, fg, selection, accent) = match theme {
            Theme::Light => (0xf5f5f5, 0x000000, 0x0078d4, 0x0078d4),
            Theme::Dark => (0x2b2b2b, 0xffffff, 0x505050, 0x0078d4),
            Theme::Neon => (0x0a0a0a, 0xff00ff, 0x00ffff, 0x00ffff),
            Theme::Retrowave => (0x1a0a2e, 0xff6b9d, 0x5c2d8a, 0xffd93d),
            Theme::Hacker => (0x0d0d0d, 0x00ff00, 0x003300, 0xffbf00),
            Theme::Lava => (0xcc0000, 0xffcc00, 0x660000, 0xffcc00),
            Theme::ElectricLime => (0xccff00, 0x0a0a0a, 0x4a0080, 0x4a0080),
            Theme::Bubblegum => (0xff69b4, 0xffffff, 0x9932cc, 0xffff00),
            Theme::CommanderKeen => (0x0000aa, 0xffff55, 0x5555ff, 0xffffff),
        };
        Self {
            bg: rgb(bg),
            fg: rgb(fg),
            selection: rgb(selection),
            accent: rgb(accent),
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn highlight(&self) -> Style {
        let fg = if self.selection == self.fg { self.bg } else { self.fg };
        Style::default()
            .fg(fg)
            .bg(self.selection)
            .add_modifier(Modifier::BOLD)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.accent).bg(self.bg)
    }

    /// Characters matched by the filter.
    pub fn matched(&self) -> Style {
        self.accent().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }
}
