use ratatui::style::{Color, Modifier, Style};

use cyber_drill::GameSettings;

/// Palette derived from the presentation settings.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub fg: Color,
    pub bg: Color,
    pub muted: Color,
    pub accent: Color,
    pub good: Color,
    pub bad: Color,
    pub warn: Color,
    pub info: Color,
    bold: bool,
}

impl Theme {
    pub fn from_settings(settings: &GameSettings) -> Self {
        let accent = match settings.accent.as_str() {
            "green" => Color::Green,
            "dark-blue" => Color::Rgb(30, 64, 175),
            _ => Color::Blue,
        };

        if settings.high_contrast {
            let (fg, bg) = if settings.is_light() {
                (Color::Black, Color::White)
            } else {
                (Color::White, Color::Black)
            };
            return Self {
                fg,
                bg,
                muted: fg,
                accent: Color::Yellow,
                good: Color::LightGreen,
                bad: Color::LightRed,
                warn: Color::Yellow,
                info: Color::LightCyan,
                bold: true,
            };
        }

        if settings.is_light() {
            Self {
                fg: Color::Black,
                bg: Color::White,
                muted: Color::Gray,
                accent,
                good: Color::Green,
                bad: Color::Red,
                warn: Color::Rgb(180, 110, 0),
                info: Color::Blue,
                bold: false,
            }
        } else {
            Self {
                fg: Color::White,
                bg: Color::Reset,
                muted: Color::DarkGray,
                accent,
                good: Color::Green,
                bad: Color::Red,
                warn: Color::Yellow,
                info: Color::Cyan,
                bold: false,
            }
        }
    }

    pub fn text(&self) -> Style {
        self.apply(Style::default().fg(self.fg).bg(self.bg))
    }

    pub fn fg(&self, color: Color) -> Style {
        self.apply(Style::default().fg(color))
    }

    /// Inverted banner style for titles and the selected menu item.
    pub fn highlight(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    fn apply(&self, style: Style) -> Style {
        if self.bold {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }
}
