use ratatui::style::{Color, Modifier, Style};

pub struct Palette;

impl Palette {
    pub const CYAN: Color = Color::Rgb(0, 217, 255);
    pub const PURPLE: Color = Color::Rgb(167, 139, 250);
    pub const AMBER: Color = Color::Rgb(245, 158, 11);
    pub const RED: Color = Color::Rgb(239, 68, 68);
    pub const GRAY: Color = Color::Rgb(107, 114, 128);
    pub const DARK_GRAY: Color = Color::Rgb(55, 65, 81);
    pub const WHITE: Color = Color::Rgb(255, 255, 255);
    pub const OFF_WHITE: Color = Color::Rgb(184, 184, 184);
    /// Background of the code regions, close to the highlighting theme's.
    pub const CODE_BG: Color = Color::Rgb(43, 48, 59);
}

pub struct BoxChars;

impl BoxChars {
    pub const ROUND_TOP_LEFT: &'static str = "╭";
    pub const ROUND_BOTTOM_LEFT: &'static str = "╰";
    pub const ROUND_BOTTOM_RIGHT: &'static str = "╯";
    pub const VERTICAL: &'static str = "│";
    pub const DOT: &'static str = "•";
    pub const ARROW_RIGHT: &'static str = "❯";
}

pub struct Spinners;

impl Spinners {
    pub const BRAILLE: &'static [&'static str] =
        &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
}

pub struct Theme;

impl Theme {
    #[must_use]
    pub const fn primary() -> Style {
        Style::new().fg(Palette::CYAN)
    }
    #[must_use]
    pub const fn secondary() -> Style {
        Style::new().fg(Palette::PURPLE)
    }
    #[must_use]
    pub const fn warning() -> Style {
        Style::new().fg(Palette::AMBER)
    }
    #[must_use]
    pub const fn error() -> Style {
        Style::new().fg(Palette::RED)
    }

    #[must_use]
    pub const fn muted() -> Style {
        Style::new().fg(Palette::GRAY)
    }

    #[must_use]
    pub const fn border() -> Style {
        Style::new().fg(Palette::DARK_GRAY)
    }

    #[must_use]
    pub const fn white() -> Style {
        Style::new().fg(Palette::WHITE)
    }

    #[must_use]
    pub const fn off_white() -> Style {
        Style::new().fg(Palette::OFF_WHITE)
    }

    #[must_use]
    pub const fn primary_bold() -> Style {
        Style::new()
            .fg(Palette::CYAN)
            .add_modifier(Modifier::BOLD)
    }

    /// Text the user typed.
    #[must_use]
    pub const fn user() -> Style {
        Style::new().fg(Palette::WHITE).add_modifier(Modifier::BOLD)
    }

    /// The `[N]` label that `/run N` refers to.
    #[must_use]
    pub const fn code_label() -> Style {
        Style::new()
            .fg(Palette::AMBER)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub const fn code_gutter() -> Style {
        Style::new().fg(Palette::DARK_GRAY).bg(Palette::CODE_BG)
    }

    /// Captured stdout of a command.
    #[must_use]
    pub const fn output() -> Style {
        Style::new().fg(Palette::OFF_WHITE)
    }
}
