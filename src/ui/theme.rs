use std::fmt;
use std::str::FromStr;

use crate::ui::builtin_themes::{find_builtin_theme, ThemeSpec};
use ratatui::style::{Color, Modifier, Style};

/// Which palette the session is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// Label for the header's toggle hint, naming the mode a toggle would switch to.
    pub fn toggle_label(self) -> &'static str {
        match self {
            ThemeMode::Light => "🌙 Dark",
            ThemeMode::Dark => "☀️ Light",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(format!("unknown theme '{other}' (expected 'light' or 'dark')")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,

    // Header
    pub header_style: Style,
    pub header_hint_style: Style,
    pub header_border_style: Style,

    // Transcript
    pub user_label_style: Style,
    pub user_bubble_style: Style,
    pub bot_label_style: Style,
    pub bot_bubble_style: Style,
    pub loading_style: Style,

    // Input area
    pub input_border_style: Style,
    pub input_border_busy_style: Style,
    pub input_title_style: Style,
    pub input_text_style: Style,
    pub placeholder_style: Style,
    pub input_cursor_style: Style,
}

impl Theme {
    /// Palette for `mode`, read from the embedded built-in themes.
    pub fn for_mode(mode: ThemeMode) -> Self {
        let spec = find_builtin_theme(mode.as_str()).unwrap_or_default();
        Self::from_spec(&spec)
    }

    pub fn from_spec(spec: &ThemeSpec) -> Self {
        let background_color = spec
            .background
            .as_deref()
            .and_then(parse_color)
            .unwrap_or(Color::Reset);

        Theme {
            background_color,
            header_style: parse_style(&spec.header),
            header_hint_style: parse_style(&spec.header_hint),
            header_border_style: parse_style(&spec.header_border),
            user_label_style: parse_style(&spec.user_label),
            user_bubble_style: parse_style(&spec.user_bubble),
            bot_label_style: parse_style(&spec.bot_label),
            bot_bubble_style: parse_style(&spec.bot_bubble),
            loading_style: parse_style(&spec.loading),
            input_border_style: parse_style(&spec.input_border),
            input_border_busy_style: parse_style(&spec.input_border_busy),
            input_title_style: parse_style(&spec.input_title),
            input_text_style: parse_style(&spec.input_text),
            placeholder_style: parse_style(&spec.placeholder),
            input_cursor_style: spec
                .input_cursor_modifiers
                .as_deref()
                .map(|mods| {
                    mods.split(',')
                        .filter_map(parse_modifier)
                        .fold(Style::default(), |style, m| style.add_modifier(m))
                })
                .unwrap_or_else(|| Style::default().add_modifier(Modifier::REVERSED)),
        }
    }
}

fn parse_style(spec: &Option<String>) -> Style {
    let mut style = Style::default();
    let Some(spec) = spec else {
        return style;
    };
    for tok in spec.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some(bg) = tok.strip_prefix("bg:") {
            if let Some(color) = parse_color(bg) {
                style = style.bg(color);
            }
        } else if let Some(color) = parse_color(tok) {
            style = style.fg(color);
        } else if let Some(modifier) = parse_modifier(tok) {
            style = style.add_modifier(modifier);
        }
    }
    style
}

fn parse_modifier(token: &str) -> Option<Modifier> {
    match token.trim().to_ascii_lowercase().as_str() {
        "bold" => Some(Modifier::BOLD),
        "italic" => Some(Modifier::ITALIC),
        "dim" => Some(Modifier::DIM),
        "reversed" => Some(Modifier::REVERSED),
        _ => None,
    }
}

fn parse_color(s: &str) -> Option<Color> {
    let lower = s.trim().to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix('#') {
        return parse_hex(hex);
    }
    match lower.as_str() {
        "black" => Some(Color::Black),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Gray),
        "dark_gray" | "darkgray" => Some(Color::DarkGray),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "blue" => Some(Color::Blue),
        "light_blue" | "lightblue" => Some(Color::LightBlue),
        "cyan" => Some(Color::Cyan),
        "magenta" => Some(Color::Magenta),
        "yellow" => Some(Color::Yellow),
        "reset" => Some(Color::Reset),
        _ => None,
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    match hex.len() {
        3 => {
            let expand = |i: usize| {
                let digit = hex.get(i..i + 1)?;
                u8::from_str_radix(&digit.repeat(2), 16).ok()
            };
            Some(Color::Rgb(expand(0)?, expand(1)?, expand(2)?))
        }
        6 => Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        _ => None,
    }
}
