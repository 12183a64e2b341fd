use std::time::Instant;

use ratatui::style::Style;
use tui_textarea::{CursorMove, TextArea};

use crate::core::transcript::Transcript;
use crate::ui::theme::{Theme, ThemeMode};

pub const INPUT_PLACEHOLDER: &str = "Type your message...";

/// Input rows shown before the input box starts scrolling.
pub const MAX_INPUT_ROWS: u16 = 5;

/// Rows outside the transcript besides the input text: the header and its
/// border, plus the input box borders.
const CHROME_ROWS: u16 = 4;

#[derive(Debug, Clone)]
pub struct UiState {
    pub transcript: Transcript,
    input: String,
    textarea: TextArea<'static>,
    pub theme_mode: ThemeMode,
    pub theme: Theme,
    /// First transcript line shown, counted in wrapped display lines.
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    /// Largest valid `scroll_offset` as of the last frame.
    pub last_max_scroll: u16,
    pub pulse_start: Instant,
    pub exit_requested: bool,
}

impl UiState {
    pub fn new(theme_mode: ThemeMode) -> Self {
        let mut state = Self {
            transcript: Transcript::new(),
            input: String::new(),
            textarea: TextArea::default(),
            theme_mode,
            theme: Theme::for_mode(theme_mode),
            scroll_offset: 0,
            auto_scroll: true,
            last_max_scroll: 0,
            pulse_start: Instant::now(),
            exit_requested: false,
        };
        state.configure_textarea();
        state
    }

    pub(crate) fn configure_textarea(&mut self) {
        let textarea_style = self
            .theme
            .input_text_style
            .patch(Style::default().bg(self.theme.background_color));
        self.textarea.set_style(textarea_style);
        self.textarea.set_cursor_style(self.theme.input_cursor_style);
        self.textarea.set_cursor_line_style(Style::default());
        self.textarea.set_placeholder_text(INPUT_PLACEHOLDER);
        self.textarea
            .set_placeholder_style(self.theme.placeholder_style);
    }

    pub fn set_theme_mode(&mut self, mode: ThemeMode) {
        self.theme_mode = mode;
        self.theme = Theme::for_mode(mode);
        self.configure_textarea();
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }

    pub fn get_input_text(&self) -> &str {
        &self.input
    }

    pub fn set_input_text(&mut self, text: String) {
        self.input = text;
        let lines: Vec<String> = if self.input.is_empty() {
            Vec::new()
        } else {
            self.input.split('\n').map(str::to_string).collect()
        };
        self.textarea = TextArea::from(lines);
        self.textarea.move_cursor(CursorMove::Bottom);
        self.textarea.move_cursor(CursorMove::End);
        self.configure_textarea();
    }

    pub fn clear_input(&mut self) {
        self.set_input_text(String::new());
    }

    pub fn apply_textarea_edit<F>(&mut self, f: F)
    where
        F: FnOnce(&mut TextArea<'static>),
    {
        f(&mut self.textarea);
        self.sync_input_from_textarea();
    }

    /// Insert already-sanitized text at the cursor.
    pub fn insert_into_input(&mut self, text: &str) {
        self.apply_textarea_edit(|ta| {
            ta.insert_str(text);
        });
    }

    fn sync_input_from_textarea(&mut self) {
        self.input = self.textarea.lines().join("\n");
    }

    /// Rows the input box needs, between 1 and [`MAX_INPUT_ROWS`].
    pub fn input_area_height(&self) -> u16 {
        let rows = self.textarea.lines().len().max(1);
        (rows.min(MAX_INPUT_ROWS as usize)) as u16
    }

    /// Transcript rows visible in a terminal `term_height` rows tall; what a
    /// page scroll moves by.
    pub fn page_lines(&self, term_height: u16) -> u16 {
        term_height
            .saturating_sub(CHROME_ROWS + self.input_area_height())
            .max(1)
    }

    pub fn scroll_up(&mut self, lines: u16) {
        if self.auto_scroll {
            self.scroll_offset = self.last_max_scroll;
        }
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
        self.auto_scroll = self.scroll_offset >= self.last_max_scroll;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_offset = self
            .scroll_offset
            .saturating_add(lines)
            .min(self.last_max_scroll);
        if self.scroll_offset >= self.last_max_scroll {
            self.auto_scroll = true;
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.auto_scroll = true;
        self.scroll_offset = self.last_max_scroll;
    }

    /// Record the scroll range of the frame just laid out and return the
    /// offset to draw with.
    pub fn update_scroll_bounds(&mut self, max_scroll: u16) -> u16 {
        self.last_max_scroll = max_scroll;
        if self.auto_scroll {
            self.scroll_offset = max_scroll;
        } else {
            self.scroll_offset = self.scroll_offset.min(max_scroll);
        }
        self.scroll_offset
    }
}
