use std::time::Duration;

use crate::core::app::App;
use crate::ui::theme::Theme;
use crate::utils::scroll::ScrollCalculator;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub const HEADER_TITLE: &str = "🤖 Chatbot Assistant";
const INPUT_TITLE: &str = "Enter to send · Shift+Enter for newline";
const LOADING_FRAME: Duration = Duration::from_millis(400);

/// Number of dots (1 to 3) in the loading indicator after `elapsed`.
pub fn loading_dots(elapsed: Duration) -> usize {
    (elapsed.as_millis() / LOADING_FRAME.as_millis()) as usize % 3 + 1
}

/// Draw one frame. Takes `&mut App` only to record the transcript's scroll
/// bounds for the frame that was laid out.
pub fn ui(f: &mut Frame, app: &mut App, theme: &Theme) {
    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(theme.background_color)),
        area,
    );

    let input_rows = app.ui.input_area_height();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(input_rows + 2), // +2 for borders
        ])
        .split(area);

    render_header(f, app, theme, chunks[0]);
    render_transcript(f, app, theme, chunks[1]);
    render_input(f, app, theme, chunks[2]);
}

fn render_header(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(theme.header_border_style);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let title = Paragraph::new(Line::from(Span::styled(HEADER_TITLE, theme.header_style)));
    f.render_widget(title, inner);

    let hint = format!("{} (Ctrl+T)", app.ui.theme_mode.toggle_label());
    let hint = Paragraph::new(Line::from(Span::styled(hint, theme.header_hint_style)))
        .alignment(Alignment::Right);
    f.render_widget(hint, inner);
}

fn render_transcript(f: &mut Frame, app: &mut App, theme: &Theme, area: Rect) {
    let loading = app
        .is_in_flight()
        .then(|| loading_dots(app.ui.pulse_start.elapsed()));
    let lines = ScrollCalculator::build_display_lines(
        &app.ui.transcript,
        theme,
        area.width,
        loading,
    );
    let max_scroll = ScrollCalculator::calculate_max_scroll_offset(lines.len(), area.height);
    let scroll_offset = app.ui.update_scroll_bounds(max_scroll);

    let transcript = Paragraph::new(lines)
        .style(Style::default().bg(theme.background_color))
        .scroll((scroll_offset, 0));
    f.render_widget(transcript, area);
}

fn render_input(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let border_style = if app.is_in_flight() {
        theme.input_border_busy_style
    } else {
        theme.input_border_style
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(INPUT_TITLE, theme.input_title_style));
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(app.ui.textarea(), inner);
}
