use crate::core::message::Message;
use crate::core::transcript::Transcript;
use crate::ui::theme::Theme;
use ratatui::{
    layout::Alignment,
    style::Style,
    text::{Line, Span},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Share of the transcript width a bubble may take, in percent.
pub const BUBBLE_MAX_WIDTH_PERCENT: usize = 80;

const USER_LABEL: &str = "You";
const BOT_LABEL: &str = "Assistant";

/// Builds pre-wrapped transcript lines and the scroll math that goes with them.
///
/// Lines come out already wrapped to the target width, so one `Line` is one
/// terminal row and scroll offsets can be computed from `lines.len()`.
pub struct ScrollCalculator;

impl ScrollCalculator {
    /// Word-wrap `text` to `width` columns. Explicit newlines are kept, runs of
    /// spaces inside a line collapse to one, and words wider than `width` are
    /// split across rows.
    pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
        let width = width.max(1);
        let mut rows = Vec::new();

        for paragraph in text.split('\n') {
            let mut row = String::new();
            let mut row_width = 0usize;

            for word in paragraph.split_whitespace() {
                let word_width = word.width();
                if row_width > 0 && row_width + 1 + word_width <= width {
                    row.push(' ');
                    row.push_str(word);
                    row_width += 1 + word_width;
                    continue;
                }
                if row_width > 0 {
                    rows.push(std::mem::take(&mut row));
                    row_width = 0;
                }
                if word_width <= width {
                    row.push_str(word);
                    row_width = word_width;
                    continue;
                }
                for ch in word.chars() {
                    let ch_width = ch.width().unwrap_or(0);
                    if row_width > 0 && row_width + ch_width > width {
                        rows.push(std::mem::take(&mut row));
                        row_width = 0;
                    }
                    row.push(ch);
                    row_width += ch_width;
                }
            }
            rows.push(row);
        }
        rows
    }

    /// Text columns available inside a bubble for a transcript `width`.
    pub fn bubble_text_width(width: u16) -> usize {
        let max_bubble = (width as usize * BUBBLE_MAX_WIDTH_PERCENT / 100).max(3);
        max_bubble.saturating_sub(2).max(1)
    }

    /// Lines for the whole transcript: a label and a bubble per message, one
    /// blank row between messages, then the loading dots when `loading_dots`
    /// is set.
    pub fn build_display_lines(
        transcript: &Transcript,
        theme: &Theme,
        width: u16,
        loading_dots: Option<usize>,
    ) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for (index, message) in transcript.iter().enumerate() {
            if index > 0 {
                lines.push(Line::from(""));
            }
            Self::push_message_lines(&mut lines, message, theme, width);
        }

        if let Some(dots) = loading_dots {
            lines.push(Line::from(""));
            lines.push(
                Line::from(Span::styled(".".repeat(dots), theme.loading_style))
                    .alignment(Alignment::Left),
            );
        }
        lines
    }

    fn push_message_lines(
        lines: &mut Vec<Line<'static>>,
        message: &Message,
        theme: &Theme,
        width: u16,
    ) {
        let (label, label_style, bubble_style, alignment) = if message.is_user() {
            (
                USER_LABEL,
                theme.user_label_style,
                theme.user_bubble_style,
                Alignment::Right,
            )
        } else {
            (
                BOT_LABEL,
                theme.bot_label_style,
                theme.bot_bubble_style,
                Alignment::Left,
            )
        };

        lines.push(Line::from(Span::styled(label, label_style)).alignment(alignment));

        let rows = Self::wrap_text(message.text(), Self::bubble_text_width(width));
        let inner_width = rows.iter().map(|row| row.width()).max().unwrap_or(0);
        for row in rows {
            lines.push(Self::bubble_row(&row, inner_width, bubble_style).alignment(alignment));
        }
    }

    /// One bubble row padded to the bubble's inner width so the background is
    /// a solid block.
    fn bubble_row(row: &str, inner_width: usize, style: Style) -> Line<'static> {
        let padding = inner_width.saturating_sub(row.width());
        let mut content = String::with_capacity(row.len() + padding + 2);
        content.push(' ');
        content.push_str(row);
        content.extend(std::iter::repeat(' ').take(padding));
        content.push(' ');
        Line::from(Span::styled(content, style))
    }

    pub fn calculate_max_scroll_offset(total_lines: usize, available_height: u16) -> u16 {
        let total = u16::try_from(total_lines).unwrap_or(u16::MAX);
        total.saturating_sub(available_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::ThemeMode;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn wrap_text_breaks_on_word_boundaries() {
        assert_eq!(
            ScrollCalculator::wrap_text("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn wrap_text_keeps_explicit_newlines_and_blank_lines() {
        assert_eq!(
            ScrollCalculator::wrap_text("one\n\ntwo", 20),
            vec!["one", "", "two"]
        );
    }

    #[test]
    fn wrap_text_splits_overlong_words() {
        assert_eq!(
            ScrollCalculator::wrap_text("abcdefghij", 4),
            vec!["abcd", "efgh", "ij"]
        );
    }

    #[test]
    fn wrap_text_counts_wide_characters_by_display_width() {
        let rows = ScrollCalculator::wrap_text("日本語テキスト", 6);
        assert!(rows.iter().all(|row| row.width() <= 6));
        assert_eq!(rows.concat(), "日本語テキスト");
    }

    #[test]
    fn bubbles_align_by_sender_and_stay_within_width() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user(
            "a fairly long question that will need to wrap onto more rows",
        ));
        let theme = Theme::for_mode(ThemeMode::Light);
        let lines = ScrollCalculator::build_display_lines(&transcript, &theme, 40, None);

        assert_eq!(line_text(&lines[0]), BOT_LABEL);
        assert_eq!(lines[0].alignment, Some(Alignment::Left));

        let user_label = lines
            .iter()
            .position(|l| line_text(l) == USER_LABEL)
            .expect("user label");
        assert_eq!(lines[user_label].alignment, Some(Alignment::Right));
        for line in &lines[user_label + 1..] {
            assert_eq!(line.alignment, Some(Alignment::Right));
            assert!(line.width() <= 32, "bubble row too wide: {:?}", line_text(line));
        }
    }

    #[test]
    fn bubble_rows_share_one_width() {
        let mut transcript = Transcript::with_greeting("short\nmuch longer row");
        transcript.push(Message::user("x"));
        let theme = Theme::for_mode(ThemeMode::Dark);
        let lines = ScrollCalculator::build_display_lines(&transcript, &theme, 80, None);
        assert_eq!(lines[1].width(), lines[2].width());
        assert_eq!(line_text(&lines[1]), format!(" short{} ", " ".repeat(10)));
    }

    #[test]
    fn loading_dots_follow_the_last_bubble() {
        let transcript = Transcript::new();
        let theme = Theme::for_mode(ThemeMode::Light);
        let lines = ScrollCalculator::build_display_lines(&transcript, &theme, 80, Some(2));
        assert_eq!(line_text(lines.last().expect("line")), "..");
    }

    #[test]
    fn max_scroll_offset_is_overflow() {
        assert_eq!(ScrollCalculator::calculate_max_scroll_offset(30, 10), 20);
        assert_eq!(ScrollCalculator::calculate_max_scroll_offset(5, 10), 0);
    }
}
