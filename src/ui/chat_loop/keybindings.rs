//! Maps key presses to what the chat loop should do with them.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press means for the chat loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Submit,
    InsertNewline,
    ToggleTheme,
    ScrollUp(u16),
    ScrollDown(u16),
    PageUp,
    PageDown,
    Quit,
    /// Hand the key to the input textarea.
    Edit,
}

/// Resolve `key`. `input_empty` is whether the input buffer holds no text.
pub fn resolve_key(key: &KeyEvent, input_empty: bool) -> KeyCommand {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Char('c') if ctrl => KeyCommand::Quit,
        KeyCode::Char('d') if ctrl && input_empty => KeyCommand::Quit,
        KeyCode::Char('t') if ctrl => KeyCommand::ToggleTheme,
        KeyCode::Enter if shift || alt => KeyCommand::InsertNewline,
        KeyCode::Enter => KeyCommand::Submit,
        KeyCode::PageUp => KeyCommand::PageUp,
        KeyCode::PageDown => KeyCommand::PageDown,
        KeyCode::Up if shift => KeyCommand::ScrollUp(1),
        KeyCode::Down if shift => KeyCommand::ScrollDown(1),
        _ => KeyCommand::Edit,
    }
}
