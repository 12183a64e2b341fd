//! Input sanitation for text that reaches the input buffer from outside the
//! keyboard path (bracketed paste).

/// Make pasted text safe to insert into the input box.
///
/// CRLF and lone CR become LF, tabs become four spaces, and any other control
/// character is dropped.
pub fn sanitize_text_input(text: &str) -> String {
    let mut sanitized = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                sanitized.push('\n');
            }
            '\t' => sanitized.push_str("    "),
            '\n' => sanitized.push('\n'),
            _ if c.is_control() => {}
            _ => sanitized.push(c),
        }
    }

    sanitized
}
