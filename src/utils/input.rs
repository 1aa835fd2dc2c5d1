//! Composer text utilities: sanitization and caret movement.
//!
//! The composer tracks its caret as a byte offset into the input string;
//! the helpers here keep movement and deletion on `char` boundaries.

/// Sanitize pasted or typed text before it enters the composer.
///
/// Tabs become spaces (a literal tab would fight the Tab-confirm binding),
/// carriage returns become newlines, and remaining control characters are
/// dropped to prevent TUI corruption.
pub fn sanitize_text_input(text: &str) -> String {
    let mut sanitized = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\t' => sanitized.push_str("    "),
            '\r' => sanitized.push('\n'),
            '\n' => sanitized.push(c),
            _ if !c.is_control() => sanitized.push(c),
            _ => {}
        }
    }
    sanitized
}

/// Byte offset of the char boundary preceding `caret`, or 0 at the start.
pub fn prev_char_boundary(text: &str, caret: usize) -> usize {
    if caret == 0 {
        return 0;
    }
    let mut i = caret.min(text.len()) - 1;
    while i > 0 && !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Byte offset of the char boundary following `caret`, clamped to the end.
pub fn next_char_boundary(text: &str, caret: usize) -> usize {
    if caret >= text.len() {
        return text.len();
    }
    let mut i = caret + 1;
    while i < text.len() && !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_handles_tabs_returns_and_controls() {
        assert_eq!(sanitize_text_input("hello\tworld"), "hello    world");
        assert_eq!(sanitize_text_input("a\rb"), "a\nb");
        assert_eq!(sanitize_text_input("a\x01\x02b\x07"), "ab");
        assert_eq!(sanitize_text_input("line1\nline2"), "line1\nline2");
    }

    #[test]
    fn boundaries_respect_multibyte_chars() {
        let text = "a€b"; // '€' is 3 bytes at offset 1..4
        assert_eq!(prev_char_boundary(text, 4), 1);
        assert_eq!(next_char_boundary(text, 1), 4);
        assert_eq!(prev_char_boundary(text, 1), 0);
        assert_eq!(next_char_boundary(text, 4), 5);
    }

    #[test]
    fn boundaries_clamp_at_the_edges() {
        assert_eq!(prev_char_boundary("abc", 0), 0);
        assert_eq!(next_char_boundary("abc", 3), 3);
        assert_eq!(next_char_boundary("abc", 99), 3);
    }
}
