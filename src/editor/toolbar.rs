//! Markdown formatting commands behind the editor toolbar.
//!
//! Positions are character indices, as reported by the text edit cursor.

/// A toolbar button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCommand {
    Bold,
    Italic,
    InlineCode,
    Heading,
    BulletList,
    Link,
}

impl FormatCommand {
    pub const ALL: [FormatCommand; 6] = [
        FormatCommand::Bold,
        FormatCommand::Italic,
        FormatCommand::InlineCode,
        FormatCommand::Heading,
        FormatCommand::BulletList,
        FormatCommand::Link,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormatCommand::Bold => "B",
            FormatCommand::Italic => "I",
            FormatCommand::InlineCode => "</>",
            FormatCommand::Heading => "H",
            FormatCommand::BulletList => "•",
            FormatCommand::Link => "🔗",
        }
    }

    pub fn tooltip(&self) -> &'static str {
        match self {
            FormatCommand::Bold => "Bold",
            FormatCommand::Italic => "Italic",
            FormatCommand::InlineCode => "Inline code",
            FormatCommand::Heading => "Heading",
            FormatCommand::BulletList => "Bullet list",
            FormatCommand::Link => "Link",
        }
    }
}

/// Text and cursor after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatResult {
    pub text: String,
    /// New cursor position (character index)
    pub cursor: usize,
}

/// Apply `command` to `text` with the selection `(start, end)` in characters.
/// A collapsed selection is the cursor position.
pub fn apply_format(text: &str, selection: (usize, usize), command: FormatCommand) -> FormatResult {
    let char_count = text.chars().count();
    let (start, end) = {
        let (a, b) = (selection.0.min(char_count), selection.1.min(char_count));
        (a.min(b), a.max(b))
    };
    let start_byte = byte_index(text, start);
    let end_byte = byte_index(text, end);

    match command {
        FormatCommand::Bold => wrap(text, start_byte, end_byte, "**", "**"),
        FormatCommand::Italic => wrap(text, start_byte, end_byte, "*", "*"),
        FormatCommand::InlineCode => wrap(text, start_byte, end_byte, "`", "`"),
        FormatCommand::Link => wrap(text, start_byte, end_byte, "[", "](url)"),
        FormatCommand::Heading => prefix_line(text, start_byte, "# "),
        FormatCommand::BulletList => prefix_line(text, start_byte, "- "),
    }
}

fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map_or(text.len(), |(i, _)| i)
}

fn char_index(text: &str, byte_index: usize) -> usize {
    text[..byte_index].chars().count()
}

/// Wrap the selection in delimiters, or unwrap it if it is already wrapped.
fn wrap(text: &str, start: usize, end: usize, prefix: &str, suffix: &str) -> FormatResult {
    let selected = &text[start..end];

    if selected.len() >= prefix.len() + suffix.len()
        && selected.starts_with(prefix)
        && selected.ends_with(suffix)
    {
        let inner = &selected[prefix.len()..selected.len() - suffix.len()];
        let new_text = format!("{}{}{}", &text[..start], inner, &text[end..]);
        let cursor = char_index(&new_text, start + inner.len());
        return FormatResult {
            text: new_text,
            cursor,
        };
    }

    let new_text = format!(
        "{}{}{}{}{}",
        &text[..start],
        prefix,
        selected,
        suffix,
        &text[end..]
    );
    // With no selection the cursor lands between the delimiters
    let cursor_byte = if start == end {
        start + prefix.len()
    } else {
        start + prefix.len() + selected.len() + suffix.len()
    };
    let cursor = char_index(&new_text, cursor_byte);
    FormatResult {
        text: new_text,
        cursor,
    }
}

/// Toggle a marker at the start of the line containing `at`.
fn prefix_line(text: &str, at: usize, marker: &str) -> FormatResult {
    let line_start = text[..at].rfind('\n').map_or(0, |i| i + 1);
    let rest = &text[line_start..];

    let (new_text, cursor_byte) = if let Some(stripped) = rest.strip_prefix(marker) {
        (
            format!("{}{}", &text[..line_start], stripped),
            at.saturating_sub(marker.len()).max(line_start),
        )
    } else {
        (
            format!("{}{}{}", &text[..line_start], marker, rest),
            at + marker.len(),
        )
    };
    let cursor = char_index(&new_text, cursor_byte);
    FormatResult {
        text: new_text,
        cursor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_wraps_selection() {
        let result = apply_format("Hello world", (0, 5), FormatCommand::Bold);
        assert_eq!(result.text, "**Hello** world");
        assert_eq!(result.cursor, 9);
    }

    #[test]
    fn test_bold_toggles_off() {
        let result = apply_format("**Hello** world", (0, 9), FormatCommand::Bold);
        assert_eq!(result.text, "Hello world");
    }

    #[test]
    fn test_empty_selection_puts_cursor_between_delimiters() {
        let result = apply_format("ab", (1, 1), FormatCommand::InlineCode);
        assert_eq!(result.text, "a``b");
        assert_eq!(result.cursor, 2);
    }

    #[test]
    fn test_reversed_selection_and_multibyte() {
        let result = apply_format("héllo", (5, 1), FormatCommand::Italic);
        assert_eq!(result.text, "h*éllo*");
    }

    #[test]
    fn test_link() {
        let result = apply_format("see docs", (4, 8), FormatCommand::Link);
        assert_eq!(result.text, "see [docs](url)");
    }

    #[test]
    fn test_heading_toggles_current_line() {
        let text = "first\nsecond";
        let result = apply_format(text, (8, 8), FormatCommand::Heading);
        assert_eq!(result.text, "first\n# second");
        assert_eq!(result.cursor, 10);

        let back = apply_format(&result.text, (result.cursor, result.cursor), FormatCommand::Heading);
        assert_eq!(back.text, text);
        assert_eq!(back.cursor, 8);
    }

    #[test]
    fn test_bullet_on_first_line() {
        let result = apply_format("item", (0, 0), FormatCommand::BulletList);
        assert_eq!(result.text, "- item");
    }

    #[test]
    fn test_selection_past_end_is_clamped() {
        let result = apply_format("ab", (1, 99), FormatCommand::Bold);
        assert_eq!(result.text, "a**b**");
    }
}
