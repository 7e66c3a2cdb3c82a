//! Word wrapping that keeps author-supplied line breaks.

/// Splits `text` on explicit newlines, then greedily wraps each paragraph to
/// `width` columns.
///
/// Blank paragraphs produce no output lines. Words longer than `width` are
/// kept whole on their own line.
#[must_use]
pub fn split_lines(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}
