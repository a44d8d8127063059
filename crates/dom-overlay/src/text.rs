//! Char-offset helpers. Every span in this crate counts Unicode scalars.

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub fn byte_index(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

pub fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let from = byte_index(text, start);
    let to = byte_index(text, end.max(start));
    &text[from..to]
}

/// Replaces `[start, end)` with `replacement`, or `None` when the range does
/// not fit `text`.
pub fn splice(text: &str, start: usize, end: usize, replacement: &str) -> Option<String> {
    if start > end || end > char_len(text) {
        return None;
    }
    let from = byte_index(text, start);
    let to = byte_index(text, end);
    let mut out = String::with_capacity(text.len() + replacement.len());
    out.push_str(&text[..from]);
    out.push_str(replacement);
    out.push_str(&text[to..]);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_by_chars() {
        assert_eq!(char_slice("맞춤법 검사", 0, 3), "맞춤법");
        assert_eq!(char_slice("abc", 1, 10), "bc");
        assert_eq!(char_slice("abc", 2, 1), "");
    }

    #[test]
    fn splice_replaces_span() {
        assert_eq!(splice("I has a pen", 2, 5, "have").as_deref(), Some("I have a pen"));
        assert_eq!(splice("abc", 2, 4, "x"), None);
        assert_eq!(splice("한글", 1, 2, "국").as_deref(), Some("한국"));
    }
}
