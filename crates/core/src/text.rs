//! Text helpers shared by graphics drivers.
use std::borrow::Cow;

/// Returns the first `n` bytes of `text`.
///
/// The prefix is borrowed when `n` falls on a character boundary. Otherwise
/// the bytes are copied and the split code point is replaced.
pub fn prefix(text: &str, n: usize) -> Cow<'_, str> {
    let n = n.min(text.len());

    if text.is_char_boundary(n) {
        Cow::Borrowed(&text[..n])
    } else {
        String::from_utf8_lossy(&text.as_bytes()[..n])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_borrows_on_boundaries() {
        assert!(matches!(prefix("hello", 3), Cow::Borrowed("hel")));
        assert!(matches!(prefix("hello", 99), Cow::Borrowed("hello")));
        assert!(matches!(prefix("", 0), Cow::Borrowed("")));
    }

    #[test]
    fn prefix_copies_split_code_points() {
        let text = "añb";
        let cut = prefix(text, 2);

        assert!(matches!(cut, Cow::Owned(_)));
        assert_eq!(cut, "a\u{FFFD}");
    }
}
