use std::borrow::Cow;

/// Truncates a string to at most `max_chars` characters.
///
/// Counts Unicode scalar values, not bytes, words or display columns, so the
/// cut can land mid-word but never inside a UTF-8 sequence. No ellipsis is
/// appended.
///
/// Returns `Cow::Borrowed` when the string already fits.
///
/// # Examples
///
/// ```
/// use feedreport::util::truncate_chars;
///
/// assert_eq!(truncate_chars("Hello World", 5), "Hello");
/// assert_eq!(truncate_chars("héllo", 2), "hé");
/// assert_eq!(truncate_chars("short", 200), "short");
/// ```
pub fn truncate_chars(s: &str, max_chars: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max_chars) {
        Some((byte_end, _)) => Cow::Owned(s[..byte_end].to_string()),
        None => Cow::Borrowed(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ascii_truncation() {
        assert_eq!(truncate_chars("Hello World", 5), "Hello");
        assert_eq!(truncate_chars("Hello", 5), "Hello");
        assert_eq!(truncate_chars("Hello", 0), "");
    }

    #[test]
    fn test_fits_returns_borrowed() {
        assert!(matches!(truncate_chars("abc", 3), Cow::Borrowed(_)));
        assert!(matches!(truncate_chars("", 10), Cow::Borrowed(_)));
    }

    #[test]
    fn test_multibyte_counts_characters() {
        // 4 chars, 12 bytes
        assert_eq!(truncate_chars("你好世界", 2), "你好");
        assert_eq!(truncate_chars("Hi 🎉 there", 4), "Hi 🎉");
    }

    #[test]
    fn test_cuts_mid_word() {
        assert_eq!(truncate_chars("internationalization", 5), "inter");
    }

    proptest! {
        #[test]
        fn truncated_is_bounded_prefix(s in "\\PC{0,400}", max in 0usize..300) {
            let out = truncate_chars(&s, max);
            prop_assert!(out.chars().count() <= max);
            prop_assert!(s.starts_with(out.as_ref()));
            if s.chars().count() <= max {
                prop_assert_eq!(out.as_ref(), s.as_str());
            }
        }
    }
}
