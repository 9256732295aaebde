use crate::japanese::is_string_partially_japanese;

/// Returns the language that the string might be by using some heuristic checks.
/// Values returned are ISO codes. `None` is returned if no language can be determined.
pub fn get_language_from_text<T: AsRef<str>>(text: T) -> Option<&'static str> {
    if is_string_partially_japanese(text.as_ref()) {
        return Some("ja");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_japanese() {
        assert_eq!(get_language_from_text("読み方"), Some("ja"));
        assert_eq!(get_language_from_text("ﾖﾐｶﾀ"), Some("ja"));
        assert_eq!(get_language_from_text("reading"), None);
        assert_eq!(get_language_from_text(""), None);
    }
}
