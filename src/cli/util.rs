pub(crate) fn mask_api_key(key: Option<&str>) -> String {
    let Some(key) = key.filter(|key| !key.is_empty()) else {
        return "(not set, using mock search)".to_string();
    };

    let visible: String = key.chars().take(8).collect();
    format!("{visible}***")
}

/// First `max_chars` characters of `text`, with an ellipsis when cut.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_all_but_prefix() {
        assert_eq!(mask_api_key(Some("tvly-1234567890")), "tvly-123***");
        assert!(mask_api_key(None).contains("not set"));
        assert!(mask_api_key(Some("")).contains("not set"));
    }

    #[test]
    fn preview_marks_truncation() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("abcdef", 3), "abc...");
    }
}
