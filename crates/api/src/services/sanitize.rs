//! Free-text sanitizing for client-submitted data.
//!
//! Structured fields (phone, wilaya, delivery type) are validated by the
//! `okami_core` newtypes instead.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Matches anything that looks like an HTML tag.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid regex"));

/// Trim, cap at `max_len` characters, then strip `<...>` tags.
///
/// Non-string values sanitize to the empty string.
#[must_use]
pub fn sanitize_string(value: &Value, max_len: usize) -> String {
    let Value::String(s) = value else {
        return String::new();
    };
    let capped: String = s.trim().chars().take(max_len).collect();
    TAG_RE.replace_all(&capped, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_string_is_empty() {
        assert_eq!(sanitize_string(&json!(42), 100), "");
        assert_eq!(sanitize_string(&Value::Null, 100), "");
        assert_eq!(sanitize_string(&json!(["a"]), 100), "");
    }

    #[test]
    fn test_trims_and_strips_tags() {
        assert_eq!(
            sanitize_string(&json!("  <b>Yacine</b> <script>x</script>"), 100),
            "Yacine x"
        );
    }

    #[test]
    fn test_truncates_by_characters() {
        assert_eq!(sanitize_string(&json!("éééé"), 2), "éé");
        assert_eq!(sanitize_string(&json!("abcdef"), 3), "abc");
    }

    #[test]
    fn test_truncation_happens_before_tag_stripping() {
        // The cut leaves an unterminated tag, which is kept as text.
        assert_eq!(sanitize_string(&json!("ab<tag>"), 4), "ab<t");
    }
}
