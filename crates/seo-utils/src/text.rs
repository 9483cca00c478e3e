//! Text helpers for building log- and report-safe strings from page content.

/// Collapse runs of whitespace into single spaces and trim the ends. Used
/// before measuring or displaying title/description text so stray newlines in
/// markup don't distort length checks or report output.
pub fn normalize_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate `input` to at most `max_chars` characters, appending an ellipsis
/// marker when truncated, for embedding page-derived text into issue messages
/// without unbounded growth.
pub fn truncate_for_report(input: &str, max_chars: usize) -> String {
    let normalized = normalize_whitespace(input);
    let char_count = normalized.chars().count();
    if char_count <= max_chars {
        return normalized;
    }
    let truncated: String = normalized.chars().take(max_chars).collect();
    format!("{truncated}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_internal_whitespace() {
        assert_eq!(normalize_whitespace("  a\n  b\t c "), "a b c");
    }

    #[test]
    fn truncation_appends_ellipsis_only_when_needed() {
        assert_eq!(truncate_for_report("short", 10), "short");
        assert_eq!(truncate_for_report("abcdefghij", 5), "abcde…");
    }
}
