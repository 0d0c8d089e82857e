//! String helpers shared by the console and the CLI
//!
//! Display truncation has to respect char boundaries: task titles coming from
//! the backend are frequently CJK.

use std::borrow::Cow;

/// Suffix appended to truncated text
pub const ELLIPSIS: &str = "...";

/// Truncate `text` to at most `max_chars` characters, appending `...` when cut.
///
/// Newlines are flattened to spaces so the result fits on one table row.
pub fn truncate(text: &str, max_chars: usize) -> Cow<'_, str> {
    let needs_flatten = text.contains('\n');
    let char_count = text.chars().count();

    if char_count <= max_chars {
        return if needs_flatten {
            Cow::Owned(text.replace('\n', " "))
        } else {
            Cow::Borrowed(text)
        };
    }

    let mut out: String = text
        .chars()
        .take(max_chars)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    out.push_str(ELLIPSIS);
    Cow::Owned(out)
}

/// Short form of an opaque id for narrow columns
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// Last non-empty path segment of a URL or path, without query or fragment
pub fn last_segment(path: &str) -> Option<&str> {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path.rsplit('/').find(|s| !s.is_empty())
}
