//! Request path canonicalization.

use std::borrow::Cow;

/// Lexically clean a request path.
///
/// Collapses repeated slashes, resolves `.` and `..` (never above the root), drops a trailing
/// slash and always returns a rooted path. Borrows when the input is already clean.
pub fn clean_path(path: &str) -> Cow<'_, str> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut cleaned = String::with_capacity(path.len().max(1));
    for segment in &segments {
        cleaned.push('/');
        cleaned.push_str(segment);
    }
    if cleaned.is_empty() {
        cleaned.push('/');
    }

    if cleaned == path {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(cleaned)
    }
}
