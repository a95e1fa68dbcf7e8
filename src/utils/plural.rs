//! Pluralization for log lines.

/// Format a count with its noun.
///
/// - `plural_count(1, "file")` -> `"1 file"`
/// - `plural_count(3, "file")` -> `"3 files"`
/// - `plural_count(2, "entry")` -> `"2 entries"`
pub fn plural_count(count: usize, noun: &str) -> String {
    if count == 1 {
        return format!("1 {noun}");
    }
    match noun.strip_suffix('y') {
        Some(stem) if !stem.ends_with(['a', 'e', 'o', 'u']) => format!("{count} {stem}ies"),
        _ => format!("{count} {noun}s"),
    }
}
