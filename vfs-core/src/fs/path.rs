//! Path splitting for the directory walk.

/// Split a path into its segment names.
///
/// - Both `/` and `\` are separators
/// - Empty segments (leading, trailing or doubled separators) are dropped
/// - No case folding, no `.`/`..` handling
///
/// # Examples
/// ```
/// use vfs_core::split_path;
/// assert_eq!(split_path("a/b\\c"), vec!["a", "b", "c"]);
/// assert_eq!(split_path("/docs//note.txt"), vec!["docs", "note.txt"]);
/// assert!(split_path("").is_empty());
/// ```
pub fn split_path(path: &str) -> Vec<&str> {
    path.split(is_separator)
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Whether `name` can key a child: non-empty and without separators.
/// Any other name could never be reached by a path walk.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(is_separator)
}

/// Join segment names with `/`.
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join("/")
}
