//! Helpers for paths in the server's namespace.
//!
//! Remote paths are plain strings separated by `/`, whatever the local
//! platform uses.

/// Directory separator of the remote namespace.
pub const SEPARATOR: char = '/';

/// Appends the separator unless `path` already ends with it.
///
/// ```
/// use ftp_directory::path::with_trailing_separator;
/// assert_eq!(with_trailing_separator("/pub"), "/pub/");
/// assert_eq!(with_trailing_separator("/pub/"), "/pub/");
/// ```
pub fn with_trailing_separator(path: &str) -> String {
    let mut owned = String::with_capacity(path.len() + 1);
    owned.push_str(path);
    if !owned.ends_with(SEPARATOR) {
        owned.push(SEPARATOR);
    }
    owned
}

/// Joins a directory and an entry name with exactly one separator between them.
pub fn join(parent: &str, name: &str) -> String {
    let name = name.trim_start_matches(SEPARATOR);
    if parent.is_empty() {
        return name.to_owned();
    }
    let mut joined = with_trailing_separator(parent);
    joined.push_str(name);
    joined
}

/// Last component of `path`, ignoring trailing separators.
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(SEPARATOR);
    match trimmed.rfind(SEPARATOR) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// `.` and `..` show up in some listings and never name a real child.
pub fn is_self_or_parent(name: &str) -> bool {
    name == "." || name == ".."
}
