//! Path validation
//!
//! Handles path validation and security checks.

use std::path::{Component, Path, PathBuf};

/// Resolves a client-supplied path under `root`.
///
/// Returns `None` for empty, absolute, or parent-relative paths, so a
/// request can never name a file outside the root.
pub fn resolve_file_path(root: &Path, requested: &str) -> Option<PathBuf> {
    let requested = requested.trim();
    if requested.is_empty() || requested.contains('\0') {
        return None;
    }

    let relative = Path::new(requested);
    let mut resolved = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    (resolved != root).then_some(resolved)
}

/// Final path component, used as the local name of a downloaded file.
pub fn file_name_of(requested: &str) -> Option<&str> {
    Path::new(requested.trim())
        .file_name()
        .and_then(|name| name.to_str())
}
