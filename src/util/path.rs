//! Utility functions for paths.

use std::{
    io,
    path::{Component, Path, PathBuf},
};

/// Extend [`std::path::Path`] with utility methods.
pub(crate) trait PathExt {
    /// Normalize the path by removing unnecessary separators and `.` and `..`
    /// components.
    ///
    /// This method calls [`normalize_path`] under the hood.
    fn normalize(&self) -> PathBuf;

    /// Join `/`-separated components of the path, regardless of the platform
    /// separator.
    fn to_slash(&self) -> String;
}

impl<T> PathExt for T
where
    T: AsRef<Path>,
{
    fn normalize(&self) -> PathBuf {
        self::normalize_path(self)
    }

    fn to_slash(&self) -> String {
        self.as_ref()
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => Some(name.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Normalize a path by removing unnecessary separators and `.` and `..`
/// components.
///
/// Unlike [`std::fs::canonicalize`], symbolic links are not resolved and the
/// path does not need to exist. A `..` component at the root is dropped
/// (e.g. `/../foo` returns `/foo`), while leading `..` components of a
/// relative path are kept.
pub(crate) fn normalize_path<P>(path: P) -> PathBuf
where
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let mut prefix = PathBuf::new();
    let mut has_root = false;
    let mut result: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(..) => prefix.push(component),
            Component::RootDir => has_root = true,
            Component::CurDir => {},
            Component::Normal(_) => result.push(component),
            Component::ParentDir => {
                if matches!(result.last(), Some(Component::Normal(_))) {
                    result.pop();
                } else if !has_root {
                    result.push(component);
                }
            },
        }
    }

    let mut normalized = prefix;

    if has_root {
        normalized.push(Component::RootDir);
    }

    normalized.extend(result);

    if normalized.as_os_str().is_empty() {
        return PathBuf::from(Component::CurDir.as_os_str());
    }

    normalized
}

/// Canonicalize a path that may not exist yet.
///
/// The longest existing ancestor is canonicalized and the remaining
/// components are appended to it, so that the result can be compared with
/// other canonical paths. The path must be absolute and normalized.
pub(crate) fn canonicalize_missing<P>(path: P) -> io::Result<PathBuf>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();

    debug_assert!(path.is_absolute());

    let mut missing = Vec::new();
    let mut ancestor = path;

    loop {
        if ancestor.exists() {
            let mut result = ancestor.canonicalize()?;
            result.extend(missing.iter().rev());
            return Ok(result);
        }

        match (ancestor.parent(), ancestor.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                ancestor = parent;
            },
            _ => return Ok(path.to_path_buf()),
        }
    }
}
