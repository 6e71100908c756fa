//! Walk input files.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::{
    config::Config,
    util::{path::PathExt, walk::DirWalker},
};

/// List of errors for this module.
#[derive(Debug, Error)]
pub enum InputError {
    /// Directory walker error.
    #[error(transparent)]
    Walk(#[from] crate::util::walk::Error),
    /// Walked path located outside the input directory.
    #[error("path {0:?} is not located inside the input directory")]
    StripPrefix(PathBuf),
}

/// Path of a file relative to the input directory.
///
/// The native path is kept for building output paths, so that file names
/// that are not valid UTF-8 are preserved. Its string form, with components
/// separated by `/` whatever the platform, is used for display and as a
/// template name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelativePath {
    /// Native relative path.
    path: PathBuf,

    /// `/`-separated string form, lossily converted to UTF-8.
    slash: String,
}

impl RelativePath {
    /// Create a relative path from a file path and its base directory.
    pub fn new(path: impl AsRef<Path>, base_dir: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .strip_prefix(base_dir)
            .ok()
            .map(|path| Self {
                path: path.to_path_buf(),
                slash: path.to_slash(),
            })
    }

    /// Return the `/`-separated path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.slash
    }

    /// Return the native path, for joining with a directory.
    pub fn as_path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.slash)
    }
}

/// A file found in the input directory.
#[derive(Debug, Clone)]
pub struct InputFile {
    /// Absolute path of the file.
    pub path: PathBuf,

    /// Path of the file relative to the input directory.
    pub relative_path: RelativePath,
}

/// Walk the input directory depth-first.
///
/// Every regular file is yielded, hidden ones included. If the output
/// directory is located inside the input directory, it is skipped.
pub fn walk_input(config: &Config) -> impl Iterator<Item = Result<InputFile, InputError>> {
    let input_dir = config.input_dir.clone();
    let output_dir = config.output_dir.clone();

    let mut walker = DirWalker::new(&input_dir);

    walker.filter_entry(move |entry| entry.path() != output_dir);

    walker.walk().map(move |result| {
        let entry = result?;
        let path = entry.into_path();

        let relative_path = RelativePath::new(&path, &input_dir)
            .ok_or_else(|| InputError::StripPrefix(path.clone()))?;

        Ok(InputFile {
            path,
            relative_path,
        })
    })
}
