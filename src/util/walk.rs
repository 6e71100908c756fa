//! Walk directories recursively.
//!
//! This module uses [`ignore`] under the hood.

use std::path::Path;

pub use ignore::{DirEntry, Error};
use ignore::WalkBuilder;

/// A directory walker.
///
/// This walker creates a depth-first recursive directory iterator. Unlike the
/// defaults of [`ignore`], hidden files and paths listed in `.gitignore`
/// files are not filtered, and symbolic links are not followed. Entries of a
/// directory are visited in file name order.
pub struct DirWalker {
    /// Builds a recursive directory iterator.
    builder: WalkBuilder,
}

impl DirWalker {
    /// Create a directory walker.
    pub fn new<P>(dir: P) -> Self
    where
        P: AsRef<Path>,
    {
        let mut builder = WalkBuilder::new(dir);

        builder
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        Self { builder }
    }

    /// Register a predicate to filter directories and files during the walk.
    ///
    /// When the predicate returns `false` for a directory, the directory is
    /// not descended into.
    pub fn filter_entry<P>(&mut self, predicate: P) -> &mut Self
    where
        P: Fn(&DirEntry) -> bool + Send + Sync + 'static,
    {
        self.builder.filter_entry(predicate);
        self
    }

    /// Return an iterator that yields regular files.
    ///
    /// Directories, symbolic links and special files are skipped, while
    /// errors (e.g. an unreadable directory) are yielded to the caller.
    pub fn walk(&self) -> impl Iterator<Item = Result<DirEntry, Error>> {
        self.builder.build().filter(|result| {
            result.as_ref().map_or(true, |entry| {
                entry
                    .file_type()
                    .is_some_and(|file_type| file_type.is_file())
            })
        })
    }
}
