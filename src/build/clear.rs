//! Clear the output directory.

use std::{io, path::Path};

use tokio::fs::{create_dir_all, remove_dir_all};
use tracing::debug;

/// Remove the directory and its content, then recreate it empty.
///
/// Removal is best-effort: a missing directory or a failed removal is not an
/// error. Failing to recreate the directory is.
pub async fn clear_dir(dir: impl AsRef<Path>) -> io::Result<()> {
    let dir = dir.as_ref();

    if let Err(error) = remove_dir_all(dir).await {
        debug!("Could not remove {:?}: {}", dir, error);
    }

    create_dir_all(dir).await
}
