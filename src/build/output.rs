//! Write output files.

use std::{io, path::Path};

use tokio::fs::{copy, create_dir_all, write};
use tracing::trace;

/// Write content to a file, creating its parent directories.
pub async fn write_file(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> io::Result<()> {
    let path = path.as_ref();

    create_parent_dir(path).await?;

    trace!("write({:?})", path);
    write(path, contents).await
}

/// Copy a file byte for byte, creating the parent directories of `to`.
pub async fn copy_file(from: impl AsRef<Path>, to: impl AsRef<Path>) -> io::Result<()> {
    let (from, to) = (from.as_ref(), to.as_ref());

    create_parent_dir(to).await?;

    trace!("copy({:?}, {:?})", from, to);
    copy(from, to).await?;

    Ok(())
}

/// Create the parent directories of a file, if missing.
async fn create_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        trace!("create_dir_all({:?})", dir);
        create_dir_all(dir).await?;
    }
    Ok(())
}
