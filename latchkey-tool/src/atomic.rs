//! Atomic file writes: write to a temp file in the target directory, then
//! rename over the destination, so a crash mid-write never leaves a
//! half-written file in place.

use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `contents` to `path` atomically.
///
/// The temp file is created in `path`'s parent directory so the final
/// rename is same-filesystem and therefore atomic on POSIX.
pub async fn atomic_write(path: &Path, contents: Vec<u8>) -> io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"))?
        .to_path_buf();
    let target = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let tmp = NamedTempFile::new_in(&parent)?;
        std::fs::write(tmp.path(), &contents)?;
        tmp.persist(&target)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(())
    })
    .await
    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        atomic_write(&path, b"first".to_vec()).await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "first");

        atomic_write(&path, b"second".to_vec()).await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "second");
    }
}
