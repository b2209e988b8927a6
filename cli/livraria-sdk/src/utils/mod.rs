use std::io::BufWriter;
use std::path::{Path, PathBuf};

use fslock::LockFile;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("invalid location for file: {0}")]
    InvalidLocation(PathBuf),
    #[error("failed to open temporary file")]
    OpenTmpFile(#[source] std::io::Error),
    #[error("failed to write temporary file")]
    WriteTmpFile(#[source] serde_json::Error),
    #[error("failed to rename temporary file")]
    RenameTmpFile(#[source] tempfile::PersistError),
}

/// Serialize `value` as JSON to `path`, replacing any previous contents.
///
/// The value is written to a temporary file next to `path` which is then renamed,
/// so readers never observe a partial write.
/// Taking the [LockFile] ensures the write only happens while the lock is held.
pub fn serialize_atomically<T>(
    value: &T,
    path: &impl AsRef<Path>,
    _lock: LockFile,
) -> Result<(), SerializeError>
where
    T: ?Sized + Serialize,
{
    let parent = path
        .as_ref()
        .parent()
        .ok_or(SerializeError::InvalidLocation(path.as_ref().to_path_buf()))?;
    let temp_file = tempfile::NamedTempFile::new_in(parent).map_err(SerializeError::OpenTmpFile)?;

    let writer = BufWriter::new(&temp_file);
    serde_json::to_writer_pretty(writer, value).map_err(SerializeError::WriteTmpFile)?;
    temp_file
        .persist(path.as_ref())
        .map_err(SerializeError::RenameTmpFile)?;
    Ok(())
}

/// Returns a `tracing`-compatible form of a [Path]
pub fn traceable_path(p: impl AsRef<Path>) -> impl tracing::Value {
    let path = p.as_ref();
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_atomically_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("value.json");
        let lock_path = dir.path().join("value.lock");

        for value in [1, 2] {
            let mut lock = LockFile::open(lock_path.as_os_str()).unwrap();
            lock.lock().unwrap();
            serialize_atomically(&value, &path, lock).unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "2");
    }

    #[test]
    fn serialize_atomically_rejects_root() {
        let dir = tempfile::tempdir().unwrap();
        let lock_path = dir.path().join("root.lock");
        let mut lock = LockFile::open(lock_path.as_os_str()).unwrap();
        lock.lock().unwrap();

        let result = serialize_atomically(&1, &Path::new("/"), lock);
        assert!(matches!(result, Err(SerializeError::InvalidLocation(_))));
    }
}
