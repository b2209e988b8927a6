use std::path::{Path, PathBuf};

use fslock::LockFile;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::credentials::Credential;
use crate::utils::{serialize_atomically, traceable_path, SerializeError};

pub const SESSION_RECORD_FILENAME: &str = "session.json";

/// The authentication state of the process.
///
/// A session is active iff it holds exactly one credential.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Unauthenticated,
    Authenticated(Credential),
}

impl Session {
    pub fn is_active(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    pub fn user(&self) -> Option<&Credential> {
        match self {
            Session::Unauthenticated => None,
            Session::Authenticated(user) => Some(user),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("couldn't acquire session record lock")]
    AcquireLock(#[source] fslock::Error),
    #[error("couldn't create session record directory")]
    CreateDir(#[source] std::io::Error),
    #[error("couldn't read session record")]
    ReadFile(#[source] std::io::Error),
    #[error("couldn't parse session record")]
    Parse(#[source] serde_json::Error),
    #[error("failed to write session record")]
    WriteFile(#[source] SerializeError),
}

/// The durable form of a [Session].
///
/// The record is overwritten wholesale on every transition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub is_logged_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_in_user: Option<Credential>,
}

impl From<&Session> for SessionRecord {
    fn from(session: &Session) -> Self {
        SessionRecord {
            is_logged_in: session.is_active(),
            logged_in_user: session.user().cloned(),
        }
    }
}

impl SessionRecord {
    /// Convert the record back into a session.
    ///
    /// A record that claims to be logged in without a user is inconsistent
    /// and restores as [Session::Unauthenticated].
    pub fn into_session(self) -> Session {
        match (self.is_logged_in, self.logged_in_user) {
            (true, Some(user)) => Session::Authenticated(user),
            (true, None) => {
                debug!("session record is logged in without a user, ignoring");
                Session::Unauthenticated
            },
            (false, _) => Session::Unauthenticated,
        }
    }
}

/// Returns the path to the session record inside `data_dir`.
pub fn session_record_path(data_dir: impl AsRef<Path>) -> PathBuf {
    data_dir.as_ref().join(SESSION_RECORD_FILENAME)
}

/// Returns the path to the session record lock file.
///
/// The lock is a separate file because the record itself is replaced on write.
/// The presence of the lock file does not indicate an active lock.
pub(crate) fn session_record_lock_path(record_path: impl AsRef<Path>) -> PathBuf {
    record_path.as_ref().with_extension("lock")
}

/// Returns the parsed session record or `None` if it doesn't yet exist.
pub fn read_session_record(
    path: impl AsRef<Path>,
) -> Result<Option<SessionRecord>, PersistenceError> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = traceable_path(path), "session record not found");
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path).map_err(PersistenceError::ReadFile)?;
    let parsed: SessionRecord =
        serde_json::from_str(&contents).map_err(PersistenceError::Parse)?;
    Ok(Some(parsed))
}

/// Acquires the filesystem-based lock on the session record,
/// creating the containing directory if necessary.
pub fn acquire_session_lock(record_path: impl AsRef<Path>) -> Result<LockFile, PersistenceError> {
    let record_path = record_path.as_ref();
    if let Some(parent) = record_path.parent() {
        std::fs::create_dir_all(parent).map_err(PersistenceError::CreateDir)?;
    }
    let lock_path = session_record_lock_path(record_path);
    let mut lock = LockFile::open(lock_path.as_os_str()).map_err(PersistenceError::AcquireLock)?;
    lock.lock().map_err(PersistenceError::AcquireLock)?;
    Ok(lock)
}

/// Writes the session record to disk.
///
/// Takes a [LockFile] to ensure that the write can only be performed
/// while the lock is held.
/// It is a bug to pass a [LockFile] that doesn't belong to the session record.
pub fn write_session_record(
    record: &SessionRecord,
    path: impl AsRef<Path>,
    lock: LockFile,
) -> Result<(), PersistenceError> {
    serialize_atomically(record, &path, lock).map_err(PersistenceError::WriteFile)
}

/// Acquire the lock and write `session` in one step.
pub fn lock_and_write_session(
    session: &Session,
    path: impl AsRef<Path>,
) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    debug!(path = traceable_path(path), "writing session record");
    let lock = acquire_session_lock(path)?;
    write_session_record(&SessionRecord::from(session), path, lock)
}
