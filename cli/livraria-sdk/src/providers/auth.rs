//! The authentication gate.
//!
//! [SessionManager] is the only place the [Session] changes.
//! Every transition is written to the durable session record,
//! but the in-memory session stays authoritative if the write fails.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::models::credentials::{Credential, CredentialStore};
use crate::models::session::{lock_and_write_session, read_session_record, Session};
use crate::utils::traceable_path;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Unknown user and wrong password are deliberately indistinguishable.
    #[error("usuário ou senha inválidos")]
    InvalidCredentials,
}

/// Owns the [Session] and its durable record.
///
/// Transitions take `&mut self`, so writes of the session record
/// never overlap within a process.
/// Across processes they are serialized by a lock on the record.
#[derive(Debug)]
pub struct SessionManager {
    credentials: CredentialStore,
    record_path: PathBuf,
    session: Session,
}

impl SessionManager {
    /// Create a manager that starts unauthenticated,
    /// without looking at the durable record.
    pub fn new(credentials: CredentialStore, record_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials,
            record_path: record_path.into(),
            session: Session::Unauthenticated,
        }
    }

    /// Create a manager whose initial state is the restored session.
    pub fn start(credentials: CredentialStore, record_path: impl Into<PathBuf>) -> Self {
        let mut manager = Self::new(credentials, record_path);
        manager.session = manager.restore_session();
        manager
    }

    /// Read the session left behind by a previous process.
    ///
    /// Fails closed: a missing, unreadable or malformed record yields
    /// [Session::Unauthenticated], as does a record whose user
    /// no longer matches the credential store.
    /// A rejected record is overwritten with a logged out one.
    #[instrument(skip(self), fields(path = traceable_path(&self.record_path)))]
    pub fn restore_session(&self) -> Session {
        let record = match read_session_record(&self.record_path) {
            Ok(Some(record)) => record,
            Ok(None) => return Session::Unauthenticated,
            Err(err) => {
                warn!(error = %err, "ignoring unusable session record");
                self.persist(&Session::Unauthenticated);
                return Session::Unauthenticated;
            },
        };

        match record.into_session() {
            Session::Authenticated(user) => {
                match self.credentials.authenticate(&user.username, &user.password) {
                    Some(current) => {
                        debug!(username = %current.username, "restored session");
                        Session::Authenticated(current.clone())
                    },
                    None => {
                        warn!(
                            username = %user.username,
                            "restored user no longer matches the credential store"
                        );
                        self.persist(&Session::Unauthenticated);
                        Session::Unauthenticated
                    },
                }
            },
            Session::Unauthenticated => Session::Unauthenticated,
        }
    }

    /// Attempt to log in.
    ///
    /// On failure the session ends, even if another user was logged in,
    /// and the durable record is cleared.
    #[instrument(skip(self, password))]
    pub fn login(&mut self, username: &str, password: &str) -> Result<Credential, AuthError> {
        match self.credentials.authenticate(username, password) {
            Some(user) => {
                let user = user.clone();
                info!("login succeeded");
                self.transition(Session::Authenticated(user.clone()));
                Ok(user)
            },
            None => {
                info!("login rejected");
                self.transition(Session::Unauthenticated);
                Err(AuthError::InvalidCredentials)
            },
        }
    }

    /// End the current session.
    #[instrument(skip(self))]
    pub fn logout(&mut self) {
        if let Some(user) = self.session.user() {
            info!(username = %user.username, "logging out");
        }
        self.transition(Session::Unauthenticated);
    }

    /// Write `session` to the durable record.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn persist(&self, session: &Session) {
        if let Err(err) = lock_and_write_session(session, &self.record_path) {
            warn!(
                error = %err,
                path = traceable_path(&self.record_path),
                "failed to persist session, continuing with in-memory session"
            );
        }
    }

    fn transition(&mut self, session: Session) {
        self.session = session;
        self.persist(&self.session);
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_user(&self) -> Option<&Credential> {
        self.session.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_active()
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn record_path(&self) -> &Path {
        &self.record_path
    }
}
