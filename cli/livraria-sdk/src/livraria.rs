use std::path::Path;

use tracing::debug;

use crate::models::browser::Browser;
use crate::models::credentials::{Credential, CredentialStore};
use crate::models::session::session_record_path;
use crate::providers::auth::{AuthError, SessionManager};

/// The main API struct of the application.
///
/// A [Livraria] instance is the single state container the view layer talks to.
/// It pairs the [SessionManager] with the [Browser] of the logged in user;
/// a browser exists exactly while the session is active.
/// Views read from it and dispatch intents, they never own copies of its state.
#[derive(Debug)]
pub struct Livraria {
    sessions: SessionManager,
    browser: Option<Browser>,
}

impl Livraria {
    /// Start the application, restoring the previous session if possible.
    pub fn start(credentials: CredentialStore, data_dir: impl AsRef<Path>) -> Self {
        let sessions = SessionManager::start(credentials, session_record_path(data_dir));
        let browser = sessions.current_user().cloned().map(Browser::new);
        debug!(restored = browser.is_some(), "application started");

        Self {
            sessions,
            browser,
        }
    }

    /// Log in, replacing any previous browsing state.
    pub fn login(&mut self, username: &str, password: &str) -> Result<&mut Browser, AuthError> {
        let result = self.sessions.login(username, password);
        // A failed login ends the session too, so the browser always follows the session.
        self.browser = result.ok().map(Browser::new);
        self.browser.as_mut().ok_or(AuthError::InvalidCredentials)
    }

    /// Log out and drop the browsing state, including favorites.
    pub fn logout(&mut self) {
        self.sessions.logout();
        self.browser = None;
    }

    pub fn current_user(&self) -> Option<&Credential> {
        self.sessions.current_user()
    }

    pub fn browser(&self) -> Option<&Browser> {
        self.browser.as_ref()
    }

    pub fn browser_mut(&mut self) -> Option<&mut Browser> {
        self.browser.as_mut()
    }

    pub fn credentials(&self) -> &CredentialStore {
        self.sessions.credentials()
    }
}
