//! The session-scoped state container views read from and dispatch intents into.

use livraria_catalog::{Book, ClientTrait, FetchError};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::models::credentials::Credential;
use crate::models::favorites::FavoriteSet;
use crate::models::search::{SearchState, SearchTicket};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowseError {
    /// Only books that were returned by a search (or are already favorites)
    /// can be toggled.
    #[error("nenhum livro com id '{0}' nos resultados ou favoritos")]
    UnknownBook(String),
}

/// A search that was started but whose request has not been sent yet.
#[derive(Debug, Clone)]
#[must_use = "a pending search does nothing until it is fetched"]
pub struct PendingSearch {
    ticket: SearchTicket,
    subject: String,
}

impl PendingSearch {
    /// Send the request.
    ///
    /// The outcome still has to be applied with [Browser::apply].
    pub async fn fetch(self, client: &impl ClientTrait) -> CompletedSearch {
        let outcome = client.search(&self.subject).await;
        CompletedSearch {
            ticket: self.ticket,
            subject: self.subject,
            outcome,
        }
    }
}

/// The outcome of a [PendingSearch].
#[derive(Debug)]
pub struct CompletedSearch {
    ticket: SearchTicket,
    subject: String,
    outcome: Result<Vec<Book>, FetchError>,
}

/// State of one logged-in browsing session.
///
/// Dropping the browser ends the session's favorites.
#[derive(Debug, Clone)]
pub struct Browser {
    user: Credential,
    search: SearchState,
    favorites: FavoriteSet,
}

impl Browser {
    pub fn new(user: Credential) -> Self {
        Self {
            user,
            search: SearchState::new(),
            favorites: FavoriteSet::new(),
        }
    }

    pub fn user(&self) -> &Credential {
        &self.user
    }

    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    pub fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }

    /// Select a new subject.
    ///
    /// Any search still in flight is superseded.
    pub fn start_search(&mut self, subject: impl Into<String>) -> PendingSearch {
        let subject = subject.into();
        let ticket = self.search.begin(subject.clone());
        PendingSearch { ticket, subject }
    }

    /// Apply a completed search, returning whether it was still current.
    pub fn apply(&mut self, completed: CompletedSearch) -> bool {
        let applied = self.search.complete(completed.ticket, completed.outcome);
        if !applied {
            debug!(subject = %completed.subject, "ignored outcome of superseded search");
        }
        applied
    }

    /// Start, fetch and apply a search in one go.
    #[instrument(skip(self, client), fields(user = %self.user.username))]
    pub async fn search(&mut self, client: &impl ClientTrait, subject: &str) -> bool {
        let pending = self.start_search(subject);
        let completed = pending.fetch(client).await;
        self.apply(completed)
    }

    /// The user navigated away from the search view.
    pub fn leave_search(&mut self) {
        self.search.cancel();
    }

    /// Toggle the favorite mark on the book with `id`.
    ///
    /// Returns whether the book is a favorite afterwards.
    pub fn toggle_favorite(&mut self, id: &str) -> Result<bool, BrowseError> {
        let book = self
            .book(id)
            .ok_or_else(|| BrowseError::UnknownBook(id.to_string()))?;
        let is_favorite = self.favorites.toggle(&book).contains(id);
        debug!(id, is_favorite, "toggled favorite");
        Ok(is_favorite)
    }

    /// Remove a book from the favorites.
    pub fn remove_favorite(&mut self, id: &str) -> Option<Book> {
        self.favorites.remove(id)
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    /// A copy of the book with `id` for a detail view.
    ///
    /// Looks in the current results first, then in the favorites.
    pub fn book(&self, id: &str) -> Option<Book> {
        self.search
            .book(id)
            .or_else(|| self.favorites.get(id))
            .cloned()
    }
}
