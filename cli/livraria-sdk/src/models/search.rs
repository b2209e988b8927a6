//! Search state for a browsing context.
//!
//! Searches may overlap: a user can pick a new subject before the previous
//! request resolved.
//! Every search start issues a [SearchTicket] and only the completion holding
//! the most recently issued ticket is applied.
//! Completions of older tickets are discarded no matter when they arrive.

use livraria_catalog::{Book, FetchError};
use tracing::debug;

/// A subject offered for browsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
    pub label: &'static str,
    /// The query sent to the catalog
    pub query: &'static str,
}

/// The curated subjects offered on the home screen.
pub const SUBJECTS: &[Subject] = &[
    Subject {
        label: "Ficção Científica",
        query: "ficção científica",
    },
    Subject {
        label: "Romance",
        query: "romance",
    },
    Subject {
        label: "Aventura",
        query: "aventura",
    },
    Subject {
        label: "Terror",
        query: "terror",
    },
    Subject {
        label: "Fantasia",
        query: "fantasia",
    },
];

pub const DEFAULT_SUBJECT: &str = "ficção científica";

/// Identifies one search request within a [SearchState].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

/// What a view should render for the current search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus<'a> {
    /// No search has been started (or the last one was cancelled before it resolved)
    Idle,
    Loading,
    /// The last search failed; results are empty
    Failed(&'a str),
    /// The last search succeeded but matched nothing
    NoResults,
    Results(&'a [Book]),
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    subject: String,
    results: Vec<Book>,
    loading: bool,
    error: Option<String>,
    /// The most recently issued ticket, `0` before the first search.
    latest: u64,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a search for `subject`, replacing the previous state.
    pub fn begin(&mut self, subject: impl Into<String>) -> SearchTicket {
        self.latest += 1;
        self.subject = subject.into();
        self.results.clear();
        self.error = None;
        self.loading = true;
        debug!(subject = %self.subject, ticket = self.latest, "search started");
        SearchTicket(self.latest)
    }

    /// Apply the outcome of the search identified by `ticket`.
    ///
    /// Returns whether the outcome was applied.
    /// Outcomes of superseded or cancelled searches are ignored.
    pub fn complete(
        &mut self,
        ticket: SearchTicket,
        outcome: Result<Vec<Book>, FetchError>,
    ) -> bool {
        if !self.is_current(ticket) {
            debug!(
                ticket = ticket.0,
                latest = self.latest,
                "discarding stale search outcome"
            );
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(books) => {
                debug!(n_books = books.len(), "search completed");
                self.results = books;
            },
            Err(err) => {
                debug!(%err, "search failed");
                self.results.clear();
                self.error = Some(err.to_string());
            },
        }
        true
    }

    /// Stop waiting for the in-flight search, if any.
    ///
    /// A later completion of that search will be discarded.
    pub fn cancel(&mut self) {
        if self.loading {
            debug!(ticket = self.latest, "search cancelled");
            self.subject.clear();
        }
        self.latest += 1;
        self.loading = false;
    }

    /// Whether `ticket` belongs to the search that is still awaited
    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        self.loading && ticket.0 == self.latest
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn results(&self) -> &[Book] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn status(&self) -> SearchStatus<'_> {
        if self.loading {
            return SearchStatus::Loading;
        }
        if let Some(error) = &self.error {
            return SearchStatus::Failed(error);
        }
        if self.results.is_empty() {
            // Distinguish "never searched" from "searched and found nothing"
            return if self.subject.is_empty() {
                SearchStatus::Idle
            } else {
                SearchStatus::NoResults
            };
        }
        SearchStatus::Results(&self.results)
    }

    /// Look up a book among the current results
    pub fn book(&self, id: &str) -> Option<&Book> {
        self.results.iter().find(|book| book.id == id)
    }
}

#[cfg(test)]
mod tests {
    use livraria_catalog::StatusCode;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    fn books(ids: &[&str]) -> Vec<Book> {
        ids.iter().map(|id| Book::new(*id, *id)).collect()
    }

    fn unavailable() -> FetchError {
        FetchError::Status(StatusCode::SERVICE_UNAVAILABLE)
    }

    #[test]
    fn begin_replaces_previous_state() {
        let mut state = SearchState::new();
        let ticket = state.begin("romance");
        state.complete(ticket, Ok(books(&["R1"])));

        state.begin("terror");
        assert_eq!(state.subject(), "terror");
        assert!(state.results().is_empty());
        assert_eq!(state.status(), SearchStatus::Loading);
    }

    #[test]
    fn last_initiated_search_wins() {
        let mut state = SearchState::new();
        let terror = state.begin("terror");
        let romance = state.begin("romance");

        // romance resolves first, terror arrives late
        assert!(state.complete(romance, Ok(books(&["R1", "R2"]))));
        assert!(!state.complete(terror, Ok(books(&["T1"]))));

        assert_eq!(state.subject(), "romance");
        assert_eq!(state.results(), books(&["R1", "R2"]).as_slice());
    }

    #[test]
    fn stale_outcome_arriving_first_is_discarded() {
        let mut state = SearchState::new();
        let terror = state.begin("terror");
        let romance = state.begin("romance");

        assert!(!state.complete(terror, Ok(books(&["T1"]))));
        assert_eq!(state.status(), SearchStatus::Loading);

        assert!(state.complete(romance, Ok(books(&["R1"]))));
        assert_eq!(state.results(), books(&["R1"]).as_slice());
    }

    #[test]
    fn failure_is_distinct_from_no_results() {
        let mut state = SearchState::new();
        assert_eq!(state.status(), SearchStatus::Idle);

        let ticket = state.begin("terror");
        state.complete(ticket, Err(unavailable()));
        assert!(matches!(state.status(), SearchStatus::Failed(_)));
        assert!(state.results().is_empty());

        let ticket = state.begin("terror");
        state.complete(ticket, Ok(vec![]));
        assert_eq!(state.status(), SearchStatus::NoResults);
    }

    #[test]
    fn cancelled_search_is_ignored() {
        let mut state = SearchState::new();
        let ticket = state.begin("aventura");
        state.cancel();

        assert!(!state.complete(ticket, Ok(books(&["A1"]))));
        assert!(!state.is_loading());
        assert_eq!(state.status(), SearchStatus::Idle);
    }

    proptest! {
        /// Whatever order outcomes arrive in, only the last started search is applied.
        #[test]
        fn only_latest_ticket_applies(n_searches in 1usize..6, arrival_seed in any::<u64>()) {
            let mut state = SearchState::new();
            let tickets = (0..n_searches)
                .map(|n| (n, state.begin(format!("subject-{n}"))))
                .collect::<Vec<_>>();

            let mut arrivals = tickets.clone();
            // deterministic shuffle from the seed
            let len = arrivals.len();
            for i in 0..len {
                let j = (arrival_seed.rotate_left(i as u32) as usize) % len;
                arrivals.swap(i, j);
            }

            let mut applied = vec![];
            for (n, ticket) in arrivals {
                if state.complete(ticket, Ok(books(&[format!("book-{n}").as_str()]))) {
                    applied.push(n);
                }
            }

            prop_assert_eq!(applied, vec![n_searches - 1]);
            prop_assert_eq!(state.subject(), format!("subject-{}", n_searches - 1));
        }
    }
}
