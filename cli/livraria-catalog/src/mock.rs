//! A catalog client that answers from seeded responses.
//!
//! Responses are queued per subject and consumed in order.
//! Subjects without a queued response return no books.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::client::ClientTrait;
use crate::error::FetchError;
use crate::types::Book;

/// A canned answer to a search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Search { books: Vec<Book> },
    Error { status: u16 },
}

#[derive(Debug, Error)]
pub enum MockDataError {
    #[error("failed to read mock response file")]
    ReadMockFile(#[source] std::io::Error),
    #[error("failed to parse mock response file")]
    ParseJson(#[source] serde_json::Error),
}

#[derive(Debug)]
struct QueuedResponse {
    response: Response,
    delay: Option<Duration>,
}

type MockResponses = Arc<Mutex<HashMap<String, VecDeque<QueuedResponse>>>>;

/// A catalog client that can be seeded with mock responses
#[derive(Debug, Default)]
pub struct MockClient {
    mock_responses: MockResponses,
}

impl MockClient {
    /// Create a new mock client, potentially reading mock responses from disk.
    ///
    /// The file holds a JSON object mapping subjects to a list of responses.
    pub fn new(mock_data_path: Option<impl AsRef<Path>>) -> Result<Self, MockDataError> {
        let client = Self::default();
        let Some(path) = mock_data_path else {
            return Ok(client);
        };

        let contents = std::fs::read_to_string(path).map_err(MockDataError::ReadMockFile)?;
        let seeded: HashMap<String, Vec<Response>> =
            serde_json::from_str(&contents).map_err(MockDataError::ParseJson)?;
        for (subject, responses) in seeded {
            for response in responses {
                client.push(&subject, response, None);
            }
        }
        Ok(client)
    }

    /// Queue a successful search response for `subject`
    pub fn push_search_response(&self, subject: impl AsRef<str>, books: Vec<Book>) {
        self.push(subject, Response::Search { books }, None);
    }

    /// Queue a successful search response that resolves after `delay`
    pub fn push_delayed_search_response(
        &self,
        subject: impl AsRef<str>,
        books: Vec<Book>,
        delay: Duration,
    ) {
        self.push(subject, Response::Search { books }, Some(delay));
    }

    /// Queue an error response with the given HTTP status for `subject`
    pub fn push_error_response(&self, subject: impl AsRef<str>, status: u16) {
        self.push(subject, Response::Error { status }, None);
    }

    fn push(&self, subject: impl AsRef<str>, response: Response, delay: Option<Duration>) {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .entry(subject.as_ref().to_string())
            .or_default()
            .push_back(QueuedResponse { response, delay });
    }

    fn pop(&self, subject: &str) -> Option<QueuedResponse> {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .get_mut(subject)
            .and_then(VecDeque::pop_front)
    }
}

impl ClientTrait for MockClient {
    async fn search(
        &self,
        subject: impl AsRef<str> + Send + Sync,
    ) -> Result<Vec<Book>, FetchError> {
        let subject = subject.as_ref();
        let Some(QueuedResponse { response, delay }) = self.pop(subject) else {
            debug!(subject, "no mock response queued, returning no books");
            return Ok(vec![]);
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match response {
            Response::Search { books } => Ok(books),
            Response::Error { status } => Err(FetchError::Status(
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pollster::FutureExt;
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn mock_client_uses_seeded_responses_in_order() {
        let client = MockClient::default();
        client.push_search_response("romance", vec![Book::new("R1", "First")]);
        client.push_search_response("romance", vec![Book::new("R2", "Second")]);

        let first = client.search("romance").block_on().unwrap();
        let second = client.search("romance").block_on().unwrap();
        assert_eq!(first, vec![Book::new("R1", "First")]);
        assert_eq!(second, vec![Book::new("R2", "Second")]);
    }

    #[test]
    fn unseeded_subject_returns_no_books() {
        let client = MockClient::default();
        client.push_search_response("romance", vec![Book::new("R1", "First")]);

        let books = client.search("terror").block_on().unwrap();
        assert!(books.is_empty());
    }

    #[test]
    fn error_response_is_status_error() {
        let client = MockClient::default();
        client.push_error_response("terror", 500);

        let result = client.search("terror").block_on();
        assert!(matches!(result, Err(FetchError::Status(status)) if status.as_u16() == 500));
    }

    #[test]
    fn reads_responses_from_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(
            br#"{
                "fantasia": [
                    { "type": "search", "books": [ { "id": "B1", "title": "Dragon Keep" } ] },
                    { "type": "error", "status": 502 }
                ]
            }"#,
        )
        .unwrap();

        let client = MockClient::new(Some(tmp.path())).unwrap();
        let books = client.search("fantasia").block_on().unwrap();
        assert_eq!(books, vec![Book::new("B1", "Dragon Keep")]);
        assert!(client.search("fantasia").block_on().is_err());
    }

    #[test]
    fn error_when_invalid_json() {
        let tmp = NamedTempFile::new().unwrap();
        let result = MockClient::new(Some(tmp.path()));
        assert!(matches!(result, Err(MockDataError::ParseJson(_))));
    }
}
