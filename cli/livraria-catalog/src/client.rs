//! Catalog client for the subject-keyed volumes endpoint.

use std::fmt::Debug;
use std::time::Duration;

use enum_dispatch::enum_dispatch;
use tracing::{debug, instrument};
use url::Url;

use crate::config::CatalogClientConfig;
use crate::error::{CatalogClientError, FetchError};
use crate::mock::MockClient;
use crate::types::{map_volumes, Book, VolumesResponse};

/// Either a client for the actual catalog service,
/// or a mock client for testing.
#[derive(Debug)]
#[enum_dispatch(ClientTrait)]
pub enum Client {
    Catalog(CatalogClient),
    Mock(MockClient),
}

/// The catalog API interface.
///
/// This trait enables alternate implementations:
/// - **HTTP**: REST calls to the volumes endpoint via [`CatalogClient`]
/// - **Mock**: canned responses without HTTP via [`MockClient`]
#[enum_dispatch]
#[allow(async_fn_in_trait)]
pub trait ClientTrait {
    /// Search the catalog for books about `subject`.
    ///
    /// Issues exactly one request per call.
    /// Records that cannot be mapped into a [Book] are dropped,
    /// so a successful search may return fewer books than the catalog sent.
    async fn search(
        &self,
        subject: impl AsRef<str> + Send + Sync,
    ) -> Result<Vec<Book>, FetchError>;
}

/// A client for the catalog service.
pub struct CatalogClient {
    client: reqwest::Client,
    endpoint: Url,
    config: CatalogClientConfig,
}

impl Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("catalog_url", &self.config.catalog_url)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog client from configuration.
    pub fn new(config: CatalogClientConfig) -> Result<Self, CatalogClientError> {
        let endpoint =
            Url::parse(&config.catalog_url).map_err(|source| CatalogClientError::InvalidUrl {
                url: config.catalog_url.clone(),
                source,
            })?;
        let client = build_http_client(&config)?;

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    /// Get the configured catalog URL.
    pub fn catalog_url(&self) -> &str {
        &self.config.catalog_url
    }
}

impl ClientTrait for CatalogClient {
    #[instrument(skip_all, fields(subject = %subject.as_ref()))]
    async fn search(
        &self,
        subject: impl AsRef<str> + Send + Sync,
    ) -> Result<Vec<Book>, FetchError> {
        debug!(url = %self.endpoint, "sending search request");

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("q", subject.as_ref())])
            .send()
            .await
            .map_err(FetchError::Request)?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "catalog rejected search request");
            return Err(FetchError::Status(status));
        }

        let body: VolumesResponse = response.json().await.map_err(FetchError::Decode)?;
        let total_items = body.total_items;
        let books = map_volumes(body.items.unwrap_or_default());

        debug!(n_books = books.len(), ?total_items, "received search results");
        Ok(books)
    }
}

/// Build the HTTP client used for catalog requests.
fn build_http_client(config: &CatalogClientConfig) -> Result<reqwest::Client, CatalogClientError> {
    debug!(catalog_url = %config.catalog_url, "building catalog HTTP client");

    let client_builder = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(15))
        .timeout(Duration::from_secs(60));

    let client_builder = if let Some(ref user_agent) = config.user_agent {
        client_builder.user_agent(user_agent)
    } else {
        client_builder
    };

    client_builder.build().map_err(CatalogClientError::BuildClient)
}

#[cfg(test)]
mod tests {
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    const VOLUMES_PATH: &str = "/books/v1/volumes";

    fn client_config(server: &MockServer) -> CatalogClientConfig {
        CatalogClientConfig {
            catalog_url: server.url(VOLUMES_PATH),
            user_agent: None,
        }
    }

    #[test]
    fn rejects_invalid_url() {
        let config = CatalogClientConfig {
            catalog_url: "not a url".to_string(),
            user_agent: None,
        };
        let err = CatalogClient::new(config).unwrap_err();
        assert!(matches!(err, CatalogClientError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn search_sends_encoded_subject_and_maps_items() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path(VOLUMES_PATH)
                .query_param("q", "ficção científica");
            then.status(200).json_body(json!({
                "totalItems": 2,
                "items": [
                    { "id": "B1", "volumeInfo": { "title": "Dragon Keep", "authors": ["Ana"] } },
                    { "id": "B2", "volumeInfo": { "title": "Star Road", "publishedDate": "2001" } }
                ]
            }));
        });

        let client = CatalogClient::new(client_config(&server)).unwrap();
        let books = client.search("ficção científica").await.unwrap();
        mock.assert();

        assert_eq!(books, vec![
            Book {
                authors: Some(vec!["Ana".to_string()]),
                ..Book::new("B1", "Dragon Keep")
            },
            Book {
                published_date: Some("2001".to_string()),
                ..Book::new("B2", "Star Road")
            },
        ]);
    }

    #[tokio::test]
    async fn missing_items_is_zero_results() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|_, then| {
            then.status(200)
                .json_body(json!({ "kind": "books#volumes", "totalItems": 0 }));
        });

        let client = CatalogClient::new(client_config(&server)).unwrap();
        let books = client.search("nothing matches").await.unwrap();
        mock.assert();
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn untitled_records_are_dropped() {
        let server = MockServer::start_async().await;
        server.mock(|_, then| {
            then.status(200).json_body(json!({
                "items": [
                    { "id": "B1", "volumeInfo": {} },
                    { "id": "B2", "volumeInfo": { "title": "Kept" } }
                ]
            }));
        });

        let client = CatalogClient::new(client_config(&server)).unwrap();
        let books = client.search("terror").await.unwrap();
        assert_eq!(books, vec![Book::new("B2", "Kept")]);
    }

    #[tokio::test]
    async fn non_success_status_is_fetch_error() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|_, then| {
            then.status(503).body("try later");
        });

        let client = CatalogClient::new(client_config(&server)).unwrap();
        let result = client.search("romance").await;
        mock.assert();
        assert!(
            matches!(result, Err(FetchError::Status(status)) if status.as_u16() == 503),
            "expected FetchError::Status, found: {result:?}"
        );
    }

    #[tokio::test]
    async fn invalid_body_is_decode_error() {
        let server = MockServer::start_async().await;
        server.mock(|_, then| {
            then.status(200).body("<html>oops</html>");
        });

        let client = CatalogClient::new(client_config(&server)).unwrap();
        let result = client.search("romance").await;
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn unreachable_catalog_is_request_error() {
        let config = CatalogClientConfig {
            // nothing listens on the discard port
            catalog_url: "http://127.0.0.1:9/volumes".to_string(),
            user_agent: None,
        };
        let client = CatalogClient::new(config).unwrap();
        let result = client.search("romance").await;
        assert!(matches!(result, Err(FetchError::Request(_))));
    }

    #[tokio::test]
    async fn user_agent_set_on_requests() {
        let expected_agent = "livraria-test-agent";

        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.header("user-agent", expected_agent);
            then.status(200).json_body(json!({}));
        });

        let config = CatalogClientConfig {
            user_agent: Some(expected_agent.to_owned()),
            ..client_config(&server)
        };

        let client = CatalogClient::new(config).unwrap();
        let _ = client.search("aventura").await;
        mock.assert();
    }
}
