//! Error handling for catalog operations.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors constructing a [crate::CatalogClient].
#[derive(Debug, Error)]
pub enum CatalogClientError {
    #[error("invalid catalog url '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("could not build catalog HTTP client")]
    BuildClient(#[source] reqwest::Error),
}

/// A search request that did not produce a result set.
///
/// Every variant is recoverable by retrying.
/// Callers are expected to show an empty result list alongside the error.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("não foi possível acessar o catálogo")]
    Request(#[source] reqwest::Error),
    #[error("o catálogo respondeu com {0}")]
    Status(StatusCode),
    #[error("resposta do catálogo inválida")]
    Decode(#[source] reqwest::Error),
}

/// A single catalog record that could not be turned into a [crate::Book].
///
/// Mapping errors never fail a whole search, the offending record is dropped.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("record is not a catalog volume")]
    Malformed(#[source] serde_json::Error),
    #[error("volume '{id}' has no title")]
    MissingTitle { id: String },
}
