//! HTTP client for the remote book catalog.
//!
//! This crate provides:
//! - HTTP client construction for the subject-keyed volumes endpoint
//! - Mapping of heterogeneous catalog records into [`Book`]s
//! - A mock client that can be seeded with responses for tests and demos
//!
//! ## Usage
//!
//! ```ignore
//! use livraria_catalog::{CatalogClient, CatalogClientConfig, ClientTrait};
//!
//! let config = CatalogClientConfig {
//!     catalog_url: "https://www.googleapis.com/books/v1/volumes".to_string(),
//!     user_agent: None,
//! };
//!
//! let client = CatalogClient::new(config)?;
//! let books = client.search("romance").await?;
//! ```

mod client;
mod config;
mod error;
mod mock;
mod types;

pub use client::{CatalogClient, Client, ClientTrait};
pub use config::{CatalogClientConfig, DEFAULT_CATALOG_URL};
pub use error::{CatalogClientError, FetchError, MappingError};
pub use mock::{MockClient, MockDataError, Response};
pub use types::{map_volumes, Book, ImageLinks, Volume, VolumeInfo, VolumesResponse};
pub use reqwest::StatusCode;
