//! Configuration types for catalog client construction.

/// The public volumes endpoint used when no catalog URL is configured.
pub const DEFAULT_CATALOG_URL: &str = "https://www.googleapis.com/books/v1/volumes";

/// Configuration for catalog client construction.
#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    /// Full URL of the volumes endpoint, without a query string.
    pub catalog_url: String,
    /// Optional user agent sent with every request.
    pub user_agent: Option<String>,
}

impl Default for CatalogClientConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            user_agent: None,
        }
    }
}
