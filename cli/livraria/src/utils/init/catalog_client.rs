use std::path::PathBuf;

use anyhow::{Context, bail};
use livraria_sdk::catalog::{CatalogClient, CatalogClientConfig, Client, MockClient};
use livraria_sdk::utils::traceable_path;
use tracing::debug;

use crate::config::Config;

/// Path to a JSON file of canned catalog responses
pub const CATALOG_MOCK_DATA_VAR: &str = "_LIVRARIA_USE_CATALOG_MOCK";

/// Initialize the catalog client
///
/// - Initialize a mock client if `_LIVRARIA_USE_CATALOG_MOCK` points to mock data
/// - Initialize a real client for the configured (or default) URL otherwise
pub fn init_catalog_client(config: &Config) -> Result<Client, anyhow::Error> {
    if let Ok(path_str) = std::env::var(CATALOG_MOCK_DATA_VAR) {
        let path = PathBuf::from(path_str);
        if !path.exists() {
            bail!("path to mock data file doesn't exist: {}", path.display());
        }

        debug!(
            mock_data_path = traceable_path(&path),
            "using mock catalog client"
        );
        return Ok(MockClient::new(Some(path))?.into());
    }

    let mut client_config = CatalogClientConfig {
        user_agent: Some(format!("livraria/{}", env!("CARGO_PKG_VERSION"))),
        ..Default::default()
    };
    if let Some(catalog_url) = &config.livraria.catalog_url {
        client_config.catalog_url = catalog_url.clone();
    }

    debug!("using catalog client with url: {}", client_config.catalog_url);
    let client = CatalogClient::new(client_config).context("Não foi possível criar o cliente do catálogo")?;
    Ok(client.into())
}
