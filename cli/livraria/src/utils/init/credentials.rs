use anyhow::{Context, Result};
use livraria_sdk::models::credentials::CredentialStore;
use livraria_sdk::utils::traceable_path;
use tracing::debug;

use crate::config::Config;

/// Accounts available when no credentials file is configured
const BUNDLED_CREDENTIALS: &str = include_str!("../../../data/usuarios.json");

/// Load the configured credentials file, or the bundled accounts
pub fn init_credentials(config: &Config) -> Result<CredentialStore> {
    let store = match &config.livraria.credentials_file {
        Some(path) => {
            debug!(path = traceable_path(path), "reading credentials file");
            CredentialStore::from_path(path)
                .with_context(|| format!("Não foi possível carregar as contas de {}", path.display()))?
        },
        None => CredentialStore::from_json(BUNDLED_CREDENTIALS)
            .context("Não foi possível carregar as contas embutidas")?,
    };
    debug!(n_accounts = store.len(), "credentials loaded");
    Ok(store)
}
