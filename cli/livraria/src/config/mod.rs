use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::{env, fs};

use anyhow::{Context, Result};
use config::{Config as HierarchicalConfig, Environment};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of livraria managed directories (config, data)
const LIVRARIA_DIR_NAME: &str = "livraria";
const LIVRARIA_CONFIG_DIR_VAR: &str = "LIVRARIA_CONFIG_DIR";
const LIVRARIA_ENV_PREFIX: &str = "LIVRARIA_";
pub const LIVRARIA_CONFIG_FILE: &str = "livraria.toml";

#[derive(Clone, Debug, Deserialize, Default, Serialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub livraria: LivrariaConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct LivrariaConfig {
    /// Directory where the session record is kept (default:
    /// `$XDG_DATA_HOME/livraria`)
    pub data_dir: PathBuf,
    /// Directory the configuration file is loaded from (default:
    /// `$XDG_CONFIG_HOME/livraria`)
    pub config_dir: PathBuf,

    /// The URL of the volumes endpoint to search
    pub catalog_url: Option<String>,

    /// A JSON list of accounts replacing the bundled ones
    pub credentials_file: Option<PathBuf>,

    /// The subject searched when none is given
    pub default_subject: Option<String>,

    /// Fixed number of favorites columns, overriding the terminal width
    pub grid_columns: Option<usize>,
}

impl Config {
    /// Creates a [Config] from the environment and config files
    pub fn parse() -> Result<Config> {
        let config_dir = match env::var(LIVRARIA_CONFIG_DIR_VAR) {
            Ok(v) => {
                debug!("`${LIVRARIA_CONFIG_DIR_VAR}` set: {v}");
                PathBuf::from(v)
            },
            Err(_) => {
                let config_dir = dirs::config_dir()
                    .context("Não foi possível determinar o diretório de configuração do usuário")?
                    .join(LIVRARIA_DIR_NAME);
                debug!("`${LIVRARIA_CONFIG_DIR_VAR}` not set, using {config_dir:?}");
                config_dir
            },
        };
        fs::create_dir_all(&config_dir)
            .context(format!("Não foi possível criar o diretório de configuração: {config_dir:?}"))?;

        let data_dir = dirs::data_dir()
            .context("Não foi possível determinar o diretório de dados do usuário")?
            .join(LIVRARIA_DIR_NAME);

        let livraria_envs = env::vars().filter_map(|(k, v)| {
            k.strip_prefix(LIVRARIA_ENV_PREFIX)
                .map(|k| (k.to_owned(), v))
        });

        Self::parse_in(
            &[PathBuf::from("/etc")
                .join(LIVRARIA_DIR_NAME)
                .join(LIVRARIA_CONFIG_FILE)],
            &config_dir,
            &data_dir,
            livraria_envs,
        )
    }

    /// Layer the given config files, the user config file
    /// and `envs` (already stripped of their prefix) over the defaults.
    fn parse_in(
        system_files: &[PathBuf],
        config_dir: &Path,
        data_dir: &Path,
        envs: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Config> {
        let mut builder = HierarchicalConfig::builder()
            .set_default("data_dir", data_dir.to_string_lossy().into_owned())?
            // Config dir is added to the config for completeness;
            // the config file cannot change the config dir.
            .set_override("config_dir", config_dir.to_string_lossy().into_owned())?;

        for file in system_files {
            builder = builder.add_source(
                config::File::from(file.as_path())
                    .format(config::FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder
            .add_source(
                config::File::from(config_dir.join(LIVRARIA_CONFIG_FILE))
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::default()
                    .source(Some(HashMap::from_iter(envs)))
                    .try_parsing(true),
            );

        let final_config = builder.build()?;
        let config: Config = final_config
            .try_deserialize()
            .context("Configuração inválida")?;
        Ok(config)
    }
}
