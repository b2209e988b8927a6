use std::fmt::Write;

use anyhow::{Result, bail};
use bpaf::Bpaf;
use livraria_sdk::catalog::Book;
use livraria_sdk::livraria::Livraria;
use livraria_sdk::models::browser::Browser;
use livraria_sdk::models::search::{DEFAULT_SUBJECT, SUBJECTS, SearchStatus};
use tracing::{debug, instrument};

use super::CommandError;
use crate::config::Config;
use crate::utils::display::DisplayBookLine;
use crate::utils::init::init_catalog_client;
use crate::utils::message;

pub(crate) const NO_RESULTS: &str = "Nenhum livro encontrado.";

// Lista os assuntos
#[derive(Debug, Bpaf, Clone)]
pub struct Subjects {}

impl Subjects {
    pub fn handle(self) -> Result<()> {
        for subject in SUBJECTS {
            println!("{}", subject.label);
        }
        Ok(())
    }
}

// Busca livros sobre um assunto
#[derive(Debug, Bpaf, Clone)]
pub struct Search {
    /// Mostra os resultados como um array JSON
    #[bpaf(long)]
    pub json: bool,

    /// O assunto a buscar, um dos assuntos listados ou qualquer termo.
    ///
    /// Por padrão, o assunto configurado.
    #[bpaf(positional("subject"))]
    pub subject: Option<String>,
}

impl Search {
    #[instrument(name = "search", skip_all, fields(json = self.json))]
    pub async fn handle(self, config: Config, livraria: &mut Livraria) -> Result<()> {
        let subject = resolve_subject(self.subject.as_deref(), &config);
        debug!(%subject, "performing search");

        let Some(browser) = livraria.browser_mut() else {
            bail!(CommandError::NotLoggedIn);
        };

        let client = init_catalog_client(&config)?;
        browser.search(&client, &subject).await;

        let rendered = render_results(browser, self.json)?;
        print!("{rendered}");
        Ok(())
    }
}

/// The query to send for a user supplied subject.
///
/// Labels of listed subjects map to their query,
/// anything else is searched for as is.
pub(crate) fn resolve_subject(subject: Option<&str>, config: &Config) -> String {
    let Some(subject) = subject else {
        return config
            .livraria
            .default_subject
            .clone()
            .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());
    };

    SUBJECTS
        .iter()
        .find(|listed| listed.label.to_lowercase() == subject.to_lowercase())
        .map(|listed| listed.query.to_string())
        .unwrap_or_else(|| subject.to_string())
}

/// Render the current results of `browser` for stdout.
///
/// A failed search is an error, no results are reported on stderr.
pub(crate) fn render_results(browser: &Browser, json: bool) -> Result<String> {
    let state = browser.search_state();
    let books: &[Book] = match state.status() {
        SearchStatus::Failed(err) => {
            bail!("Erro ao buscar livros sobre '{}': {err}", state.subject())
        },
        SearchStatus::Results(books) => books,
        SearchStatus::Idle | SearchStatus::Loading | SearchStatus::NoResults => &[],
    };

    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(books)?));
    }

    if books.is_empty() {
        message::plain(NO_RESULTS);
        return Ok(String::new());
    }

    let mut rendered = String::new();
    for book in books {
        writeln!(rendered, "{}", DisplayBookLine {
            book,
            is_favorite: browser.is_favorite(&book.id),
        })?;
    }
    Ok(rendered)
}
