use std::fmt::{self, Display};

use anyhow::{Context, Result, bail};
use bpaf::Bpaf;
use livraria_sdk::catalog::{Book, ClientTrait};
use livraria_sdk::livraria::Livraria;
use livraria_sdk::models::browser::Browser;
use livraria_sdk::models::search::{SUBJECTS, SearchStatus, Subject};
use tracing::{debug, instrument};

use super::CommandError;
use super::search::{NO_RESULTS, resolve_subject};
use crate::config::Config;
use crate::utils::dialog::{Dialog, Select, is_cancellation};
use crate::utils::display::{
    DisplayBookDetails,
    DisplayBookLine,
    DisplayFavoritesGrid,
    grid_columns,
    viewport_width,
};
use crate::utils::init::init_catalog_client;
use crate::utils::message;

// Navega pelo catálogo interativamente
#[derive(Debug, Bpaf, Clone)]
pub struct Browse {
    /// O assunto inicial, por padrão o assunto configurado
    #[bpaf(positional("subject"))]
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Details,
    ToggleFavorite,
    ChangeSubject,
    Favorites,
    Logout,
    Quit,
}

impl Action {
    /// The actions offered for a search in `status`
    fn offered(status: SearchStatus<'_>, has_favorites: bool) -> Vec<Action> {
        let mut actions = vec![];
        if matches!(status, SearchStatus::Results(_)) {
            actions.extend([Action::Details, Action::ToggleFavorite]);
        }
        actions.push(Action::ChangeSubject);
        if has_favorites {
            actions.push(Action::Favorites);
        }
        actions.extend([Action::Logout, Action::Quit]);
        actions
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Details => "Ver detalhes",
            Action::ToggleFavorite => "Marcar/desmarcar favorito",
            Action::ChangeSubject => "Trocar assunto",
            Action::Favorites => "★ Ver favoritos",
            Action::Logout => "Sair da conta",
            Action::Quit => "Fechar",
        };
        write!(f, "{label}")
    }
}

/// A book offered in a picker
struct BookChoice {
    book: Book,
    is_favorite: bool,
}

impl Display for BookChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        DisplayBookLine {
            book: &self.book,
            is_favorite: self.is_favorite,
        }
        .fmt(f)
    }
}

struct SubjectChoice(&'static Subject);

impl Display for SubjectChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.label)
    }
}

impl Browse {
    #[instrument(name = "browse", skip_all)]
    pub async fn handle(self, config: Config, livraria: &mut Livraria) -> Result<()> {
        if !Dialog::can_prompt() {
            bail!(CommandError::CannotPrompt);
        }
        let client = init_catalog_client(&config)?;
        let subject = resolve_subject(self.subject.as_deref(), &config);

        let Some(browser) = livraria.browser_mut() else {
            bail!(CommandError::NotLoggedIn);
        };
        message::plain(format!("Olá, {}!", browser.user().display_name));

        let logout = browse_loop(browser, &client, &config, subject).await?;
        if logout {
            livraria.logout();
            message::updated("Logout realizado");
        }
        Ok(())
    }
}

/// Run the menu until the user quits or logs out.
///
/// Returns whether the user asked to log out.
async fn browse_loop(
    browser: &mut Browser,
    client: &impl ClientTrait,
    config: &Config,
    subject: String,
) -> Result<bool> {
    run_search(browser, client, &subject).await;

    loop {
        let actions = Action::offered(
            browser.search_state().status(),
            !browser.favorites().is_empty(),
        );
        let Some(action) = prompt_select("O que deseja fazer?", actions).await? else {
            browser.leave_search();
            return Ok(false);
        };
        debug!(?action, "selected action");

        match action {
            Action::Details => {
                if let Some(book) = pick_book(browser, browser.search_state().results()).await? {
                    println!("{}\n", DisplayBookDetails(&book));
                }
            },
            Action::ToggleFavorite => {
                if let Some(book) = pick_book(browser, browser.search_state().results()).await? {
                    let is_favorite = browser.toggle_favorite(&book.id)?;
                    if is_favorite {
                        message::created(format!("'{}' adicionado aos favoritos", book.title));
                    } else {
                        message::deleted(format!("'{}' removido dos favoritos", book.title));
                    }
                }
            },
            Action::ChangeSubject => {
                let choices = SUBJECTS.iter().map(SubjectChoice).collect();
                if let Some(SubjectChoice(subject)) =
                    prompt_select("Escolha um assunto", choices).await?
                {
                    run_search(browser, client, subject.query).await;
                }
            },
            Action::Favorites => show_favorites(browser, config).await?,
            Action::Logout => {
                browser.leave_search();
                return Ok(true);
            },
            Action::Quit => {
                browser.leave_search();
                return Ok(false);
            },
        }
    }
}

async fn run_search(browser: &mut Browser, client: &impl ClientTrait, subject: &str) {
    message::plain(format!("Buscando livros sobre '{subject}'..."));
    browser.search(client, subject).await;

    match browser.search_state().status() {
        SearchStatus::Results(books) => {
            for book in books {
                println!("{}", DisplayBookLine {
                    book,
                    is_favorite: browser.is_favorite(&book.id),
                });
            }
            println!();
        },
        SearchStatus::Failed(err) => message::error(format!("Erro ao buscar livros: {err}")),
        SearchStatus::NoResults | SearchStatus::Idle | SearchStatus::Loading => {
            message::plain(NO_RESULTS)
        },
    }
}

/// Render the favorites grid and offer to remove entries
async fn show_favorites(browser: &mut Browser, config: &Config) -> Result<()> {
    let favorites = browser.favorites().all();
    if favorites.is_empty() {
        message::plain("Nenhum favorito ainda.");
        return Ok(());
    }

    let (columns, width) = favorites_layout(config);
    println!("Meus Favoritos\n");
    print!("{}", DisplayFavoritesGrid {
        books: &favorites,
        columns,
        width,
    });

    let choices = favorites
        .into_iter()
        .map(|book| BookChoice {
            book,
            is_favorite: true,
        })
        .collect();
    if let Some(choice) = prompt_select("Remover um favorito?", choices).await? {
        if let Some(removed) = browser.remove_favorite(&choice.book.id) {
            message::deleted(format!("'{}' removido dos favoritos", removed.title));
        }
    }
    Ok(())
}

/// Column count and width in cells for the favorites grid
fn favorites_layout(config: &Config) -> (usize, usize) {
    let (cells, width_px) = match crossterm::terminal::window_size() {
        Ok(size) => (size.columns, size.width),
        Err(err) => {
            debug!(%err, "could not query terminal size");
            (80, 0)
        },
    };
    let columns = config
        .livraria
        .grid_columns
        .unwrap_or_else(|| grid_columns(viewport_width(cells, width_px)));
    (columns, cells as usize)
}

async fn pick_book(browser: &Browser, books: &[Book]) -> Result<Option<Book>> {
    let choices = books
        .iter()
        .map(|book| BookChoice {
            book: book.clone(),
            is_favorite: browser.is_favorite(&book.id),
        })
        .collect();
    Ok(prompt_select("Escolha um livro", choices)
        .await?
        .map(|choice| choice.book))
}

/// Prompt for one of `options`, [None] if the user backed out
async fn prompt_select<T: Display>(message: &str, options: Vec<T>) -> Result<Option<T>> {
    let result = Dialog {
        message,
        help_message: Some("Esc para voltar"),
        typed: Select { options },
    }
    .prompt()
    .await;

    match result {
        Ok(choice) => Ok(Some(choice)),
        Err(err) if is_cancellation(&err) => Ok(None),
        Err(err) => Err(err).context("Não foi possível ler a seleção"),
    }
}

#[cfg(test)]
mod tests {
    use livraria_sdk::catalog::MockClient;
    use livraria_sdk::models::credentials::{Credential, CredentialId};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::utils::message::history::History;

    fn browser() -> Browser {
        Browser::new(Credential {
            id: CredentialId::Number(1),
            username: "ana".to_string(),
            password: "1234".to_string(),
            display_name: "Ana".to_string(),
        })
    }

    #[test]
    fn actions_depend_on_results_and_favorites() {
        assert_eq!(Action::offered(SearchStatus::Idle, false), vec![
            Action::ChangeSubject,
            Action::Logout,
            Action::Quit
        ]);

        let books = [Book::new("B1", "Dragon Keep")];
        assert_eq!(Action::offered(SearchStatus::Results(&books), true), vec![
            Action::Details,
            Action::ToggleFavorite,
            Action::ChangeSubject,
            Action::Favorites,
            Action::Logout,
            Action::Quit
        ]);
    }

    #[test]
    fn configured_columns_override_terminal() {
        let mut config = Config::default();
        config.livraria.grid_columns = Some(3);
        let (columns, _) = favorites_layout(&config);
        assert_eq!(columns, 3);
    }

    #[tokio::test]
    async fn failed_search_is_reported_inline() {
        let client = MockClient::default();
        client.push_error_response("terror", 500);

        let mut browser = browser();
        run_search(&mut browser, &client, "terror").await;

        let last = History::global().messages().back().cloned().unwrap();
        assert!(last.starts_with("❌ ERROR: Erro ao buscar livros"), "{last}");
        assert!(browser.search_state().results().is_empty());
    }

    #[tokio::test]
    async fn empty_search_is_reported_inline() {
        let client = MockClient::default();

        let mut browser = browser();
        run_search(&mut browser, &client, "poesia").await;

        assert_eq!(History::global().messages().back().unwrap(), NO_RESULTS);
    }
}
