mod auth;
mod browse;
mod search;

use std::fmt;

use anyhow::{Context, Result};
use bpaf::{Bpaf, ParseFailure};
use indoc::{formatdoc, indoc};
use livraria_sdk::livraria::Livraria;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::utils::init::init_credentials;
use crate::utils::message;

static LIVRARIA_DESCRIPTION: &'_ str = indoc! {"
    Livraria permite explorar um catálogo de livros por assunto e manter uma lista de favoritos.\n\n

    Entre com uma das contas embutidas, escolha um assunto e marque os livros de que gostar."
};

fn vec_len<T>(x: Vec<T>) -> usize {
    Vec::len(&x)
}

#[derive(Bpaf, Clone, Copy, Debug)]
pub enum Verbosity {
    Verbose(
        /// Aumenta o detalhamento dos logs
        ///
        /// Repita para mais detalhes.
        #[bpaf(short('v'), long("verbose"), req_flag(()), many, map(vec_len))]
        usize,
    ),

    /// Mostra apenas logs de erro
    #[bpaf(short, long)]
    Quiet,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Verbose(0)
    }
}

#[derive(Bpaf)]
#[bpaf(options, descr(LIVRARIA_DESCRIPTION))]
pub struct LivrariaCli(#[bpaf(external(livraria_args))] pub LivrariaArgs);

/// Main livraria args parser
///
/// To parse the livraria CLI, use [`LivrariaCli`] instead using [`livraria_cli()`].
#[derive(Debug, Bpaf)]
#[bpaf(ignore_rustdoc)] // we don't want this struct to be interpreted as a group
pub struct LivrariaArgs {
    /// Modo detalhado
    ///
    /// Repita para mais detalhes.
    #[bpaf(external, fallback(Default::default()))]
    pub verbosity: Verbosity,

    #[bpaf(external(commands), optional)]
    command: Option<Commands>,
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command")
    }
}

/// Errors shared by commands that need a logged in user or a terminal
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Você não está logado.\nEntre com 'livraria login <usuário>'.")]
    NotLoggedIn,
    #[error("Não é possível pedir dados ao usuário neste terminal")]
    CannotPrompt,
}

impl LivrariaArgs {
    /// Load configuration dependent state and run the selected command
    pub async fn handle(self, config: Config) -> Result<()> {
        let Some(command) = self.command else {
            print_welcome_message();
            return Ok(());
        };

        match command {
            Commands::Help(help) => {
                help.handle();
                Ok(())
            },
            Commands::Auth(args) => {
                let mut livraria = init_livraria(&config).await?;
                args.handle(&mut livraria).await
            },
            Commands::Discover(args) => {
                let mut livraria = init_livraria(&config).await?;
                args.handle(config, &mut livraria).await
            },
        }
    }
}

/// Restore the application state from the data directory
async fn init_livraria(config: &Config) -> Result<Livraria> {
    let data_dir = &config.livraria.data_dir;
    tokio::fs::create_dir_all(data_dir)
        .await
        .with_context(|| format!("Não foi possível criar o diretório de dados {}", data_dir.display()))?;

    let credentials = init_credentials(config)?;
    let livraria = Livraria::start(credentials, data_dir);
    debug!(
        logged_in = livraria.current_user().is_some(),
        "application state ready"
    );
    Ok(livraria)
}

/// Print a short usage summary
fn print_welcome_message() {
    let version = env!("CARGO_PKG_VERSION");
    message::plain(formatdoc! {r#"
        livraria versão {version}

        Uso: livraria OPÇÕES (login|browse|search|...) [--help]

        Use 'livraria --help' para a lista completa de comandos e mais informações
    "#});
}

#[derive(Bpaf, Clone)]
enum Commands {
    /// Mostra a ajuda
    #[bpaf(command, hide)]
    Help(#[bpaf(external(help))] Help),

    Auth(#[bpaf(external(auth::auth))] auth::Auth),
    Discover(#[bpaf(external(discover_commands))] DiscoverCommands),
}

#[derive(Debug, Bpaf, Clone)]
struct Help {
    /// Comando para o qual mostrar a ajuda
    #[bpaf(positional("cmd"))]
    cmd: Option<String>,
}

/// Force `--help` output for `livraria` with a given command
pub fn display_help(cmd: Option<String>) {
    let mut args = Vec::from_iter(cmd.as_deref());
    args.push("--help");

    match livraria_cli().run_inner(&*args) {
        Ok(_) => message::error("Saída de ajuda esperada"),
        Err(ParseFailure::Completion(comp)) => print!("{comp:80}"),
        Err(ParseFailure::Stdout(doc, _)) => message::plain(format!("{doc:80}")),
        Err(ParseFailure::Stderr(err)) => message::error(err),
    }
}
impl Help {
    fn handle(self) {
        display_help(self.cmd);
    }
}

/// Explorar livros
#[derive(Bpaf, Clone)]
enum DiscoverCommands {
    /// Lista os assuntos disponíveis
    #[bpaf(command)]
    Subjects(#[bpaf(external(search::subjects))] search::Subjects),

    /// Busca no catálogo livros sobre um assunto
    #[bpaf(command)]
    Search(#[bpaf(external(search::search))] search::Search),

    /// Navegação interativa: escolha assuntos, marque favoritos e veja detalhes
    #[bpaf(command)]
    Browse(#[bpaf(external(browse::browse))] browse::Browse),
}

impl DiscoverCommands {
    async fn handle(self, config: Config, livraria: &mut Livraria) -> Result<()> {
        match self {
            DiscoverCommands::Subjects(args) => args.handle(),
            DiscoverCommands::Search(args) => args.handle(config, livraria).await,
            DiscoverCommands::Browse(args) => args.handle(config, livraria).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> LivrariaArgs {
        let LivrariaCli(args) = livraria_cli().run_inner(args).unwrap();
        args
    }

    #[test]
    fn verbosity_counts_flags() {
        assert!(matches!(parse(&["-vv"]).verbosity, Verbosity::Verbose(2)));
        assert!(matches!(parse(&["-q"]).verbosity, Verbosity::Quiet));
        assert!(matches!(parse(&[]).verbosity, Verbosity::Verbose(0)));
    }

    #[test]
    fn parses_login_with_password() {
        let args = parse(&["login", "ana", "--password", "1234"]);
        assert!(matches!(
            args.command,
            Some(Commands::Auth(auth::Auth::Login { ref username, password: Some(ref password) }))
                if username == "ana" && password == "1234"
        ));
    }

    #[test]
    fn parses_search_with_and_without_subject() {
        let args = parse(&["search", "terror"]);
        assert!(matches!(
            args.command,
            Some(Commands::Discover(DiscoverCommands::Search(ref search)))
                if search.subject.as_deref() == Some("terror")
        ));

        let args = parse(&["search"]);
        assert!(matches!(
            args.command,
            Some(Commands::Discover(DiscoverCommands::Search(ref search)))
                if search.subject.is_none()
        ));
    }

    #[test]
    fn no_command_is_accepted() {
        assert!(parse(&[]).command.is_none());
    }
}
