use anyhow::{Context, Result, bail};
use bpaf::Bpaf;
use livraria_sdk::livraria::Livraria;
use livraria_sdk::models::credentials::SignupRequest;
use tracing::instrument;

use super::CommandError;
use crate::utils::dialog::{Dialog, Password};
use crate::utils::message;

// Comandos de conta
#[derive(Clone, Debug, Bpaf)]
pub enum Auth {
    /// Entra com uma conta existente
    #[bpaf(command)]
    Login {
        /// Senha da conta, solicitada se omitida
        #[bpaf(long, short, argument("password"))]
        password: Option<String>,

        /// Usuário da conta
        #[bpaf(positional("username"))]
        username: String,
    },

    /// Sai da conta e descarta os favoritos da sessão
    #[bpaf(command)]
    Logout,

    /// Mostra o status do login
    #[bpaf(command)]
    Status,

    /// Verifica se uma conta poderia ser criada
    ///
    /// Contas não são salvas: apenas as contas embutidas (ou configuradas) podem entrar.
    #[bpaf(command)]
    Signup {
        /// Senha da nova conta, solicitada se omitida
        #[bpaf(long, short, argument("password"))]
        password: Option<String>,

        /// Confirmação da senha, solicitada se omitida
        #[bpaf(long("confirm"), argument("password"))]
        password_confirmation: Option<String>,

        /// Usuário da nova conta
        #[bpaf(positional("username"))]
        username: String,
    },
}

impl Auth {
    #[instrument(name = "auth", skip_all)]
    pub async fn handle(self, livraria: &mut Livraria) -> Result<()> {
        match self {
            Auth::Login { username, password } => {
                let password = match password {
                    Some(password) => password,
                    None => prompt_password(&format!("Senha de '{username}':")).await?,
                };
                login(livraria, &username, &password)
            },
            Auth::Logout => {
                logout(livraria);
                Ok(())
            },
            Auth::Status => {
                status(livraria);
                Ok(())
            },
            Auth::Signup {
                username,
                password,
                password_confirmation,
            } => {
                let password = match password {
                    Some(password) => password,
                    None => prompt_password("Senha:").await?,
                };
                let password_confirmation = match password_confirmation {
                    Some(confirmation) => confirmation,
                    None => prompt_password("Confirme a senha:").await?,
                };
                signup(livraria, SignupRequest {
                    username,
                    password,
                    password_confirmation,
                })
            },
        }
    }
}

async fn prompt_password(message: &str) -> Result<String> {
    if !Dialog::can_prompt() {
        bail!(CommandError::CannotPrompt);
    }
    let password = Dialog {
        message,
        help_message: None,
        typed: Password,
    }
    .prompt()
    .await
    .context("Não foi possível ler a senha")?;
    Ok(password)
}

pub(crate) fn login(livraria: &mut Livraria, username: &str, password: &str) -> Result<()> {
    let browser = livraria.login(username, password).context("Falha no login")?;
    message::updated(format!("Bem-vindo(a), {}!", browser.user().display_name));
    Ok(())
}

pub(crate) fn logout(livraria: &mut Livraria) {
    if livraria.current_user().is_none() {
        message::warning("Você não está logado");
        return;
    }
    livraria.logout();
    message::updated("Logout realizado");
}

pub(crate) fn status(livraria: &Livraria) {
    match livraria.current_user() {
        Some(user) => message::plain(format!(
            "Logado como {} ({})",
            user.display_name, user.username
        )),
        None => message::warning("Você não está logado."),
    }
}

pub(crate) fn signup(livraria: &Livraria, request: SignupRequest) -> Result<()> {
    livraria
        .credentials()
        .validate_signup(&request)
        .context("Falha no cadastro")?;
    message::created(format!("Cadastro de '{}' aceito", request.username));
    message::plain("Novas contas não são salvas. Entre com uma conta existente.");
    Ok(())
}
