use std::fmt::Display;

use crossterm::tty::IsTty;
use inquire::ui::{Attributes, Color, RenderConfig, StyleSheet, Styled};

use super::TERMINAL_STDERR;

#[derive(Clone)]
pub struct Select<T> {
    pub options: Vec<T>,
}

/// A masked text input
#[derive(Debug, Clone)]
pub struct Password;

#[derive(Debug, Clone)]
pub struct Dialog<'a, Type> {
    pub message: &'a str,
    pub help_message: Option<&'a str>,
    pub typed: Type,
}

struct Choice(usize, String);
impl Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.1.fmt(f)
    }
}

impl<T: Display> Dialog<'_, Select<T>> {
    pub async fn prompt(self) -> inquire::error::InquireResult<T> {
        let message = self.message.to_owned();
        let help_message = self.help_message.map(ToOwned::to_owned);
        let mut options = self.typed.options;

        let choices = options
            .iter()
            .map(ToString::to_string)
            .enumerate()
            .map(|(id, value)| Choice(id, value))
            .collect();

        let Choice(id, _) = tokio::task::spawn_blocking(move || {
            let _stderr_lock = TERMINAL_STDERR.lock();

            let mut dialog =
                inquire::Select::new(&message, choices).with_render_config(livraria_theme());

            if let Some(ref help_message) = help_message {
                dialog = dialog.with_help_message(help_message);
            }

            dialog.prompt()
        })
        .await
        .map_err(|e| inquire::InquireError::Custom(Box::new(e)))??;

        Ok(options.remove(id))
    }
}

impl Dialog<'_, Password> {
    pub async fn prompt(self) -> inquire::error::InquireResult<String> {
        let message = self.message.to_owned();
        let help_message = self.help_message.map(ToOwned::to_owned);

        tokio::task::spawn_blocking(move || {
            let _stderr_lock = TERMINAL_STDERR.lock();

            let mut dialog = inquire::Password::new(&message)
                .without_confirmation()
                .with_render_config(livraria_theme());

            if let Some(ref help_message) = help_message {
                dialog = dialog.with_help_message(help_message);
            }

            dialog.prompt()
        })
        .await
        .map_err(|e| inquire::InquireError::Custom(Box::new(e)))?
    }
}

impl Dialog<'_, ()> {
    /// True if stderr and stdin are ttys
    pub fn can_prompt() -> bool {
        if std::env::var("_LIVRARIA_NO_PROMPT").is_ok_and(|v| v == "1") {
            return false;
        }
        std::io::stderr().is_tty() && std::io::stdin().is_tty()
    }
}

/// Whether the user backed out of a prompt with escape or ctrl-c
pub fn is_cancellation(err: &inquire::InquireError) -> bool {
    matches!(
        err,
        inquire::InquireError::OperationCanceled | inquire::InquireError::OperationInterrupted
    )
}

pub fn livraria_theme() -> RenderConfig<'static> {
    let mut render_config = RenderConfig::default_colored();

    let accent = Color::DarkYellow;
    render_config.answered_prompt_prefix = Styled::new(">").with_fg(accent);
    render_config.highlighted_option_prefix = Styled::new(">").with_fg(accent);
    render_config.prompt_prefix = Styled::new("?").with_fg(accent);
    render_config.prompt = StyleSheet::new().with_attr(Attributes::BOLD);
    render_config.help_message = Styled::new("").with_fg(Color::DarkCyan).style;
    render_config.answer = Styled::new("").with_fg(accent).style;

    render_config
}
