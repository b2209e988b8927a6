use std::io::Stderr;
use std::sync::{LazyLock, Mutex};

pub mod dialog;
pub mod display;
pub mod init;
pub mod message;

/// Serializes writes to stderr between log output and interactive prompts
pub static TERMINAL_STDERR: LazyLock<Mutex<Stderr>> =
    LazyLock::new(|| Mutex::new(std::io::stderr()));
