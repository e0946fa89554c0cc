//! Session error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that end an interactive session
#[derive(Error, Debug)]
pub enum SessionError {
    /// The SSH handshake with the endpoint failed
    #[error("Failed to connect to {address}: {message}")]
    Dial { address: String, message: String },

    /// Credentials could not be loaded or were rejected
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Failed to open session channel: {0}")]
    ChannelOpen(String),

    #[error("PTY request failed: {0}")]
    Pty(String),

    #[error("Failed to start shell: {0}")]
    Shell(String),

    /// Local terminal could not be switched to raw mode
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("Remote command exited with status {0}")]
    RemoteExit(u32),

    #[error("Remote command killed by signal {0}")]
    RemoteSignal(String),

    /// The local process received a termination signal
    #[error("Session interrupted by {0}")]
    Interrupted(&'static str),

    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),
}

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Identity file not found: {}", .0.display())]
    IdentityNotFound(PathBuf),

    #[error("Failed to load identity {}: {message}", .path.display())]
    InvalidKey { path: PathBuf, message: String },

    /// Reading a password or passphrase from the terminal failed
    #[error("Failed to read from terminal: {0}")]
    Prompt(#[source] std::io::Error),

    #[error("Authentication rejected for user '{0}'")]
    Rejected(String),
}
