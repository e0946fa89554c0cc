//! nssh-session: Interactive SSH session bridge for nssh
//!
//! Dials a port mapping endpoint, authenticates, and bridges the local
//! terminal to one remote shell channel: raw mode for the duration of the
//! session, a PTY sized like the local terminal, stream copying in both
//! directions, and window-change forwarding.

pub mod auth;
pub mod bridge;
pub mod channel;
pub mod client;
pub mod error;
pub mod terminal;

pub use auth::Credentials;
pub use bridge::{
    forward_reader, forward_stdin, resize_signals, LocalStdio, SessionBridge, SessionOutcome,
};
pub use channel::{ChannelEvent, ShellChannel};
pub use client::connect;
pub use error::{AuthError, SessionError};
pub use terminal::{CrosstermTerminal, RawModeGuard, TerminalControl, TerminalSize};
