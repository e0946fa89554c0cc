//! Remote shell channel abstraction

use async_trait::async_trait;
use bytes::Bytes;
use russh::client::Msg;
use russh::{Channel, ChannelMsg, Pty};

use crate::error::SessionError;
use crate::terminal::TerminalSize;

/// Terminal modes requested with the PTY
const PTY_MODES: &[(Pty, u32)] = &[
    (Pty::ECHO, 1),
    (Pty::TTY_OP_ISPEED, 14400),
    (Pty::TTY_OP_OSPEED, 14400),
];

/// Extended data stream number for stderr
const SSH_EXTENDED_DATA_STDERR: u32 = 1;

/// Something that happened on the remote side of the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Stdout(Bytes),
    Stderr(Bytes),
    ExitStatus(u32),
    ExitSignal(String),
    /// Remote will send no more data
    Eof,
    /// Channel is gone
    Closed,
}

/// The parts of a session channel the bridge drives
#[async_trait]
pub trait ShellChannel: Send {
    async fn open_pty(&mut self, term: &str, size: TerminalSize) -> Result<(), SessionError>;

    async fn start_shell(&mut self) -> Result<(), SessionError>;

    async fn write_input(&mut self, data: &[u8]) -> Result<(), SessionError>;

    /// Signal end of local input
    async fn close_input(&mut self) -> Result<(), SessionError>;

    async fn resize(&mut self, size: TerminalSize) -> Result<(), SessionError>;

    /// Next event, or `None` once the channel is closed
    async fn next_event(&mut self) -> Option<ChannelEvent>;
}

/// Wait for the reply to a `want_reply` request
async fn await_reply(channel: &mut Channel<Msg>) -> Result<(), String> {
    loop {
        match channel.wait().await {
            Some(ChannelMsg::Success) => return Ok(()),
            Some(ChannelMsg::Failure) => return Err("request rejected by server".to_string()),
            Some(ChannelMsg::Close) | None => return Err("channel closed".to_string()),
            Some(_) => {}
        }
    }
}

#[async_trait]
impl ShellChannel for Channel<Msg> {
    async fn open_pty(&mut self, term: &str, size: TerminalSize) -> Result<(), SessionError> {
        tracing::debug!("Requesting {} PTY {}x{}", term, size.cols, size.rows);
        self.request_pty(
            true,
            term,
            u32::from(size.cols),
            u32::from(size.rows),
            0,
            0,
            PTY_MODES,
        )
        .await
        .map_err(|e| SessionError::Pty(e.to_string()))?;
        await_reply(self).await.map_err(SessionError::Pty)
    }

    async fn start_shell(&mut self) -> Result<(), SessionError> {
        self.request_shell(true)
            .await
            .map_err(|e| SessionError::Shell(e.to_string()))?;
        await_reply(self).await.map_err(SessionError::Shell)
    }

    async fn write_input(&mut self, data: &[u8]) -> Result<(), SessionError> {
        self.data(data).await?;
        Ok(())
    }

    async fn close_input(&mut self) -> Result<(), SessionError> {
        self.eof().await?;
        Ok(())
    }

    async fn resize(&mut self, size: TerminalSize) -> Result<(), SessionError> {
        self.window_change(u32::from(size.cols), u32::from(size.rows), 0, 0)
            .await?;
        Ok(())
    }

    async fn next_event(&mut self) -> Option<ChannelEvent> {
        loop {
            let event = match self.wait().await? {
                ChannelMsg::Data { data } => ChannelEvent::Stdout(Bytes::copy_from_slice(&data)),
                ChannelMsg::ExtendedData { data, ext } if ext == SSH_EXTENDED_DATA_STDERR => {
                    ChannelEvent::Stderr(Bytes::copy_from_slice(&data))
                }
                ChannelMsg::ExitStatus { exit_status } => ChannelEvent::ExitStatus(exit_status),
                ChannelMsg::ExitSignal { signal_name, .. } => {
                    ChannelEvent::ExitSignal(format!("{:?}", signal_name))
                }
                ChannelMsg::Eof => ChannelEvent::Eof,
                ChannelMsg::Close => ChannelEvent::Closed,
                _ => continue,
            };
            return Some(event);
        }
    }
}
