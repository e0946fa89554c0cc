//! Terminal to channel bridge
//!
//! The bridge owns the channel for the whole session. Stdin, stdout and
//! stderr are serviced by their own tasks and talk to the event loop over
//! mpsc channels; a resize watcher does the same for window changes.

use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::channel::{ChannelEvent, ShellChannel};
use crate::error::SessionError;
use crate::terminal::{size_or_default, RawModeGuard, TerminalControl, TerminalSize};

/// Buffer size for a single stdin read
const READ_BUFFER_SIZE: usize = 8192;

/// Chunks queued between a copy task and the event loop
const STREAM_CHANNEL_CAPACITY: usize = 64;

/// Terminal type sent when `$TERM` is unset
const DEFAULT_TERM: &str = "xterm";

/// Local side of the session
pub struct LocalStdio<O, E> {
    /// Chunks read from local input
    pub input: mpsc::Receiver<Bytes>,
    pub stdout: O,
    pub stderr: E,
}

impl<O, E> LocalStdio<O, E> {
    pub fn new(input: mpsc::Receiver<Bytes>, stdout: O, stderr: E) -> Self {
        Self {
            input,
            stdout,
            stderr,
        }
    }
}

impl LocalStdio<tokio::io::Stdout, tokio::io::Stderr> {
    /// The process's own standard streams
    pub fn process() -> Self {
        Self::new(forward_stdin(), tokio::io::stdout(), tokio::io::stderr())
    }
}

/// Forward chunks read from `reader` until EOF or the receiver is dropped
pub fn forward_reader<R>(mut reader: R) -> mpsc::Receiver<Bytes>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
    tokio::spawn(async move {
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send(Bytes::copy_from_slice(&buf[..n])).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to read local input: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

/// Forward the process's stdin from a dedicated thread
///
/// A blocking read on stdin cannot be cancelled, so it runs on a detached
/// thread that exits on the first send after the session is gone.
pub fn forward_stdin() -> mpsc::Receiver<Bytes> {
    let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
    let spawned = std::thread::Builder::new()
        .name("nssh-stdin".to_string())
        .spawn(move || {
            use std::io::Read;

            let mut stdin = std::io::stdin();
            let mut buf = vec![0u8; READ_BUFFER_SIZE];
            loop {
                match stdin.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.blocking_send(Bytes::copy_from_slice(&buf[..n])).is_err() {
                            break;
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        tracing::warn!("Failed to read stdin: {}", e);
                        break;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        tracing::warn!("Failed to start stdin reader: {}", e);
    }
    rx
}

/// Stream of window-change notifications
#[cfg(unix)]
pub fn resize_signals() -> BoxStream<'static, ()> {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::window_change()) {
        Ok(sig) => stream::unfold(sig, |mut sig| async move {
            sig.recv().await.map(|()| ((), sig))
        })
        .boxed(),
        Err(e) => {
            tracing::warn!("Failed to watch for terminal resizes: {}", e);
            stream::empty().boxed()
        }
    }
}

#[cfg(not(unix))]
pub fn resize_signals() -> BoxStream<'static, ()> {
    stream::empty().boxed()
}

/// Resolves with the name of the first termination signal received
#[cfg(unix)]
async fn termination_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let (Ok(mut term), Ok(mut hup)) = (
        signal(SignalKind::terminate()),
        signal(SignalKind::hangup()),
    ) else {
        tracing::warn!("Failed to install termination signal handlers");
        return std::future::pending().await;
    };

    tokio::select! {
        _ = term.recv() => "SIGTERM",
        _ = hup.recv() => "SIGHUP",
    }
}

#[cfg(not(unix))]
async fn termination_signal() -> &'static str {
    std::future::pending().await
}

/// How a session ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    /// Status reported by the remote command, if it sent one
    pub exit_status: Option<u32>,
}

/// Bridges the local terminal to a remote shell channel
pub struct SessionBridge<T: TerminalControl + ?Sized> {
    terminal: Arc<T>,
    term: String,
}

impl<T: TerminalControl + ?Sized + 'static> SessionBridge<T> {
    /// Bridge using `$TERM` (or `xterm`) as the remote terminal type
    pub fn new(terminal: Arc<T>) -> Self {
        let term = std::env::var("TERM")
            .ok()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TERM.to_string());
        Self { terminal, term }
    }

    /// Override the terminal type sent with the PTY request
    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = term.into();
        self
    }

    /// Run one interactive session on `channel` until it closes
    pub async fn run<C, O, E, R>(
        &self,
        channel: &mut C,
        stdio: LocalStdio<O, E>,
        resizes: R,
    ) -> Result<SessionOutcome, SessionError>
    where
        C: ShellChannel + ?Sized,
        O: AsyncWrite + Unpin + Send + 'static,
        E: AsyncWrite + Unpin + Send + 'static,
        R: Stream<Item = ()> + Unpin + Send + 'static,
    {
        let _raw = RawModeGuard::enter(Arc::clone(&self.terminal))?;

        let size = size_or_default(&*self.terminal);
        channel.open_pty(&self.term, size).await?;

        let LocalStdio {
            mut input,
            stdout,
            stderr,
        } = stdio;
        let (stdout_tx, stdout_task) = spawn_writer(stdout, "stdout");
        let (stderr_tx, stderr_task) = spawn_writer(stderr, "stderr");

        if let Err(e) = channel.start_shell().await {
            drop(stdout_tx);
            drop(stderr_tx);
            join_writers(stdout_task, stderr_task).await;
            return Err(e);
        }
        tracing::debug!("Remote shell started");

        let shutdown = CancellationToken::new();
        let (resize_tx, mut resize_rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        let watcher = tokio::spawn(watch_resizes(
            Arc::clone(&self.terminal),
            resizes,
            resize_tx,
            shutdown.clone(),
        ));

        let termination = termination_signal();
        tokio::pin!(termination);

        let mut exit_status = None;
        let mut exit_signal = None;
        let mut interrupted = None;
        let mut input_open = true;

        loop {
            tokio::select! {
                event = channel.next_event() => match event {
                    Some(ChannelEvent::Stdout(data)) => {
                        let _ = stdout_tx.send(data).await;
                    }
                    Some(ChannelEvent::Stderr(data)) => {
                        let _ = stderr_tx.send(data).await;
                    }
                    Some(ChannelEvent::ExitStatus(status)) => {
                        tracing::debug!("Remote exit status {}", status);
                        exit_status = Some(status);
                    }
                    Some(ChannelEvent::ExitSignal(signal)) => {
                        tracing::debug!("Remote exit signal {}", signal);
                        exit_signal = Some(signal);
                    }
                    Some(ChannelEvent::Eof) => {}
                    Some(ChannelEvent::Closed) | None => break,
                },

                chunk = input.recv(), if input_open => match chunk {
                    Some(data) => {
                        if let Err(e) = channel.write_input(&data).await {
                            tracing::warn!("Failed to forward input: {}", e);
                        }
                    }
                    None => {
                        input_open = false;
                        if let Err(e) = channel.close_input().await {
                            tracing::debug!("Failed to send EOF: {}", e);
                        }
                    }
                },

                Some(size) = resize_rx.recv() => {
                    if let Err(e) = channel.resize(size).await {
                        tracing::warn!("Failed to forward window change: {}", e);
                    }
                }

                signal = &mut termination => {
                    interrupted = Some(signal);
                    break;
                }
            }
        }

        shutdown.cancel();
        drop(input);
        drop(stdout_tx);
        drop(stderr_tx);
        if let Err(e) = watcher.await {
            tracing::debug!("Resize watcher ended abnormally: {}", e);
        }
        join_writers(stdout_task, stderr_task).await;

        if let Some(signal) = interrupted {
            return Err(SessionError::Interrupted(signal));
        }
        if let Some(signal) = exit_signal {
            return Err(SessionError::RemoteSignal(signal));
        }
        match exit_status {
            Some(status) if status != 0 => Err(SessionError::RemoteExit(status)),
            _ => Ok(SessionOutcome { exit_status }),
        }
    }
}

/// Spawn a task copying queued chunks into `writer`
///
/// A write failure is logged and stops this copy only.
fn spawn_writer<W>(mut writer: W, name: &'static str) -> (mpsc::Sender<Bytes>, JoinHandle<()>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<Bytes>(STREAM_CHANNEL_CAPACITY);
    let task = tokio::spawn(async move {
        while let Some(data) = rx.recv().await {
            let written = async {
                writer.write_all(&data).await?;
                writer.flush().await
            };
            if let Err(e) = written.await {
                tracing::warn!("Failed to write remote {}: {}", name, e);
                break;
            }
        }
    });
    (tx, task)
}

async fn join_writers(stdout_task: JoinHandle<()>, stderr_task: JoinHandle<()>) {
    for task in [stdout_task, stderr_task] {
        if let Err(e) = task.await {
            tracing::debug!("Output task ended abnormally: {}", e);
        }
    }
}

/// Re-query the terminal size on every notification until cancelled
async fn watch_resizes<T, R>(
    terminal: Arc<T>,
    mut resizes: R,
    tx: mpsc::Sender<TerminalSize>,
    shutdown: CancellationToken,
) where
    T: TerminalControl + ?Sized,
    R: Stream<Item = ()> + Unpin,
{
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            next = resizes.next() => {
                if next.is_none() {
                    break;
                }
                let size = size_or_default(&*terminal);
                tracing::trace!("Terminal resized to {}x{}", size.cols, size.rows);
                if tx.send(size).await.is_err() {
                    break;
                }
            }
        }
    }
}
