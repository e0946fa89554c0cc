//! Local terminal control
//!
//! Raw mode is process-wide state. [`RawModeGuard`] enables it once and
//! restores the previous mode when dropped, on every exit path.

use std::io;
use std::sync::Arc;

/// Terminal dimensions in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalSize {
    pub cols: u16,
    pub rows: u16,
}

impl TerminalSize {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }
}

impl Default for TerminalSize {
    fn default() -> Self {
        Self { cols: 80, rows: 24 }
    }
}

/// Operations on the controlling terminal
pub trait TerminalControl: Send + Sync {
    fn enable_raw_mode(&self) -> io::Result<()>;

    fn disable_raw_mode(&self) -> io::Result<()>;

    fn size(&self) -> io::Result<TerminalSize>;
}

/// The real terminal, via crossterm
#[derive(Debug, Default, Clone, Copy)]
pub struct CrosstermTerminal;

impl TerminalControl for CrosstermTerminal {
    fn enable_raw_mode(&self) -> io::Result<()> {
        crossterm::terminal::enable_raw_mode()
    }

    fn disable_raw_mode(&self) -> io::Result<()> {
        crossterm::terminal::disable_raw_mode()
    }

    fn size(&self) -> io::Result<TerminalSize> {
        let (cols, rows) = crossterm::terminal::size()?;
        Ok(TerminalSize { cols, rows })
    }
}

/// Current size, or 80x24 when it cannot be determined
pub fn size_or_default<T: TerminalControl + ?Sized>(terminal: &T) -> TerminalSize {
    match terminal.size() {
        Ok(size) => size,
        Err(e) => {
            tracing::debug!("Failed to query terminal size, using 80x24: {}", e);
            TerminalSize::default()
        }
    }
}

/// Holds the terminal in raw mode until dropped
pub struct RawModeGuard<T: TerminalControl + ?Sized> {
    terminal: Arc<T>,
}

impl<T: TerminalControl + ?Sized> RawModeGuard<T> {
    pub fn enter(terminal: Arc<T>) -> io::Result<Self> {
        terminal.enable_raw_mode()?;
        Ok(Self { terminal })
    }
}

impl<T: TerminalControl + ?Sized> Drop for RawModeGuard<T> {
    fn drop(&mut self) {
        if let Err(e) = self.terminal.disable_raw_mode() {
            tracing::warn!("Failed to restore terminal mode: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        enabled: AtomicUsize,
        disabled: AtomicUsize,
    }

    impl TerminalControl for Counting {
        fn enable_raw_mode(&self) -> io::Result<()> {
            self.enabled.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn disable_raw_mode(&self) -> io::Result<()> {
            self.disabled.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn size(&self) -> io::Result<TerminalSize> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "not a tty"))
        }
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let terminal = Arc::new(Counting::default());
        {
            let _guard = RawModeGuard::enter(terminal.clone()).unwrap();
            assert_eq!(terminal.enabled.load(Ordering::SeqCst), 1);
            assert_eq!(terminal.disabled.load(Ordering::SeqCst), 0);
        }
        assert_eq!(terminal.disabled.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_size_falls_back_to_default() {
        assert_eq!(size_or_default(&Counting::default()), TerminalSize::new(80, 24));
    }
}
