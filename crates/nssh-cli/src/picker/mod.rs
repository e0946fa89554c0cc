//! Full-screen device picker
//!
//! Key handling lives in [`PickerState`]; this module owns the terminal and
//! draws the list with ratatui.

mod state;

pub use state::{PickerAction, PickerState};

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::{Frame, Terminal};

use nssh_core::Device;

const ACCENT: Color = Color::Rgb(0x34, 0xcd, 0xd7);
const TITLE: &str = "Online Devices";

/// Raw mode plus alternate screen, undone on drop
struct ScreenGuard;

impl ScreenGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(e) = crossterm::execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        Ok(Self)
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(io::stdout(), LeaveAlternateScreen);
        if let Err(e) = disable_raw_mode() {
            tracing::warn!("Failed to restore terminal: {}", e);
        }
    }
}

/// Let the user pick one device; `None` when they quit
///
/// Blocks on terminal input, so run it off the async runtime.
pub fn run_picker(devices: Vec<Device>) -> io::Result<Option<Device>> {
    let mut state = PickerState::new(devices);

    let _screen = ScreenGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    loop {
        terminal.draw(|frame| draw(frame, &mut state))?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match state.handle_key(key) {
            PickerAction::Continue => {}
            PickerAction::Cancel => return Ok(None),
            PickerAction::Confirm => return Ok(state.selected().cloned()),
        }
    }
}

fn draw(frame: &mut Frame, state: &mut PickerState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.size());

    // Two text lines per item, minus the border
    let rows = usize::from(chunks[0].height.saturating_sub(2)) / 2;
    state.set_page_size(rows);

    let items: Vec<ListItem> = state
        .visible()
        .map(|device| {
            ListItem::new(Text::from(vec![
                Line::from(device.title()),
                Line::from(Span::styled(
                    device.description(),
                    Style::default().add_modifier(Modifier::DIM),
                )),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(Span::styled(
                    TITLE,
                    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT)),
        )
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut list_state = ListState::default().with_selected(state.cursor());
    frame.render_stateful_widget(list, chunks[0], &mut list_state);

    frame.render_widget(Paragraph::new(footer(state)), chunks[1]);
}

fn footer(state: &PickerState) -> Line<'static> {
    if state.is_filtering() {
        Line::from(vec![
            Span::styled("Filter: ", Style::default().fg(ACCENT)),
            Span::raw(state.filter().to_string()),
            Span::styled("█", Style::default().fg(ACCENT)),
        ])
    } else if !state.filter().is_empty() {
        Line::from(format!(
            "{} matching \"{}\" • /: edit filter • enter: connect • q: quit",
            state.visible_len(),
            state.filter()
        ))
    } else {
        Line::from(Span::styled(
            "↑/k up • ↓/j down • /: filter • enter: connect • q: quit",
            Style::default().add_modifier(Modifier::DIM),
        ))
    }
}
