//! Picker state: cursor, filter and key handling

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use nssh_core::Device;

/// What the event loop should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerAction {
    Continue,
    Confirm,
    Cancel,
}

/// List of devices with a cursor and an optional filter
#[derive(Debug)]
pub struct PickerState {
    items: Vec<Device>,
    /// Indices into `items` that match the filter, in order
    visible: Vec<usize>,
    cursor: usize,
    filter: String,
    filtering: bool,
    page_size: usize,
}

impl PickerState {
    pub fn new(items: Vec<Device>) -> Self {
        let visible = (0..items.len()).collect();
        Self {
            items,
            visible,
            cursor: 0,
            filter: String::new(),
            filtering: false,
            page_size: 10,
        }
    }

    /// Devices matching the current filter
    pub fn visible(&self) -> impl Iterator<Item = &Device> {
        self.visible.iter().map(|&i| &self.items[i])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Cursor position within the visible devices
    pub fn cursor(&self) -> Option<usize> {
        if self.visible.is_empty() {
            None
        } else {
            Some(self.cursor)
        }
    }

    pub fn selected(&self) -> Option<&Device> {
        self.visible.get(self.cursor).map(|&i| &self.items[i])
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn is_filtering(&self) -> bool {
        self.filtering
    }

    /// Rows moved by PgUp/PgDn
    pub fn set_page_size(&mut self, rows: usize) {
        self.page_size = rows.max(1);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PickerAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return PickerAction::Cancel;
        }

        if self.filtering {
            return self.handle_filter_key(key);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return PickerAction::Cancel,
            KeyCode::Enter if self.selected().is_some() => return PickerAction::Confirm,
            KeyCode::Char('/') => self.filtering = true,
            KeyCode::Up | KeyCode::Char('k') => self.move_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.move_down(1),
            KeyCode::PageUp => self.move_up(self.page_size),
            KeyCode::PageDown => self.move_down(self.page_size),
            KeyCode::Home | KeyCode::Char('g') => self.cursor = 0,
            KeyCode::End | KeyCode::Char('G') => self.cursor = self.visible.len().saturating_sub(1),
            _ => {}
        }
        PickerAction::Continue
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> PickerAction {
        match key.code {
            KeyCode::Esc => {
                self.filtering = false;
                self.filter.clear();
                self.refilter();
            }
            KeyCode::Enter => self.filtering = false,
            KeyCode::Backspace => {
                self.filter.pop();
                self.refilter();
            }
            KeyCode::Up => self.move_up(1),
            KeyCode::Down => self.move_down(1),
            KeyCode::Char(c) if !c.is_control() => {
                self.filter.push(c);
                self.refilter();
            }
            _ => {}
        }
        PickerAction::Continue
    }

    fn move_up(&mut self, rows: usize) {
        self.cursor = self.cursor.saturating_sub(rows);
    }

    fn move_down(&mut self, rows: usize) {
        let last = self.visible.len().saturating_sub(1);
        self.cursor = self.cursor.saturating_add(rows).min(last);
    }

    /// Case-insensitive substring match on each device's filter value
    fn refilter(&mut self) {
        let needle = self.filter.to_lowercase();
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, d)| needle.is_empty() || d.filter_value().to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();
        self.cursor = self.cursor.min(self.visible.len().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::device;
    use nssh_core::DeviceRecord;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(state: &mut PickerState, s: &str) {
        for c in s.chars() {
            state.handle_key(press(KeyCode::Char(c)));
        }
    }

    fn sample() -> PickerState {
        PickerState::new(vec![
            device("440100000000001", "gateway-east", true),
            device("440100000000002", "gateway-west", true),
            device("440100000000003", "Sensor-North", true),
            device("440100000000004", "camera", true),
        ])
    }

    fn selected_id(state: &PickerState) -> Option<&str> {
        state.selected().map(|d| d.identifier())
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut state = sample();
        state.handle_key(press(KeyCode::Up));
        assert_eq!(state.cursor(), Some(0));

        state.handle_key(press(KeyCode::Char('j')));
        state.handle_key(press(KeyCode::Down));
        assert_eq!(selected_id(&state), Some("440100000000003"));

        state.handle_key(press(KeyCode::End));
        assert_eq!(state.cursor(), Some(3));
        state.handle_key(press(KeyCode::Down));
        assert_eq!(state.cursor(), Some(3));

        state.handle_key(press(KeyCode::Char('k')));
        assert_eq!(state.cursor(), Some(2));
        state.handle_key(press(KeyCode::Home));
        assert_eq!(state.cursor(), Some(0));
    }

    #[test]
    fn test_page_keys() {
        let mut state = sample();
        state.set_page_size(2);
        state.handle_key(press(KeyCode::PageDown));
        assert_eq!(state.cursor(), Some(2));
        state.handle_key(press(KeyCode::PageDown));
        assert_eq!(state.cursor(), Some(3));
        state.handle_key(press(KeyCode::PageUp));
        assert_eq!(state.cursor(), Some(1));
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let mut state = sample();
        state.handle_key(press(KeyCode::Char('/')));
        assert!(state.is_filtering());

        type_str(&mut state, "GATEWAY");
        assert_eq!(state.visible_len(), 2);
        assert_eq!(state.filter(), "GATEWAY");

        state.handle_key(press(KeyCode::Backspace));
        type_str(&mut state, "y-w");
        assert_eq!(state.visible_len(), 1);
        assert_eq!(selected_id(&state), Some("440100000000002"));
    }

    #[test]
    fn test_filter_matches_identifier_and_plan() {
        let mut state = sample();
        state.handle_key(press(KeyCode::Char('/')));
        type_str(&mut state, "0003plan");
        assert_eq!(state.visible_len(), 1);
        assert_eq!(selected_id(&state), Some("440100000000003"));
    }

    #[test]
    fn test_letters_edit_filter_instead_of_navigating() {
        let mut state = sample();
        state.handle_key(press(KeyCode::Char('/')));
        assert_eq!(state.handle_key(press(KeyCode::Char('q'))), PickerAction::Continue);
        type_str(&mut state, "j");
        assert_eq!(state.filter(), "qj");
        assert_eq!(state.visible_len(), 0);
        assert_eq!(state.cursor(), None);
        assert_eq!(state.handle_key(press(KeyCode::Enter)), PickerAction::Continue);
        assert!(!state.is_filtering());
        assert_eq!(state.handle_key(press(KeyCode::Enter)), PickerAction::Continue);
    }

    #[test]
    fn test_escape_in_filter_mode_clears_filter() {
        let mut state = sample();
        state.handle_key(press(KeyCode::Char('/')));
        type_str(&mut state, "camera");
        assert_eq!(state.visible_len(), 1);

        assert_eq!(state.handle_key(press(KeyCode::Esc)), PickerAction::Continue);
        assert!(!state.is_filtering());
        assert_eq!(state.filter(), "");
        assert_eq!(state.visible_len(), 4);
    }

    #[test]
    fn test_confirm_returns_filtered_selection() {
        let mut state = sample();
        state.handle_key(press(KeyCode::Char('/')));
        type_str(&mut state, "camera");
        state.handle_key(press(KeyCode::Enter));

        assert_eq!(state.handle_key(press(KeyCode::Enter)), PickerAction::Confirm);
        assert_eq!(selected_id(&state), Some("440100000000004"));
    }

    #[test]
    fn test_cancel_keys() {
        for key in [
            press(KeyCode::Char('q')),
            press(KeyCode::Esc),
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut state = sample();
            assert_eq!(state.handle_key(key), PickerAction::Cancel);
        }

        let mut filtering = sample();
        filtering.handle_key(press(KeyCode::Char('/')));
        assert_eq!(
            filtering.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            PickerAction::Cancel
        );
    }

    #[test]
    fn test_empty_list() {
        let mut state = PickerState::new(Vec::new());
        assert_eq!(state.cursor(), None);
        state.handle_key(press(KeyCode::Down));
        state.handle_key(press(KeyCode::End));
        assert_eq!(state.handle_key(press(KeyCode::Enter)), PickerAction::Continue);
        assert!(state.selected().is_none());
    }
}
