//! Single-line text input

use crate::tui::theme::current_theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// What a key did to the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Text or cursor changed
    Edited,
    Submit,
    Cancel,
    /// Key not handled here
    Ignored,
}

/// Text input box
///
/// The cursor counts chars, not bytes, so CJK titles edit correctly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBox {
    content: String,
    cursor: usize,
    focused: bool,
    label: String,
    placeholder: String,
}

impl InputBox {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            focused: true,
            ..Default::default()
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Start with `text`, cursor at the end
    pub fn with_content(mut self, text: impl Into<String>) -> Self {
        self.content = text.into();
        self.cursor = self.content.chars().count();
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars().filter(|c| *c != '\n' && *c != '\r') {
            let idx = self.byte_index(self.cursor);
            self.content.insert(idx, c);
            self.cursor += 1;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> InputOutcome {
        let len = self.content.chars().count();
        match key.code {
            KeyCode::Enter => return InputOutcome::Submit,
            KeyCode::Esc => return InputOutcome::Cancel,
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.content.clear();
                self.cursor = 0;
            }
            KeyCode::Char(c) => {
                let idx = self.byte_index(self.cursor);
                self.content.insert(idx, c);
                self.cursor += 1;
            }
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                let idx = self.byte_index(self.cursor);
                self.content.remove(idx);
            }
            KeyCode::Delete if self.cursor < len => {
                let idx = self.byte_index(self.cursor);
                self.content.remove(idx);
            }
            KeyCode::Left if self.cursor > 0 => self.cursor -= 1,
            KeyCode::Right if self.cursor < len => self.cursor += 1,
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = len,
            _ => return InputOutcome::Ignored,
        }
        InputOutcome::Edited
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let theme = current_theme();
        let border_style = if self.focused {
            theme.border_focused()
        } else {
            theme.border()
        };

        let (text, style) = if self.content.is_empty() && !self.placeholder.is_empty() {
            (self.placeholder.as_str(), theme.text_muted())
        } else {
            (self.content.as_str(), theme.text())
        };

        let input = Paragraph::new(text).style(style).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(format!(" {} ", self.label)),
        );
        frame.render_widget(input, area);

        if self.focused {
            let x = area.x + 1 + (self.cursor as u16).min(area.width.saturating_sub(3));
            frame.set_cursor_position((x, area.y + 1));
        }
    }
}
