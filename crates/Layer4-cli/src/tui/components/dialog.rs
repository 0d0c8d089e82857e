//! Modal for create / edit / delete
//!
//! 다이얼로그 상태 자체는 controller가 소유하고, 여기서는 입력 포커스와
//! 텍스트 커서만 들고 있다가 변경된 `Dialog`를 돌려준다.

use crate::tui::components::input::{InputBox, InputOutcome};
use crate::tui::theme::current_theme;
use castdesk_console::Dialog;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Text,
    Visibility,
}

/// Result of a key inside the modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    /// Form changed; write it back
    Changed(Dialog),
    /// Write back, then submit
    Submit(Dialog),
    Close,
    Ignored,
}

/// Editing state for the open dialog
#[derive(Debug, Clone)]
pub struct DialogEditor {
    dialog: Dialog,
    input: InputBox,
    focus: Focus,
}

impl DialogEditor {
    pub fn new(dialog: Dialog) -> Self {
        let input = match &dialog {
            Dialog::Create(form) => InputBox::new("Source URL")
                .with_placeholder("https://...")
                .with_content(form.url.clone()),
            Dialog::Edit(form) => InputBox::new("Title").with_content(form.title.clone()),
            Dialog::Delete(_) => InputBox::new(""),
        };
        Self {
            dialog,
            input,
            focus: Focus::Text,
        }
    }

    /// Whether this editor was opened for `other` (same kind and task)
    pub fn edits(&self, other: &Dialog) -> bool {
        match (&self.dialog, other) {
            (Dialog::Create(_), Dialog::Create(_)) => true,
            (Dialog::Edit(a), Dialog::Edit(b)) => a.task_id == b.task_id,
            (Dialog::Delete(a), Dialog::Delete(b)) => a.task_id == b.task_id,
            _ => false,
        }
    }

    /// Pick up `submitting` and other controller-side changes
    pub fn sync(&mut self, dialog: &Dialog) {
        let submitting = dialog.is_submitting();
        match &mut self.dialog {
            Dialog::Create(f) => f.submitting = submitting,
            Dialog::Edit(f) => f.submitting = submitting,
            Dialog::Delete(f) => f.submitting = submitting,
        }
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    fn write_text(&mut self) {
        let text = self.input.content().to_string();
        match &mut self.dialog {
            Dialog::Create(f) => f.url = text,
            Dialog::Edit(f) => f.title = text,
            Dialog::Delete(_) => {}
        }
    }

    fn toggle_visibility(&mut self) {
        match &mut self.dialog {
            Dialog::Create(f) => f.is_public = !f.is_public,
            Dialog::Edit(f) => f.is_public = !f.is_public,
            Dialog::Delete(_) => {}
        }
    }

    pub fn paste(&mut self, text: &str) -> DialogOutcome {
        if matches!(self.dialog, Dialog::Delete(_)) || self.focus != Focus::Text {
            return DialogOutcome::Ignored;
        }
        self.input.insert_str(text);
        self.write_text();
        DialogOutcome::Changed(self.dialog.clone())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> DialogOutcome {
        // 전송 중에는 닫기만 허용
        if self.dialog.is_submitting() {
            return match key.code {
                KeyCode::Esc => DialogOutcome::Close,
                _ => DialogOutcome::Ignored,
            };
        }

        if matches!(self.dialog, Dialog::Delete(_)) {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Enter => DialogOutcome::Submit(self.dialog.clone()),
                KeyCode::Char('n') | KeyCode::Esc => DialogOutcome::Close,
                _ => DialogOutcome::Ignored,
            };
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Text => Focus::Visibility,
                    Focus::Visibility => Focus::Text,
                };
                self.input.set_focused(self.focus == Focus::Text);
                DialogOutcome::Ignored
            }
            KeyCode::Char(' ') if self.focus == Focus::Visibility => {
                self.toggle_visibility();
                DialogOutcome::Changed(self.dialog.clone())
            }
            KeyCode::Enter => DialogOutcome::Submit(self.dialog.clone()),
            KeyCode::Esc => DialogOutcome::Close,
            _ if self.focus == Focus::Text => match self.input.handle_key(key) {
                InputOutcome::Edited => {
                    self.write_text();
                    DialogOutcome::Changed(self.dialog.clone())
                }
                _ => DialogOutcome::Ignored,
            },
            _ => DialogOutcome::Ignored,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let theme = current_theme();
        let height = if matches!(self.dialog, Dialog::Delete(_)) { 7 } else { 10 };
        let rect = centered_rect(60, height, area);

        frame.render_widget(Clear, rect);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_focused())
            .title(format!(" {} ", self.dialog.title()))
            .title_style(theme.text_bold());
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        let footer = if self.dialog.is_submitting() {
            Line::styled("Submitting...", theme.warning())
        } else {
            match self.dialog {
                Dialog::Delete(_) => hints(&[("y/Enter", "delete"), ("n/Esc", "cancel")]),
                _ => hints(&[
                    ("Tab", "focus"),
                    ("Space", "toggle"),
                    ("Enter", "submit"),
                    ("Esc", "cancel"),
                ]),
            }
        };

        match &self.dialog {
            Dialog::Delete(confirm) => {
                let body = vec![
                    Line::from(vec![
                        Span::styled("Delete ", theme.text()),
                        Span::styled(format!("\"{}\"", confirm.label), theme.text_bold()),
                        Span::styled("?", theme.text()),
                    ]),
                    Line::styled("This cannot be undone.", theme.text_muted()),
                    Line::from(""),
                    footer,
                ];
                frame.render_widget(Paragraph::new(body).wrap(Wrap { trim: true }), inner);
            }
            Dialog::Create(_) | Dialog::Edit(_) => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(3),
                        Constraint::Length(2),
                        Constraint::Min(1),
                    ])
                    .split(inner);

                self.input.render(frame, chunks[0]);

                let is_public = match &self.dialog {
                    Dialog::Create(f) => f.is_public,
                    Dialog::Edit(f) => f.is_public,
                    Dialog::Delete(_) => false,
                };
                let marker = if is_public { "[x]" } else { "[ ]" };
                let style = if self.focus == Focus::Visibility {
                    theme.selected()
                } else {
                    theme.text()
                };
                frame.render_widget(
                    Paragraph::new(Line::styled(format!(" {} Public", marker), style)),
                    chunks[1],
                );
                frame.render_widget(Paragraph::new(footer), chunks[2]);
            }
        }
    }
}

fn hints(pairs: &[(&'static str, &'static str)]) -> Line<'static> {
    let theme = current_theme();
    let mut spans = Vec::new();
    for (key, desc) in pairs {
        spans.push(Span::styled(*key, theme.keybind()));
        spans.push(Span::styled(format!(" {}  ", desc), theme.keybind_desc()));
    }
    Line::from(spans)
}

/// `width_percent` of `area` wide, `height` rows tall, centered
pub fn centered_rect(width_percent: u16, height: u16, area: Rect) -> Rect {
    let width = (area.width * width_percent.min(100) / 100).max(20).min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
