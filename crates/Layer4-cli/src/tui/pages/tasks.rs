//! Task list page
//!
//! 키 입력을 `PageAction`으로 바꾸는 부분과 그리는 부분만 담당한다.
//! 네트워크 호출은 app 루프가 controller를 통해 수행한다.
//!
//! ```text
//! ┌ Filters ───────────────────────────────────────────────┐
//! │ s status all   v visibility all   / title *   ...      │
//! └────────────────────────────────────────────────────────┘
//! ┌ Tasks ─────────────────────────────────────────────────┐
//! │ Status      Title        URL        Progress  Files    │
//! │▶⟳ Processing Episode 12  https://…  50% tts   -        │
//! └────────────────────────────────────────────────────────┘
//!  ✗ Failed to retrieve tasks  (Esc to dismiss)
//!  ↑↓ select  n/p page  c create  e edit  d delete  ? help
//! ```

use crate::format;
use crate::tui::components::{
    dialog::centered_rect, filter_bar, task_table, toast, DialogEditor, DialogOutcome, InputBox,
    InputOutcome, Toast,
};
use crate::tui::theme::current_theme;
use castdesk_api::{day_end, day_start, ArtifactKind, Task, TaskFilter};
use castdesk_console::{Dialog, Notification, PageState};
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::time::Instant;

/// What the app loop should do in response to a key
#[derive(Debug, Clone, PartialEq)]
pub enum PageAction {
    Quit,
    Refresh,
    NextPage,
    PrevPage,
    SetFilter(TaskFilter),
    ResetFilters,
    OpenCreate,
    OpenEdit(String),
    OpenDelete(String),
    /// Write the edited form back to the controller
    ReplaceDialog(Dialog),
    /// Write back, then submit
    SubmitDialog(Dialog),
    CloseDialog,
    Retry(String),
    Download(String, ArtifactKind),
    /// Put the text on the clipboard
    Copy(String),
    DismissError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterField {
    Title,
    Url,
    From,
    To,
}

impl FilterField {
    fn label(self) -> &'static str {
        match self {
            FilterField::Title => "Title contains",
            FilterField::Url => "URL contains",
            FilterField::From => "Created from (YYYY-MM-DD)",
            FilterField::To => "Created to (YYYY-MM-DD)",
        }
    }
}

/// Task list page state that lives only in the view
#[derive(Debug, Default)]
pub struct TasksPage {
    selected: usize,
    editor: Option<DialogEditor>,
    filter_input: Option<(FilterField, InputBox)>,
    show_help: bool,
    toast: Toast,
}

impl TasksPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_notification(&mut self, notification: Notification) {
        self.toast.show(notification);
    }

    pub fn tick(&mut self) {
        self.toast.expire(Instant::now());
    }

    /// Follow the controller's dialog and keep the selection on the page
    fn sync(&mut self, state: &PageState) {
        match &state.dialog {
            Some(dialog) => match &mut self.editor {
                Some(editor) if editor.edits(dialog) => editor.sync(dialog),
                _ => self.editor = Some(DialogEditor::new(dialog.clone())),
            },
            None => self.editor = None,
        }
        self.selected = self.selected.min(state.tasks.len().saturating_sub(1));
    }

    fn selected_task<'a>(&self, state: &'a PageState) -> Option<&'a Task> {
        state.tasks.get(self.selected)
    }

    pub fn handle_paste(&mut self, text: &str, state: &PageState) -> Option<PageAction> {
        self.sync(state);
        if let Some(editor) = self.editor.as_mut() {
            return match editor.paste(text) {
                DialogOutcome::Changed(dialog) => Some(PageAction::ReplaceDialog(dialog)),
                _ => None,
            };
        }
        if let Some((_, input)) = self.filter_input.as_mut() {
            input.insert_str(text);
        }
        None
    }

    pub fn handle_key(&mut self, key: KeyEvent, state: &PageState) -> Option<PageAction> {
        self.sync(state);

        if self.show_help {
            self.show_help = false;
            return None;
        }

        if let Some(editor) = self.editor.as_mut() {
            return match editor.handle_key(key) {
                DialogOutcome::Changed(dialog) => Some(PageAction::ReplaceDialog(dialog)),
                DialogOutcome::Submit(dialog) => Some(PageAction::SubmitDialog(dialog)),
                DialogOutcome::Close => Some(PageAction::CloseDialog),
                DialogOutcome::Ignored => None,
            };
        }

        if self.filter_input.is_some() {
            return self.handle_filter_key(key, state);
        }

        self.handle_list_key(key, state)
    }

    fn handle_filter_key(&mut self, key: KeyEvent, state: &PageState) -> Option<PageAction> {
        let (field, input) = self.filter_input.as_mut()?;
        match input.handle_key(key) {
            InputOutcome::Submit => {
                let field = *field;
                let text = input.content().trim().to_string();
                self.filter_input = None;
                apply_filter_text(&state.filter, field, &text).map(PageAction::SetFilter)
            }
            InputOutcome::Cancel => {
                self.filter_input = None;
                None
            }
            InputOutcome::Edited | InputOutcome::Ignored => None,
        }
    }

    fn open_filter_input(&mut self, field: FilterField, filter: &TaskFilter) {
        let current = match field {
            FilterField::Title => filter.title_keyword.clone(),
            FilterField::Url => filter.url_keyword.clone(),
            FilterField::From => day_text(filter.start_date),
            FilterField::To => day_text(filter.end_date),
        };
        self.filter_input = Some((field, InputBox::new(field.label()).with_content(current)));
    }

    fn handle_list_key(&mut self, key: KeyEvent, state: &PageState) -> Option<PageAction> {
        let selected = self.selected_task(state).map(|t| t.id.clone());

        match key.code {
            KeyCode::Char('q') => Some(PageAction::Quit),
            KeyCode::Char('?') => {
                self.show_help = true;
                None
            }
            KeyCode::Esc if state.error.is_some() => Some(PageAction::DismissError),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < state.tasks.len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Right | KeyCode::Char('n') if state.has_next_page() => {
                self.selected = 0;
                Some(PageAction::NextPage)
            }
            KeyCode::Left | KeyCode::Char('p') if state.has_prev_page() => {
                self.selected = 0;
                Some(PageAction::PrevPage)
            }
            KeyCode::Char('r') => Some(PageAction::Refresh),

            // Filters
            KeyCode::Char('s') => {
                let mut filter = state.filter.clone();
                filter.status = filter.status.next();
                Some(PageAction::SetFilter(filter))
            }
            KeyCode::Char('v') => {
                let mut filter = state.filter.clone();
                filter.visibility = filter.visibility.next();
                Some(PageAction::SetFilter(filter))
            }
            KeyCode::Char('/') => {
                self.open_filter_input(FilterField::Title, &state.filter);
                None
            }
            KeyCode::Char('u') => {
                self.open_filter_input(FilterField::Url, &state.filter);
                None
            }
            KeyCode::Char('f') => {
                self.open_filter_input(FilterField::From, &state.filter);
                None
            }
            KeyCode::Char('t') => {
                self.open_filter_input(FilterField::To, &state.filter);
                None
            }
            KeyCode::Char('x') => {
                self.selected = 0;
                Some(PageAction::ResetFilters)
            }

            // Mutations
            KeyCode::Char('c') => Some(PageAction::OpenCreate),
            KeyCode::Char('e') => selected.map(PageAction::OpenEdit),
            KeyCode::Char('d') | KeyCode::Delete => selected.map(PageAction::OpenDelete),
            KeyCode::Char('R') => self
                .selected_task(state)
                .filter(|t| t.status.is_retryable())
                .map(|t| PageAction::Retry(t.id.clone())),

            // Clipboard
            KeyCode::Char('y') => selected.map(PageAction::Copy),
            KeyCode::Char('Y') => self
                .selected_task(state)
                .map(|t| PageAction::Copy(t.url.clone())),
            KeyCode::Char('m') => self
                .selected_task(state)
                .and_then(|t| t.progress_message.clone())
                .map(PageAction::Copy),

            // Downloads: 1-4 in artifact order
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                let kind = ArtifactKind::ALL[index];
                self.selected_task(state)
                    .filter(|t| t.artifact_url(kind).is_some())
                    .map(|t| PageAction::Download(t.id.clone(), kind))
            }
            _ => None,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, state: &PageState) {
        self.sync(state);

        let error_height = if state.error.is_some() { 1 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(7),
                Constraint::Length(error_height),
                Constraint::Length(1),
            ])
            .split(area);

        let page_label = format!(
            "page {}/{}  ({})",
            state.page + 1,
            state.page_count(),
            state.range_label()
        );
        filter_bar::render(frame, chunks[0], &state.filter, &page_label);

        let selected = (!state.tasks.is_empty()).then_some(self.selected);
        task_table::render(frame, chunks[1], &state.tasks, selected, state.loading);
        self.render_detail(frame, chunks[2], state);

        if let Some(message) = &state.error {
            toast::render_error(frame, chunks[3], message);
        }
        self.render_status_bar(frame, chunks[4], state);

        if let Some((_, input)) = &self.filter_input {
            let rect = centered_rect(50, 3, area);
            frame.render_widget(Clear, rect);
            input.render(frame, rect);
        }
        if let Some(editor) = &self.editor {
            editor.render(frame, area);
        }
        if self.show_help {
            render_help(frame, area);
        }
        self.toast.render(frame, area);
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect, state: &PageState) {
        let theme = current_theme();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border())
            .title(" Detail ");

        let Some(task) = self.selected_task(state) else {
            frame.render_widget(block, area);
            return;
        };

        let mut lines = vec![Line::from(vec![
            Span::styled("ID ", theme.text_muted()),
            Span::styled(task.id.clone(), theme.text()),
        ])];
        if task.shows_progress() {
            let (filled, _) = theme.progress_bar();
            lines.push(Line::from(vec![
                Span::styled(format::gauge(task.progress_percent()), filled),
                Span::raw(" "),
                Span::styled(format::progress(task), theme.text()),
            ]));
            if let Some(message) = task.progress_message.as_deref() {
                lines.push(Line::styled(
                    castdesk_foundation::strings::truncate(message, format::MESSAGE_WIDTH * 2)
                        .into_owned(),
                    theme.text_muted(),
                ));
            }
        }

        let artifacts: Vec<Span> = ArtifactKind::ALL
            .iter()
            .enumerate()
            .flat_map(|(i, kind)| {
                let available = task.artifact_url(*kind).is_some();
                let style = if available {
                    theme.keybind()
                } else {
                    theme.text_muted()
                };
                [
                    Span::styled(format!("{}", i + 1), style),
                    Span::styled(format!(" {}  ", format::artifact_label(*kind)), style),
                ]
            })
            .collect();
        lines.push(Line::from(artifacts));

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect, state: &PageState) {
        let theme = current_theme();
        let mut spans = Vec::new();
        for (key, desc) in [
            ("↑↓", "select"),
            ("n/p", "page"),
            ("c", "create"),
            ("e", "edit"),
            ("d", "delete"),
            ("R", "retry"),
            ("1-4", "download"),
            ("?", "help"),
            ("q", "quit"),
        ] {
            spans.push(Span::styled(format!(" {}", key), theme.keybind()));
            spans.push(Span::styled(format!(" {} ", desc), theme.keybind_desc()));
        }
        if let Some(at) = state.last_refreshed {
            spans.push(Span::styled(
                format!("  refreshed {}", at.with_timezone(&Local).format("%H:%M:%S")),
                theme.text_muted(),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

fn day_text(at: Option<chrono::DateTime<chrono::Utc>>) -> String {
    at.map(|d| d.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// New filter with one text field replaced; `None` when a date does not parse
fn apply_filter_text(filter: &TaskFilter, field: FilterField, text: &str) -> Option<TaskFilter> {
    let mut next = filter.clone();
    match field {
        FilterField::Title => next.title_keyword = text.to_string(),
        FilterField::Url => next.url_keyword = text.to_string(),
        FilterField::From if text.is_empty() => next.start_date = None,
        FilterField::To if text.is_empty() => next.end_date = None,
        FilterField::From => next.start_date = Some(day_start(&Local, format::parse_day(text)?)),
        FilterField::To => next.end_date = Some(day_end(&Local, format::parse_day(text)?)),
    }
    (next != *filter).then_some(next)
}

fn render_help(frame: &mut Frame, area: Rect) {
    let theme = current_theme();
    let rect = centered_rect(50, 22, area);
    frame.render_widget(Clear, rect);

    let section = |title: &'static str| Line::styled(title, theme.text_bold());
    let entry = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("{:<10}", key), theme.keybind()),
            Span::styled(desc, theme.text()),
        ])
    };

    let lines = vec![
        section("Navigation"),
        entry("↑↓ / j k", "Select task"),
        entry("n / p", "Next / previous page"),
        entry("r", "Refresh"),
        Line::from(""),
        section("Filters"),
        entry("s / v", "Cycle status / visibility"),
        entry("/ / u", "Title / URL keyword"),
        entry("f / t", "Created from / to"),
        entry("x", "Reset filters"),
        Line::from(""),
        section("Tasks"),
        entry("c", "Create"),
        entry("e / d", "Edit / delete selected"),
        entry("R", "Retry failed task"),
        entry("1-4", "Download CN/EN audio, CN/EN subtitles"),
        entry("y Y m", "Copy id / URL / progress message"),
        Line::from(""),
        entry("Esc", "Dismiss error"),
        entry("q", "Quit"),
    ];

    let help = Paragraph::new(lines).block(
        Block::default()
            .title(" Help (press any key to close) ")
            .borders(Borders::ALL)
            .border_style(theme.border_focused()),
    );
    frame.render_widget(help, rect);
}
