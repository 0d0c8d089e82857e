//! Task table

use crate::format;
use crate::tui::theme::current_theme;
use castdesk_api::Task;
use castdesk_foundation::strings::truncate;
use ratatui::{
    layout::{Constraint, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

const HEADERS: [&str; 7] = ["Status", "Title", "URL", "Visibility", "Progress", "Files", "Created"];

fn status_cell(task: &Task) -> Cell<'static> {
    let theme = current_theme();
    Cell::from(Line::from(vec![
        Span::styled(
            format!("{} ", task.status.symbol()),
            theme.status(&task.status),
        ),
        Span::styled(
            task.status.display_name().to_string(),
            theme.status(&task.status),
        ),
    ]))
}

fn progress_cell(task: &Task) -> Cell<'static> {
    let theme = current_theme();
    if !task.shows_progress() {
        return Cell::from("");
    }
    let (filled, _) = theme.progress_bar();
    Cell::from(Line::from(vec![
        Span::styled(format!("{:>3}% ", task.progress_percent()), filled),
        Span::styled(
            truncate(task.step_label(), 14).into_owned(),
            theme.text_muted(),
        ),
    ]))
}

fn row(task: &Task) -> Row<'static> {
    let theme = current_theme();
    Row::new(vec![
        status_cell(task),
        Cell::from(truncate(task.display_title(), format::TITLE_WIDTH).into_owned()),
        Cell::from(truncate(&task.url, format::URL_WIDTH).into_owned()).style(theme.text_muted()),
        Cell::from(format::visibility(task.is_public)),
        progress_cell(task),
        Cell::from(format::artifacts(task)),
        Cell::from(format::created(task.created_at)).style(theme.text_muted()),
    ])
}

/// Render `tasks` with `selected` highlighted
pub fn render(frame: &mut Frame, area: Rect, tasks: &[Task], selected: Option<usize>, loading: bool) {
    let theme = current_theme();

    let header = Row::new(HEADERS.iter().map(|h| Cell::from(*h)))
        .style(theme.header())
        .bottom_margin(0);

    let rows: Vec<Row> = tasks.iter().map(row).collect();
    let title = if loading { " Tasks (loading...) " } else { " Tasks " };

    let table = Table::new(
        rows,
        [
            Constraint::Length(13),
            Constraint::Length(format::TITLE_WIDTH as u16 + 3),
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(20),
            Constraint::Length(13),
            Constraint::Length(16),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border())
            .title(title),
    )
    .row_highlight_style(theme.selected().add_modifier(Modifier::BOLD))
    .highlight_symbol("▶ ");

    let mut state = TableState::default().with_selected(selected);
    frame.render_stateful_widget(table, area, &mut state);

    if tasks.is_empty() && !loading {
        let hint = Line::styled("No tasks match the current filters", theme.text_muted());
        let inner = Rect {
            x: area.x + 2,
            y: area.y + 2,
            width: area.width.saturating_sub(4),
            height: 1.min(area.height.saturating_sub(3)),
        };
        frame.render_widget(hint, inner);
    }
}
