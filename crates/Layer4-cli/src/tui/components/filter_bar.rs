//! Filter summary line

use crate::tui::theme::current_theme;
use castdesk_api::TaskFilter;
use chrono::Local;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn keyword(value: &str) -> String {
    if value.is_empty() {
        "*".to_string()
    } else {
        format!("\"{}\"", value)
    }
}

fn date_range(filter: &TaskFilter) -> String {
    let fmt = |d: Option<chrono::DateTime<chrono::Utc>>| {
        d.map(|d| d.with_timezone(&Local).format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "…".to_string())
    };
    format!("{} → {}", fmt(filter.start_date), fmt(filter.end_date))
}

pub fn render(frame: &mut Frame, area: Rect, filter: &TaskFilter, page_label: &str) {
    let theme = current_theme();

    let item = |key: &'static str, label: &'static str, value: String| {
        vec![
            Span::styled(key, theme.keybind()),
            Span::styled(format!(" {} ", label), theme.keybind_desc()),
            Span::styled(value, theme.text()),
            Span::raw("   "),
        ]
    };

    let mut spans = Vec::new();
    spans.extend(item("s", "status", filter.status.as_str().to_string()));
    spans.extend(item("v", "visibility", filter.visibility.as_str().to_string()));
    spans.extend(item("/", "title", keyword(&filter.title_keyword)));
    spans.extend(item("u", "url", keyword(&filter.url_keyword)));
    spans.extend(item("x", "created", date_range(filter)));
    spans.push(Span::styled(page_label.to_string(), theme.text_muted()));

    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border())
            .title(" Filters "),
    );
    frame.render_widget(bar, area);
}
