//! Toast notifications and the error banner

use crate::tui::theme::current_theme;
use castdesk_console::{Notification, NotificationKind};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::time::{Duration, Instant};

pub const TOAST_TTL: Duration = Duration::from_secs(3);

/// Most recent notification, shown until it expires
#[derive(Debug, Default)]
pub struct Toast {
    current: Option<(Notification, Instant)>,
}

impl Toast {
    pub fn show(&mut self, notification: Notification) {
        self.current = Some((notification, Instant::now()));
    }

    /// Drop the toast once it outlived `TOAST_TTL`
    pub fn expire(&mut self, now: Instant) {
        if let Some((_, shown)) = &self.current {
            if now.duration_since(*shown) >= TOAST_TTL {
                self.current = None;
            }
        }
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref().map(|(n, _)| n)
    }

    /// Bottom-right corner of `area`
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(notification) = self.current() else {
            return;
        };
        let theme = current_theme();
        let style = match notification.kind {
            NotificationKind::Success => theme.success(),
            NotificationKind::Failure => theme.error(),
        };

        let width = toast_width(&notification.message, area.width);
        let rect = Rect {
            x: area.x + area.width.saturating_sub(width.saturating_add(1)),
            y: area.y + area.height.saturating_sub(4),
            width,
            height: 3.min(area.height),
        };

        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(notification.message.as_str())
                .style(style)
                .block(Block::default().borders(Borders::ALL).border_style(style)),
            rect,
        );
    }
}

/// Message plus border and padding, never wider than `available`
fn toast_width(message: &str, available: u16) -> u16 {
    u16::try_from(message.chars().count())
        .unwrap_or(u16::MAX)
        .saturating_add(4)
        .min(available)
}

/// One-line dismissible error banner
pub fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let theme = current_theme();
    let line = Line::from(vec![
        Span::styled(" ✗ ", theme.error()),
        Span::styled(message.to_string(), theme.error()),
        Span::styled("  (Esc to dismiss)", theme.text_muted()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
