//! Terminal input events
//!
//! crossterm's `poll`/`read` block, so input is read on a blocking thread and
//! forwarded over a channel together with periodic ticks.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;
use tokio::sync::mpsc;

/// Redraw cadence when no input arrives
pub const TICK_RATE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
pub enum TuiEvent {
    Key(KeyEvent),
    Paste(String),
    Resize(u16, u16),
    Tick,
    /// Ctrl+C
    Quit,
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<TuiEvent>,
}

impl EventHandler {
    /// Start reading terminal input in the background
    pub fn start() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::task::spawn_blocking(move || loop {
            let ready = event::poll(TICK_RATE).unwrap_or(false);
            let event = if ready {
                match event::read() {
                    Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                        Some(translate_key(key))
                    }
                    Ok(Event::Paste(text)) => Some(TuiEvent::Paste(text)),
                    Ok(Event::Resize(w, h)) => Some(TuiEvent::Resize(w, h)),
                    _ => None,
                }
            } else {
                Some(TuiEvent::Tick)
            };

            if let Some(event) = event {
                let quit = matches!(event, TuiEvent::Quit);
                if tx.send(event).is_err() || quit {
                    break;
                }
            }
        });

        Self { rx }
    }

    pub async fn next(&mut self) -> Option<TuiEvent> {
        self.rx.recv().await
    }
}

fn translate_key(key: KeyEvent) -> TuiEvent {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        TuiEvent::Quit
    } else {
        TuiEvent::Key(key)
    }
}
