//! Main TUI application

use crate::clipboard;
use crate::tui::event::{EventHandler, TuiEvent};
use crate::tui::pages::{PageAction, TasksPage};
use castdesk_api::HttpTaskApi;
use castdesk_console::{
    ChannelNotifier, ControllerOptions, Notification, PageState, TaskListController,
};
use castdesk_foundation::ConsoleConfig;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Run the TUI application
pub async fn run(config: &ConsoleConfig) -> anyhow::Result<()> {
    let api = HttpTaskApi::from_config(config)?;
    let (notifier, mut notifications) = ChannelNotifier::new();
    let controller = TaskListController::new(
        Arc::new(api),
        Arc::new(notifier),
        ControllerOptions::from_config(config),
    );
    info!(base_url = config.base_url(), "Starting task console");

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &controller, &mut notifications).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> anyhow::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Tui) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;
    Ok(())
}

async fn event_loop(
    terminal: &mut Tui,
    controller: &TaskListController,
    notifications: &mut UnboundedReceiver<Notification>,
) -> anyhow::Result<()> {
    let mut page = TasksPage::new();
    let mut events = EventHandler::start();
    let shared = controller.state();
    let mut snapshot = controller.snapshot().await;

    // 첫 페이지 로드, 이후 폴러가 진행 중 태스크를 갱신
    spawn_action(controller, PageAction::Refresh);
    let _poller = controller.start_poller();

    loop {
        // Writers only hold the lock briefly; keep the last frame's state otherwise
        if let Ok(state) = shared.try_read() {
            snapshot = state.clone();
        }
        terminal.draw(|frame| {
            let area = frame.area();
            page.render(frame, area, &snapshot);
        })?;

        tokio::select! {
            Some(event) = events.next() => {
                let action = match event {
                    TuiEvent::Quit => break,
                    TuiEvent::Key(key) => page.handle_key(key, &snapshot),
                    TuiEvent::Paste(text) => page.handle_paste(&text, &snapshot),
                    TuiEvent::Resize(_, _) => None,
                    TuiEvent::Tick => {
                        page.tick();
                        None
                    }
                };
                match action {
                    Some(PageAction::Quit) => break,
                    Some(action) => dispatch(controller, action, &snapshot).await,
                    None => {}
                }
            }
            Some(notification) = notifications.recv() => {
                page.show_notification(notification);
            }
        }
    }

    info!("Task console closed");
    Ok(())
}

/// Apply local state changes inline; anything touching the network runs in the background
async fn dispatch(controller: &TaskListController, action: PageAction, snapshot: &PageState) {
    debug!(?action, "Page action");
    match action {
        PageAction::OpenCreate => controller.open_create_dialog().await,
        PageAction::OpenEdit(id) => {
            controller.open_edit_dialog(&id).await;
        }
        PageAction::OpenDelete(id) => {
            controller.open_delete_dialog(&id).await;
        }
        PageAction::ReplaceDialog(dialog) => {
            controller.update_dialog(|d| *d = dialog).await;
        }
        PageAction::CloseDialog => controller.close_dialog().await,
        PageAction::DismissError => controller.dismiss_error().await,
        PageAction::Copy(text) => {
            if let Some(copied) = clipboard::copy_for_report(&text) {
                controller.report_copy(copied);
            }
        }
        PageAction::SubmitDialog(dialog) => {
            if snapshot.dialog.as_ref().is_some_and(|d| d.is_submitting()) {
                return;
            }
            controller.update_dialog(|d| *d = dialog).await;
            let controller = controller.clone();
            tokio::spawn(async move {
                controller.submit_dialog().await;
            });
        }
        other => spawn_action(controller, other),
    }
}

fn spawn_action(controller: &TaskListController, action: PageAction) {
    let controller = controller.clone();
    tokio::spawn(async move {
        match action {
            PageAction::Refresh => {
                controller.query().await;
            }
            PageAction::NextPage => {
                controller.next_page().await;
            }
            PageAction::PrevPage => {
                controller.prev_page().await;
            }
            PageAction::SetFilter(filter) => {
                controller.set_filter(filter).await;
            }
            PageAction::ResetFilters => {
                controller.reset_filters().await;
            }
            PageAction::Retry(id) => {
                controller.retry(&id).await;
            }
            PageAction::Download(id, kind) => {
                controller.download(&id, kind).await;
            }
            _ => {}
        }
    });
}
