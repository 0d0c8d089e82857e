//! Task list controller
//!
//! Owns the page state and drives the three flows of the page:
//! - query: one list request, replaces the cached page
//! - mutate: create / edit / delete / retry, each followed by a fresh query
//! - poll: refresh non-terminal tasks, patch or refetch
//!
//! The controller is cheap to clone; clones share state, so the poller and
//! the UI work on the same page.

use crate::dialog::{CreateForm, DeleteConfirm, Dialog, EditForm};
use crate::notify::{NotificationKind, Notifier};
use crate::poller::{self, PollerHandle};
use crate::reconcile::{apply_patches, reconcile, Reconciliation};
use crate::state::PageState;
use castdesk_api::{
    ApiError, ApiResult, ArtifactKind, CreateTaskRequest, Operation, TaskApi, TaskFilter,
    UpdateTaskRequest,
};
use castdesk_foundation::ConsoleConfig;
use chrono::Local;
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub const COPY_SUCCESS: &str = "Copied!";
pub const COPY_FAILURE: &str = "Copy failed, please retry";

/// Controller settings derived from [`ConsoleConfig`]
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerOptions {
    pub rows_per_page: u32,
    pub poll_interval: Duration,
    pub download_dir: PathBuf,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self::from_config(&ConsoleConfig::default())
    }
}

impl ControllerOptions {
    pub fn from_config(config: &ConsoleConfig) -> Self {
        Self {
            rows_per_page: config.page_size(),
            poll_interval: config.poll_interval(),
            download_dir: config.download_dir(),
        }
    }
}

/// Result of one poll tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing non-terminal on the page
    Idle,
    /// Tasks patched in place
    Patched(usize),
    /// A task turned terminal and the page was re-queried
    Refetched,
    /// A query started during the tick; patches dropped
    Stale,
}

#[derive(Clone)]
pub struct TaskListController {
    api: Arc<dyn TaskApi>,
    notifier: Arc<dyn Notifier>,
    state: Arc<RwLock<PageState>>,
    options: ControllerOptions,
}

impl TaskListController {
    /// Controller with the default filter (last month, everything)
    pub fn new(
        api: Arc<dyn TaskApi>,
        notifier: Arc<dyn Notifier>,
        options: ControllerOptions,
    ) -> Self {
        let filter = TaskFilter::with_default_range(&Local::now());
        Self::with_filter(api, notifier, options, filter)
    }

    pub fn with_filter(
        api: Arc<dyn TaskApi>,
        notifier: Arc<dyn Notifier>,
        options: ControllerOptions,
        filter: TaskFilter,
    ) -> Self {
        let state = PageState::new(filter, options.rows_per_page);
        Self {
            api,
            notifier,
            state: Arc::new(RwLock::new(state)),
            options,
        }
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    /// Shared state, for renderers that want `try_read`
    pub fn state(&self) -> Arc<RwLock<PageState>> {
        Arc::clone(&self.state)
    }

    pub async fn snapshot(&self) -> PageState {
        self.state.read().await.clone()
    }

    // ========================================================================
    // Query
    // ========================================================================

    /// Fetch the current page
    ///
    /// Failure keeps the previous tasks and sets the banner. A result that
    /// arrives after a newer query started is dropped.
    pub async fn query(&self) -> bool {
        let (query, generation) = {
            let mut state = self.state.write().await;
            state.generation += 1;
            state.loading = true;
            (state.query(), state.generation)
        };
        debug!(generation, offset = query.offset, limit = query.limit, "Querying tasks");

        let result = self.api.list(&query).await;

        let mut state = self.state.write().await;
        if state.generation != generation {
            debug!(generation, current = state.generation, "Dropping superseded query result");
            return false;
        }
        state.loading = false;

        match result {
            Ok(page) => {
                debug!(count = page.items.len(), total = page.total, "Tasks loaded");
                state.apply_page(page);
                true
            }
            Err(e) => {
                warn!(error = %e, "Task query failed");
                state.error = Some(e.user_message());
                false
            }
        }
    }

    /// Replace the filter, go back to the first page and query
    pub async fn set_filter(&self, filter: TaskFilter) -> bool {
        {
            let mut state = self.state.write().await;
            state.filter = filter;
            state.page = 0;
        }
        self.query().await
    }

    /// Edit the filter in place, go back to the first page and query
    pub async fn update_filter<F>(&self, edit: F) -> bool
    where
        F: FnOnce(&mut TaskFilter),
    {
        {
            let mut state = self.state.write().await;
            edit(&mut state.filter);
            state.page = 0;
        }
        self.query().await
    }

    /// Everything visible again: all statuses, both visibilities, default range
    pub async fn reset_filters(&self) -> bool {
        self.set_filter(TaskFilter::with_default_range(&Local::now()))
            .await
    }

    pub async fn next_page(&self) -> bool {
        {
            let mut state = self.state.write().await;
            if !state.has_next_page() {
                return false;
            }
            state.page += 1;
        }
        self.query().await
    }

    pub async fn prev_page(&self) -> bool {
        {
            let mut state = self.state.write().await;
            if !state.has_prev_page() {
                return false;
            }
            state.page -= 1;
        }
        self.query().await
    }

    pub async fn set_rows_per_page(&self, rows: u32) -> bool {
        {
            let mut state = self.state.write().await;
            state.rows_per_page = rows.max(1);
            state.page = 0;
        }
        self.query().await
    }

    pub async fn dismiss_error(&self) {
        self.state.write().await.error = None;
    }

    // ========================================================================
    // Dialogs
    // ========================================================================

    pub async fn open_create_dialog(&self) {
        self.state.write().await.dialog = Some(Dialog::Create(CreateForm::default()));
    }

    /// Prefilled edit dialog; false when the task is not on the page
    pub async fn open_edit_dialog(&self, task_id: &str) -> bool {
        let mut state = self.state.write().await;
        let Some(form) = state.task(task_id).map(EditForm::for_task) else {
            return false;
        };
        state.dialog = Some(Dialog::Edit(form));
        true
    }

    pub async fn open_delete_dialog(&self, task_id: &str) -> bool {
        let mut state = self.state.write().await;
        let Some(confirm) = state.task(task_id).map(DeleteConfirm::for_task) else {
            return false;
        };
        state.dialog = Some(Dialog::Delete(confirm));
        true
    }

    pub async fn close_dialog(&self) {
        self.state.write().await.dialog = None;
    }

    /// Mutate the open dialog's form (text input, toggles)
    pub async fn update_dialog<F>(&self, edit: F)
    where
        F: FnOnce(&mut Dialog),
    {
        if let Some(dialog) = self.state.write().await.dialog.as_mut() {
            edit(dialog);
        }
    }

    /// Submit whichever dialog is open
    pub async fn submit_dialog(&self) -> bool {
        let dialog = self.state.read().await.dialog.clone();
        match dialog {
            Some(Dialog::Create(form)) => self.create(form.to_request()).await,
            Some(Dialog::Edit(form)) => self.edit(&form.task_id, form.to_request()).await,
            Some(Dialog::Delete(confirm)) => self.delete(&confirm.task_id).await,
            None => false,
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    pub async fn create(&self, request: CreateTaskRequest) -> bool {
        let closes = |d: &Dialog| matches!(d, Dialog::Create(_));
        self.begin_mutation(&closes).await;

        let result = if request.is_submittable() {
            self.api.create(&request).await.map(|task| {
                info!(task_id = %task.id, "Created task");
            })
        } else {
            Err(ApiError::InvalidInput("URL must not be empty".to_string()))
        };
        self.finish_mutation(result, &closes, "Task created").await
    }

    pub async fn edit(&self, task_id: &str, request: UpdateTaskRequest) -> bool {
        let closes = |d: &Dialog| matches!(d, Dialog::Edit(f) if f.task_id == task_id);
        self.begin_mutation(&closes).await;

        let result = self.api.update(task_id, &request).await.map(|_| ());
        self.finish_mutation(result, &closes, "Task updated").await
    }

    pub async fn delete(&self, task_id: &str) -> bool {
        let closes = |d: &Dialog| matches!(d, Dialog::Delete(c) if c.task_id == task_id);
        self.begin_mutation(&closes).await;

        let result = self.api.delete(task_id).await;
        self.finish_mutation(result, &closes, "Task deleted").await
    }

    pub async fn retry(&self, task_id: &str) -> bool {
        let closes = |_: &Dialog| false;
        let result = self.api.retry(task_id).await;
        self.finish_mutation(result, &closes, "Task queued for retry")
            .await
    }

    async fn begin_mutation(&self, closes: &(dyn Fn(&Dialog) -> bool + Sync)) {
        let mut state = self.state.write().await;
        if let Some(dialog) = state.dialog.as_mut().filter(|d| closes(d)) {
            dialog.set_submitting(true);
        }
    }

    /// Success closes the matching dialog, notifies and re-queries.
    /// Failure sets the banner and leaves the dialog open.
    async fn finish_mutation(
        &self,
        result: ApiResult<()>,
        closes: &(dyn Fn(&Dialog) -> bool + Sync),
        success_message: &str,
    ) -> bool {
        {
            let mut state = self.state.write().await;
            match &result {
                Ok(()) => {
                    if state.dialog.as_ref().is_some_and(|d| closes(d)) {
                        state.dialog = None;
                    }
                    state.error = None;
                }
                Err(e) => {
                    warn!(error = %e, "Task mutation failed");
                    if let Some(dialog) = state.dialog.as_mut().filter(|d| closes(d)) {
                        dialog.set_submitting(false);
                    }
                    state.error = Some(e.user_message());
                }
            }
        }

        if result.is_err() {
            return false;
        }
        self.notifier
            .notify(success_message, NotificationKind::Success);
        self.query().await;
        true
    }

    // ========================================================================
    // Downloads & clipboard
    // ========================================================================

    /// Download one artifact of a task on the page into the download directory
    pub async fn download(&self, task_id: &str, kind: ArtifactKind) -> Option<PathBuf> {
        let file_url = {
            let state = self.state.read().await;
            state
                .task(task_id)
                .and_then(|t| t.artifact_url(kind))
                .map(str::to_string)
        };

        let result = match file_url {
            Some(url) => {
                self.api
                    .download(task_id, &url, &self.options.download_dir)
                    .await
            }
            None => Err(ApiError::InvalidInput(format!(
                "{}: no {} artifact",
                Operation::Download.default_message(),
                kind.slug()
            ))),
        };

        match result {
            Ok(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.notifier
                    .notify(&format!("Downloaded {}", name), NotificationKind::Success);
                Some(path)
            }
            Err(e) => {
                warn!(task_id, error = %e, "Download failed");
                self.state.write().await.error = Some(e.user_message());
                None
            }
        }
    }

    /// Report a clipboard copy made by the view
    pub fn report_copy(&self, copied: bool) {
        if copied {
            self.notifier.notify(COPY_SUCCESS, NotificationKind::Success);
        } else {
            self.notifier.notify(COPY_FAILURE, NotificationKind::Failure);
        }
    }

    // ========================================================================
    // Polling
    // ========================================================================

    /// One poll tick over every non-terminal task on the page
    pub async fn poll_once(&self) -> PollOutcome {
        let (task_ids, generation) = {
            let state = self.state.read().await;
            (state.non_terminal_ids(), state.generation)
        };
        if task_ids.is_empty() {
            return PollOutcome::Idle;
        }

        let fetches = task_ids.into_iter().map(|task_id| async move {
            let result = self.api.detail(&task_id).await;
            (task_id, result)
        });
        let results = join_all(fetches).await;

        match reconcile(results) {
            Reconciliation::Refetch => {
                debug!("Task reached a terminal state, refetching page");
                self.query().await;
                PollOutcome::Refetched
            }
            Reconciliation::Patch(patches) => {
                let mut state = self.state.write().await;
                if state.generation != generation {
                    debug!("Query started during poll, dropping patches");
                    return PollOutcome::Stale;
                }
                PollOutcome::Patched(apply_patches(&mut state.tasks, patches))
            }
        }
    }

    /// Start the background poller; dropping the handle stops it
    pub fn start_poller(&self) -> PollerHandle {
        poller::spawn(self.clone(), self.options.poll_interval)
    }
}

impl std::fmt::Debug for TaskListController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskListController")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
