//! In-memory backend for controller tests

#![allow(dead_code)]

use async_trait::async_trait;
use castdesk_api::{
    download::file_name_for, ApiError, ApiResult, CreateTaskRequest, Operation, Task, TaskApi,
    TaskFilter, TaskPage, TaskQuery, TaskStatus, UpdateTaskRequest,
};
use castdesk_console::{ControllerOptions, RecordingNotifier, TaskListController};
use chrono::Utc;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub struct FakeBackend {
    tasks: Mutex<Vec<Task>>,
    next_id: AtomicUsize,
    fail_ops: Mutex<HashSet<Operation>>,
    fail_detail_for: Mutex<HashSet<String>>,
    list_delay: Mutex<Duration>,
    detail_delay: Mutex<Duration>,
    pub list_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Seed a task with the given status; newest first like the backend
    pub fn seed(&self, id: &str, status: TaskStatus) -> Task {
        let task = Task {
            status,
            created_at: Some(Utc::now()),
            ..Task::new(id, format!("http://example.com/{}", id))
        };
        self.tasks.lock().unwrap().insert(0, task.clone());
        task
    }

    pub fn seed_many(&self, count: usize, status: TaskStatus) {
        for i in 0..count {
            self.seed(&format!("seed-{:03}", i), status.clone());
        }
    }

    pub fn set_status(&self, id: &str, status: TaskStatus) {
        if let Some(task) = self.tasks.lock().unwrap().iter_mut().find(|t| t.id == id) {
            task.status = status;
        }
    }

    pub fn edit(&self, id: &str, edit: impl FnOnce(&mut Task)) {
        if let Some(task) = self.tasks.lock().unwrap().iter_mut().find(|t| t.id == id) {
            edit(task);
        }
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        self.tasks.lock().unwrap().iter().find(|t| t.id == id).cloned()
    }

    pub fn all(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().clone()
    }

    pub fn fail(&self, op: Operation) {
        self.fail_ops.lock().unwrap().insert(op);
    }

    pub fn heal(&self, op: Operation) {
        self.fail_ops.lock().unwrap().remove(&op);
    }

    pub fn fail_detail_for(&self, id: &str) {
        self.fail_detail_for.lock().unwrap().insert(id.to_string());
    }

    /// Answer `list` with the data as of the call, `delay` later
    pub fn slow_list(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = delay;
    }

    /// Answer `detail` with the data as of the call, `delay` later
    pub fn slow_detail(&self, delay: Duration) {
        *self.detail_delay.lock().unwrap() = delay;
    }

    async fn respond_after<T>(delay: Duration, value: T) -> T {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        value
    }

    fn check(&self, op: Operation) -> ApiResult<()> {
        if self.fail_ops.lock().unwrap().contains(&op) {
            return Err(ApiError::from_response(op, 500, ""));
        }
        Ok(())
    }

    fn not_found(op: Operation) -> ApiError {
        ApiError::from_response(op, 404, r#"{"detail":"Task not found"}"#)
    }

    fn matches(task: &Task, filter: &TaskFilter) -> bool {
        let in_range = match task.created_at {
            Some(created) => {
                filter.start_date.map_or(true, |s| created >= s)
                    && filter.end_date.map_or(true, |e| created <= e)
            }
            None => true,
        };
        filter.status.matches(&task.status)
            && filter.visibility.matches(task.is_public)
            && task
                .title
                .as_deref()
                .unwrap_or_default()
                .contains(filter.title_keyword.as_str())
            && task.url.contains(filter.url_keyword.as_str())
            && in_range
    }
}

#[async_trait]
impl TaskApi for FakeBackend {
    async fn list(&self, query: &TaskQuery) -> ApiResult<TaskPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Operation::List)?;

        let page = {
            let tasks = self.tasks.lock().unwrap();
            let matching: Vec<&Task> = tasks
                .iter()
                .filter(|t| Self::matches(t, &query.filter))
                .collect();
            let items = matching
                .iter()
                .skip(query.offset as usize)
                .take(query.limit as usize)
                .map(|t| (*t).clone())
                .collect();
            TaskPage {
                items,
                total: matching.len() as u64,
            }
        };

        let delay = *self.list_delay.lock().unwrap();
        Ok(Self::respond_after(delay, page).await)
    }

    async fn create(&self, request: &CreateTaskRequest) -> ApiResult<Task> {
        self.check(Operation::Create)?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let task = Task {
            is_public: request.is_public,
            created_at: Some(Utc::now()),
            ..Task::new(format!("new-{}", n), request.url.clone())
        };
        self.tasks.lock().unwrap().insert(0, task.clone());
        Ok(task)
    }

    async fn delete(&self, task_id: &str) -> ApiResult<()> {
        self.check(Operation::Delete)?;
        let mut tasks = self.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|t| t.id != task_id);
        if tasks.len() == before {
            return Err(Self::not_found(Operation::Delete));
        }
        Ok(())
    }

    async fn retry(&self, task_id: &str) -> ApiResult<()> {
        self.check(Operation::Retry)?;
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| Self::not_found(Operation::Retry))?;
        if task.status != TaskStatus::Failed {
            return Err(ApiError::from_response(
                Operation::Retry,
                400,
                r#"{"detail":"Only failed tasks can be retried"}"#,
            ));
        }
        task.status = TaskStatus::Pending;
        Ok(())
    }

    async fn detail(&self, task_id: &str) -> ApiResult<Task> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Operation::Detail)?;
        if self.fail_detail_for.lock().unwrap().contains(task_id) {
            return Err(ApiError::network(Operation::Detail, "connection reset"));
        }
        let result = self
            .get(task_id)
            .ok_or_else(|| Self::not_found(Operation::Detail));

        let delay = *self.detail_delay.lock().unwrap();
        Self::respond_after(delay, result).await
    }

    async fn update(&self, task_id: &str, request: &UpdateTaskRequest) -> ApiResult<Task> {
        self.check(Operation::Update)?;
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| Self::not_found(Operation::Update))?;
        task.title = Some(request.title.clone());
        task.is_public = request.is_public;
        Ok(task.clone())
    }

    async fn download(
        &self,
        task_id: &str,
        file_url: &str,
        dest_dir: &Path,
    ) -> ApiResult<PathBuf> {
        self.check(Operation::Download)?;
        let path = dest_dir.join(file_name_for(task_id, file_url));
        std::fs::create_dir_all(dest_dir).map_err(|e| ApiError::io(Operation::Download, e))?;
        std::fs::write(&path, format!("artifact of {}", task_id))
            .map_err(|e| ApiError::io(Operation::Download, e))?;
        Ok(path)
    }
}

pub struct Harness {
    pub backend: Arc<FakeBackend>,
    pub notifier: Arc<RecordingNotifier>,
    pub controller: TaskListController,
}

pub fn harness() -> Harness {
    harness_with(ControllerOptions {
        rows_per_page: 10,
        poll_interval: Duration::from_secs(5),
        download_dir: std::env::temp_dir(),
    })
}

pub fn harness_with(options: ControllerOptions) -> Harness {
    let backend = FakeBackend::new();
    let notifier = Arc::new(RecordingNotifier::new());
    let controller = TaskListController::new(backend.clone(), notifier.clone(), options);
    Harness {
        backend,
        notifier,
        controller,
    }
}
