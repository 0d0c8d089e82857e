//! Non-interactive CLI mode
//!
//! One request per command against the task backend, printed for scripts and
//! terminals. `watch` polls a single task the way the page's poller does.

use crate::format;
use castdesk_api::{
    ArtifactKind, CreateTaskRequest, Task, TaskApi, TaskFilter, TaskQuery, UpdateTaskRequest,
};
use std::path::Path;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Print one page of tasks
pub async fn list(
    api: &dyn TaskApi,
    filter: TaskFilter,
    page: u32,
    rows: u32,
    json: bool,
) -> anyhow::Result<()> {
    let query = TaskQuery::page(filter, page, rows.max(1));
    let result = api.list(&query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result.items)?);
        return Ok(());
    }

    if result.items.is_empty() {
        println!("No tasks match the current filters.");
        return Ok(());
    }
    for task in &result.items {
        println!("{}", format::task_row(task));
    }

    let first = u64::from(page) * u64::from(rows.max(1)) + 1;
    let last = first + result.items.len() as u64 - 1;
    println!("\n{}-{} of {}", first, last.min(result.total), result.total);
    Ok(())
}

pub async fn show(api: &dyn TaskApi, task_id: &str, json: bool) -> anyhow::Result<()> {
    let task = api.detail(task_id).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
    } else {
        println!("{}", format::task_detail(&task));
    }
    Ok(())
}

pub async fn create(api: &dyn TaskApi, url: &str, is_public: bool) -> anyhow::Result<()> {
    let request = CreateTaskRequest::new(url.trim(), is_public);
    if !request.is_submittable() {
        anyhow::bail!("URL must not be empty");
    }
    let task = api.create(&request).await?;
    info!(task_id = %task.id, "Created task");
    println!("✓ Task created: {}", task.id);
    Ok(())
}

/// Update title and/or visibility; unspecified fields keep the task's current value
pub async fn edit(
    api: &dyn TaskApi,
    task_id: &str,
    title: Option<String>,
    is_public: Option<bool>,
) -> anyhow::Result<()> {
    let current = api.detail(task_id).await?;
    let request = merge_edit(&current, title, is_public);
    api.update(task_id, &request).await?;
    println!("✓ Task updated: {}", task_id);
    Ok(())
}

fn merge_edit(current: &Task, title: Option<String>, is_public: Option<bool>) -> UpdateTaskRequest {
    UpdateTaskRequest::new(
        title.unwrap_or_else(|| current.title.clone().unwrap_or_default()),
        is_public.unwrap_or(current.is_public),
    )
}

pub async fn delete(api: &dyn TaskApi, task_id: &str) -> anyhow::Result<()> {
    api.delete(task_id).await?;
    println!("✓ Task deleted: {}", task_id);
    Ok(())
}

pub async fn retry(api: &dyn TaskApi, task_id: &str) -> anyhow::Result<()> {
    api.retry(task_id).await?;
    println!("✓ Task queued for retry: {}", task_id);
    Ok(())
}

pub async fn download(
    api: &dyn TaskApi,
    task_id: &str,
    kind: ArtifactKind,
    dest_dir: &Path,
) -> anyhow::Result<()> {
    let task = api.detail(task_id).await?;
    let Some(file_url) = task.artifact_url(kind) else {
        anyhow::bail!("Task {} has no {} artifact", task_id, kind.slug());
    };
    let path = api.download(task_id, file_url, dest_dir).await?;
    println!("✓ Downloaded {}", path.display());
    Ok(())
}

/// Print progress until the task is terminal
pub async fn watch(api: &dyn TaskApi, task_id: &str, every: Duration) -> anyhow::Result<()> {
    let task = watch_until_terminal(api, task_id, every, |task| {
        println!("{} {}", task.status.symbol(), describe(task));
    })
    .await?;
    println!("\n{}", format::task_detail(&task));
    Ok(())
}

fn describe(task: &Task) -> String {
    match task.progress_message.as_deref() {
        Some(message) if task.shows_progress() => {
            format!("{} - {}", format::progress(task), message)
        }
        _ if task.shows_progress() => format::progress(task),
        _ => task.status.display_name().to_string(),
    }
}

/// Poll `task_id` every `every`, calling `on_change` whenever status or
/// progress moved, and return the first terminal snapshot
pub async fn watch_until_terminal<F>(
    api: &dyn TaskApi,
    task_id: &str,
    every: Duration,
    mut on_change: F,
) -> anyhow::Result<Task>
where
    F: FnMut(&Task),
{
    let mut ticker = interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last: Option<Task> = None;
    loop {
        let task = api.detail(task_id).await?;
        let changed = last.as_ref().map_or(true, |prev| {
            prev.status != task.status
                || prev.current_step_index != task.current_step_index
                || prev.progress_message != task.progress_message
        });
        if changed {
            on_change(&task);
        }
        if task.is_terminal() {
            return Ok(task);
        }
        debug!(task_id, status = task.status.as_str(), "Waiting for next poll");
        last = Some(task);
        ticker.tick().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use castdesk_api::{ApiError, ApiResult, Operation, TaskPage, TaskStatus};
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Returns scripted detail snapshots in order, repeating the last one
    struct ScriptedApi {
        details: Mutex<Vec<Task>>,
    }

    impl ScriptedApi {
        fn new(mut details: Vec<Task>) -> Self {
            details.reverse();
            Self {
                details: Mutex::new(details),
            }
        }
    }

    #[async_trait]
    impl TaskApi for ScriptedApi {
        async fn list(&self, _: &TaskQuery) -> ApiResult<TaskPage> {
            Ok(TaskPage::default())
        }
        async fn create(&self, _: &CreateTaskRequest) -> ApiResult<Task> {
            Err(ApiError::InvalidInput("unused".into()))
        }
        async fn delete(&self, _: &str) -> ApiResult<()> {
            Ok(())
        }
        async fn retry(&self, _: &str) -> ApiResult<()> {
            Ok(())
        }
        async fn detail(&self, task_id: &str) -> ApiResult<Task> {
            let mut details = self.details.lock().unwrap();
            let task = if details.len() > 1 {
                details.pop()
            } else {
                details.last().cloned()
            };
            task.ok_or_else(|| ApiError::from_response(Operation::Detail, 404, task_id))
        }
        async fn update(&self, _: &str, _: &UpdateTaskRequest) -> ApiResult<Task> {
            Err(ApiError::InvalidInput("unused".into()))
        }
        async fn download(&self, _: &str, _: &str, _: &Path) -> ApiResult<PathBuf> {
            Err(ApiError::InvalidInput("unused".into()))
        }
    }

    fn snapshot(status: TaskStatus, step: Option<u32>) -> Task {
        Task {
            status,
            current_step_index: step,
            total_steps: Some(4),
            ..Task::new("t1", "http://example.com/a")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_reports_changes_until_terminal() {
        let api = ScriptedApi::new(vec![
            snapshot(TaskStatus::Pending, None),
            snapshot(TaskStatus::Processing, Some(0)),
            snapshot(TaskStatus::Processing, Some(0)),
            snapshot(TaskStatus::Processing, Some(2)),
            snapshot(TaskStatus::Completed, Some(3)),
        ]);

        let mut seen = Vec::new();
        let task = watch_until_terminal(&api, "t1", Duration::from_secs(5), |t| {
            seen.push((t.status.clone(), t.current_step_index));
        })
        .await
        .unwrap();

        assert_eq!(task.status, TaskStatus::Completed);
        // 변화가 없는 세 번째 스냅샷은 건너뛴다
        assert_eq!(
            seen,
            vec![
                (TaskStatus::Pending, None),
                (TaskStatus::Processing, Some(0)),
                (TaskStatus::Processing, Some(2)),
                (TaskStatus::Completed, Some(3)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_propagates_errors() {
        let api = ScriptedApi::new(vec![]);
        let result = watch_until_terminal(&api, "gone", Duration::from_secs(1), |_| {}).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_edit_keeps_unspecified_fields() {
        let mut current = Task::new("t1", "http://a");
        current.title = Some("Old".into());
        current.is_public = true;

        let request = merge_edit(&current, None, Some(false));
        assert_eq!(request, UpdateTaskRequest::new("Old", false));

        let request = merge_edit(&current, Some("New".into()), None);
        assert_eq!(request, UpdateTaskRequest::new("New", true));
    }

    #[test]
    fn test_describe_completed_task() {
        let task = snapshot(TaskStatus::Completed, Some(3));
        assert_eq!(describe(&task), "Completed");

        let mut task = snapshot(TaskStatus::Processing, Some(1));
        task.progress_message = Some("Translating".into());
        assert_eq!(describe(&task), "50% Preparing - Translating");
    }
}
