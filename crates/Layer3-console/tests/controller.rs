//! TaskListController against an in-memory backend

mod support;

use castdesk_api::{ArtifactKind, Operation, StatusFilter, TaskStatus, UpdateTaskRequest, Visibility};
use castdesk_console::{
    ControllerOptions, CreateForm, Dialog, NotificationKind, PollOutcome, COPY_FAILURE,
    COPY_SUCCESS,
};
use std::sync::atomic::Ordering;
use std::time::Duration;
use support::{harness, harness_with};

// ============================================================================
// Query
// ============================================================================

#[tokio::test]
async fn test_unfiltered_query_returns_backend_page() {
    let h = harness();
    h.backend.seed_many(23, TaskStatus::Completed);

    assert!(h.controller.query().await);
    let state = h.controller.snapshot().await;

    assert_eq!(state.tasks.len(), 10);
    assert_eq!(state.total, 23);
    assert!(!state.loading);
    assert_eq!(state.tasks[0].id, h.backend.all()[0].id);
}

#[tokio::test]
async fn test_total_independent_of_page_size() {
    let h = harness();
    h.backend.seed_many(23, TaskStatus::Completed);

    h.controller.set_rows_per_page(5).await;
    let state = h.controller.snapshot().await;
    assert_eq!(state.tasks.len(), 5);
    assert_eq!(state.total, 23);
    assert_eq!(state.page_count(), 5);
}

#[tokio::test]
async fn test_query_failure_keeps_previous_tasks() {
    let h = harness();
    h.backend.seed("a", TaskStatus::Completed);
    h.controller.query().await;

    h.backend.fail(Operation::List);
    assert!(!h.controller.query().await);

    let state = h.controller.snapshot().await;
    assert_eq!(state.tasks.len(), 1);
    assert_eq!(state.error.as_deref(), Some("Failed to fetch task list"));

    h.controller.dismiss_error().await;
    assert!(h.controller.snapshot().await.error.is_none());
}

#[tokio::test]
async fn test_pagination() {
    let h = harness();
    h.backend.seed_many(15, TaskStatus::Completed);
    h.controller.query().await;

    assert!(!h.controller.prev_page().await);
    assert!(h.controller.next_page().await);

    let state = h.controller.snapshot().await;
    assert_eq!(state.page, 1);
    assert_eq!(state.tasks.len(), 5);
    assert!(!h.controller.next_page().await);
}

#[tokio::test]
async fn test_filters_reset_page_and_narrow() {
    let h = harness();
    h.backend.seed_many(12, TaskStatus::Completed);
    h.backend.seed("bad", TaskStatus::Failed);
    h.backend.edit("bad", |t| t.is_public = true);
    h.controller.query().await;
    h.controller.next_page().await;

    h.controller
        .update_filter(|f| f.status = StatusFilter::Failed)
        .await;
    let state = h.controller.snapshot().await;
    assert_eq!(state.page, 0);
    assert_eq!(state.total, 1);
    assert_eq!(state.tasks[0].id, "bad");

    h.controller
        .update_filter(|f| f.visibility = Visibility::Private)
        .await;
    assert_eq!(h.controller.snapshot().await.total, 0);

    h.controller.reset_filters().await;
    let state = h.controller.snapshot().await;
    assert_eq!(state.total, 13);
    assert_eq!(state.filter.status, StatusFilter::All);
    assert!(state.filter.start_date.is_some());
}

// ============================================================================
// Mutations
// ============================================================================

#[tokio::test]
async fn test_create_adds_one_record_and_closes_dialog() {
    let h = harness();
    h.controller.open_create_dialog().await;
    h.controller
        .update_dialog(|d| {
            if let Dialog::Create(form) = d {
                form.url = "http://example.com/a".to_string();
                form.is_public = false;
            }
        })
        .await;

    assert!(h.controller.submit_dialog().await);

    let all = h.backend.all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].url, "http://example.com/a");
    assert!(!all[0].is_public);

    let state = h.controller.snapshot().await;
    assert!(state.dialog.is_none());
    assert_eq!(state.tasks.len(), 1);
    assert_eq!(h.notifier.last().unwrap().message, "Task created");

    // 다시 열면 빈 폼
    h.controller.open_create_dialog().await;
    assert_eq!(
        h.controller.snapshot().await.dialog,
        Some(Dialog::Create(CreateForm::default()))
    );
}

#[tokio::test]
async fn test_create_refuses_empty_url() {
    let h = harness();
    h.controller.open_create_dialog().await;

    assert!(!h.controller.submit_dialog().await);

    let state = h.controller.snapshot().await;
    assert!(h.backend.all().is_empty());
    assert!(matches!(state.dialog, Some(Dialog::Create(ref f)) if !f.submitting));
    assert_eq!(state.error.as_deref(), Some("URL must not be empty"));
}

#[tokio::test]
async fn test_create_failure_keeps_dialog_open() {
    let h = harness();
    h.backend.fail(Operation::Create);
    h.controller.open_create_dialog().await;
    h.controller
        .update_dialog(|d| {
            if let Dialog::Create(form) = d {
                form.url = "http://example.com/a".to_string();
            }
        })
        .await;

    assert!(!h.controller.submit_dialog().await);

    let state = h.controller.snapshot().await;
    assert!(matches!(state.dialog, Some(Dialog::Create(ref f)) if f.url == "http://example.com/a"));
    assert_eq!(state.error.as_deref(), Some("Failed to create task"));
    assert_eq!(h.backend.list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_retry_failed_task() {
    let h = harness();
    h.backend.seed("t", TaskStatus::Failed);
    h.controller.query().await;

    assert!(h.controller.retry("t").await);

    let state = h.controller.snapshot().await;
    assert_ne!(state.task("t").unwrap().status, TaskStatus::Failed);
}

#[tokio::test]
async fn test_retry_rejected_surfaces_backend_message() {
    let h = harness();
    h.backend.seed("t", TaskStatus::Completed);
    h.controller.query().await;

    assert!(!h.controller.retry("t").await);
    assert_eq!(
        h.controller.snapshot().await.error.as_deref(),
        Some("Only failed tasks can be retried")
    );
}

#[tokio::test]
async fn test_delete_removes_task_and_closes_dialog() {
    let h = harness();
    h.backend.seed("keep", TaskStatus::Completed);
    h.backend.seed("T", TaskStatus::Completed);
    h.controller.query().await;

    assert!(h.controller.open_delete_dialog("T").await);
    assert!(h.controller.submit_dialog().await);

    let state = h.controller.snapshot().await;
    assert!(state.dialog.is_none());
    assert!(state.task("T").is_none());
    assert_eq!(state.total, 1);
}

#[tokio::test]
async fn test_delete_failure_keeps_dialog() {
    let h = harness();
    h.backend.seed("T", TaskStatus::Completed);
    h.controller.query().await;
    h.controller.open_delete_dialog("T").await;
    h.backend.fail(Operation::Delete);

    assert!(!h.controller.submit_dialog().await);
    let state = h.controller.snapshot().await;
    assert!(matches!(state.dialog, Some(Dialog::Delete(ref c)) if c.task_id == "T"));
    assert_eq!(state.error.as_deref(), Some("Failed to delete task"));
}

#[tokio::test]
async fn test_edit_to_empty_title_and_public() {
    let h = harness();
    h.backend.seed("t", TaskStatus::Completed);
    h.backend.edit("t", |t| t.title = Some("Old title".into()));
    h.controller.query().await;

    assert!(h.controller.open_edit_dialog("t").await);
    match h.controller.snapshot().await.dialog {
        Some(Dialog::Edit(form)) => {
            assert_eq!(form.title, "Old title");
            assert!(!form.is_public);
        }
        other => panic!("expected edit dialog, got {:?}", other),
    }

    h.controller
        .update_dialog(|d| {
            if let Dialog::Edit(form) = d {
                form.title.clear();
                form.is_public = true;
            }
        })
        .await;
    assert!(h.controller.submit_dialog().await);

    let detail = h.backend.get("t").unwrap();
    assert_eq!(detail.title.as_deref(), Some(""));
    assert!(detail.is_public);
    assert!(h.controller.snapshot().await.dialog.is_none());
}

#[tokio::test]
async fn test_edit_without_dialog() {
    let h = harness();
    h.backend.seed("t", TaskStatus::Pending);

    assert!(h.controller.edit("t", UpdateTaskRequest::new("Renamed", false)).await);
    assert_eq!(h.backend.get("t").unwrap().title.as_deref(), Some("Renamed"));
}

#[tokio::test]
async fn test_open_dialog_for_missing_task() {
    let h = harness();
    assert!(!h.controller.open_edit_dialog("nope").await);
    assert!(!h.controller.open_delete_dialog("nope").await);
    assert!(h.controller.snapshot().await.dialog.is_none());
}

// ============================================================================
// Poll
// ============================================================================

#[tokio::test]
async fn test_poll_refetches_on_terminal_status() {
    let h = harness();
    h.backend.seed("p", TaskStatus::Processing);
    h.controller.query().await;
    let lists_before = h.backend.list_calls.load(Ordering::SeqCst);

    h.backend.set_status("p", TaskStatus::Completed);
    assert_eq!(h.controller.poll_once().await, PollOutcome::Refetched);

    assert_eq!(h.backend.list_calls.load(Ordering::SeqCst), lists_before + 1);
    let state = h.controller.snapshot().await;
    assert_eq!(state.task("p").unwrap().status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_poll_patches_running_tasks_in_place() {
    let h = harness();
    h.backend.seed("a", TaskStatus::Pending);
    h.backend.seed("b", TaskStatus::Processing);
    h.backend.seed("done", TaskStatus::Completed);
    h.controller.query().await;
    let lists_before = h.backend.list_calls.load(Ordering::SeqCst);

    h.backend.edit("b", |t| {
        t.current_step_index = Some(2);
        t.total_steps = Some(4);
        t.current_step = Some("tts".into());
    });
    assert_eq!(h.controller.poll_once().await, PollOutcome::Patched(2));

    // 종료된 태스크는 조회하지 않음
    assert_eq!(h.backend.detail_calls.load(Ordering::SeqCst), 2);
    assert_eq!(h.backend.list_calls.load(Ordering::SeqCst), lists_before);

    let state = h.controller.snapshot().await;
    let b = state.task("b").unwrap();
    assert_eq!(b.progress_percent(), 75);
    assert_eq!(b.step_label(), "tts");
}

#[tokio::test]
async fn test_poll_failure_keeps_prior_state() {
    let h = harness();
    h.backend.seed("a", TaskStatus::Processing);
    h.backend.seed("b", TaskStatus::Processing);
    h.controller.query().await;

    h.backend.fail_detail_for("a");
    h.backend.edit("a", |t| t.progress_message = Some("hidden".into()));
    h.backend.edit("b", |t| t.progress_message = Some("visible".into()));

    assert_eq!(h.controller.poll_once().await, PollOutcome::Patched(1));
    let state = h.controller.snapshot().await;
    assert!(state.task("a").unwrap().progress_message.is_none());
    assert_eq!(state.task("b").unwrap().progress_message.as_deref(), Some("visible"));
    assert!(state.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_query_during_poll_wins() {
    let h = harness();
    h.backend.seed("p", TaskStatus::Processing);
    h.controller.query().await;

    h.backend.slow_detail(Duration::from_secs(1));
    let controller = h.controller.clone();
    let tick = tokio::spawn(async move { controller.poll_once().await });
    // 폴러가 detail 응답을 기다리는 동안 새 조회가 끝난다
    tokio::time::sleep(Duration::from_millis(10)).await;

    h.backend.edit("p", |t| t.progress_message = Some("from-query".into()));
    assert!(h.controller.query().await);

    assert_eq!(tick.await.unwrap(), PollOutcome::Stale);
    let state = h.controller.snapshot().await;
    assert_eq!(
        state.task("p").unwrap().progress_message.as_deref(),
        Some("from-query")
    );
}

#[tokio::test(start_paused = true)]
async fn test_superseded_query_result_dropped() {
    let h = harness();
    h.backend.seed("a", TaskStatus::Completed);

    h.backend.slow_list(Duration::from_secs(2));
    let controller = h.controller.clone();
    let older = tokio::spawn(async move { controller.query().await });
    tokio::time::sleep(Duration::from_millis(10)).await;

    h.backend.slow_list(Duration::ZERO);
    h.backend.seed("b", TaskStatus::Pending);
    assert!(h.controller.query().await);

    assert!(!older.await.unwrap());
    let state = h.controller.snapshot().await;
    assert_eq!(state.total, 2);
    assert_eq!(state.tasks[0].id, "b");
    assert!(!state.loading);
}

#[tokio::test]
async fn test_poll_idle_without_running_tasks() {
    let h = harness();
    h.backend.seed("done", TaskStatus::Completed);
    h.controller.query().await;

    assert_eq!(h.controller.poll_once().await, PollOutcome::Idle);
    assert_eq!(h.backend.detail_calls.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Downloads & clipboard
// ============================================================================

#[tokio::test]
async fn test_download_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness_with(ControllerOptions {
        rows_per_page: 10,
        poll_interval: Duration::from_secs(5),
        download_dir: dir.path().to_path_buf(),
    });
    h.backend.seed("t", TaskStatus::Completed);
    h.backend
        .edit("t", |t| t.audio_url_cn = Some("/audio/t/t_cn.mp3".into()));
    h.controller.query().await;

    let path = h.controller.download("t", ArtifactKind::AudioCn).await.unwrap();
    assert_eq!(path, dir.path().join("t_cn.mp3"));
    assert!(path.exists());
    assert_eq!(h.notifier.last().unwrap().kind, NotificationKind::Success);

    assert!(h.controller.download("t", ArtifactKind::SubtitleEn).await.is_none());
    let error = h.controller.snapshot().await.error.unwrap();
    assert!(error.starts_with("Failed to download file"));
}

#[tokio::test]
async fn test_copy_notifications() {
    let h = harness();
    h.controller.report_copy(true);
    h.controller.report_copy(false);

    let seen = h.notifier.notifications();
    assert_eq!(seen[0].message, COPY_SUCCESS);
    assert_eq!(seen[1].message, COPY_FAILURE);
    assert_eq!(seen[1].kind, NotificationKind::Failure);
}
