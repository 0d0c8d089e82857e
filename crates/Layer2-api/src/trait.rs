//! TaskApi trait
//!
//! 백엔드 태스크 API를 추상화합니다. 컨트롤러와 CLI는 이 트레잇에만 의존하고,
//! 실제 구현은 [`HttpTaskApi`](crate::HttpTaskApi), 테스트는 인메모리 구현을 사용합니다.

use crate::error::ApiResult;
use crate::query::{TaskPage, TaskQuery};
use crate::request::{CreateTaskRequest, UpdateTaskRequest};
use crate::task::Task;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Backend task operations
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// One page of tasks matching `query`
    async fn list(&self, query: &TaskQuery) -> ApiResult<TaskPage>;

    /// Create a task from a source URL
    async fn create(&self, request: &CreateTaskRequest) -> ApiResult<Task>;

    /// Delete a task by id
    async fn delete(&self, task_id: &str) -> ApiResult<()>;

    /// Re-queue a failed task
    async fn retry(&self, task_id: &str) -> ApiResult<()>;

    /// Current state of one task
    async fn detail(&self, task_id: &str) -> ApiResult<Task>;

    /// Change title and visibility
    async fn update(&self, task_id: &str, request: &UpdateTaskRequest) -> ApiResult<Task>;

    /// Download an artifact of `task_id` into `dest_dir`, returning the written path
    async fn download(&self, task_id: &str, file_url: &str, dest_dir: &Path)
        -> ApiResult<PathBuf>;
}
