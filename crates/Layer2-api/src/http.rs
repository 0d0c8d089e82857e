//! reqwest-backed [`TaskApi`] implementation

use crate::download::{file_name_for, write_stream};
use crate::error::{ApiError, ApiResult, Operation};
use crate::query::{TaskPage, TaskQuery};
use crate::r#trait::TaskApi;
use crate::request::{CreateTaskRequest, UpdateTaskRequest};
use crate::task::{Task, TaskStatus};
use async_trait::async_trait;
use castdesk_foundation::{ConsoleConfig, Error as FoundationError};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// HTTP client for the task backend
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
}

impl HttpTaskApi {
    /// Create a client for `base_url` without a request timeout
    pub fn new(base_url: &str) -> castdesk_foundation::Result<Self> {
        Self::build(base_url, None)
    }

    /// Create from the effective console configuration
    pub fn from_config(config: &ConsoleConfig) -> castdesk_foundation::Result<Self> {
        let api = Self::build(config.base_url(), config.request_timeout())?;
        Ok(match config.api_token.as_deref() {
            Some(token) => api.with_token(token),
            None => api,
        })
    }

    /// Send `Authorization: Bearer <token>` on every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.api_token = (!token.trim().is_empty()).then_some(token);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn build(base_url: &str, timeout: Option<Duration>) -> castdesk_foundation::Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            return Err(FoundationError::Config(format!(
                "baseUrl '{}' cannot be used as a base",
                base_url
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FoundationError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_token: None,
        })
    }

    /// `{base}/api/{segments...}`; segments are percent-encoded
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    /// Absolute artifact URLs are used as-is, relative ones hang off the base URL
    pub fn resolve_file_url(&self, file_url: &str) -> ApiResult<Url> {
        let op = Operation::Download;
        if let Ok(url) = Url::parse(file_url) {
            if !url.cannot_be_a_base() {
                return Ok(url);
            }
        }
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            file_url.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| ApiError::InvalidInput(format!("{} ({})", op.default_message(), e)))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and turn non-success statuses into [`ApiError::Backend`]
    async fn send(&self, operation: Operation, builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::network(operation, e))?;

        let status = response.status();
        debug!(operation = %operation, status = status.as_u16(), "backend responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_response(operation, status.as_u16(), &body));
        }
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(operation: Operation, response: Response) -> ApiResult<T> {
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::network(operation, e))?;
        serde_json::from_str(&body).map_err(|e| ApiError::decode(operation, e))
    }
}

/// Create returns either a full task or just `{"taskId": ...}`
fn task_from_create_response(body: Value, request: &CreateTaskRequest) -> ApiResult<Task> {
    let op = Operation::Create;
    if body.get("url").is_some() {
        return serde_json::from_value(body).map_err(|e| ApiError::decode(op, e));
    }

    let id = body
        .get("taskId")
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .ok_or_else(|| ApiError::decode(op, "response carries no taskId"))?;

    Ok(Task {
        is_public: request.is_public,
        status: TaskStatus::Pending,
        ..Task::new(id, request.url.clone())
    })
}

fn task_from_update_body(body: &str) -> Option<Task> {
    serde_json::from_str::<Task>(body)
        .ok()
        .filter(|task| !task.id.is_empty())
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list(&self, query: &TaskQuery) -> ApiResult<TaskPage> {
        let op = Operation::List;
        let url = self.endpoint(&["get_tasks"]);
        debug!(offset = query.offset, limit = query.limit, "listing tasks");

        let response = self
            .send(op, self.request(Method::GET, url).query(&query.to_params()))
            .await?;
        Self::json(op, response).await
    }

    async fn create(&self, request: &CreateTaskRequest) -> ApiResult<Task> {
        let op = Operation::Create;
        if !request.is_submittable() {
            return Err(ApiError::InvalidInput("URL must not be empty".to_string()));
        }

        let url = self.endpoint(&["post_task"]);
        let response = self
            .send(op, self.request(Method::POST, url).json(request))
            .await?;
        let body: Value = Self::json(op, response).await?;
        let task = task_from_create_response(body, request)?;

        info!(task_id = %task.id, url = %task.url, is_public = task.is_public, "task created");
        Ok(task)
    }

    async fn delete(&self, task_id: &str) -> ApiResult<()> {
        let url = self.endpoint(&["delete_task", task_id]);
        self.send(Operation::Delete, self.request(Method::DELETE, url))
            .await?;
        info!(task_id, "task deleted");
        Ok(())
    }

    async fn retry(&self, task_id: &str) -> ApiResult<()> {
        let url = self.endpoint(&["retry_task", task_id]);
        self.send(Operation::Retry, self.request(Method::POST, url))
            .await?;
        info!(task_id, "task retried");
        Ok(())
    }

    async fn detail(&self, task_id: &str) -> ApiResult<Task> {
        let op = Operation::Detail;
        let url = self.endpoint(&["get_task"]);
        let response = self
            .send(
                op,
                self.request(Method::GET, url).query(&[("taskId", task_id)]),
            )
            .await?;
        Self::json(op, response).await
    }

    async fn update(&self, task_id: &str, request: &UpdateTaskRequest) -> ApiResult<Task> {
        let op = Operation::Update;
        let url = self.endpoint(&["update_task", task_id]);
        let response = self
            .send(op, self.request(Method::PUT, url).json(request))
            .await?;
        info!(task_id, is_public = request.is_public, "task updated");

        // Any 2xx means the update landed; the body is not always the task.
        let body = response.text().await.unwrap_or_default();
        match task_from_update_body(&body) {
            Some(task) => Ok(task),
            None => self.detail(task_id).await,
        }
    }

    async fn download(
        &self,
        task_id: &str,
        file_url: &str,
        dest_dir: &Path,
    ) -> ApiResult<PathBuf> {
        let op = Operation::Download;
        let url = self.resolve_file_url(file_url)?;
        let file_name = file_name_for(task_id, url.path());
        debug!(task_id, %url, file_name = %file_name, "downloading artifact");

        let response = self.send(op, self.request(Method::GET, url)).await?;
        let (path, bytes) =
            write_stream(Box::pin(response.bytes_stream()), dest_dir, &file_name).await?;

        info!(task_id, path = %path.display(), bytes, "artifact downloaded");
        Ok(path)
    }
}
