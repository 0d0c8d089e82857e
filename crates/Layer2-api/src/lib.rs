//! # castdesk-api
//!
//! Backend client layer for castdesk.
//!
//! ## Features
//! - Task model with lenient decoding of backend payloads
//! - List query model (filters, default date range, pagination)
//! - `TaskApi` trait with a reqwest implementation
//! - Streaming artifact downloads

mod de;
pub mod download;
pub mod error;
pub mod http;
pub mod query;
pub mod request;
pub mod task;
pub mod r#trait;

// Core trait and client
pub use http::HttpTaskApi;
pub use r#trait::TaskApi;

// Model
pub use query::{day_end, day_start, default_date_range, StatusFilter, TaskFilter, TaskPage, TaskQuery, Visibility};
pub use request::{CreateTaskRequest, UpdateTaskRequest};
pub use task::{ArtifactKind, Task, TaskStatus};

// Errors
pub use error::{extract_message, ApiError, ApiResult, Operation};
