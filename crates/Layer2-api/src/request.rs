//! Mutation payloads

use serde::{Deserialize, Serialize};

/// Body of `POST /api/post_task`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub url: String,
    pub is_public: bool,
}

impl CreateTaskRequest {
    pub fn new(url: impl Into<String>, is_public: bool) -> Self {
        Self {
            url: url.into(),
            is_public,
        }
    }

    /// Submitting an empty (or blank) URL is refused before any request goes out
    pub fn is_submittable(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

/// Body of `PUT /api/update_task/{taskId}`
///
/// An empty title is sent as-is and clears the stored title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: String,
    pub is_public: bool,
}

impl UpdateTaskRequest {
    pub fn new(title: impl Into<String>, is_public: bool) -> Self {
        Self {
            title: title.into(),
            is_public,
        }
    }
}
