//! API error types
//!
//! ApiError는 백엔드 호출 실패를 표현합니다. 배너에 보여줄 메시지는
//! `user_message()`로 얻고, castdesk_foundation::Error로 변환할 수 있습니다.

use castdesk_foundation::Error as FoundationError;
use serde_json::Value;
use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Backend operation, used for logging and default messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Delete,
    Retry,
    Detail,
    Update,
    Download,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Create => "create",
            Operation::Delete => "delete",
            Operation::Retry => "retry",
            Operation::Detail => "detail",
            Operation::Update => "update",
            Operation::Download => "download",
        }
    }

    /// Message shown when the backend gives none
    pub fn default_message(&self) -> &'static str {
        match self {
            Operation::List => "Failed to fetch task list",
            Operation::Create => "Failed to create task",
            Operation::Delete => "Failed to delete task",
            Operation::Retry => "Failed to retry task",
            Operation::Detail => "Failed to fetch task detail",
            Operation::Update => "Failed to update task",
            Operation::Download => "Failed to download file",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by [`TaskApi`](crate::TaskApi) operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Non-success HTTP status; `message` is the backend's or the default
    #[error("{operation} failed (HTTP {status}): {message}")]
    Backend {
        operation: Operation,
        status: u16,
        message: String,
    },

    /// Connection, DNS, timeout
    #[error("{operation} failed: network error: {message}")]
    Network { operation: Operation, message: String },

    /// Response body did not match the expected shape
    #[error("{operation} failed: invalid response: {message}")]
    Decode { operation: Operation, message: String },

    /// Local file system failure while downloading
    #[error("{operation} failed: io error: {message}")]
    Io { operation: Operation, message: String },

    /// Refused before any request was sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    /// Build from a failed response, preferring the body's message
    pub fn from_response(operation: Operation, status: u16, body: &str) -> Self {
        let message =
            extract_message(body).unwrap_or_else(|| operation.default_message().to_string());
        ApiError::Backend {
            operation,
            status,
            message,
        }
    }

    pub fn network(operation: Operation, err: impl std::fmt::Display) -> Self {
        ApiError::Network {
            operation,
            message: err.to_string(),
        }
    }

    pub fn decode(operation: Operation, err: impl std::fmt::Display) -> Self {
        ApiError::Decode {
            operation,
            message: err.to_string(),
        }
    }

    pub fn io(operation: Operation, err: impl std::fmt::Display) -> Self {
        ApiError::Io {
            operation,
            message: err.to_string(),
        }
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            ApiError::Backend { operation, .. }
            | ApiError::Network { operation, .. }
            | ApiError::Decode { operation, .. }
            | ApiError::Io { operation, .. } => Some(*operation),
            ApiError::InvalidInput(_) => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text for the dismissible error banner
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Backend { message, .. } => message.clone(),
            ApiError::InvalidInput(msg) => msg.clone(),
            other => other
                .operation()
                .map(|op| op.default_message().to_string())
                .unwrap_or_default(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Pull a human-readable message out of an error body
///
/// Accepts `{"message": "..."}`, `{"detail": "..."}` and FastAPI validation
/// errors `{"detail": [{"msg": "..."}]}`.
pub fn extract_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;

    let candidate = json
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| json.get("detail").and_then(Value::as_str))
        .or_else(|| {
            json.get("detail")
                .and_then(Value::as_array)
                .and_then(|items| items.first())
                .and_then(|item| item.get("msg"))
                .and_then(Value::as_str)
        })?;

    let trimmed = candidate.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ============================================================================
// castdesk_foundation::Error 변환
// ============================================================================

impl From<ApiError> for FoundationError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Backend {
                status: 404,
                message,
                ..
            } => FoundationError::NotFound(message),
            ApiError::Backend {
                operation, message, ..
            } => FoundationError::api(operation.as_str(), message),
            ApiError::Network { message, .. } => FoundationError::Http(message),
            ApiError::Decode { operation, message } => {
                FoundationError::api(operation.as_str(), format!("Invalid response: {}", message))
            }
            ApiError::Io { message, .. } => FoundationError::Internal(message),
            ApiError::InvalidInput(msg) => FoundationError::InvalidInput(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_variants() {
        assert_eq!(
            extract_message(r#"{"message":"Task not found"}"#).as_deref(),
            Some("Task not found")
        );
        assert_eq!(
            extract_message(r#"{"detail":"Only failed tasks can be retried"}"#).as_deref(),
            Some("Only failed tasks can be retried")
        );
        assert_eq!(
            extract_message(r#"{"detail":[{"loc":["body","url"],"msg":"field required"}]}"#)
                .as_deref(),
            Some("field required")
        );
        assert_eq!(extract_message(r#"{"message":"  "}"#), None);
        assert_eq!(extract_message("<html>502</html>"), None);
    }

    #[test]
    fn test_default_message_fallback() {
        let err = ApiError::from_response(Operation::List, 500, "");
        assert_eq!(err.user_message(), "Failed to fetch task list");
        assert_eq!(err.status(), Some(500));

        let err = ApiError::network(Operation::Retry, "connection refused");
        assert_eq!(err.user_message(), "Failed to retry task");
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_backend_message_wins() {
        let err = ApiError::from_response(Operation::Delete, 404, r#"{"message":"gone"}"#);
        assert_eq!(err.user_message(), "gone");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_into_foundation_error() {
        let err: FoundationError =
            ApiError::from_response(Operation::Detail, 404, r#"{"detail":"Task not found"}"#).into();
        assert!(matches!(err, FoundationError::NotFound(ref m) if m == "Task not found"));

        let err: FoundationError = ApiError::network(Operation::List, "timeout").into();
        assert!(err.is_retryable());

        let err: FoundationError = ApiError::from_response(Operation::Update, 400, "").into();
        assert!(err.is_user_facing());
    }
}
