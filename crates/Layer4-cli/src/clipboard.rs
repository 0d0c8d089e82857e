//! Clipboard - 태스크 ID / URL / 진행 메시지 복사
//!
//! 클립보드는 한 번만 열고 재사용한다. 헤드리스 환경에서는 사용할 수 없으므로
//! 실패는 항상 에러로 돌려주고, 화면에는 토스트로만 알린다.

use std::sync::{Mutex, OnceLock};
use tracing::debug;

static CLIPBOARD: OnceLock<Mutex<Option<arboard::Clipboard>>> = OnceLock::new();

/// 클립보드 에러
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    NotAvailable,
    Empty,
    SetFailed(String),
}

impl std::fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClipboardError::NotAvailable => write!(f, "Clipboard not available"),
            ClipboardError::Empty => write!(f, "Nothing to copy"),
            ClipboardError::SetFailed(e) => write!(f, "Failed to set clipboard: {}", e),
        }
    }
}

impl std::error::Error for ClipboardError {}

fn shared() -> &'static Mutex<Option<arboard::Clipboard>> {
    CLIPBOARD.get_or_init(|| Mutex::new(arboard::Clipboard::new().ok()))
}

/// 텍스트 복사 (빈 문자열은 거부)
pub fn copy_text(text: &str) -> Result<(), ClipboardError> {
    if text.trim().is_empty() {
        return Err(ClipboardError::Empty);
    }

    let mut guard = shared().lock().map_err(|_| ClipboardError::NotAvailable)?;
    let clipboard = guard.as_mut().ok_or(ClipboardError::NotAvailable)?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| ClipboardError::SetFailed(e.to_string()))
}

/// 복사 후 알릴 결과. 빈 문자열은 조용히 건너뛰므로 `None`
pub fn copy_for_report(text: &str) -> Option<bool> {
    match copy_text(text) {
        Ok(()) => Some(true),
        Err(ClipboardError::Empty) => None,
        Err(e) => {
            debug!(error = %e, "Copy failed");
            Some(false)
        }
    }
}
