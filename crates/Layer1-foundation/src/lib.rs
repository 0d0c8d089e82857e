//! # castdesk-foundation
//!
//! Foundation layer for castdesk:
//! - Error: 공통 에러 타입과 Result
//! - Config: ConsoleConfig (글로벌 + 프로젝트 + 환경 변수)
//! - Storage: JsonStore (설정 파일)
//! - Strings: 표시용 문자열 유틸리티
//!
//! ## 아키텍처
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Layer4  castdesk (TUI page / one-shot CLI)  │
//! │                     │                        │
//! │  Layer3  TaskListController + Poller         │
//! │                     │                        │
//! │  Layer2  TaskApi (reqwest HTTP client)       │
//! │                     │                        │
//! │  Layer1  config · error · storage · strings  │
//! └──────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod storage;
pub mod strings;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    ConsoleConfig, CONSOLE_CONFIG_FILE, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_THEME, ENV_API_TOKEN, ENV_BASE_URL,
};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::JsonStore;
