//! Config - 통합 설정 관리
//!
//! - `console.rs` - ConsoleConfig 통합 설정

mod console;

pub use console::{
    ConsoleConfig, CONSOLE_CONFIG_FILE, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_THEME, ENV_API_TOKEN, ENV_BASE_URL,
};
