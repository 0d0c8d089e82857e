//! Console Config - castdesk 통합 설정
//!
//! 글로벌 → 프로젝트 → 환경 변수 → CLI 순서로 병합된다 (뒤가 우선).

use crate::storage::JsonStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// 설정 파일명
pub const CONSOLE_CONFIG_FILE: &str = "config.json";

/// 백엔드 기본 주소
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// 폴링 주기 기본값 (초)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// 페이지 크기 기본값
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// 기본 테마
pub const DEFAULT_THEME: &str = "dark";

/// 환경 변수: 백엔드 주소
pub const ENV_BASE_URL: &str = "CASTDESK_BASE_URL";

/// 환경 변수: API 토큰
pub const ENV_API_TOKEN: &str = "CASTDESK_API_TOKEN";

// ============================================================================
// Console Config
// ============================================================================

/// castdesk 설정
///
/// 모든 필드는 Optional 이며, 비어 있으면 기본값을 사용한다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleConfig {
    /// 버전 (마이그레이션용)
    #[serde(default = "default_version")]
    pub version: u32,

    /// 백엔드 API 주소
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Bearer 토큰
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// 진행 중 태스크 폴링 주기 (초)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,

    /// 페이지당 태스크 수
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    /// 다운로드 저장 위치
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,

    /// 요청 타임아웃 (초), 없으면 무제한
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// 테마 이름 (dark / light)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            base_url: None,
            api_token: None,
            poll_interval_secs: None,
            page_size: None,
            download_dir: None,
            request_timeout_secs: None,
            theme: None,
        }
    }
}

impl ConsoleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 + 환경 변수 병합 로드
    pub fn load() -> Result<Self> {
        let mut config = Self::new();

        // 1. 글로벌 설정
        if let Ok(global) = JsonStore::global() {
            if let Some(global_config) = global.load_optional::<ConsoleConfig>(CONSOLE_CONFIG_FILE)? {
                debug!(dir = %global.base_dir().display(), "Loaded global config");
                config.merge(global_config);
            }
        }

        // 2. 프로젝트 설정
        if let Ok(project) = JsonStore::current_project() {
            if let Some(project_config) =
                project.load_optional::<ConsoleConfig>(CONSOLE_CONFIG_FILE)?
            {
                debug!(dir = %project.base_dir().display(), "Loaded project config");
                config.merge(project_config);
            }
        }

        // 3. 환경 변수
        config.apply_env(|key| std::env::var(key).ok());

        Ok(config)
    }

    /// 특정 저장소에서만 로드
    pub fn load_from(store: &JsonStore) -> Result<Self> {
        Ok(store
            .load_optional::<ConsoleConfig>(CONSOLE_CONFIG_FILE)?
            .unwrap_or_default())
    }

    /// 글로벌 설정 저장
    pub fn save_global(&self) -> Result<()> {
        let store = JsonStore::global()?;
        store.save(CONSOLE_CONFIG_FILE, self)
    }

    // ========================================================================
    // Merge
    // ========================================================================

    /// 다른 설정과 병합 (other가 우선)
    pub fn merge(&mut self, other: ConsoleConfig) {
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.api_token.is_some() {
            self.api_token = other.api_token;
        }
        if other.poll_interval_secs.is_some() {
            self.poll_interval_secs = other.poll_interval_secs;
        }
        if other.page_size.is_some() {
            self.page_size = other.page_size;
        }
        if other.download_dir.is_some() {
            self.download_dir = other.download_dir;
        }
        if other.request_timeout_secs.is_some() {
            self.request_timeout_secs = other.request_timeout_secs;
        }
        if other.theme.is_some() {
            self.theme = other.theme;
        }
    }

    /// 환경 변수 적용 (빈 값은 무시)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = Some(url);
        }
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.api_token = Some(token);
        }
    }

    // ========================================================================
    // Effective values
    // ========================================================================

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(|u| u.trim_end_matches('/'))
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS))
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// 다운로드 위치: 설정값 → 시스템 다운로드 폴더 → 현재 디렉토리
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn theme_name(&self) -> &str {
        self.theme.as_deref().unwrap_or(DEFAULT_THEME)
    }

    /// 설정값 검증
    pub fn validate(&self) -> Result<()> {
        let base = self.base_url();
        if base.trim().is_empty() {
            return Err(Error::Config("baseUrl must not be empty".to_string()));
        }
        let parsed = url::Url::parse(base)
            .map_err(|e| Error::Config(format!("Invalid baseUrl '{}': {}", base, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "baseUrl must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if self.poll_interval_secs == Some(0) {
            return Err(Error::Config("pollIntervalSecs must be positive".to_string()));
        }
        if self.page_size == Some(0) {
            return Err(Error::Config("pageSize must be positive".to_string()));
        }
        Ok(())
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = Some(secs);
        self
    }

    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }
}

fn default_version() -> u32 {
    1
}
