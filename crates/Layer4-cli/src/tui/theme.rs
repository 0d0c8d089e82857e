//! Theme - castdesk TUI 색상과 스타일
//!
//! 상태별 색상: pending 회색, processing 파랑, completed 초록, failed 빨강

use castdesk_api::TaskStatus;
use ratatui::style::{Color, Modifier, Style};

/// castdesk 테마
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    /// 전경색 (기본 텍스트)
    pub fg: Color,
    /// 보조 텍스트
    pub muted: Color,
    /// 강조색
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    /// 보더
    pub border: Color,
    /// 선택 행 배경
    pub selection_bg: Color,
    /// 선택 행 전경
    pub selection_fg: Color,
    /// 대기 상태
    pub pending: Color,
}

impl Theme {
    /// 다크 테마 (기본)
    pub fn dark() -> Self {
        Self {
            fg: Color::Rgb(220, 220, 224),
            muted: Color::Rgb(128, 128, 140),
            accent: Color::Rgb(120, 180, 255),
            success: Color::Rgb(80, 200, 120),
            warning: Color::Rgb(255, 200, 80),
            error: Color::Rgb(255, 100, 100),
            info: Color::Rgb(100, 180, 255),
            border: Color::Rgb(60, 60, 70),
            selection_bg: Color::Rgb(50, 80, 120),
            selection_fg: Color::Rgb(255, 255, 255),
            pending: Color::Rgb(150, 150, 160),
        }
    }

    /// 라이트 테마
    pub fn light() -> Self {
        Self {
            fg: Color::Rgb(30, 30, 40),
            muted: Color::Rgb(120, 120, 130),
            accent: Color::Rgb(0, 100, 200),
            success: Color::Rgb(30, 150, 80),
            warning: Color::Rgb(200, 150, 0),
            error: Color::Rgb(200, 60, 60),
            info: Color::Rgb(0, 120, 200),
            border: Color::Rgb(200, 200, 210),
            selection_bg: Color::Rgb(200, 220, 250),
            selection_fg: Color::Rgb(0, 0, 0),
            pending: Color::Rgb(110, 110, 120),
        }
    }

    /// 설정값으로 테마 선택 (알 수 없는 이름은 다크)
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    // === 스타일 헬퍼 ===

    pub fn text(&self) -> Style {
        Style::default().fg(self.fg)
    }

    pub fn text_muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn text_bold(&self) -> Style {
        Style::default().fg(self.fg).add_modifier(Modifier::BOLD)
    }

    pub fn header(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.selection_bg)
            .fg(self.selection_fg)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    /// 상태 색상
    pub fn status_color(&self, status: &TaskStatus) -> Color {
        match status {
            TaskStatus::Pending => self.pending,
            TaskStatus::Processing => self.info,
            TaskStatus::Completed => self.success,
            TaskStatus::Failed => self.error,
            TaskStatus::Unknown(_) => self.warning,
        }
    }

    pub fn status(&self, status: &TaskStatus) -> Style {
        Style::default().fg(self.status_color(status))
    }

    /// 진행률 게이지 (채워진 부분, 빈 부분)
    pub fn progress_bar(&self) -> (Style, Style) {
        (
            Style::default().fg(self.accent),
            Style::default().fg(self.border),
        )
    }

    /// 단축키
    pub fn keybind(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// 단축키 설명
    pub fn keybind_desc(&self) -> Style {
        Style::default().fg(self.muted)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

thread_local! {
    static CURRENT_THEME: std::cell::Cell<Theme> = std::cell::Cell::new(Theme::dark());
}

/// 현재 테마
pub fn current_theme() -> Theme {
    CURRENT_THEME.with(|t| t.get())
}

/// 테마 설정
pub fn set_theme(theme: Theme) {
    CURRENT_THEME.with(|t| t.set(theme));
}
