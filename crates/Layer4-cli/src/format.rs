//! Text formatting shared by the TUI page and one-shot commands

use castdesk_api::{ArtifactKind, Task};
use castdesk_foundation::strings::truncate;
use chrono::{DateTime, Local, NaiveDate, Utc};

pub const TITLE_WIDTH: usize = 20;
pub const URL_WIDTH: usize = 30;
pub const MESSAGE_WIDTH: usize = 40;

/// `2024-05-01 20:00` in local time, `-` when unknown
pub fn created(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// `YYYY-MM-DD` as typed in a date filter
pub fn parse_day(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// `50% tts`; empty once the task completed
pub fn progress(task: &Task) -> String {
    if !task.shows_progress() {
        return String::new();
    }
    format!("{}% {}", task.progress_percent(), task.step_label())
}

/// Ten-cell text gauge, `[#####-----]`
pub fn gauge(percent: u16) -> String {
    let filled = usize::from(percent.min(100)) / 10;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(10 - filled))
}

pub fn visibility(is_public: bool) -> &'static str {
    if is_public {
        "public"
    } else {
        "private"
    }
}

/// Short label per artifact, in download-key order
pub fn artifact_label(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::AudioCn => "CN audio",
        ArtifactKind::AudioEn => "EN audio",
        ArtifactKind::SubtitleCn => "CN srt",
        ArtifactKind::SubtitleEn => "EN srt",
    }
}

/// Compact availability marker, `A:cn,en S:en`
pub fn artifacts(task: &Task) -> String {
    let mut audio = Vec::new();
    let mut subs = Vec::new();
    for (kind, _) in task.artifacts() {
        let lang = match kind {
            ArtifactKind::AudioCn | ArtifactKind::SubtitleCn => "cn",
            ArtifactKind::AudioEn | ArtifactKind::SubtitleEn => "en",
        };
        if kind.is_audio() {
            audio.push(lang);
        } else {
            subs.push(lang);
        }
    }

    let mut parts = Vec::new();
    if !audio.is_empty() {
        parts.push(format!("A:{}", audio.join(",")));
    }
    if !subs.is_empty() {
        parts.push(format!("S:{}", subs.join(",")));
    }
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(" ")
    }
}

/// One line per task for `castdesk list`
pub fn task_row(task: &Task) -> String {
    format!(
        "{} {:<36} {:<10} {:<22} {:<32} {:<7} {:<16} {}",
        task.status.symbol(),
        task.id,
        task.status.display_name(),
        truncate(task.display_title(), TITLE_WIDTH),
        truncate(&task.url, URL_WIDTH),
        visibility(task.is_public),
        created(task.created_at),
        progress(task),
    )
}

/// Multi-line detail for `castdesk show`
pub fn task_detail(task: &Task) -> String {
    let mut lines = vec![
        format!("ID:          {}", task.id),
        format!("Status:      {} {}", task.status.symbol(), task.status.display_name()),
        format!("Title:       {}", task.display_title()),
        format!("URL:         {}", task.url),
        format!("Visibility:  {}", visibility(task.is_public)),
        format!("Created:     {}", created(task.created_at)),
    ];
    if task.updated_at.is_some() {
        lines.push(format!("Updated:     {}", created(task.updated_at)));
    }
    if task.shows_progress() {
        lines.push(format!(
            "Progress:    {} {}",
            gauge(task.progress_percent()),
            progress(task)
        ));
        if let Some(message) = task.progress_message.as_deref().or(task.progress.as_deref()) {
            lines.push(format!("Message:     {}", message));
        }
    }
    for (kind, url) in task.artifacts() {
        lines.push(format!("{:<12} {}", format!("{}:", artifact_label(kind)), url));
    }
    lines.join("\n")
}
