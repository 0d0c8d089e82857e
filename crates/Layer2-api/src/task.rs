//! Task record and status as reported by the backend

use crate::de;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a backend task
///
/// `pending → processing → {completed | failed}`; `failed → pending` happens
/// only through an explicit retry. Unrecognised values are kept verbatim so a
/// newer backend never breaks decoding of a whole page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
    Unknown(String),
}

impl TaskStatus {
    /// Every status the backend documents, in lifecycle order
    pub const KNOWN: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::Processing,
        TaskStatus::Completed,
        TaskStatus::Failed,
    ];

    /// Check if this is a terminal state (no further automatic transition)
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// Only failed tasks can be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, TaskStatus::Failed)
    }

    /// Wire value
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Unknown(raw) => raw,
        }
    }

    /// Get display name for the state
    pub fn display_name(&self) -> &str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::Processing => "Processing",
            TaskStatus::Completed => "Completed",
            TaskStatus::Failed => "Failed",
            TaskStatus::Unknown(raw) => raw,
        }
    }

    /// Get a symbol for the state (for TUI)
    pub fn symbol(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "⧗",
            TaskStatus::Processing => "⟳",
            TaskStatus::Completed => "✓",
            TaskStatus::Failed => "✗",
            TaskStatus::Unknown(_) => "?",
        }
    }
}

impl From<String> for TaskStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => TaskStatus::Pending,
            "processing" => TaskStatus::Processing,
            "completed" => TaskStatus::Completed,
            "failed" => TaskStatus::Failed,
            _ => TaskStatus::Unknown(raw),
        }
    }
}

impl From<&str> for TaskStatus {
    fn from(raw: &str) -> Self {
        TaskStatus::from(raw.to_string())
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Downloadable output of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    AudioCn,
    AudioEn,
    SubtitleCn,
    SubtitleEn,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::AudioCn,
        ArtifactKind::AudioEn,
        ArtifactKind::SubtitleCn,
        ArtifactKind::SubtitleEn,
    ];

    /// Short label used by the CLI (`audio-cn`, ...)
    pub fn slug(&self) -> &'static str {
        match self {
            ArtifactKind::AudioCn => "audio-cn",
            ArtifactKind::AudioEn => "audio-en",
            ArtifactKind::SubtitleCn => "subtitle-cn",
            ArtifactKind::SubtitleEn => "subtitle-en",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, ArtifactKind::AudioCn | ArtifactKind::AudioEn)
    }
}

/// A content-processing job
///
/// Progress fields are meaningful only while the status is non-terminal.
/// Artifact URLs are filled in independently and may show up before the task
/// reaches `completed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "taskId")]
    pub id: String,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub is_public: bool,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub status: TaskStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step_index: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_steps: Option<u32>,

    #[serde(
        default,
        deserialize_with = "de::string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_step: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_message: Option<String>,

    /// Legacy free-text progress from older backends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,

    #[serde(rename = "audioUrlCn", default, skip_serializing_if = "Option::is_none")]
    pub audio_url_cn: Option<String>,

    #[serde(rename = "audioUrlEn", default, skip_serializing_if = "Option::is_none")]
    pub audio_url_en: Option<String>,

    #[serde(rename = "subtitleUrlCn", default, skip_serializing_if = "Option::is_none")]
    pub subtitle_url_cn: Option<String>,

    #[serde(rename = "subtitleUrlEn", default, skip_serializing_if = "Option::is_none")]
    pub subtitle_url_en: Option<String>,

    #[serde(rename = "createdAt", default, with = "de::timestamp")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(
        rename = "updatedAt",
        default,
        with = "de::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Overall progress in percent: `round((step_index + 1) / total * 100)`.
    ///
    /// Zero when either field is missing or `total_steps` is zero.
    pub fn progress_percent(&self) -> u16 {
        match (self.current_step_index, self.total_steps) {
            (Some(index), Some(total)) if total > 0 => {
                let pct = ((index as f64 + 1.0) / total as f64 * 100.0).round();
                pct.clamp(0.0, 100.0) as u16
            }
            _ => 0,
        }
    }

    /// Label of the running step
    pub fn step_label(&self) -> &str {
        self.current_step
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("Preparing")
    }

    /// Progress is hidden once the task completed
    pub fn shows_progress(&self) -> bool {
        self.status != TaskStatus::Completed
    }

    pub fn artifact_url(&self, kind: ArtifactKind) -> Option<&str> {
        let url = match kind {
            ArtifactKind::AudioCn => &self.audio_url_cn,
            ArtifactKind::AudioEn => &self.audio_url_en,
            ArtifactKind::SubtitleCn => &self.subtitle_url_cn,
            ArtifactKind::SubtitleEn => &self.subtitle_url_en,
        };
        url.as_deref().filter(|u| !u.is_empty())
    }

    /// Artifacts that are already available, in display order
    pub fn artifacts(&self) -> Vec<(ArtifactKind, &str)> {
        ArtifactKind::ALL
            .into_iter()
            .filter_map(|kind| self.artifact_url(kind).map(|url| (kind, url)))
            .collect()
    }

    /// Title for display, `-` when missing
    pub fn display_title(&self) -> &str {
        self.title.as_deref().filter(|t| !t.is_empty()).unwrap_or("-")
    }
}
