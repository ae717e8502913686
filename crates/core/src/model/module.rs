use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::ids::ModuleId;
use crate::model::timestamp;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModuleError {
    #[error("module title cannot be empty")]
    EmptyTitle,

    #[error("module content cannot be empty")]
    EmptyContent,

    #[error("video modules need an absolute URL, got {0:?}")]
    InvalidVideoUrl(String),

    #[error("update has no fields")]
    EmptyPatch,
}

/// Content kind of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Text,
    Video,
}

impl ModuleKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ModuleKind::Text => "Text",
            ModuleKind::Video => "Video",
        }
    }
}

/// A unit of course content, possibly with an attached quiz.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: ModuleKind,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// List entry for modules (no content body).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModuleSummary {
    pub id: ModuleId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ModuleKind,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ModuleStats {
    pub total_modules: u64,
}

/// Payload for creating a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleDraft {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: ModuleKind,
}

impl ModuleDraft {
    /// Trim and check a draft.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError` for an empty title or content, or a video module
    /// whose content is not an absolute URL.
    pub fn validate(self) -> Result<Self, ModuleError> {
        let title = non_empty(&self.title).ok_or(ModuleError::EmptyTitle)?;
        let content = non_empty(&self.content).ok_or(ModuleError::EmptyContent)?;
        if self.kind == ModuleKind::Video {
            check_video_url(&content)?;
        }
        Ok(Self {
            title,
            content,
            kind: self.kind,
        })
    }
}

/// Partial update for a module. Absent fields are left untouched server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModulePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ModuleKind>,
}

impl ModulePatch {
    /// # Errors
    ///
    /// Returns `ModuleError::EmptyPatch` when nothing is set, otherwise the
    /// same errors as `ModuleDraft::validate` for the fields present.
    pub fn validate(self) -> Result<Self, ModuleError> {
        if self.title.is_none() && self.content.is_none() && self.kind.is_none() {
            return Err(ModuleError::EmptyPatch);
        }
        let title = match self.title {
            Some(title) => Some(non_empty(&title).ok_or(ModuleError::EmptyTitle)?),
            None => None,
        };
        let content = match self.content {
            Some(content) => Some(non_empty(&content).ok_or(ModuleError::EmptyContent)?),
            None => None,
        };
        if let (Some(ModuleKind::Video), Some(url)) = (self.kind, content.as_deref()) {
            check_video_url(url)?;
        }
        Ok(Self {
            title,
            content,
            kind: self.kind,
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn check_video_url(raw: &str) -> Result<(), ModuleError> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ModuleError::InvalidVideoUrl(raw.to_owned())),
    }
}
