use serde::Deserialize;

use crate::model::ids::CourseId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub level: CourseLevel,
    #[serde(default)]
    pub description: Option<String>,
}

/// Backend liveness as reported by `/health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Health {
    pub status: String,
}

impl Health {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self.status.as_str(), "ok" | "healthy")
    }
}
