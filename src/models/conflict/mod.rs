// Conflict module
// Request/response types for the external conflict-check service

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    Teacher,
    Room,
    Student,
    TimeOff,
    /// No specific clash; the check itself could not be completed
    Unverified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks a commit
    Error,
    /// Informational only
    Warning,
}

/// One conflict reported by the checker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictResult {
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
}

impl ConflictResult {
    pub fn error(conflict_type: ConflictType, message: impl Into<String>) -> Self {
        Self {
            conflict_type,
            severity: Severity::Error,
            message: message.into(),
            entity_name: None,
        }
    }

    pub fn warning(conflict_type: ConflictType, message: impl Into<String>) -> Self {
        Self {
            conflict_type,
            severity: Severity::Warning,
            message: message.into(),
            entity_name: None,
        }
    }

    pub fn with_entity(mut self, entity_name: impl Into<String>) -> Self {
        self.entity_name = Some(entity_name.into());
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ConflictResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entity_name {
            Some(name) => write!(f, "{} ({})", self.message, name),
            None => f.write_str(&self.message),
        }
    }
}

/// Proposed time slot to validate before persisting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictCheckRequest {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub teacher_id: String,
    pub teacher_user_id: Option<String>,
    pub room_id: Option<String>,
    pub location_id: Option<String>,
    #[serde(default)]
    pub student_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_lesson_id: Option<String>,
}
