use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of post-completion actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Delete,
    Keep,
    Complete,
    Move,
    Archive,
    Duplicate,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Delete => "delete",
            ActionKind::Keep => "keep",
            ActionKind::Complete => "complete",
            ActionKind::Move => "move",
            ActionKind::Archive => "archive",
            ActionKind::Duplicate => "duplicate",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed onCompletion directive.
///
/// Serializes as the JSON object form, e.g.
/// `{"type":"move","targetFile":"archive.md","targetSection":"Done"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum OnCompletionConfig {
    Delete,
    Keep,
    /// Mark other tasks complete
    Complete { task_ids: Vec<String> },
    Move {
        target_file: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_section: Option<String>,
    },
    Archive {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        archive_file: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        archive_section: Option<String>,
    },
    Duplicate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_file: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_section: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        preserve_metadata: Option<bool>,
    },
}

impl OnCompletionConfig {
    pub fn kind(&self) -> ActionKind {
        match self {
            OnCompletionConfig::Delete => ActionKind::Delete,
            OnCompletionConfig::Keep => ActionKind::Keep,
            OnCompletionConfig::Complete { .. } => ActionKind::Complete,
            OnCompletionConfig::Move { .. } => ActionKind::Move,
            OnCompletionConfig::Archive { .. } => ActionKind::Archive,
            OnCompletionConfig::Duplicate { .. } => ActionKind::Duplicate,
        }
    }
}

/// Outcome of reading a raw onCompletion string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectiveParseResult {
    pub is_valid: bool,
    pub raw: String,
    pub config: Option<OnCompletionConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DirectiveParseResult {
    pub fn valid(raw: &str, config: OnCompletionConfig) -> Self {
        DirectiveParseResult {
            is_valid: true,
            raw: raw.to_string(),
            config: Some(config),
            error: None,
        }
    }

    pub fn invalid(raw: &str, error: impl Into<String>) -> Self {
        DirectiveParseResult {
            is_valid: false,
            raw: raw.to_string(),
            config: None,
            error: Some(error.into()),
        }
    }
}
