use serde::{Deserialize, Serialize};

/// How a derived project identity was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TgProjectKind {
    Path,
    Metadata,
    Config,
    Default,
}

impl TgProjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TgProjectKind::Path => "path",
            TgProjectKind::Metadata => "metadata",
            TgProjectKind::Config => "config",
            TgProjectKind::Default => "default",
        }
    }
}

/// A task's derived project. Never set from inline text, and kept apart
/// from the explicit `project` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TgProject {
    #[serde(rename = "type")]
    pub kind: TgProjectKind,
    pub name: String,
    /// Path pattern, metadata key, config file name, or naming strategy
    pub source: String,
    pub readonly: bool,
}

impl TgProject {
    pub fn new(kind: TgProjectKind, name: impl Into<String>, source: impl Into<String>) -> Self {
        TgProject {
            kind,
            name: name.into(),
            source: source.into(),
            readonly: true,
        }
    }
}
