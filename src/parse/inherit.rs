use serde_json::Value;

use crate::model::config::ParserConfig;
use crate::model::task::{Field, FileMetadata, Task, TaskMetadata, normalize_tag, scalar_text};
use crate::parse::tags::TagScanner;

/// File metadata keys that describe a task's identity or position and
/// are never copied onto tasks
const NON_INHERITABLE: [&str; 21] = [
    "id",
    "content",
    "status",
    "rawStatus",
    "completed",
    "line",
    "lineNumber",
    "originalMarkdown",
    "filePath",
    "heading",
    "headingLevel",
    "parent",
    "parentId",
    "children",
    "childrenIds",
    "indentLevel",
    "actualIndent",
    "listMarker",
    "tgProject",
    "comment",
    "metadata",
];

/// Fill the gaps in a task's metadata from file-level data.
///
/// `file_metadata` wins over `project_config_data`, and anything the
/// task set itself wins over both. Tags are merged rather than filled.
pub fn inherit(
    task: &mut Task,
    file_metadata: Option<&FileMetadata>,
    project_config_data: Option<&FileMetadata>,
    config: &ParserConfig,
    scanner: &TagScanner,
) {
    let inheritance = &config.file_metadata_inheritance;
    if !inheritance.enabled || !inheritance.inherit_from_frontmatter {
        return;
    }
    if task.is_subtask() && !inheritance.inherit_from_frontmatter_for_subtasks {
        return;
    }

    let project = &config.project_config;
    let metadata_key = project.metadata_config.metadata_key.as_str();
    let key_is_tg_project = project.enable_enhanced_project && project.metadata_config.enabled;
    let config_is_tg_project = project.enable_enhanced_project && project.config_file.enabled;

    if let Some(fm) = file_metadata {
        if !key_is_tg_project {
            map_project_key(&mut task.metadata, fm, metadata_key);
        }
        fill_from(&mut task.metadata, fm, scanner, |key| {
            key_is_tg_project && key == metadata_key
        });
    }
    if let Some(pc) = project_config_data {
        fill_from(&mut task.metadata, pc, scanner, |key| {
            config_is_tg_project && key == "project"
        });
    }
}

/// Copy a custom project key (e.g. `projectName`) into `project` when
/// the task has none of its own.
fn map_project_key(meta: &mut TaskMetadata, source: &FileMetadata, key: &str) {
    if !meta.project.as_deref().is_none_or(str::is_empty) {
        return;
    }
    let name = source
        .get(key)
        .and_then(scalar_text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    if let Some(name) = name {
        meta.project = Some(name);
    }
}

fn fill_from(
    meta: &mut TaskMetadata,
    source: &FileMetadata,
    scanner: &TagScanner,
    skip: impl Fn(&str) -> bool,
) {
    for (key, value) in source {
        if value.is_null() || NON_INHERITABLE.contains(&key.as_str()) || skip(key) {
            continue;
        }
        let field = Field::from_name(key);
        if field == Field::Tags {
            merge_tags(meta, value, scanner);
            continue;
        }
        if meta.has(&field) {
            continue;
        }
        if !meta.set_json(&field, value) {
            tracing::debug!(key = key.as_str(), "file metadata value not inheritable");
        }
    }
}

/// Union file-level tags into the task's own, `#`-normalized, and let
/// namespaced ones fill `project` / `area` / `context`.
fn merge_tags(meta: &mut TaskMetadata, value: &Value, scanner: &TagScanner) {
    let items: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    };
    for item in items {
        let tag = normalize_tag(&item);
        if tag.len() <= 1 {
            continue;
        }
        if let Some((field, v)) = scanner.namespace_field(&tag)
            && !meta.has(&field)
        {
            meta.set_text(&field, &v);
        }
        meta.tags.insert(tag);
    }
}
