use std::path::Path;

use regex::Regex;
use serde_json::Value;

use crate::model::config::{NamingStrategy, PathMapping, ProjectConfig};
use crate::model::project::{TgProject, TgProjectKind};
use crate::model::task::FileMetadata;

/// Decide a file's derived project.
///
/// First match wins: path mappings, the frontmatter metadata key, the
/// project config file, then default naming. Disabled methods are never
/// attempted, and nothing resolves unless enhanced detection is on.
pub fn resolve(
    file_path: &str,
    file_metadata: Option<&FileMetadata>,
    project_config_data: Option<&FileMetadata>,
    config: &ProjectConfig,
) -> Option<TgProject> {
    if !config.enable_enhanced_project {
        return None;
    }

    if let Some(mapping) = best_path_mapping(file_path, &config.path_mappings) {
        return Some(TgProject::new(
            TgProjectKind::Path,
            &mapping.project_name,
            &mapping.path_pattern,
        ));
    }

    let key = &config.metadata_config.metadata_key;
    if config.metadata_config.enabled
        && let Some(name) = file_metadata.and_then(|m| string_field(m, key))
    {
        return Some(TgProject::new(TgProjectKind::Metadata, name, key));
    }

    if config.config_file.enabled
        && let Some(name) = project_config_data.and_then(|d| string_field(d, "project"))
    {
        return Some(TgProject::new(
            TgProjectKind::Config,
            name,
            &config.config_file.file_name,
        ));
    }

    let naming = &config.default_project_naming;
    if naming.enabled {
        let name = match naming.strategy {
            NamingStrategy::Filename => file_name(file_path, naming.strip_extension),
            NamingStrategy::Foldername => folder_name(file_path),
            NamingStrategy::Metadata => file_metadata.and_then(|m| string_field(m, key)),
        };
        if let Some(name) = name {
            return Some(TgProject::new(
                TgProjectKind::Default,
                name,
                naming.strategy.as_str(),
            ));
        }
    }

    None
}

/// Copy of `metadata` with every enabled `sourceKey -> targetKey`
/// mapping applied. Source keys are kept.
pub fn apply_metadata_mappings(metadata: &FileMetadata, config: &ProjectConfig) -> FileMetadata {
    let mut mapped = metadata.clone();
    for mapping in config.metadata_mappings.iter().filter(|m| m.enabled) {
        if mapping.source_key.is_empty() || mapping.target_key.is_empty() {
            continue;
        }
        if let Some(value) = metadata.get(&mapping.source_key) {
            mapped.insert(mapping.target_key.clone(), value.clone());
        }
    }
    mapped
}

/// The longest enabled pattern matching `file_path`; earlier mappings
/// win ties.
fn best_path_mapping<'a>(file_path: &str, mappings: &'a [PathMapping]) -> Option<&'a PathMapping> {
    let path = file_path.replace('\\', "/");
    mappings
        .iter()
        .filter(|m| m.enabled && !m.path_pattern.is_empty())
        .filter(|m| path_matches(&path, &m.path_pattern))
        .rev()
        .max_by_key(|m| m.path_pattern.len())
}

/// Globs (`*`, `?`) match the whole path case-insensitively; plain
/// patterns are case-sensitive substrings.
pub fn path_matches(path: &str, pattern: &str) -> bool {
    let pattern = pattern.replace('\\', "/");
    if !pattern.contains(['*', '?']) {
        return path.contains(&pattern);
    }
    let mut re = String::from("(?i)^");
    for c in pattern.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            c => re.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    re.push('$');
    match Regex::new(&re) {
        Ok(re) => re.is_match(path),
        Err(e) => {
            tracing::warn!(pattern = %pattern, error = %e, "invalid path pattern");
            false
        }
    }
}

fn string_field(metadata: &FileMetadata, key: &str) -> Option<String> {
    match metadata.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn file_name(file_path: &str, strip_extension: bool) -> Option<String> {
    let normalized = file_path.replace('\\', "/");
    let path = Path::new(&normalized);
    let name = if strip_extension {
        path.file_stem()
    } else {
        path.file_name()
    };
    name.and_then(|n| n.to_str()).map(String::from)
}

fn folder_name(file_path: &str) -> Option<String> {
    let normalized = file_path.replace('\\', "/");
    Path::new(&normalized)
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .map(String::from)
}
