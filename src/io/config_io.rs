use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::model::config::ParserConfig;
use crate::model::task::FileMetadata;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not parse {path}: {source}")]
    MetadataParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{path}: expected a JSON object")]
    NotAnObject { path: PathBuf },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Read and validate a TOML parser config
pub fn load_config(path: &Path) -> Result<ParserConfig, ConfigError> {
    let text = read(path)?;
    let config: ParserConfig = toml::from_str(&text)?;
    validate(&config)?;
    Ok(config)
}

/// Read a JSON object to use as file metadata or project config data
pub fn load_metadata(path: &Path) -> Result<FileMetadata, ConfigError> {
    let text = read(path)?;
    let value: Value = serde_json::from_str(&text).map_err(|e| ConfigError::MetadataParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

/// Reject configs whose limits would make every parse fail
pub fn validate(config: &ParserConfig) -> Result<(), ConfigError> {
    let limits = [
        ("max_parse_iterations", config.max_parse_iterations),
        ("max_metadata_iterations", config.max_metadata_iterations),
        ("max_tag_length", config.max_tag_length),
        ("max_emoji_value_length", config.max_emoji_value_length),
        ("max_stack_operations", config.max_stack_operations),
        ("max_stack_size", config.max_stack_size),
    ];
    if let Some((name, _)) = limits.iter().find(|(_, v)| *v == 0) {
        return Err(ConfigError::Invalid(format!("{} must be greater than 0", name)));
    }
    if config.emoji_mapping.keys().any(|k| k.is_empty()) {
        return Err(ConfigError::Invalid("emoji_mapping has an empty marker".to_string()));
    }
    for mapping in &config.project_config.path_mappings {
        if mapping.enabled && mapping.project_name.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "path mapping {:?} has no project name",
                mapping.path_pattern
            )));
        }
    }
    Ok(())
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}
