use serde_json::Value;

use crate::model::directive::{DirectiveParseResult, OnCompletionConfig};

const EMPTY: &str = "Empty or invalid onCompletion value";
const UNRECOGNIZED: &str = "Unrecognized onCompletion format";
const INVALID_STRUCTURE: &str = "Invalid configuration structure";

/// Read a raw onCompletion string.
///
/// Accepts the simple forms (`delete`, `keep`, `archive`,
/// `archive:<file>`, `complete:<id>,<id>`, `move:<file>[#<section>]`,
/// `duplicate:<file>[#<section>]`) and the JSON object form. Keywords
/// are case-insensitive. Problems are reported in the result, never as
/// an error.
pub fn parse_directive(raw: &str) -> DirectiveParseResult {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DirectiveParseResult::invalid(raw, EMPTY);
    }
    if trimmed.starts_with('{') {
        return parse_json(raw, trimmed);
    }
    match parse_simple(trimmed) {
        Ok(config) => DirectiveParseResult::valid(raw, config),
        Err(e) => DirectiveParseResult::invalid(raw, e),
    }
}

fn parse_json(raw: &str, text: &str) -> DirectiveParseResult {
    let mut value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => return DirectiveParseResult::invalid(raw, format!("Parse error: {}", e)),
    };
    if let Some(Value::String(kind)) = value.get_mut("type") {
        *kind = kind.trim().to_lowercase();
    }
    match serde_json::from_value::<OnCompletionConfig>(value) {
        Ok(config) => DirectiveParseResult::valid(raw, config),
        Err(e) => {
            tracing::debug!(error = %e, "onCompletion object rejected");
            DirectiveParseResult::invalid(raw, INVALID_STRUCTURE)
        }
    }
}

fn parse_simple(text: &str) -> Result<OnCompletionConfig, &'static str> {
    let (keyword, arg) = match text.split_once(':') {
        Some((k, a)) => (k.trim().to_lowercase(), Some(a.trim())),
        None => (text.to_lowercase(), None),
    };

    let config = match (keyword.as_str(), arg) {
        ("delete", None) => OnCompletionConfig::Delete,
        ("keep", None) => OnCompletionConfig::Keep,
        ("archive", None) => OnCompletionConfig::Archive {
            archive_file: None,
            archive_section: None,
        },
        ("archive", Some(arg)) => {
            let (file, section) = split_section(arg);
            OnCompletionConfig::Archive {
                archive_file: non_empty(file),
                archive_section: section,
            }
        }
        ("complete", Some(arg)) => {
            let task_ids: Vec<String> = arg
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from)
                .collect();
            OnCompletionConfig::Complete { task_ids }
        }
        ("move", Some(arg)) => {
            let (file, section) = split_section(arg);
            OnCompletionConfig::Move {
                target_file: file.to_string(),
                target_section: section,
            }
        }
        ("duplicate", Some(arg)) => {
            let (file, section) = split_section(arg);
            OnCompletionConfig::Duplicate {
                target_file: non_empty(file),
                target_section: section,
                preserve_metadata: None,
            }
        }
        _ => return Err(UNRECOGNIZED),
    };
    Ok(config)
}

/// `archive.md#Done` -> (`archive.md`, Some(`Done`))
fn split_section(arg: &str) -> (&str, Option<String>) {
    match arg.split_once('#') {
        Some((file, section)) => (file.trim(), non_empty(section)),
        None => (arg.trim(), None),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(raw: &str) -> OnCompletionConfig {
        let result = parse_directive(raw);
        assert!(result.is_valid, "{:?}", result.error);
        result.config.unwrap()
    }

    fn error(raw: &str) -> String {
        let result = parse_directive(raw);
        assert!(!result.is_valid);
        assert_eq!(result.config, None);
        result.error.unwrap()
    }

    #[test]
    fn test_keywords() {
        assert_eq!(config("delete"), OnCompletionConfig::Delete);
        assert_eq!(config("  KEEP "), OnCompletionConfig::Keep);
        assert_eq!(
            config("Archive"),
            OnCompletionConfig::Archive {
                archive_file: None,
                archive_section: None
            }
        );
    }

    #[test]
    fn test_move_with_section() {
        assert_eq!(
            config("move:archive.md#completed-tasks"),
            OnCompletionConfig::Move {
                target_file: "archive.md".to_string(),
                target_section: Some("completed-tasks".to_string()),
            }
        );
        assert_eq!(
            config("MOVE : my archive file.md"),
            OnCompletionConfig::Move {
                target_file: "my archive file.md".to_string(),
                target_section: None,
            }
        );
    }

    #[test]
    fn test_complete_ids() {
        assert_eq!(
            config("complete:task1, task2,,task3"),
            OnCompletionConfig::Complete {
                task_ids: vec!["task1".into(), "task2".into(), "task3".into()]
            }
        );
    }

    #[test]
    fn test_partial_configs_match_json_form() {
        let empty = OnCompletionConfig::Complete { task_ids: vec![] };
        assert_eq!(config("complete:"), empty);
        assert_eq!(config(" complete: , "), empty);
        assert_eq!(config(r#"{"type": "complete", "taskIds": []}"#), empty);
        assert_eq!(
            config("move:"),
            OnCompletionConfig::Move {
                target_file: String::new(),
                target_section: None,
            }
        );
    }

    #[test]
    fn test_archive_and_duplicate_targets() {
        assert_eq!(
            config("archive:Archive/2024.md"),
            OnCompletionConfig::Archive {
                archive_file: Some("Archive/2024.md".to_string()),
                archive_section: None,
            }
        );
        assert_eq!(
            config("duplicate:templates.canvas#Next"),
            OnCompletionConfig::Duplicate {
                target_file: Some("templates.canvas".to_string()),
                target_section: Some("Next".to_string()),
                preserve_metadata: None,
            }
        );
    }

    #[test]
    fn test_json_form() {
        assert_eq!(
            config(r#"{"type": "MOVE", "targetFile": "done.md"}"#),
            OnCompletionConfig::Move {
                target_file: "done.md".to_string(),
                target_section: None,
            }
        );
        assert_eq!(
            config(r#"{"type": "complete", "taskIds": ["a", "b"]}"#),
            OnCompletionConfig::Complete {
                task_ids: vec!["a".into(), "b".into()]
            }
        );
        assert_eq!(config(r#"{"type": "delete", "extra": 1}"#), OnCompletionConfig::Delete);
    }

    #[test]
    fn test_json_structure_errors() {
        assert_eq!(error(r#"{"type": "complete"}"#), INVALID_STRUCTURE);
        assert_eq!(error(r#"{"type": "move", "targetFile": 3}"#), INVALID_STRUCTURE);
        assert_eq!(error(r#"{"type": "explode"}"#), INVALID_STRUCTURE);
        assert_eq!(error(r#"{"targetFile": "x.md"}"#), INVALID_STRUCTURE);
    }

    #[test]
    fn test_json_syntax_error() {
        assert!(error(r#"{"type": "delete""#).starts_with("Parse error: "));
    }

    #[test]
    fn test_unrecognized_and_empty() {
        assert_eq!(error("explode"), UNRECOGNIZED);
        assert_eq!(error("delete:now"), UNRECOGNIZED);
        assert_eq!(error("move"), UNRECOGNIZED);
        assert_eq!(error("   "), EMPTY);
        assert_eq!(error(""), EMPTY);
    }

    #[test]
    fn test_raw_is_kept() {
        let result = parse_directive(" delete ");
        assert_eq!(result.raw, " delete ");
    }
}
