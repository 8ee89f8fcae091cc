use std::collections::HashMap;

use serde::Serialize;

use crate::model::directive::{DirectiveParseResult, OnCompletionConfig};
use crate::model::task::{Priority, Task};
use crate::util::date::format_date;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskListJson<'a> {
    pub file: String,
    pub tasks: Vec<&'a Task>,
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// One task per line, indented two spaces per nesting level
pub fn format_task_list(tasks: &[&Task]) -> Vec<String> {
    let mut depth: HashMap<&str, usize> = HashMap::new();
    let mut lines = Vec::new();
    for task in tasks {
        let d = task
            .metadata
            .parent
            .as_deref()
            .and_then(|p| depth.get(p))
            .map_or(0, |d| d + 1);
        depth.insert(task.id.as_str(), d);
        lines.push(format!("{}{}", "  ".repeat(d), format_task_line(task)));
    }
    lines
}

/// `[x] content #tags  due:2024-01-01 p:4 @home (L12)`
pub fn format_task_line(task: &Task) -> String {
    let meta = &task.metadata;
    let mut line = format!("[{}] {}", task.status, task.content);

    if !meta.tags.is_empty() {
        line.push(' ');
        line.push_str(&meta.tags.iter().cloned().collect::<Vec<_>>().join(" "));
    }

    let mut fields = Vec::new();
    if let Some(p) = &meta.priority {
        fields.push(format!("p:{}", format_priority(p)));
    }
    for (label, date) in [
        ("start", meta.start_date),
        ("scheduled", meta.scheduled_date),
        ("due", meta.due_date),
    ] {
        if let Some(d) = date.and_then(format_date) {
            fields.push(format!("{}:{}", label, d));
        }
    }
    if let Some(r) = &meta.recurrence {
        fields.push(format!("every:{}", r));
    }
    if let Some(c) = &meta.context {
        fields.push(format!("@{}", c));
    }
    if let Some(p) = &meta.project {
        fields.push(format!("project:{}", p));
    }
    if let Some(tg) = &meta.tg_project {
        fields.push(format!("tg:{}/{}", tg.kind.as_str(), tg.name));
    }
    if let Some(oc) = &meta.on_completion {
        fields.push(format!("then:{}", oc));
    }
    if !fields.is_empty() {
        line.push_str("  ");
        line.push_str(&fields.join(" "));
    }

    line.push_str(&format!(" (L{})", task.line + 1));
    line
}

fn format_priority(p: &Priority) -> String {
    match p {
        Priority::Level(l) => l.to_string(),
        Priority::Named(n) => n.clone(),
    }
}

/// Summary of a directive check, e.g. `move -> archive.md#Done`
pub fn format_directive(result: &DirectiveParseResult) -> String {
    let Some(config) = &result.config else {
        return format!(
            "invalid: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    };
    let target = |file: Option<&str>, section: Option<&str>| match (file, section) {
        (Some(f), Some(s)) => format!(" -> {}#{}", f, s),
        (Some(f), None) => format!(" -> {}", f),
        (None, Some(s)) => format!(" -> #{}", s),
        (None, None) => String::new(),
    };
    let detail = match config {
        OnCompletionConfig::Delete | OnCompletionConfig::Keep => String::new(),
        OnCompletionConfig::Complete { task_ids } => format!(" {}", task_ids.join(", ")),
        OnCompletionConfig::Move {
            target_file,
            target_section,
        } => target(
            Some(target_file.as_str()).filter(|f| !f.is_empty()),
            target_section.as_deref(),
        ),
        OnCompletionConfig::Archive {
            archive_file,
            archive_section,
        } => target(archive_file.as_deref(), archive_section.as_deref()),
        OnCompletionConfig::Duplicate {
            target_file,
            target_section,
            ..
        } => target(target_file.as_deref(), target_section.as_deref()),
    };
    format!("{}{}", config.kind(), detail)
}
