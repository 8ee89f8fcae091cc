use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::project::TgProject;
use crate::util::date::parse_date_millis;

/// Pre-parsed key/value data for a whole file: frontmatter, or the
/// contents of a project config file found by the host.
pub type FileMetadata = serde_json::Map<String, Value>;

/// Task priority.
///
/// Known words and priority emojis become a level from 1 (lowest) to
/// 5 (highest). Numbers pass through as-is; unknown words are kept raw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Priority {
    Level(i64),
    Named(String),
}

impl Priority {
    pub fn from_text(s: &str) -> Priority {
        let s = s.trim();
        if let Ok(n) = s.parse::<i64>() {
            return Priority::Level(n);
        }
        match priority_level(s) {
            Some(level) => Priority::Level(level),
            None => Priority::Named(s.to_string()),
        }
    }

    pub fn from_value(value: &Value) -> Option<Priority> {
        match value {
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => Priority::Level(i),
                None => Priority::Named(n.to_string()),
            }),
            Value::String(s) => Some(Priority::from_text(s)),
            _ => None,
        }
    }

    pub fn level(&self) -> Option<i64> {
        match self {
            Priority::Level(l) => Some(*l),
            Priority::Named(_) => None,
        }
    }
}

/// Level for a priority word or priority emoji
pub fn priority_level(s: &str) -> Option<i64> {
    let level = match s.to_lowercase().as_str() {
        "highest" | "urgent" | "critical" | "🔺" => 5,
        "high" | "important" | "⏫" => 4,
        "medium" | "normal" | "moderate" | "🔼" => 3,
        "low" | "minor" | "🔽" => 2,
        "lowest" | "trivial" | "⏬" => 1,
        _ => return None,
    };
    Some(level)
}

/// A metadata field a marker, tag namespace, or file metadata key can name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Priority,
    DueDate,
    StartDate,
    ScheduledDate,
    CompletedDate,
    CreatedDate,
    CancelledDate,
    Recurrence,
    Project,
    Context,
    Area,
    Tags,
    OnCompletion,
    DependsOn,
    Id,
    Other(String),
}

impl Field {
    /// Resolve a field name. Canonical names and the short dataview
    /// aliases (`due`, `start`, `repeat`, ...) match case-insensitively.
    pub fn from_name(name: &str) -> Field {
        match name.trim().to_lowercase().as_str() {
            "priority" => Field::Priority,
            "duedate" | "due" => Field::DueDate,
            "startdate" | "start" => Field::StartDate,
            "scheduleddate" | "scheduled" => Field::ScheduledDate,
            "completeddate" | "completion" => Field::CompletedDate,
            "createddate" | "created" => Field::CreatedDate,
            "cancelleddate" | "cancelled" => Field::CancelledDate,
            "recurrence" | "repeat" => Field::Recurrence,
            "project" => Field::Project,
            "context" => Field::Context,
            "area" => Field::Area,
            "tags" => Field::Tags,
            "oncompletion" => Field::OnCompletion,
            "dependson" => Field::DependsOn,
            "id" => Field::Id,
            _ => Field::Other(name.trim().to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Field::Priority => "priority",
            Field::DueDate => "dueDate",
            Field::StartDate => "startDate",
            Field::ScheduledDate => "scheduledDate",
            Field::CompletedDate => "completedDate",
            Field::CreatedDate => "createdDate",
            Field::CancelledDate => "cancelledDate",
            Field::Recurrence => "recurrence",
            Field::Project => "project",
            Field::Context => "context",
            Field::Area => "area",
            Field::Tags => "tags",
            Field::OnCompletion => "onCompletion",
            Field::DependsOn => "dependsOn",
            Field::Id => "id",
            Field::Other(name) => name,
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(
            self,
            Field::DueDate
                | Field::StartDate
                | Field::ScheduledDate
                | Field::CompletedDate
                | Field::CreatedDate
                | Field::CancelledDate
        )
    }
}

/// Everything resolved about a task beyond its text and status.
///
/// Optional fields distinguish "absent" (`None`) from "present but
/// empty" (`Some("")`); only absent fields are filled by later stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMetadata {
    pub tags: IndexSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Epoch milliseconds, UTC midnight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    /// Raw post-completion directive, e.g. `move:archive.md#done`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_completion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tg_project: Option<TgProject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Fields with no dedicated slot, keyed by their original name
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extra: IndexMap<String, Value>,
}

impl TaskMetadata {
    pub fn has(&self, field: &Field) -> bool {
        match field {
            Field::Priority => self.priority.is_some(),
            Field::DueDate => self.due_date.is_some(),
            Field::StartDate => self.start_date.is_some(),
            Field::ScheduledDate => self.scheduled_date.is_some(),
            Field::CompletedDate => self.completed_date.is_some(),
            Field::CreatedDate => self.created_date.is_some(),
            Field::CancelledDate => self.cancelled_date.is_some(),
            Field::Recurrence => self.recurrence.is_some(),
            Field::Project => self.project.is_some(),
            Field::Context => self.context.is_some(),
            Field::Area => self.area.is_some(),
            Field::Tags => !self.tags.is_empty(),
            Field::OnCompletion => self.on_completion.is_some(),
            Field::DependsOn => self.depends_on.is_some(),
            Field::Id => self.id.is_some(),
            Field::Other(name) => self.extra.contains_key(name),
        }
    }

    /// Set a field from marker text, converting dates and priorities.
    /// Returns false when the value could not be converted.
    pub fn set_text(&mut self, field: &Field, value: &str) -> bool {
        let value = value.trim();
        if field.is_date() {
            let Some(ms) = parse_date_millis(value) else {
                return false;
            };
            *self.date_slot(field) = Some(ms);
            return true;
        }
        match field {
            Field::Priority => self.priority = Some(Priority::from_text(value)),
            Field::Recurrence => self.recurrence = Some(value.to_string()),
            Field::Project => self.project = Some(value.to_string()),
            Field::Context => self.context = Some(value.to_string()),
            Field::Area => self.area = Some(value.to_string()),
            Field::OnCompletion => self.on_completion = Some(value.to_string()),
            Field::Id => self.id = Some(value.to_string()),
            Field::DependsOn => {
                self.depends_on = Some(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect(),
                )
            }
            Field::Tags => {
                self.tags.insert(normalize_tag(value));
            }
            Field::Other(name) => {
                self.extra
                    .insert(name.clone(), Value::String(value.to_string()));
            }
            _ => return false,
        }
        true
    }

    /// Set a field from a file metadata value. Returns false when the
    /// value has no sensible conversion for the field.
    pub fn set_json(&mut self, field: &Field, value: &Value) -> bool {
        if let Field::Other(name) = field {
            self.extra.insert(name.clone(), value.clone());
            return true;
        }
        match value {
            Value::String(s) => self.set_text(field, s),
            Value::Number(n) if field.is_date() => match n.as_i64() {
                Some(ms) => {
                    *self.date_slot(field) = Some(ms);
                    true
                }
                None => false,
            },
            Value::Number(_) if *field == Field::Priority => {
                self.priority = Priority::from_value(value);
                true
            }
            Value::Number(_) | Value::Bool(_) => self.set_text(field, &value.to_string()),
            Value::Array(items) if *field == Field::DependsOn => {
                self.depends_on = Some(items.iter().filter_map(scalar_text).collect());
                true
            }
            _ => false,
        }
    }

    fn date_slot(&mut self, field: &Field) -> &mut Option<i64> {
        match field {
            Field::StartDate => &mut self.start_date,
            Field::ScheduledDate => &mut self.scheduled_date,
            Field::CompletedDate => &mut self.completed_date,
            Field::CreatedDate => &mut self.created_date,
            Field::CancelledDate => &mut self.cancelled_date,
            _ => &mut self.due_date,
        }
    }
}

/// Text of a scalar JSON value; `None` for null, arrays and objects
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Prefix a tag with `#` if it doesn't have one
pub fn normalize_tag(tag: &str) -> String {
    let tag = tag.trim();
    if tag.starts_with('#') {
        tag.to_string()
    } else {
        format!("#{}", tag)
    }
}

/// A single checkbox list item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// `<filePath>-L<line>`
    pub id: String,
    /// Item text with recognized markers, tags and contexts removed
    pub content: String,
    pub completed: bool,
    /// Character inside the checkbox
    pub status: char,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_name: Option<String>,
    /// 0-based line number in the source text
    pub line: usize,
    pub file_path: String,
    pub original_markdown: String,
    pub list_marker: String,
    /// Indentation width after clamping
    pub indent_level: usize,
    pub metadata: TaskMetadata,
}

impl Task {
    pub fn is_subtask(&self) -> bool {
        self.metadata.parent.is_some()
    }
}

/// Stable id for the task at `line` of `file_path`
pub fn task_id(file_path: &str, line: usize) -> String {
    format!("{}-L{}", file_path, line)
}
