use std::collections::HashMap;
use std::convert::Infallible;

use serde::Serialize;

use crate::lifecycle::Lifecycle;
use crate::model::directive::{ActionKind, OnCompletionConfig};
use crate::model::task::Task;
use crate::parse::directive::parse_directive;

#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("{0}")]
    Failed(String),
}

/// Performs one kind of post-completion action. Implemented by the host;
/// this crate ships none.
pub trait ActionExecutor {
    fn kind(&self) -> ActionKind;

    fn validate(&self, config: &OnCompletionConfig) -> bool {
        config.kind() == self.kind()
    }

    /// Human-readable summary, e.g. "Move task to archive.md"
    fn describe(&self, config: &OnCompletionConfig) -> String;

    /// Run the action, returning a success message
    fn execute(&self, task: &Task, config: &OnCompletionConfig) -> Result<String, ExecutorError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    fn ok(message: String) -> Self {
        ExecutionResult {
            success: true,
            message: Some(message),
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        ExecutionResult {
            success: false,
            message: None,
            error: Some(error),
        }
    }
}

/// Routes parsed directives to the executor registered for their kind.
/// Every failure comes back as an unsuccessful [`ExecutionResult`].
#[derive(Default)]
pub struct DirectiveDispatcher {
    executors: HashMap<ActionKind, Box<dyn ActionExecutor>>,
}

impl DirectiveDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an executor, returning the one it replaced
    pub fn register(&mut self, executor: Box<dyn ActionExecutor>) -> Option<Box<dyn ActionExecutor>> {
        self.executors.insert(executor.kind(), executor)
    }

    pub fn has_executor(&self, kind: ActionKind) -> bool {
        self.executors.contains_key(&kind)
    }

    pub fn describe(&self, config: &OnCompletionConfig) -> Option<String> {
        self.executors
            .get(&config.kind())
            .map(|executor| executor.describe(config))
    }

    pub fn execute(&self, task: &Task, config: &OnCompletionConfig) -> ExecutionResult {
        let kind = config.kind();
        let Some(executor) = self.executors.get(&kind) else {
            return ExecutionResult::failed(format!("No executor found for action type: {}", kind));
        };
        if !executor.validate(config) {
            return ExecutionResult::failed(format!("Invalid configuration for {}", kind));
        }
        tracing::debug!(task = task.id.as_str(), %kind, "running completion action");
        match executor.execute(task, config) {
            Ok(message) => ExecutionResult::ok(message),
            Err(e) => ExecutionResult::failed(format!("Execution failed: {}", e)),
        }
    }

    /// Parse and run a completed task's onCompletion directive. `None`
    /// when the task is not complete or carries no directive.
    pub fn handle_completion(&self, task: &Task) -> Option<ExecutionResult> {
        if !task.completed {
            return None;
        }
        let raw = task.metadata.on_completion.as_deref()?;
        let parsed = parse_directive(raw);
        Some(match (parsed.config, parsed.error) {
            (Some(config), _) => self.execute(task, &config),
            (None, error) => ExecutionResult::failed(error.unwrap_or_default()),
        })
    }
}

impl Lifecycle for DirectiveDispatcher {
    type Error = Infallible;

    fn shutdown(&mut self) {
        self.executors.clear();
    }
}
