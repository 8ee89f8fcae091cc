use crate::model::config::ParserConfig;
use crate::model::task::Task;
use crate::parse::{Limit, ParseError};

/// Assembles tasks into a flat, document-ordered list with parent and
/// children links derived from indentation.
pub struct TaskBuilder<'c> {
    config: &'c ParserConfig,
    tasks: Vec<Task>,
    /// (index into `tasks`, indent) of the open ancestors
    stack: Vec<(usize, usize)>,
    operations: usize,
    heading: Option<(u8, String)>,
    /// Task that following deeper text lines belong to, with its raw indent
    comment_target: Option<(usize, usize)>,
}

impl<'c> TaskBuilder<'c> {
    pub fn new(config: &'c ParserConfig) -> Self {
        TaskBuilder {
            config,
            tasks: Vec::new(),
            stack: Vec::new(),
            operations: 0,
            heading: None,
            comment_target: None,
        }
    }

    /// Place a task. `indent` is its clamped indentation, `raw_indent`
    /// the leading whitespace as written.
    pub fn push(&mut self, mut task: Task, indent: usize, raw_indent: usize) -> Result<(), ParseError> {
        while self.stack.last().is_some_and(|&(_, open)| open >= indent) {
            self.stack.pop();
        }

        self.operations += 1;
        if self.operations > self.config.max_stack_operations {
            return Err(self.limit(Limit::StackOperations, &task));
        }
        if self.stack.len() >= self.config.max_stack_size {
            return Err(self.limit(Limit::StackSize, &task));
        }

        if let Some(&(parent_idx, _)) = self.stack.last() {
            let parent = &mut self.tasks[parent_idx];
            parent.metadata.children.push(task.id.clone());
            task.metadata.parent = Some(parent.id.clone());
        }
        if let Some((level, text)) = &self.heading {
            task.metadata.heading = Some(text.clone());
            task.metadata.heading_level = Some(*level);
        }

        let idx = self.tasks.len();
        self.stack.push((idx, indent));
        self.comment_target = Some((idx, raw_indent));
        self.tasks.push(task);
        Ok(())
    }

    /// A heading closes every open task and applies to the tasks below it
    pub fn heading(&mut self, level: u8, text: &str) {
        self.heading = Some((level, text.to_string()));
        self.stack.clear();
        self.comment_target = None;
    }

    /// A non-task line: deeper than the last task it continues that
    /// task's comment, otherwise it ends it.
    pub fn text(&mut self, text: &str, raw_indent: usize) {
        match self.comment_target {
            Some((idx, task_indent)) if self.config.parse_comments && raw_indent > task_indent => {
                let comment = self.tasks[idx]
                    .metadata
                    .comment
                    .get_or_insert_with(String::new);
                if !comment.is_empty() {
                    comment.push('\n');
                }
                comment.push_str(text.trim());
            }
            _ => self.comment_target = None,
        }
    }

    /// A blank line ends the current comment
    pub fn break_comment(&mut self) {
        self.comment_target = None;
    }

    pub fn finish(self) -> Vec<Task> {
        self.tasks
    }

    fn limit(&self, limit: Limit, task: &Task) -> ParseError {
        let max = match limit {
            Limit::StackOperations => self.config.max_stack_operations,
            _ => self.config.max_stack_size,
        };
        tracing::warn!(%limit, max, line = task.line, "task tree limit exceeded");
        ParseError::LimitExceeded {
            limit,
            max,
            line: task.line,
        }
    }
}
