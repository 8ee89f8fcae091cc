use std::borrow::Cow;

use crate::io::config_io::{ConfigError, validate};
use crate::lifecycle::Lifecycle;
use crate::model::config::ParserConfig;
use crate::model::project::TgProject;
use crate::model::task::{FileMetadata, Task, TaskMetadata, task_id};
use crate::parse::inherit::inherit;
use crate::parse::line_scanner::{LineKind, RawLine, scan};
use crate::parse::metadata::MetadataExtractor;
use crate::parse::project::{apply_metadata_mappings, resolve};
use crate::parse::span::strip_spans;
use crate::parse::tags::TagScanner;
use crate::parse::task_builder::TaskBuilder;
use crate::parse::ParseError;

/// Turns a markdown file into its task list.
///
/// The configuration is fixed at construction; `parse` holds no state
/// between calls, so one parser can serve any number of files.
#[derive(Debug, Clone)]
pub struct ConfigurableTaskParser {
    config: ParserConfig,
    extractor: MetadataExtractor,
    scanner: TagScanner,
}

impl Default for ConfigurableTaskParser {
    fn default() -> Self {
        ConfigurableTaskParser::new(ParserConfig::default())
    }
}

impl ConfigurableTaskParser {
    pub fn new(config: ParserConfig) -> Self {
        ConfigurableTaskParser {
            extractor: MetadataExtractor::new(&config),
            scanner: TagScanner::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse `content` into tasks in document order, parents before
    /// their children.
    pub fn parse(
        &self,
        content: &str,
        file_path: &str,
        file_metadata: Option<&FileMetadata>,
        project_config_data: Option<&FileMetadata>,
    ) -> Result<Vec<Task>, ParseError> {
        self.parse_inner(content, file_path, file_metadata, project_config_data, None)
    }

    /// Older call shape: same as [`parse`](Self::parse), plus a project
    /// used when nothing else resolves one.
    pub fn parse_legacy(
        &self,
        content: &str,
        file_path: &str,
        file_metadata: Option<&FileMetadata>,
        project_config_data: Option<&FileMetadata>,
        fallback_tg_project: Option<TgProject>,
    ) -> Result<Vec<Task>, ParseError> {
        self.parse_inner(
            content,
            file_path,
            file_metadata,
            project_config_data,
            fallback_tg_project,
        )
    }

    fn parse_inner(
        &self,
        content: &str,
        file_path: &str,
        file_metadata: Option<&FileMetadata>,
        project_config_data: Option<&FileMetadata>,
        fallback_tg_project: Option<TgProject>,
    ) -> Result<Vec<Task>, ParseError> {
        let project = &self.config.project_config;
        let file_metadata: Option<Cow<'_, FileMetadata>> = match file_metadata {
            Some(fm) if project.enable_enhanced_project && !project.metadata_mappings.is_empty() => {
                Some(Cow::Owned(apply_metadata_mappings(fm, project)))
            }
            other => other.map(Cow::Borrowed),
        };
        let file_metadata = file_metadata.as_deref();

        let tg_project = resolve(file_path, file_metadata, project_config_data, project)
            .or(fallback_tg_project);

        let mut builder = TaskBuilder::new(&self.config);
        let mut next_line = 0;
        for line in scan(content, &self.config)? {
            // the scanner drops blank and fence lines; either ends a comment
            if line.line_number > next_line {
                builder.break_comment();
            }
            next_line = line.line_number + 1;
            match line.kind {
                LineKind::Task {
                    marker,
                    status,
                    body,
                } => {
                    let mut task = self.build_task(&line, marker, status, body, file_path);
                    task.metadata.tg_project = tg_project.clone();
                    builder.push(task, line.indent, raw_indent(&line))?;
                }
                LineKind::Heading { level, text } => builder.heading(level, text),
                LineKind::Text => builder.text(line.text, raw_indent(&line)),
            }
        }

        let mut tasks = builder.finish();
        for task in &mut tasks {
            inherit(
                task,
                file_metadata,
                project_config_data,
                &self.config,
                &self.scanner,
            );
        }
        Ok(tasks)
    }

    fn build_task(&self, line: &RawLine<'_>, marker: &str, status: char, body: &str, file_path: &str) -> Task {
        let (content, metadata) = self.resolve_inline(body, line.line_number);
        let status_name = self.status_name(status);
        let completed = matches!(status, 'x' | 'X')
            || status_name
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case("done") || n.eq_ignore_ascii_case("completed"));

        Task {
            id: task_id(file_path, line.line_number),
            content,
            completed,
            status,
            status_name,
            line: line.line_number,
            file_path: file_path.to_string(),
            original_markdown: line.text.to_string(),
            list_marker: marker.to_string(),
            indent_level: line.indent,
            metadata,
        }
    }

    /// Markers first, then tags and contexts over whatever the markers
    /// left. Marker values win over tag-derived ones.
    fn resolve_inline(&self, body: &str, line: usize) -> (String, TaskMetadata) {
        let (mut metadata, mut removed, stopped_at) = if self.config.parse_metadata {
            let ex = self.extractor.extract(body, line);
            if let Some(err) = &ex.limit_hit {
                tracing::warn!(%err, "metadata extraction stopped early");
            }
            (ex.metadata, ex.removed, ex.stopped_at)
        } else {
            (TaskMetadata::default(), Vec::new(), body.len())
        };

        if self.config.parse_tags {
            let scan = self.scanner.scan_region(body, &removed, stopped_at, line);
            if let Some(err) = &scan.limit_hit {
                tracing::warn!(%err, "tag scan stopped early");
            }
            metadata.tags.extend(scan.tags);
            for (field, value) in &scan.fields {
                if !metadata.has(field) {
                    metadata.set_text(field, value);
                }
            }
            removed.extend(scan.removed);
        }

        (strip_spans(body, &removed), metadata)
    }

    fn status_name(&self, status: char) -> Option<String> {
        self.config
            .status_mapping
            .iter()
            .find(|(_, c)| **c == status)
            .map(|(name, _)| name.clone())
    }
}

impl Lifecycle for ConfigurableTaskParser {
    type Error = ConfigError;

    fn init(&mut self) -> Result<(), ConfigError> {
        validate(&self.config)
    }
}

fn raw_indent(line: &RawLine<'_>) -> usize {
    line.text.len() - line.text.trim_start().len()
}
