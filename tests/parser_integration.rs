use mdtasks::model::{
    ConfigFileConfig, FileMetadata, MetadataKeyConfig, ParserConfig, PathMapping, Priority,
    ProjectConfig, Task, TgProjectKind,
};
use mdtasks::parse::{ConfigurableTaskParser, Limit, ParseError};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use std::path::Path;

fn parse(content: &str) -> Vec<Task> {
    ConfigurableTaskParser::default()
        .parse(content, "test.md", None, None)
        .unwrap()
}

fn parse_with(config: ParserConfig, content: &str, fm: Option<&FileMetadata>) -> Vec<Task> {
    ConfigurableTaskParser::new(config)
        .parse(content, "test.md", fm, None)
        .unwrap()
}

fn object(value: serde_json::Value) -> FileMetadata {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("not an object: {}", other),
    }
}

fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Could not read fixture {}: {}", name, e))
}

// ============================================================================
// Tags, contexts, namespaces
// ============================================================================

#[test]
fn test_project_tag_sets_project() {
    let tasks = parse("- [ ] Task with project #project/myproject");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].content, "Task with project");
    assert_eq!(tasks[0].metadata.project.as_deref(), Some("myproject"));
    assert!(tasks[0].metadata.tags.contains("#project/myproject"));
}

#[test]
fn test_area_and_context() {
    let tasks = parse("- [ ] Plan trip #area/personal @home");
    let meta = &tasks[0].metadata;
    assert_eq!(meta.area.as_deref(), Some("personal"));
    assert_eq!(meta.context.as_deref(), Some("home"));
    assert_eq!(tasks[0].content, "Plan trip");
}

#[test]
fn test_dataview_context_and_recurrence() {
    let tasks = parse("- [ ] Standup [context:: office] 🔁 every weekday");
    let meta = &tasks[0].metadata;
    assert_eq!(meta.context.as_deref(), Some("office"));
    assert_eq!(meta.recurrence.as_deref(), Some("every weekday"));
    assert_eq!(tasks[0].content, "Standup");
}

#[test]
fn test_chinese_tags() {
    let tasks = parse(
        "- [ ] Task with Chinese tag #中文标签\n\
         - [ ] Nested #new/中文1/中文2\n\
         - [ ] Project #project/中文项目",
    );
    assert!(tasks[0].metadata.tags.contains("#中文标签"));
    assert!(tasks[1].metadata.tags.contains("#new/中文1/中文2"));
    assert_eq!(tasks[2].metadata.project.as_deref(), Some("中文项目"));
}

#[test]
fn test_chinese_tags_with_metadata() {
    let tasks = parse("- [ ] Task with Chinese and metadata #重要 @家里 🔺 #project/工作项目");
    let meta = &tasks[0].metadata;
    assert!(meta.tags.contains("#重要"));
    assert!(meta.tags.contains("#project/工作项目"));
    assert_eq!(meta.project.as_deref(), Some("工作项目"));
    assert_eq!(meta.context.as_deref(), Some("家里"));
    assert_eq!(meta.priority, Some(Priority::Level(5)));
    assert_eq!(tasks[0].content, "Task with Chinese and metadata");
}

#[test]
fn test_link_text_is_not_tagged() {
    let tasks = parse("- [ ] Task [[Note#Title|Title]] #real-tag");
    let tags: Vec<&str> = tasks[0].metadata.tags.iter().map(String::as_str).collect();
    assert_eq!(tags, vec!["#real-tag"]);
    assert!(tasks[0].content.contains("[[Note#Title|Title]]"));
}

#[test]
fn test_color_codes_stay_in_content() {
    let tasks = parse("- [ ] Set color #ff0000 and #fff #design");
    let tags: Vec<&str> = tasks[0].metadata.tags.iter().map(String::as_str).collect();
    assert_eq!(tags, vec!["#design"]);
    assert_eq!(tasks[0].content, "Set color #ff0000 and #fff");
}

#[test]
fn test_long_tags_kept_whole() {
    let plain = format!("#{}", "a".repeat(50));
    let project = format!("#project/{}", "b".repeat(50));
    let tasks = parse(&format!("- [ ] Long {} {}", plain, project));
    assert!(tasks[0].metadata.tags.contains(&plain));
    assert!(tasks[0].metadata.tags.contains(&project));
    assert_eq!(tasks[0].metadata.project, Some("b".repeat(50)));
}

// ============================================================================
// Markers
// ============================================================================

#[test]
fn test_on_completion_stops_before_tag() {
    let tasks = parse("- [ ] Task 🏁 move:archive.md#completed-tasks #tag1");
    let meta = &tasks[0].metadata;
    assert_eq!(
        meta.on_completion.as_deref(),
        Some("move:archive.md#completed-tasks")
    );
    let tags: Vec<&str> = meta.tags.iter().map(String::as_str).collect();
    assert_eq!(tags, vec!["#tag1"]);
    assert_eq!(tasks[0].content, "Task");
}

#[test]
fn test_on_completion_json_and_delete() {
    let tasks = parse(
        "- [ ] A 🏁 delete\n\
         - [ ] B 🏁 complete:t1,t2 📅 2024-01-01",
    );
    assert_eq!(tasks[0].metadata.on_completion.as_deref(), Some("delete"));
    assert_eq!(tasks[1].metadata.on_completion.as_deref(), Some("complete:t1,t2"));
    assert!(tasks[1].metadata.due_date.is_some());
}

#[test]
fn test_priority_words_from_file_metadata() {
    for (word, level) in [("high", 4), ("medium", 3), ("low", 2), ("urgent", 5)] {
        let fm = object(json!({ "priority": word }));
        let tasks = parse_with(ParserConfig::default(), "- [ ] Task", Some(&fm));
        assert_eq!(tasks[0].metadata.priority, Some(Priority::Level(level)), "{}", word);
    }
    let fm = object(json!({ "priority": 2 }));
    let tasks = parse_with(ParserConfig::default(), "- [ ] Task", Some(&fm));
    assert_eq!(tasks[0].metadata.priority, Some(Priority::Level(2)));
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn test_parent_child_links() {
    let tasks = parse(
        "- [ ] Parent\n  - [ ] Child 1\n    - [ ] Grandchild\n  - [ ] Child 2",
    );
    assert_eq!(tasks.len(), 4);
    assert_eq!(tasks[0].metadata.parent, None);
    assert_eq!(
        tasks[0].metadata.children,
        vec!["test.md-L1".to_string(), "test.md-L3".to_string()]
    );
    assert_eq!(tasks[1].metadata.parent.as_deref(), Some("test.md-L0"));
    assert_eq!(tasks[2].metadata.parent.as_deref(), Some("test.md-L1"));
    assert_eq!(tasks[3].metadata.parent.as_deref(), Some("test.md-L0"));
}

#[test]
fn test_deep_nesting() {
    let content: Vec<String> = (0..=10)
        .map(|level| format!("{}- [ ] Level {}", "  ".repeat(level), level))
        .collect();
    let tasks = parse(&content.join("\n"));
    assert_eq!(tasks.len(), 11);
    for pair in tasks.windows(2) {
        assert_eq!(pair[1].metadata.parent.as_deref(), Some(pair[0].id.as_str()));
    }
}

#[test]
fn test_stack_size_limit_is_fatal() {
    let config = ParserConfig {
        max_stack_size: 2,
        ..Default::default()
    };
    let err = ConfigurableTaskParser::new(config)
        .parse("- [ ] a\n  - [ ] b\n    - [ ] c", "test.md", None, None)
        .unwrap_err();
    assert_eq!(
        err,
        ParseError::LimitExceeded {
            limit: Limit::StackSize,
            max: 2,
            line: 2,
        }
    );
}

#[test]
fn test_parse_iteration_limit_is_fatal() {
    let config = ParserConfig {
        max_parse_iterations: 2,
        ..Default::default()
    };
    let err = ConfigurableTaskParser::new(config)
        .parse("- [ ] a\n- [ ] b\n- [ ] c", "test.md", None, None)
        .unwrap_err();
    assert_eq!(err.to_string(), "max_parse_iterations (2) exceeded at line 3");
}

#[test]
fn test_headings_and_comments() {
    let config = ParserConfig {
        parse_headings: true,
        parse_comments: true,
        ..Default::default()
    };
    let tasks = parse_with(
        config,
        "## Inbox\n- [ ] First\n  details here\n  more details\n## Later\n  - [ ] Second",
        None,
    );
    assert_eq!(tasks[0].metadata.heading.as_deref(), Some("Inbox"));
    assert_eq!(tasks[0].metadata.heading_level, Some(2));
    assert_eq!(
        tasks[0].metadata.comment.as_deref(),
        Some("details here\nmore details")
    );
    assert_eq!(tasks[1].metadata.heading.as_deref(), Some("Later"));
    assert_eq!(tasks[1].metadata.parent, None);
}

#[test]
fn test_blank_line_ends_comment() {
    let config = ParserConfig {
        parse_comments: true,
        ..Default::default()
    };
    let tasks = parse_with(config, "- [ ] First\n  note\n\n  later paragraph", None);
    assert_eq!(tasks[0].metadata.comment.as_deref(), Some("note"));
}

// ============================================================================
// Robustness
// ============================================================================

#[test]
fn test_malformed_lines_skipped() {
    let tasks = parse(
        "- [ ] valid\n- [] missing status\n-[x] no space\n- [ ]no space after\n- [ ] Another valid",
    );
    let content: Vec<&str> = tasks.iter().map(|t| t.content.as_str()).collect();
    assert_eq!(content, vec!["valid", "Another valid"]);
    assert_eq!(tasks[1].line, 4);
}

#[test]
fn test_code_blocks_ignored() {
    let tasks = parse("```\n- [ ] not a task\n```\n- [ ] real");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, "test.md-L3");
}

#[test]
fn test_long_content() {
    let body = "a".repeat(10_000);
    let tasks = parse(&format!("- [ ] {}", body));
    assert_eq!(tasks[0].content, body);
}

#[test]
fn test_many_tasks() {
    let content: Vec<String> = (0..100).map(|i| format!("- [ ] Task {} #batch", i)).collect();
    let tasks = parse(&content.join("\n"));
    assert_eq!(tasks.len(), 100);
    assert_eq!(tasks[99].id, "test.md-L99");
    assert!(tasks.iter().all(|t| t.metadata.tags.contains("#batch")));
}

#[test]
fn test_parse_is_idempotent() {
    let content = load_fixture("sprint.md");
    let fm = object(json!({ "tags": ["sprint"], "priority": "medium" }));
    let parser = ConfigurableTaskParser::default();
    let first = parser.parse(&content, "sprint.md", Some(&fm), None).unwrap();
    let second = parser.parse(&content, "sprint.md", Some(&fm), None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_crlf_matches_lf() {
    let lf = parse("- [ ] One 📅 2024-01-01\n  - [x] Two #tag\n");
    let crlf = parse("- [ ] One 📅 2024-01-01\r\n  - [x] Two #tag\r\n");
    assert_eq!(lf, crlf);
}

// ============================================================================
// Project detection
// ============================================================================

fn enhanced() -> ProjectConfig {
    ProjectConfig {
        enable_enhanced_project: true,
        path_mappings: vec![PathMapping {
            path_pattern: "Projects/Work".to_string(),
            project_name: "Work".to_string(),
            enabled: true,
        }],
        metadata_config: MetadataKeyConfig {
            metadata_key: "project".to_string(),
            enabled: true,
        },
        config_file: ConfigFileConfig {
            enabled: true,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn tg_kind(project: ProjectConfig) -> Option<TgProjectKind> {
    let config = ParserConfig {
        project_config: project,
        ..Default::default()
    };
    let fm = object(json!({ "project": "FromMeta" }));
    let pc = object(json!({ "project": "FromConfig" }));
    ConfigurableTaskParser::new(config)
        .parse("- [ ] Task", "Projects/Work/plan.md", Some(&fm), Some(&pc))
        .unwrap()[0]
        .metadata
        .tg_project
        .as_ref()
        .map(|p| p.kind)
}

#[test]
fn test_project_cascade() {
    let mut project = enhanced();
    assert_eq!(tg_kind(project.clone()), Some(TgProjectKind::Path));

    project.path_mappings[0].enabled = false;
    assert_eq!(tg_kind(project.clone()), Some(TgProjectKind::Metadata));

    project.metadata_config.enabled = false;
    assert_eq!(tg_kind(project.clone()), Some(TgProjectKind::Config));

    project.config_file.enabled = false;
    assert_eq!(tg_kind(project), None);
}

#[test]
fn test_project_applies_to_every_task() {
    let config = ParserConfig {
        project_config: enhanced(),
        ..Default::default()
    };
    let tasks = ConfigurableTaskParser::new(config)
        .parse("- [ ] a\n  - [ ] b", "Projects/Work/plan.md", None, None)
        .unwrap();
    for task in &tasks {
        let tg = task.metadata.tg_project.as_ref().unwrap();
        assert_eq!(tg.name, "Work");
        assert_eq!(tg.source, "Projects/Work");
    }
}

// ============================================================================
// Inheritance
// ============================================================================

#[test]
fn test_task_values_beat_file_metadata() {
    let fm = object(json!({ "context": "home", "priority": "high" }));
    let tasks = parse_with(ParserConfig::default(), "- [ ] Task @work", Some(&fm));
    assert_eq!(tasks[0].metadata.context.as_deref(), Some("work"));
    assert_eq!(tasks[0].metadata.priority, Some(Priority::Level(4)));
}

#[test]
fn test_urgent_parent_only() {
    let fm = object(json!({ "priority": "urgent" }));
    let tasks = parse_with(ParserConfig::default(), "- [ ] Parent\n  - [ ] Child", Some(&fm));
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].metadata.priority, Some(Priority::Level(5)));
    assert_eq!(tasks[1].metadata.priority, None);
}

#[test]
fn test_subtask_inheritance_toggle() {
    let fm = object(json!({ "area": "ops" }));
    let content = "- [ ] Parent\n  - [ ] Child\n    - [ ] Grandchild";

    let mut config = ParserConfig::default();
    let tasks = parse_with(config.clone(), content, Some(&fm));
    let areas: Vec<Option<&str>> = tasks.iter().map(|t| t.metadata.area.as_deref()).collect();
    assert_eq!(areas, vec![Some("ops"), None, None]);

    config.file_metadata_inheritance.inherit_from_frontmatter_for_subtasks = true;
    let tasks = parse_with(config, content, Some(&fm));
    assert!(tasks.iter().all(|t| t.metadata.area.as_deref() == Some("ops")));
}

// ============================================================================
// Fixture
// ============================================================================

#[test]
fn test_sprint_fixture() {
    let content = load_fixture("sprint.md");
    let config = ParserConfig {
        parse_headings: true,
        ..Default::default()
    };
    let tasks = ConfigurableTaskParser::new(config)
        .parse(&content, "notes/sprint.md", None, None)
        .unwrap();

    let lines: Vec<usize> = tasks.iter().map(|t| t.line).collect();
    assert_eq!(lines, vec![6, 7, 8, 9, 10, 14, 15, 21]);

    let migrate = &tasks[0];
    assert_eq!(migrate.content, "Migrate billing tables");
    assert_eq!(migrate.metadata.priority, Some(Priority::Level(4)));
    assert_eq!(migrate.metadata.due_date, Some(1_709_856_000_000));
    assert_eq!(migrate.metadata.project.as_deref(), Some("billing"));
    assert_eq!(migrate.metadata.heading.as_deref(), Some("Backend"));
    assert_eq!(
        migrate.metadata.children,
        vec!["notes/sprint.md-L7".to_string(), "notes/sprint.md-L8".to_string()]
    );

    let written = &tasks[1];
    assert!(written.completed);
    assert_eq!(written.metadata.completed_date, Some(1_709_510_400_000));

    let backfill = &tasks[2];
    assert_eq!(backfill.content, "Backfill invoices");
    assert_eq!(backfill.metadata.context.as_deref(), Some("db"));
    assert_eq!(backfill.metadata.extra.get("owner"), Some(&json!("dana")));

    let verify = &tasks[3];
    assert_eq!(verify.status_name.as_deref(), Some("incomplete"));
    assert_eq!(verify.metadata.parent.as_deref(), Some("notes/sprint.md-L8"));
    assert_eq!(verify.metadata.recurrence.as_deref(), Some("every week"));

    let dropped = &tasks[4];
    assert_eq!(dropped.status_name.as_deref(), Some("cancelled"));
    assert!(!dropped.completed);
    assert!(dropped.metadata.cancelled_date.is_some());

    let settings = &tasks[5];
    assert_eq!(settings.list_marker, "1.");
    assert_eq!(settings.content, "Settings page [[Design#Settings|mockup]]");
    assert_eq!(settings.metadata.heading.as_deref(), Some("Frontend"));
    let tags: Vec<&str> = settings.metadata.tags.iter().map(String::as_str).collect();
    assert_eq!(tags, vec!["#ui"]);

    assert_eq!(tasks[6].status_name.as_deref(), Some("question"));
    assert!(tasks[6].metadata.tags.contains("#ui/theme"));

    let release = &tasks[7];
    assert_eq!(
        release.metadata.on_completion.as_deref(),
        Some("move:archive.md#sprint-14")
    );
    assert!(release.metadata.tags.contains("#release"));
}
