use std::fs;
use std::path::Path;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::lifecycle::Lifecycle;
use crate::model::config::ParserConfig;
use crate::model::task::{FileMetadata, Task, normalize_tag};
use crate::parse::{ConfigurableTaskParser, parse_directive};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    match cli.command {
        Commands::Parse(args) => cmd_parse(args, cli.config.as_deref(), json),
        Commands::Directive(args) => cmd_directive(args, json),
    }
}

// ---------------------------------------------------------------------------
// Parse
// ---------------------------------------------------------------------------

fn load_parser(config_path: Option<&Path>) -> Result<ConfigurableTaskParser, Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) => config_io::load_config(path)?,
        None => ParserConfig::default(),
    };
    let mut parser = ConfigurableTaskParser::new(config);
    parser.init()?;
    Ok(parser)
}

fn load_optional(path: Option<&Path>) -> Result<Option<FileMetadata>, config_io::ConfigError> {
    path.map(config_io::load_metadata).transpose()
}

fn cmd_parse(args: ParseArgs, config_path: Option<&Path>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let parser = load_parser(config_path)?;
    let content = fs::read_to_string(&args.file)
        .map_err(|e| format!("could not read {}: {}", args.file.display(), e))?;
    let file_metadata = load_optional(args.metadata.as_deref())?;
    let project_data = load_optional(args.project_config.as_deref())?;
    let file_path = args
        .path
        .unwrap_or_else(|| args.file.to_string_lossy().replace('\\', "/"));

    tracing::debug!(file = file_path.as_str(), "parsing");
    let tasks = parser.parse(
        &content,
        &file_path,
        file_metadata.as_ref(),
        project_data.as_ref(),
    )?;

    let wanted_tag = args.tag.as_deref().map(normalize_tag);
    let shown: Vec<&Task> = tasks
        .iter()
        .filter(|t| !args.open || !t.completed)
        .filter(|t| {
            wanted_tag
                .as_ref()
                .is_none_or(|tag| t.metadata.tags.contains(tag))
        })
        .collect();

    if json {
        let out = TaskListJson {
            file: file_path,
            tasks: shown,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if shown.is_empty() {
        println!("no tasks");
        return Ok(());
    }
    for line in format_task_list(&shown) {
        println!("{}", line);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Directive
// ---------------------------------------------------------------------------

fn cmd_directive(args: DirectiveArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let result = parse_directive(&args.raw);
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.is_valid {
        println!("{}", format_directive(&result));
    }
    match result.error {
        Some(error) if !result.is_valid => Err(error.into()),
        _ => Ok(()),
    }
}
