use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mdtasks",
    about = concat!("mdtasks v", env!("CARGO_PKG_VERSION"), " - tasks and metadata from markdown checklists"),
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Parser config file (TOML)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a markdown file and list its tasks
    Parse(ParseArgs),
    /// Check an onCompletion directive
    Directive(DirectiveArgs),
}

#[derive(Args)]
pub struct ParseArgs {
    /// Markdown file to parse
    pub file: PathBuf,
    /// File metadata (frontmatter) as a JSON object
    #[arg(long)]
    pub metadata: Option<PathBuf>,
    /// Project config data as a JSON object
    #[arg(long = "project-config")]
    pub project_config: Option<PathBuf>,
    /// Path used for task ids and project mapping (default: FILE as given)
    #[arg(long)]
    pub path: Option<String>,
    /// Hide completed tasks
    #[arg(long)]
    pub open: bool,
    /// Only show tasks with this tag (with or without the leading #)
    #[arg(long)]
    pub tag: Option<String>,
}

#[derive(Args)]
pub struct DirectiveArgs {
    /// Raw directive, e.g. "move:archive.md#Done"
    pub raw: String,
}
